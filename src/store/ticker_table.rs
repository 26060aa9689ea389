// =============================================================================
// Ticker Table - latest instantaneous price per pair
// =============================================================================

use std::collections::HashMap;

use parking_lot::RwLock;
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::types::{CurrencyPair, TickerPrice};

/// Holds the single most recent ticker per canonical pair key.
pub struct TickerTable {
    tickers: RwLock<HashMap<String, TickerPrice>>,
}

impl TickerTable {
    pub fn new() -> Self {
        Self {
            tickers: RwLock::new(HashMap::new()),
        }
    }

    /// Replace the ticker for `pair`. Last write wins, timestamps are not
    /// compared.
    pub fn set(&self, pair: &CurrencyPair, ticker: TickerPrice) {
        self.tickers.write().insert(pair.key(), ticker);
    }

    /// Return the tickers for every requested pair, or fail on the first pair
    /// that has none. The read lock is held for the whole batch.
    pub fn get_many(&self, pairs: &[CurrencyPair]) -> Result<HashMap<String, TickerPrice>> {
        let tickers = self.tickers.read();

        let mut out = HashMap::with_capacity(pairs.len());
        for pair in pairs {
            let key = pair.key();
            let Some(ticker) = tickers.get(&key) else {
                debug!(pair = %key, "ticker missing from store");
                return Err(StoreError::MissingTicker(key));
            };
            out.insert(key, *ticker);
        }
        Ok(out)
    }

    #[cfg(test)]
    fn len(&self) -> usize {
        self.tickers.read().len()
    }
}

impl Default for TickerTable {
    fn default() -> Self {
        Self::new()
    }
}
