// =============================================================================
// Candle Table - time-bounded sliding window of samples per pair
// =============================================================================
//
// Every write prepends the new sample and drops all stored samples whose
// timestamp is at or before `now - window`. The new sample itself is always
// kept, even if it is already older than the cutoff. Samples are never sorted:
// the window is in insertion order (newest insert first), which matches time
// order only when collectors deliver in time order.
// =============================================================================

use std::collections::HashMap;
use std::time::Duration;

use parking_lot::RwLock;
use tracing::{debug, trace};

use crate::clock::Clock;
use crate::error::{Result, StoreError};
use crate::types::{CandlePrice, CurrencyPair};

/// Thread-safe map of pair key to its candle window.
pub struct CandleTable {
    windows: RwLock<HashMap<String, Vec<CandlePrice>>>,
    window: Duration,
}

impl CandleTable {
    /// Create an empty table that retains samples newer than `window`.
    pub fn new(window: Duration) -> Self {
        Self {
            windows: RwLock::new(HashMap::new()),
            window,
        }
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    /// Insert `candle` for `pair` and prune the window against `clock`.
    /// The clock read, the insert and the prune all happen under one write
    /// lock.
    pub fn insert(&self, pair: &CurrencyPair, candle: CandlePrice, clock: &dyn Clock) {
        let mut windows = self.windows.write();
        let stale_ms = clock.now_ms().saturating_sub(self.window_ms());

        let old = windows.remove(&pair.key()).unwrap_or_default();

        let mut fresh = Vec::with_capacity(old.len() + 1);
        fresh.push(candle);
        fresh.extend(old.iter().copied().filter(|c| c.timestamp_ms > stale_ms));

        let pruned = old.len() + 1 - fresh.len();
        if pruned > 0 {
            debug!(pair = %pair, pruned, retained = fresh.len(), "pruned stale candles");
        } else {
            trace!(pair = %pair, retained = fresh.len(), "candle stored");
        }

        windows.insert(pair.key(), fresh);
    }

    /// Return an owned copy of the window for every requested pair, or fail
    /// on the first pair that has no window. An empty window is returned as
    /// an empty vector, not an error.
    pub fn get_many(
        &self,
        pairs: &[CurrencyPair],
    ) -> Result<HashMap<String, Vec<CandlePrice>>> {
        let windows = self.windows.read();

        let mut out = HashMap::with_capacity(pairs.len());
        for pair in pairs {
            let key = pair.key();
            let Some(window) = windows.get(&key) else {
                debug!(pair = %key, "candles missing from store");
                return Err(StoreError::MissingCandles(key));
            };
            out.insert(key, window.clone());
        }
        Ok(out)
    }

    /// Number of samples currently held for `pair`.
    pub fn count(&self, pair: &CurrencyPair) -> usize {
        self.windows.read().get(&pair.key()).map_or(0, Vec::len)
    }

    fn window_ms(&self) -> i64 {
        i64::try_from(self.window.as_millis()).unwrap_or(i64::MAX)
    }
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
