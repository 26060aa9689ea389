// =============================================================================
// Price Store - tickers, candle windows and subscriptions for one collector
// =============================================================================
//
// Thread safety:
//   - Each collection sits behind its own parking_lot::RwLock.
//   - No lock is ever held while another is taken, so the three locks can
//     not deadlock against each other.
//   - Batched reads hold their single lock for the whole batch and return
//     owned copies.
//
// The store is built once per collector and shared as `Arc<PriceStore>`.
// =============================================================================

pub mod candle_table;
pub mod subscriptions;
pub mod ticker_table;

pub use candle_table::CandleTable;
pub use subscriptions::SubscriptionRegistry;
pub use ticker_table::TickerTable;

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::clock::{Clock, SystemClock};
use crate::error::Result;
use crate::types::{CandlePrice, CurrencyPair, TickerPrice};

/// In-memory store of the freshest market data a collector has observed.
pub struct PriceStore {
    tickers: TickerTable,
    candles: CandleTable,
    subscriptions: SubscriptionRegistry,
    clock: Arc<dyn Clock>,
}

impl PriceStore {
    /// Create an empty store whose candle windows keep samples newer than
    /// `candle_window`, measured against the system clock.
    pub fn new(candle_window: Duration) -> Self {
        Self::with_clock(candle_window, Arc::new(SystemClock))
    }

    /// Create an empty store that reads "now" from `clock`.
    pub fn with_clock(candle_window: Duration, clock: Arc<dyn Clock>) -> Self {
        Self {
            tickers: TickerTable::new(),
            candles: CandleTable::new(candle_window),
            subscriptions: SubscriptionRegistry::new(),
            clock,
        }
    }

    pub fn candle_window(&self) -> Duration {
        self.candles.window()
    }

    // ── Reads (aggregation consumer) ────────────────────────────────────

    /// Tickers for every pair, keyed by canonical pair key. Fails with
    /// [`StoreError::MissingTicker`](crate::StoreError::MissingTicker) if
    /// any pair has no ticker; no partial map is ever returned.
    pub fn get_ticker_prices(
        &self,
        pairs: &[CurrencyPair],
    ) -> Result<HashMap<String, TickerPrice>> {
        self.tickers.get_many(pairs)
    }

    /// Copies of the candle windows for every pair. Fails with
    /// [`StoreError::MissingCandles`](crate::StoreError::MissingCandles) if
    /// any pair has no window.
    pub fn get_candle_prices(
        &self,
        pairs: &[CurrencyPair],
    ) -> Result<HashMap<String, Vec<CandlePrice>>> {
        self.candles.get_many(pairs)
    }

    // ── Writes (collector tasks) ────────────────────────────────────────

    pub fn set_ticker(&self, pair: &CurrencyPair, ticker: TickerPrice) {
        self.tickers.set(pair, ticker);
    }

    /// Store a candle sample and prune the pair's window against the
    /// store clock.
    pub fn set_candle(&self, pair: &CurrencyPair, candle: CandlePrice) {
        self.candles.insert(pair, candle, self.clock.as_ref());
    }

    // ── Subscriptions (coverage management) ─────────────────────────────

    /// Subscribe `pairs` and return only those that were not already
    /// subscribed. Callers use the result to start new upstream streams.
    pub fn add_subscribed_pairs(&self, pairs: &[CurrencyPair]) -> Vec<CurrencyPair> {
        self.subscriptions.add(pairs)
    }

    pub fn set_subscribed_pairs(&self, pairs: &[CurrencyPair]) {
        self.subscriptions.set(pairs);
    }

    pub fn is_subscribed(&self, key: &str) -> bool {
        self.subscriptions.is_subscribed(key)
    }

    pub fn subscribed_pairs(&self) -> Vec<CurrencyPair> {
        self.subscriptions.pairs()
    }

    /// Number of candle samples currently held for `pair`.
    pub fn candle_count(&self, pair: &CurrencyPair) -> usize {
        self.candles.count(pair)
    }
}
