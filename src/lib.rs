//! In-memory price store for an oracle price collector.
//!
//! Collector tasks write the latest ticker and candle samples per currency
//! pair; an aggregation consumer reads consistent multi-pair snapshots. Three
//! independently locked collections back the store: tickers, candle windows
//! and subscriptions.

pub mod clock;
pub mod config;
pub mod error;
pub mod store;
pub mod types;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::StoreConfig;
pub use error::{Result, StoreError};
pub use store::PriceStore;
pub use types::{CandlePrice, CurrencyPair, TickerPrice};
