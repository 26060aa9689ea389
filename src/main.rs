// =============================================================================
// Price Store - collector process entry point
// =============================================================================
//
// Wires a `PriceStore` into a running collector: synthetic collector tasks
// write tickers and candles for every subscribed pair while a periodic reader
// takes the batched snapshots an aggregation layer would consume.
// =============================================================================

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use price_store::{
    CandlePrice, Clock, CurrencyPair, PriceStore, StoreConfig, SystemClock, TickerPrice,
};
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // ── 1. Environment & config ──────────────────────────────────────────
    let _ = dotenv::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    let config_path =
        std::env::var("PRICE_STORE_CONFIG").unwrap_or_else(|_| "price_store.json".into());
    let mut config = StoreConfig::load(&config_path).unwrap_or_else(|e| {
        warn!(error = %e, "Failed to load config, using defaults");
        StoreConfig::default()
    });

    if let Ok(pairs) = std::env::var("PRICE_STORE_PAIRS") {
        config.pairs = pairs
            .split(',')
            .map(|s| s.trim().to_string())
            .filter(|s| !s.is_empty())
            .collect();
    }

    let pairs = config.currency_pairs()?;
    info!(
        pairs = ?config.pairs,
        candle_window_secs = config.candle_window_secs,
        "Price store starting"
    );

    // ── 2. Build the store and subscribe ─────────────────────────────────
    let store = Arc::new(PriceStore::new(config.candle_window()));
    let added = store.add_subscribed_pairs(&pairs);

    // ── 3. One collector task per newly subscribed pair ──────────────────
    for (idx, pair) in added.into_iter().enumerate() {
        let store = store.clone();
        let period = config.sample_interval();
        let base_price = 10.0 * (idx + 1) as f64;
        tokio::spawn(async move {
            run_synthetic_collector(store, pair, base_price, period).await;
        });
    }

    // ── 4. Snapshot reader ───────────────────────────────────────────────
    let reader_store = store.clone();
    let snapshot_every = config.snapshot_interval();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(snapshot_every);
        loop {
            interval.tick().await;
            take_snapshot(&reader_store);
        }
    });

    info!("Collector running. Press Ctrl+C to stop.");

    // ── 5. Shutdown ──────────────────────────────────────────────────────
    tokio::signal::ctrl_c().await?;
    warn!("Shutdown signal received - stopping");
    Ok(())
}

/// Writes a slow deterministic waveform around `base_price`. Stands in for an
/// exchange client feeding the store.
async fn run_synthetic_collector(
    store: Arc<PriceStore>,
    pair: CurrencyPair,
    base_price: f64,
    period: Duration,
) {
    info!(pair = %pair, symbol = %pair.join(), "collector started");

    let mut interval = tokio::time::interval(period);
    let mut tick: u64 = 0;
    loop {
        interval.tick().await;
        tick += 1;

        let now_ms = SystemClock.now_ms();
        let price = base_price * (1.0 + 0.01 * (tick as f64 / 10.0).sin());
        let volume = 1.0 + (tick % 7) as f64;

        store.set_ticker(&pair, TickerPrice::new(price, volume, now_ms));
        store.set_candle(&pair, CandlePrice::new(price, volume, now_ms));
        debug!(pair = %pair, price, "sample written");
    }
}

/// Result of one aggregation read: data for every pair that had it, plus the
/// keys that were dropped from the request because the store had nothing yet.
#[derive(Debug, Default)]
struct Snapshot {
    tickers: HashMap<String, TickerPrice>,
    candles: HashMap<String, Vec<CandlePrice>>,
    excluded: Vec<String>,
}

/// One aggregation read cycle over every subscribed pair.
fn take_snapshot(store: &PriceStore) {
    let pairs = store.subscribed_pairs();
    if pairs.is_empty() {
        return;
    }

    let snapshot = read_available(store, pairs);
    if !snapshot.excluded.is_empty() {
        warn!(pairs = ?snapshot.excluded, "snapshot excluded pairs with no data yet");
    }

    let mut keys: Vec<&String> = snapshot.tickers.keys().collect();
    keys.sort();
    for key in keys {
        let t = &snapshot.tickers[key];
        let samples = snapshot.candles.get(key).map_or(0, Vec::len);
        info!(pair = %key, price = t.price, volume = t.volume, samples, "snapshot");
    }
}

/// Batched reads are all-or-nothing, so a pair with no data yet is removed
/// from the request and both reads are issued again over the rest, until
/// they succeed or no pair is left.
fn read_available(store: &PriceStore, mut pairs: Vec<CurrencyPair>) -> Snapshot {
    let mut excluded = Vec::new();

    while !pairs.is_empty() {
        let read = store
            .get_ticker_prices(&pairs)
            .and_then(|tickers| Ok((tickers, store.get_candle_prices(&pairs)?)));

        match read {
            Ok((tickers, candles)) => {
                return Snapshot {
                    tickers,
                    candles,
                    excluded,
                };
            }
            Err(e) => {
                let Some(key) = e.missing_pair().map(str::to_string) else {
                    warn!(error = %e, "snapshot read failed");
                    break;
                };
                debug!(pair = %key, error = %e, "excluding pair from snapshot");
                pairs.retain(|p| p.key() != key);
                excluded.push(key);
            }
        }
    }

    excluded.extend(pairs.iter().map(CurrencyPair::key));
    Snapshot {
        excluded,
        ..Snapshot::default()
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn pair(s: &str) -> CurrencyPair {
        s.parse().unwrap()
    }

    fn seed(store: &PriceStore, p: &CurrencyPair, ticker: bool, candle: bool) {
        let now_ms = SystemClock.now_ms();
        if ticker {
            store.set_ticker(p, TickerPrice::new(1.0, 1.0, now_ms));
        }
        if candle {
            store.set_candle(p, CandlePrice::new(1.0, 1.0, now_ms));
        }
    }

    #[test]
    fn pair_without_ticker_is_excluded_not_the_cycle() {
        let store = PriceStore::new(Duration::from_secs(600));
        let (a, b, c) = (pair("A/USD"), pair("B/USD"), pair("C/USD"));
        seed(&store, &a, true, true);
        seed(&store, &b, false, true);
        seed(&store, &c, true, true);

        let snap = read_available(&store, vec![a, b, c]);
        assert_eq!(snap.excluded, vec!["B/USD".to_string()]);
        assert_eq!(snap.tickers.len(), 2);
        assert_eq!(snap.candles.len(), 2);
        assert!(snap.tickers.contains_key("A/USD") && snap.tickers.contains_key("C/USD"));
    }

    #[test]
    fn missing_candles_and_tickers_are_both_excluded() {
        let store = PriceStore::new(Duration::from_secs(600));
        let (a, b, c) = (pair("A/USD"), pair("B/USD"), pair("C/USD"));
        seed(&store, &a, true, false);
        seed(&store, &b, false, true);
        seed(&store, &c, true, true);

        let snap = read_available(&store, vec![a, b, c]);
        assert_eq!(snap.excluded.len(), 2);
        assert!(snap.excluded.contains(&"A/USD".to_string()));
        assert!(snap.excluded.contains(&"B/USD".to_string()));
        assert_eq!(snap.tickers.keys().collect::<Vec<_>>(), vec!["C/USD"]);
        assert_eq!(snap.candles.keys().collect::<Vec<_>>(), vec!["C/USD"]);
    }

    #[test]
    fn empty_store_excludes_everything() {
        let store = PriceStore::new(Duration::from_secs(600));
        let snap = read_available(&store, vec![pair("A/USD"), pair("B/USD")]);

        assert!(snap.tickers.is_empty());
        assert!(snap.candles.is_empty());
        assert_eq!(snap.excluded, vec!["A/USD".to_string(), "B/USD".to_string()]);
    }
}
