// =============================================================================
// Store Configuration - candle window and collector runtime settings
// =============================================================================
//
// All fields carry `#[serde(default)]` so that a partial (or empty) JSON file
// still loads; missing values fall back to the defaults below.
// =============================================================================

use std::path::Path;
use std::time::Duration;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use tracing::info;

use crate::types::CurrencyPair;

// =============================================================================
// Default-value helpers (required by serde `default = "..."` attribute)
// =============================================================================

fn default_candle_window_secs() -> u64 {
    600
}

fn default_pairs() -> Vec<String> {
    vec![
        "ATOM/USDT".to_string(),
        "BTC/USDT".to_string(),
        "ETH/USDT".to_string(),
    ]
}

fn default_snapshot_interval_secs() -> u64 {
    10
}

fn default_sample_interval_ms() -> u64 {
    1_000
}

// =============================================================================
// StoreConfig
// =============================================================================

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreConfig {
    /// Maximum age of a candle sample before it is pruned, in seconds.
    #[serde(default = "default_candle_window_secs")]
    pub candle_window_secs: u64,

    /// Pairs (`BASE/QUOTE`) to subscribe at startup.
    #[serde(default = "default_pairs")]
    pub pairs: Vec<String>,

    /// How often the aggregation reader takes a snapshot.
    #[serde(default = "default_snapshot_interval_secs")]
    pub snapshot_interval_secs: u64,

    /// How often each collector task writes a sample.
    #[serde(default = "default_sample_interval_ms")]
    pub sample_interval_ms: u64,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            candle_window_secs: default_candle_window_secs(),
            pairs: default_pairs(),
            snapshot_interval_secs: default_snapshot_interval_secs(),
            sample_interval_ms: default_sample_interval_ms(),
        }
    }
}

impl StoreConfig {
    /// Load configuration from a JSON file at `path`.
    ///
    /// A missing or malformed file is an error so the caller can fall back
    /// to defaults with a warning.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read store config from {}", path.display()))?;

        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("failed to parse store config from {}", path.display()))?;

        info!(
            path = %path.display(),
            pairs = ?config.pairs,
            candle_window_secs = config.candle_window_secs,
            "store config loaded"
        );

        Ok(config)
    }

    pub fn candle_window(&self) -> Duration {
        Duration::from_secs(self.candle_window_secs)
    }

    pub fn snapshot_interval(&self) -> Duration {
        Duration::from_secs(self.snapshot_interval_secs.max(1))
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.max(1))
    }

    /// Parse the configured pair strings.
    pub fn currency_pairs(&self) -> Result<Vec<CurrencyPair>> {
        self.pairs
            .iter()
            .map(|s| {
                s.parse::<CurrencyPair>()
                    .with_context(|| format!("bad pair in store config: {s}"))
            })
            .collect()
    }
}
