// =============================================================================
// Shared market-data types held by the price store
// =============================================================================

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, StoreError};

/// A tradable pair of assets, e.g. `ATOM/USDT`.
///
/// Both assets are stored upper-cased and may not contain the `/` separator,
/// so two pairs are equal exactly when their canonical keys are equal. The
/// fields are private; every pair is built through [`CurrencyPair::new`] or
/// parsed from its `BASE/QUOTE` string, including when deserialized.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct CurrencyPair {
    base: String,
    quote: String,
}

impl CurrencyPair {
    /// Build a pair from its two assets. Fails with
    /// [`StoreError::InvalidPair`] if either asset is blank or contains `/`.
    pub fn new(base: &str, quote: &str) -> Result<Self> {
        let (base, quote) = (base.trim(), quote.trim());
        if base.is_empty() || quote.is_empty() || base.contains('/') || quote.contains('/') {
            return Err(StoreError::InvalidPair(format!("{base}/{quote}")));
        }
        Ok(Self {
            base: base.to_uppercase(),
            quote: quote.to_uppercase(),
        })
    }

    pub fn base(&self) -> &str {
        &self.base
    }

    pub fn quote(&self) -> &str {
        &self.quote
    }

    /// Canonical map key (`BASE/QUOTE`) used by every table in the store.
    pub fn key(&self) -> String {
        self.to_string()
    }

    /// Exchange-style symbol with no separator (`BASEQUOTE`).
    pub fn join(&self) -> String {
        format!("{}{}", self.base, self.quote)
    }
}

impl std::fmt::Display for CurrencyPair {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.base, self.quote)
    }
}

impl FromStr for CurrencyPair {
    type Err = StoreError;

    fn from_str(s: &str) -> Result<Self> {
        s.split_once('/')
            .and_then(|(base, quote)| Self::new(base, quote).ok())
            .ok_or_else(|| StoreError::InvalidPair(s.to_string()))
    }
}

impl TryFrom<String> for CurrencyPair {
    type Error = StoreError;

    fn try_from(s: String) -> Result<Self> {
        s.parse()
    }
}

impl From<CurrencyPair> for String {
    fn from(pair: CurrencyPair) -> Self {
        pair.key()
    }
}

/// Latest instantaneous price observation for a pair.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct TickerPrice {
    pub price: f64,
    pub volume: f64,
    /// Unix epoch milliseconds.
    pub timestamp_ms: i64,
}

impl TickerPrice {
    pub fn new(price: f64, volume: f64, timestamp_ms: i64) -> Self {
        Self {
            price,
            volume,
            timestamp_ms,
        }
    }

    /// Build a ticker from the decimal strings exchanges send on the wire.
    pub fn from_strings(price: &str, volume: &str, timestamp_ms: i64) -> Result<Self> {
        Ok(Self::new(
            parse_decimal("price", price)?,
            parse_decimal("volume", volume)?,
            timestamp_ms,
        ))
    }
}

/// One sampled price/volume observation inside a candle window.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct CandlePrice {
    pub price: f64,
    pub volume: f64,
    /// Unix epoch milliseconds.
    pub timestamp_ms: i64,
}

impl CandlePrice {
    pub fn new(price: f64, volume: f64, timestamp_ms: i64) -> Self {
        Self {
            price,
            volume,
            timestamp_ms,
        }
    }

    /// Build a candle sample from exchange-formatted decimal strings.
    pub fn from_strings(price: &str, volume: &str, timestamp_ms: i64) -> Result<Self> {
        Ok(Self::new(
            parse_decimal("price", price)?,
            parse_decimal("volume", volume)?,
            timestamp_ms,
        ))
    }
}

fn parse_decimal(field: &'static str, value: &str) -> Result<f64> {
    match value.trim().parse::<f64>() {
        Ok(v) if v.is_finite() => Ok(v),
        _ => Err(StoreError::InvalidNumber {
            field,
            value: value.to_string(),
        }),
    }
}

// =============================================================================
// Tests
// =============================================================================
#[cfg(test)]
mod tests {
    use super::*;

    fn pair(base: &str, quote: &str) -> CurrencyPair {
        CurrencyPair::new(base, quote).unwrap()
    }

    #[test]
    fn pair_key_is_upper_cased() {
        let pair = pair("atom", "usdt");
        assert_eq!(pair.key(), "ATOM/USDT");
        assert_eq!(pair.join(), "ATOMUSDT");
    }

    #[test]
    fn pair_equality_follows_canonical_key() {
        assert_eq!(pair("btc", "USDT"), pair("BTC", "usdt"));
        assert_ne!(pair("BTC", "USDT"), pair("USDT", "BTC"));
    }

    #[test]
    fn separator_inside_an_asset_is_rejected() {
        // Otherwise {A/B, C} and {A, B/C} would share the key "A/B/C".
        assert!(matches!(
            CurrencyPair::new("A/B", "C"),
            Err(StoreError::InvalidPair(_))
        ));
        assert!(CurrencyPair::new("A", "B/C").is_err());
        assert!(CurrencyPair::new(" ", "USDT").is_err());
        assert!(CurrencyPair::new("ATOM", "").is_err());
    }

    #[test]
    fn parse_pair_ok() {
        let pair: CurrencyPair = " eth / usdc ".parse().expect("should parse");
        assert_eq!(pair.base(), "ETH");
        assert_eq!(pair.quote(), "USDC");
    }

    #[test]
    fn parse_pair_rejects_malformed() {
        for bad in ["ETHUSDC", "/USDC", "ETH/", "A/B/C", ""] {
            let err = bad.parse::<CurrencyPair>().unwrap_err();
            assert!(matches!(err, StoreError::InvalidPair(ref s) if s == bad));
        }
    }

    // =========================================================================
    // Serde goes through the same normalisation as parsing
    // =========================================================================

    #[test]
    fn deserialised_pair_is_normalised() {
        let parsed: CurrencyPair = "ATOM/USDT".parse().unwrap();
        let decoded: CurrencyPair = serde_json::from_str(r#""atom/usdt""#).unwrap();

        assert_eq!(decoded.key(), "ATOM/USDT");
        assert_eq!(decoded, parsed);
        assert_eq!(serde_json::to_string(&parsed).unwrap(), r#""ATOM/USDT""#);
    }

    #[test]
    fn deserialise_rejects_unvalidated_shapes() {
        assert!(serde_json::from_str::<CurrencyPair>(r#""A/B/C""#).is_err());
        assert!(serde_json::from_str::<CurrencyPair>(r#""ATOMUSDT""#).is_err());
        // The field-wise object form would skip validation and is not accepted.
        assert!(
            serde_json::from_str::<CurrencyPair>(r#"{"base":"atom","quote":"usdt"}"#).is_err()
        );
    }

    #[test]
    fn ticker_from_strings() {
        let t = TickerPrice::from_strings("37020.50", "123.456", 1_700_000_000_000).unwrap();
        assert!((t.price - 37020.5).abs() < f64::EPSILON);
        assert!((t.volume - 123.456).abs() < 1e-9);
        assert_eq!(t.timestamp_ms, 1_700_000_000_000);
    }

    #[test]
    fn candle_from_strings_names_bad_field() {
        let err = CandlePrice::from_strings("10.0", "abc", 0).unwrap_err();
        match err {
            StoreError::InvalidNumber { field, value } => {
                assert_eq!(field, "volume");
                assert_eq!(value, "abc");
            }
            other => panic!("unexpected error: {other}"),
        }

        assert!(CandlePrice::from_strings("NaN", "1", 0).is_err());
        assert!(CandlePrice::from_strings("inf", "1", 0).is_err());
    }
}
