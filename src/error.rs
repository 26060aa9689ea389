use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum StoreError {
    // Batched read errors
    #[error("failed to get ticker price for {0}")]
    MissingTicker(String),

    #[error("failed to get candle prices for {0}")]
    MissingCandles(String),

    // Input errors
    #[error("invalid currency pair: {0:?}")]
    InvalidPair(String),

    #[error("invalid {field}: {value:?}")]
    InvalidNumber { field: &'static str, value: String },
}

impl StoreError {
    /// Canonical key of the pair a batched read was missing, if any.
    pub fn missing_pair(&self) -> Option<&str> {
        match self {
            Self::MissingTicker(key) | Self::MissingCandles(key) => Some(key),
            _ => None,
        }
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
