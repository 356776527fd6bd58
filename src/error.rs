//! Custom error types for the scanner
//!
//! Provides structured, typed errors instead of generic Box<dyn Error>

use thiserror::Error;

/// Market data retrieval errors
#[derive(Error, Debug)]
pub enum DataError {
    #[error("HTTP {status}: {body}")]
    Http { status: u16, body: String },

    #[error("Network error: {0}")]
    Network(#[from] reqwest::Error),

    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("No price history for {symbol}")]
    EmptyHistory { symbol: String },

    #[error("No options chain for {symbol}")]
    NoOptions { symbol: String },

    #[error("Missing field in provider response: {0}")]
    MissingField(&'static str),
}

/// Failure of one analysis stage for one symbol.
///
/// A stage failure is an expected outcome (missing data, thin options
/// activity), never a batch-level error. The pipeline runner converts
/// it into a skip for that symbol.
#[derive(Error, Debug)]
pub enum StageError {
    #[error("market data unavailable: {0}")]
    Data(#[from] DataError),

    #[error("insufficient history: have {have} bars, need {need}")]
    InsufficientHistory { have: usize, need: usize },

    #[error("stage timed out after {secs}s")]
    Timeout { secs: u64 },

    #[error("{0}")]
    Failed(String),
}

/// Top-level scanner errors
#[derive(Error, Debug)]
pub enum ScanError {
    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Snapshot write failed: {0}")]
    Snapshot(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl From<String> for ScanError {
    fn from(err: String) -> Self {
        ScanError::Config(err)
    }
}

impl From<&str> for ScanError {
    fn from(err: &str) -> Self {
        ScanError::Config(err.to_string())
    }
}
