use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::DataError;

pub type DataResult<T> = Result<T, DataError>;

/// One daily bar.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Candle {
    pub timestamp: i64,
    pub open: f64,
    pub high: f64,
    pub low: f64,
    pub close: f64,
    pub volume: f64,
}

/// One option contract row from a chain.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct OptionContract {
    pub strike: f64,
    pub volume: f64,
    pub open_interest: f64,
    pub implied_volatility: f64,
    /// Not every provider exposes Greeks.
    pub gamma: Option<f64>,
}

/// Calls and puts for one expiration date.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct OptionChain {
    pub expiration: String,
    pub calls: Vec<OptionContract>,
    pub puts: Vec<OptionContract>,
}

/// Source of price history and options chains.
///
/// Implementations may block on network calls; the analysis stages treat
/// any error as a stage failure for that symbol only.
#[async_trait]
pub trait MarketDataProvider: Send + Sync {
    fn name(&self) -> &'static str;

    /// Daily bars, oldest first.
    async fn daily_history(&self, symbol: &str, days: u32) -> DataResult<Vec<Candle>>;

    /// Chains for the nearest `max_expirations` expiration dates, nearest first.
    async fn option_chains(&self, symbol: &str, max_expirations: usize)
        -> DataResult<Vec<OptionChain>>;
}
