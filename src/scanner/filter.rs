//! Declarative filter over decision records.

use serde::{Deserialize, Serialize};

use crate::stages::Trend;

use super::record::DecisionRecord;

/// The predicate set applied to every decision record.
///
/// Evaluation is a short-circuiting conjunction in this fixed order:
/// trend membership, PCR range, RSI range, stochastic-RSI range, minimum
/// confidence, symbol allow-list. All numeric bounds are inclusive.
///
/// An empty `trend` set admits nothing, and so does an inverted range
/// (min > max) - both are intentional "admit nothing" filters rather
/// than configuration errors. Non-finite record values (NaN) fail the
/// range they appear in.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct FilterSpec {
    pub trend: Vec<Trend>,
    pub pcr_min: f64,
    pub pcr_max: f64,
    pub rsi_min: f64,
    pub rsi_max: f64,
    pub stoch_rsi_min: f64,
    pub stoch_rsi_max: f64,
    pub min_confidence: f64,
    /// When present and non-empty, only these symbols are admitted.
    #[serde(default)]
    pub symbols: Option<Vec<String>>,
}

impl FilterSpec {
    pub fn admits(&self, record: &DecisionRecord) -> bool {
        if !self.trend.contains(&record.context.trend) {
            return false;
        }
        if !in_range(record.context.pcr, self.pcr_min, self.pcr_max) {
            return false;
        }
        if !in_range(record.context.rsi, self.rsi_min, self.rsi_max) {
            return false;
        }
        if !in_range(record.context.stoch_rsi, self.stoch_rsi_min, self.stoch_rsi_max) {
            return false;
        }
        // NaN confidence fails here as well.
        if !(record.setup.confidence >= self.min_confidence) {
            return false;
        }
        if let Some(allowed) = &self.symbols {
            if !allowed.is_empty() && !allowed.iter().any(|s| s == &record.symbol) {
                return false;
            }
        }
        true
    }
}

fn in_range(value: f64, min: f64, max: f64) -> bool {
    // NaN comparisons are false, so malformed values are rejected here
    // instead of crashing downstream.
    value >= min && value <= max
}

/// Per-request overrides for the configured filter, as accepted by the
/// scan endpoint. Unset fields keep the configured value.
#[derive(Clone, Debug, Default, Deserialize)]
pub struct FilterOverrides {
    pub trend: Option<Vec<Trend>>,
    pub pcr_min: Option<f64>,
    pub pcr_max: Option<f64>,
    pub rsi_min: Option<f64>,
    pub rsi_max: Option<f64>,
    pub stoch_rsi_min: Option<f64>,
    pub stoch_rsi_max: Option<f64>,
    pub min_confidence: Option<f64>,
    pub symbols: Option<Vec<String>>,
}

impl FilterOverrides {
    pub fn apply(&self, base: &FilterSpec) -> FilterSpec {
        FilterSpec {
            trend: self.trend.clone().unwrap_or_else(|| base.trend.clone()),
            pcr_min: self.pcr_min.unwrap_or(base.pcr_min),
            pcr_max: self.pcr_max.unwrap_or(base.pcr_max),
            rsi_min: self.rsi_min.unwrap_or(base.rsi_min),
            rsi_max: self.rsi_max.unwrap_or(base.rsi_max),
            stoch_rsi_min: self.stoch_rsi_min.unwrap_or(base.stoch_rsi_min),
            stoch_rsi_max: self.stoch_rsi_max.unwrap_or(base.stoch_rsi_max),
            min_confidence: self.min_confidence.unwrap_or(base.min_confidence),
            symbols: self.symbols.clone().or_else(|| base.symbols.clone()),
        }
    }
}
