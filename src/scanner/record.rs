//! Decision records and scan batches.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use crate::stages::{Confirmation, KeyLevels, MarketContext, RiskParameters, TradeSetup};

use super::filter::FilterSpec;

/// The fully merged five-stage evaluation of one symbol.
///
/// A record exists only when every stage succeeded; partial records are
/// never constructed. Each stage owns its own sub-structure, so field
/// names never collide across stages. Immutable after construction.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct DecisionRecord {
    pub symbol: String,
    /// RFC 3339 evaluation time.
    pub timestamp: String,
    pub context: MarketContext,
    pub levels: KeyLevels,
    pub setup: TradeSetup,
    pub confirmation: Confirmation,
    pub risk: RiskParameters,
}

impl DecisionRecord {
    /// Ranking key: the setup-classification confidence (0-100).
    pub fn confidence(&self) -> f64 {
        self.setup.confidence
    }
}

/// One complete orchestrator run: the ranked admitted records plus the
/// filter that produced them. Replaced wholesale by the next scan.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ScanBatch {
    pub records: Vec<DecisionRecord>,
    pub filter: FilterSpec,
    pub completed_at: String,
    /// Where the snapshot landed; `None` when persistence failed or
    /// there was nothing to save.
    pub snapshot_path: Option<PathBuf>,
    /// Symbols dispatched in this run.
    pub scanned: usize,
    /// Symbols that produced no record (stage failure, panic or timeout).
    pub skipped: usize,
}

impl ScanBatch {
    pub fn bullish(&self) -> Vec<&DecisionRecord> {
        self.setups_with_prefix("bullish")
    }

    pub fn bearish(&self) -> Vec<&DecisionRecord> {
        self.setups_with_prefix("bearish")
    }

    pub fn neutral(&self) -> Vec<&DecisionRecord> {
        self.setups_with_prefix("neutral")
    }

    pub fn entry_signals(&self) -> Vec<&DecisionRecord> {
        self.records
            .iter()
            .filter(|r| r.confirmation.entry.signal)
            .collect()
    }

    fn setups_with_prefix(&self, prefix: &str) -> Vec<&DecisionRecord> {
        self.records
            .iter()
            .filter(|r| {
                r.setup.label.starts_with(prefix)
                    || r.setup.label.strip_prefix("weak_").is_some_and(|rest| rest.starts_with(prefix))
            })
            .collect()
    }
}
