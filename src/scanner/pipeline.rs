//! Per-symbol pipeline runner.
//!
//! Sequences the five stage adapters in fixed order, feeding each later
//! stage the accumulated outputs of the earlier ones. The first failing
//! stage short-circuits the symbol into a skip; a skip is an expected
//! outcome, never a batch error.

use std::sync::Arc;

use chrono::Utc;

use crate::stages::AnalysisStages;

use super::record::DecisionRecord;

/// Result of evaluating one symbol.
#[derive(Debug)]
pub enum PipelineOutcome {
    Record(Box<DecisionRecord>),
    Skipped {
        stage: &'static str,
        reason: String,
    },
}

#[derive(Clone)]
pub struct PipelineRunner {
    stages: Arc<dyn AnalysisStages>,
}

impl PipelineRunner {
    pub fn new(stages: Arc<dyn AnalysisStages>) -> Self {
        Self { stages }
    }

    /// Runs the full five-stage pipeline for one symbol. Touches no state
    /// outside this symbol's working set, so it is safe to invoke
    /// concurrently for many symbols.
    pub async fn evaluate(&self, symbol: &str) -> PipelineOutcome {
        let context = match self.stages.market_context(symbol).await {
            Ok(c) => c,
            Err(e) => return skip("market_context", e),
        };

        let levels = match self.stages.key_levels(symbol).await {
            Ok(l) => l,
            Err(e) => return skip("key_levels", e),
        };

        let setup = match self.stages.trade_setup(symbol, &context, &levels).await {
            Ok(s) => s,
            Err(e) => return skip("trade_setup", e),
        };

        let confirmation = match self
            .stages
            .confirmation(symbol, &context, &levels, &setup)
            .await
        {
            Ok(c) => c,
            Err(e) => return skip("confirmation", e),
        };

        let risk = match self
            .stages
            .risk_parameters(symbol, &context, &levels, &setup)
            .await
        {
            Ok(r) => r,
            Err(e) => return skip("risk_parameters", e),
        };

        PipelineOutcome::Record(Box::new(DecisionRecord {
            symbol: symbol.to_string(),
            timestamp: Utc::now().to_rfc3339(),
            context,
            levels,
            setup,
            confirmation,
            risk,
        }))
    }
}

fn skip(stage: &'static str, err: crate::error::StageError) -> PipelineOutcome {
    PipelineOutcome::Skipped {
        stage,
        reason: err.to_string(),
    }
}
