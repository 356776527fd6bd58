//! Scan orchestrator: bounded fan-out with per-symbol failure isolation.

use std::sync::Arc;
use std::time::Duration;

use tokio::sync::Semaphore;
use tokio::task::JoinSet;
use tracing::{error, info, warn};

use crate::stages::AnalysisStages;

use super::pipeline::{PipelineOutcome, PipelineRunner};
use super::record::DecisionRecord;

pub struct ScanOrchestrator {
    runner: PipelineRunner,
    width: usize,
    symbol_timeout: Option<Duration>,
}

impl ScanOrchestrator {
    pub fn new(
        stages: Arc<dyn AnalysisStages>,
        width: usize,
        symbol_timeout: Option<Duration>,
    ) -> Self {
        Self {
            runner: PipelineRunner::new(stages),
            width: width.max(1),
            symbol_timeout,
        }
    }

    /// Evaluates every symbol with at most `width` pipelines in flight and
    /// returns the unordered set of completed records.
    ///
    /// This is a full join: it returns only after every dispatched symbol
    /// has either produced a record or been logged as skipped. A panic or
    /// timeout inside one symbol's pipeline never aborts its siblings.
    pub async fn collect(&self, symbols: &[String]) -> Vec<DecisionRecord> {
        let semaphore = Arc::new(Semaphore::new(self.width));
        let mut tasks: JoinSet<(String, PipelineOutcome)> = JoinSet::new();

        for symbol in symbols {
            let semaphore = semaphore.clone();
            let runner = self.runner.clone();
            let symbol = symbol.clone();
            let timeout = self.symbol_timeout;

            tasks.spawn(async move {
                let _permit = semaphore
                    .acquire_owned()
                    .await
                    .expect("scan semaphore closed");
                let outcome = run_isolated(runner, &symbol, timeout).await;
                (symbol, outcome)
            });
        }

        let mut records = Vec::new();
        while let Some(joined) = tasks.join_next().await {
            match joined {
                Ok((symbol, PipelineOutcome::Record(record))) => {
                    info!(
                        "Found setup for {}: {} (Confidence: {:.0}%)",
                        symbol, record.setup.label, record.setup.confidence
                    );
                    records.push(*record);
                }
                Ok((symbol, PipelineOutcome::Skipped { stage, reason })) => {
                    warn!("Skipping {}: {} stage failed: {}", symbol, stage, reason);
                }
                // The outer task only awaits the inner handle; reaching
                // here means the collector itself was torn down.
                Err(e) => error!("Scan worker aborted: {}", e),
            }
        }
        records
    }
}

/// Runs one symbol's pipeline inside its own task so a panicking stage
/// adapter is confined to that symbol. The same wrapper carries the
/// optional per-symbol deadline.
async fn run_isolated(
    runner: PipelineRunner,
    symbol: &str,
    timeout: Option<Duration>,
) -> PipelineOutcome {
    let owned = symbol.to_string();
    let mut handle = tokio::spawn(async move { runner.evaluate(&owned).await });

    let joined = match timeout {
        Some(deadline) => match tokio::time::timeout(deadline, &mut handle).await {
            Ok(joined) => joined,
            Err(_) => {
                handle.abort();
                return PipelineOutcome::Skipped {
                    stage: "deadline",
                    reason: format!("exceeded {}s budget", deadline.as_secs()),
                };
            }
        },
        None => (&mut handle).await,
    };

    match joined {
        Ok(outcome) => outcome,
        Err(e) => PipelineOutcome::Skipped {
            stage: "pipeline",
            reason: if e.is_panic() {
                format!("panicked: {}", e)
            } else {
                format!("cancelled: {}", e)
            },
        },
    }
}
