//! Scan orchestration core: fan-out, filtering, ranking and persistence.

pub mod filter;
pub mod orchestrator;
pub mod pipeline;
pub mod ranking;
pub mod record;



use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{error, info, warn};

use crate::config::AppConfig;
use crate::stages::AnalysisStages;

use filter::FilterSpec;
use orchestrator::ScanOrchestrator;
use ranking::SnapshotWriter;
use record::ScanBatch;

/// Facade over one full scan: orchestrate the symbol universe, prune with
/// the filter, rank, persist, and hand the batch back to the caller.
pub struct Scanner {
    orchestrator: ScanOrchestrator,
    snapshots: SnapshotWriter,
}

impl Scanner {
    pub fn new(stages: Arc<dyn AnalysisStages>, config: &AppConfig) -> Self {
        let timeout = config
            .scanner
            .symbol_timeout_secs
            .map(Duration::from_secs);
        Self {
            orchestrator: ScanOrchestrator::new(stages, config.worker_width(), timeout),
            snapshots: SnapshotWriter::new(config.scanner.output_dir.clone()),
        }
    }

    /// Runs one complete scan. Returns only after every symbol resolved.
    ///
    /// Each call is independent; the returned batch belongs to the caller
    /// and fully replaces whatever batch an earlier call produced.
    pub async fn scan(&self, symbols: &[String], filter: &FilterSpec) -> ScanBatch {
        info!("Starting scan for {} symbols", symbols.len());

        let collected = self.orchestrator.collect(symbols).await;
        let produced = collected.len();

        let mut admitted: Vec<_> = collected
            .into_iter()
            .filter(|record| filter.admits(record))
            .collect();
        ranking::rank(&mut admitted);

        let snapshot_path = if admitted.is_empty() {
            warn!("No results to save");
            None
        } else {
            match self.snapshots.write(&admitted) {
                Ok(path) => {
                    info!("Results saved to {}", path.display());
                    Some(path)
                }
                Err(e) => {
                    // In-memory results stay valid even when the disk write fails.
                    error!("Error saving results: {}", e);
                    None
                }
            }
        };

        info!(
            "Scan complete. Found {} setups ({} evaluated, {} skipped).",
            admitted.len(),
            produced,
            symbols.len() - produced
        );

        ScanBatch {
            records: admitted,
            filter: filter.clone(),
            completed_at: Utc::now().to_rfc3339(),
            snapshot_path,
            scanned: symbols.len(),
            skipped: symbols.len() - produced,
        }
    }
}
