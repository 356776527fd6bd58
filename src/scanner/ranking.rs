//! Ranking and snapshot persistence for admitted records.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Utc;

use crate::error::ScanError;

use super::record::DecisionRecord;

/// Sorts by confidence descending; ties break on symbol ascending so
/// repeated scans over identical inputs rank identically.
pub fn rank(records: &mut [DecisionRecord]) {
    records.sort_by(|a, b| {
        b.confidence()
            .total_cmp(&a.confidence())
            .then_with(|| a.symbol.cmp(&b.symbol))
    });
}

/// Writes ranked result sets as timestamped JSON files.
pub struct SnapshotWriter {
    output_dir: PathBuf,
}

impl SnapshotWriter {
    pub fn new(output_dir: impl Into<PathBuf>) -> Self {
        Self {
            output_dir: output_dir.into(),
        }
    }

    pub fn output_dir(&self) -> &Path {
        &self.output_dir
    }

    /// Persists the records, creating the output directory if absent.
    /// The millisecond suffix keeps back-to-back scans from colliding.
    pub fn write(&self, records: &[DecisionRecord]) -> Result<PathBuf, ScanError> {
        fs::create_dir_all(&self.output_dir)?;

        let stamp = Utc::now().format("%Y%m%d_%H%M%S_%3f");
        let path = self.output_dir.join(format!("scan_results_{}.json", stamp));
        fs::write(&path, serde_json::to_vec_pretty(records)?)?;
        Ok(path)
    }
}
