//! HybridScan - options-technical stock scanner
//!
//! This library screens a symbol universe through a five-stage analysis
//! pipeline (market context, key levels, setup classification,
//! confirmation signals, risk parameters), filters the merged decisions
//! and returns a ranked, persisted result set.

pub mod api;
pub mod config;
pub mod data;
pub mod error;
pub mod scanner;
pub mod stages;

// Re-export commonly used types
pub use config::AppConfig;
pub use scanner::filter::FilterSpec;
pub use scanner::record::{DecisionRecord, ScanBatch};
pub use scanner::Scanner;

#[cfg(test)]
mod config_tests;
