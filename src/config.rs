use serde::Deserialize;
use std::fs;

use crate::scanner::filter::FilterSpec;

/// Fallback universe when neither `symbols` nor `symbols_file` yields anything.
const FALLBACK_SYMBOLS: &[&str] = &["AAPL", "MSFT", "GOOGL", "AMZN", "TSLA", "META", "NVDA"];

#[derive(Clone, Debug, Deserialize)]
pub struct ScannerConfig {
    #[serde(default = "default_max_workers")]
    pub max_workers: usize,

    #[serde(default = "default_output_dir")]
    pub output_dir: String,

    /// Optional per-symbol deadline. A symbol exceeding it is skipped,
    /// same as a stage failure.
    #[serde(default)]
    pub symbol_timeout_secs: Option<u64>,
}

fn default_max_workers() -> usize {
    5
}

fn default_output_dir() -> String {
    "scanner_results".to_string()
}

impl Default for ScannerConfig {
    fn default() -> Self {
        Self {
            max_workers: default_max_workers(),
            output_dir: default_output_dir(),
            symbol_timeout_secs: None,
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct DataConfig {
    #[serde(default = "default_base_url")]
    pub base_url: String,

    /// Daily bars fetched for the market-context stage.
    #[serde(default = "default_lookback_days")]
    pub lookback_days: u32,

    /// Shorter window used by the confirmation stage.
    #[serde(default = "default_confirmation_lookback_days")]
    pub confirmation_lookback_days: u32,

    /// Nearest expirations pulled from the options chain.
    #[serde(default = "default_max_expirations")]
    pub max_expirations: usize,
}

fn default_base_url() -> String {
    "https://query1.finance.yahoo.com".to_string()
}

fn default_lookback_days() -> u32 {
    100
}

fn default_confirmation_lookback_days() -> u32 {
    30
}

fn default_max_expirations() -> usize {
    3
}

impl Default for DataConfig {
    fn default() -> Self {
        Self {
            base_url: default_base_url(),
            lookback_days: default_lookback_days(),
            confirmation_lookback_days: default_confirmation_lookback_days(),
            max_expirations: default_max_expirations(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct ApiConfig {
    #[serde(default = "default_bind")]
    pub bind: String,
}

fn default_bind() -> String {
    "0.0.0.0:8080".to_string()
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            bind: default_bind(),
        }
    }
}

#[derive(Clone, Debug, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub symbols: Vec<String>,

    #[serde(default)]
    pub symbols_file: Option<String>,

    #[serde(default)]
    pub scanner: ScannerConfig,

    pub filters: FilterSpec,

    #[serde(default)]
    pub data: DataConfig,

    #[serde(default)]
    pub api: ApiConfig,
}

impl AppConfig {
    pub fn load() -> Self {
        let config_path = "config.yaml";
        let content = fs::read_to_string(config_path).expect("Failed to read config.yaml");

        // Strip BOM if present
        let content = content.strip_prefix("\u{feff}").unwrap_or(&content);

        let config: AppConfig = serde_yaml::from_str(content).expect("Failed to parse config.yaml");
        config
    }

    /// Worker-pool width, clamped to at least one worker.
    pub fn worker_width(&self) -> usize {
        self.scanner.max_workers.max(1)
    }

    /// Resolve the symbol universe: inline list first, then the symbols
    /// file (one ticker per line), then the built-in fallback.
    pub fn resolve_symbols(&self) -> Vec<String> {
        if !self.symbols.is_empty() {
            return self.symbols.iter().map(|s| s.trim().to_uppercase()).collect();
        }

        if let Some(path) = &self.symbols_file {
            match fs::read_to_string(path) {
                Ok(content) => {
                    let symbols: Vec<String> = content
                        .lines()
                        .map(str::trim)
                        .filter(|l| !l.is_empty())
                        .map(str::to_uppercase)
                        .collect();
                    if !symbols.is_empty() {
                        return symbols;
                    }
                }
                Err(e) => {
                    tracing::warn!("Failed to read symbols file {}: {}", path, e);
                }
            }
        }

        FALLBACK_SYMBOLS.iter().map(|s| s.to_string()).collect()
    }
}
