//! Unit tests for configuration structures and parsing.

#[cfg(test)]
mod config_tests {
    use crate::config::*;
    use crate::stages::Trend;

    fn create_test_config() -> AppConfig {
        let yaml = r#"
symbols:
  - "aapl"
  - "MSFT"
  - "tsla"

scanner:
  max_workers: 4
  output_dir: "out"

filters:
  trend: ["bullish", "bearish", "neutral"]
  pcr_min: 0.0
  pcr_max: 2.0
  rsi_min: 0.0
  rsi_max: 100.0
  stoch_rsi_min: 0.0
  stoch_rsi_max: 100.0
  min_confidence: 60.0

data:
  lookback_days: 100

api:
  bind: "127.0.0.1:9090"
"#;
        serde_yaml::from_str(yaml).unwrap()
    }

    // ============= ScannerConfig Tests =============

    #[test]
    fn test_scanner_config_defaults() {
        let config: ScannerConfig = serde_yaml::from_str("{}").unwrap();

        assert_eq!(config.max_workers, 5);
        assert_eq!(config.output_dir, "scanner_results");
        assert_eq!(config.symbol_timeout_secs, None);
    }

    #[test]
    fn test_scanner_config_deserialize() {
        let yaml = r#"
max_workers: 8
output_dir: "results"
symbol_timeout_secs: 30
"#;
        let config: ScannerConfig = serde_yaml::from_str(yaml).unwrap();

        assert_eq!(config.max_workers, 8);
        assert_eq!(config.output_dir, "results");
        assert_eq!(config.symbol_timeout_secs, Some(30));
    }

    // ============= DataConfig Tests =============

    #[test]
    fn test_data_config_defaults() {
        let config: DataConfig = serde_yaml::from_str("{}").unwrap();

        assert_eq!(config.lookback_days, 100);
        assert_eq!(config.confirmation_lookback_days, 30);
        assert_eq!(config.max_expirations, 3);
        assert!(config.base_url.contains("yahoo"));
    }

    // ============= Filter Parsing Tests =============

    #[test]
    fn test_filter_trend_labels_parse_lowercase() {
        let config = create_test_config();

        assert_eq!(config.filters.trend.len(), 3);
        assert!(config.filters.trend.contains(&Trend::Bullish));
        assert!(config.filters.trend.contains(&Trend::Bearish));
        assert!(config.filters.trend.contains(&Trend::Neutral));
    }

    #[test]
    fn test_filter_bounds_parse() {
        let config = create_test_config();

        assert_eq!(config.filters.pcr_max, 2.0);
        assert_eq!(config.filters.min_confidence, 60.0);
        assert_eq!(config.filters.symbols, None);
    }

    // ============= Symbol Universe Tests =============

    #[test]
    fn test_resolve_symbols_uppercases_inline_list() {
        let config = create_test_config();
        let symbols = config.resolve_symbols();

        assert_eq!(symbols, vec!["AAPL", "MSFT", "TSLA"]);
    }

    #[test]
    fn test_resolve_symbols_fallback() {
        let mut config = create_test_config();
        config.symbols.clear();
        config.symbols_file = None;

        let symbols = config.resolve_symbols();
        assert!(symbols.contains(&"AAPL".to_string()));
        assert!(symbols.contains(&"NVDA".to_string()));
    }

    #[test]
    fn test_resolve_symbols_missing_file_falls_back() {
        let mut config = create_test_config();
        config.symbols.clear();
        config.symbols_file = Some("definitely_not_here.txt".to_string());

        let symbols = config.resolve_symbols();
        assert!(!symbols.is_empty());
    }

    // ============= Worker Width Tests =============

    #[test]
    fn test_worker_width_clamps_to_one() {
        let mut config = create_test_config();
        config.scanner.max_workers = 0;

        assert_eq!(config.worker_width(), 1);
    }

    #[test]
    fn test_worker_width_passthrough() {
        let config = create_test_config();
        assert_eq!(config.worker_width(), 4);
    }

    // ============= Full Config Tests =============

    #[test]
    fn test_full_config_deserialize() {
        let config = create_test_config();

        assert_eq!(config.scanner.max_workers, 4);
        assert_eq!(config.api.bind, "127.0.0.1:9090");
        assert_eq!(config.data.lookback_days, 100);
    }

    #[test]
    fn test_config_clone() {
        let config = create_test_config();
        let cloned = config.clone();

        assert_eq!(cloned.symbols, config.symbols);
        assert_eq!(cloned.scanner.max_workers, config.scanner.max_workers);
    }
}
