use std::sync::Arc;

use tokio::sync::RwLock;
use tracing::info;

use rust_hybridscan::api::{run_server, AppState};
use rust_hybridscan::config::AppConfig;
use rust_hybridscan::data::provider::MarketDataProvider;
use rust_hybridscan::data::yahoo::YahooProvider;
use rust_hybridscan::scanner::pipeline::{PipelineOutcome, PipelineRunner};
use rust_hybridscan::scanner::Scanner;
use rust_hybridscan::stages::{AnalysisStages, StageSet};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
    // Setup Logging
    let subscriber = tracing_subscriber::FmtSubscriber::builder()
        .with_max_level(tracing::Level::INFO)
        .finish();
    tracing::subscriber::set_global_default(subscriber).expect("setting default subscriber failed");

    dotenvy::dotenv().ok();

    info!("Starting Options-Technical Hybrid Scanner...");

    // Load Configuration
    let config = AppConfig::load();
    info!("Loaded Configuration: {:?}", config);

    let provider = Arc::new(YahooProvider::new(config.data.base_url.clone()));
    info!(
        "Using market data provider: {} ({})",
        provider.name(),
        config.data.base_url
    );

    let stages: Arc<dyn AnalysisStages> = Arc::new(StageSet::new(provider, &config.data));
    let scanner = Scanner::new(stages.clone(), &config);

    let args: Vec<String> = std::env::args().collect();

    if args.iter().any(|a| a == "--scan") {
        // One-shot scan mode: run once, print the ranked table, exit.
        let symbols = config.resolve_symbols();
        let batch = scanner.scan(&symbols, &config.filters).await;
        for record in &batch.records {
            println!(
                "Symbol: {}, Setup: {}, Confidence: {:.0}%",
                record.symbol, record.setup.label, record.setup.confidence
            );
        }
        println!(
            "{} setups: {} bullish / {} bearish / {} neutral, {} with entry signal",
            batch.records.len(),
            batch.bullish().len(),
            batch.bearish().len(),
            batch.neutral().len(),
            batch.entry_signals().len()
        );
        return Ok(());
    }

    if let Some(pos) = args.iter().position(|a| a == "--symbol") {
        let Some(symbol) = args.get(pos + 1) else {
            eprintln!("Usage: {} --symbol TICKER", args[0]);
            return Ok(());
        };
        let symbol = symbol.to_uppercase();
        info!("Analyzing {}", symbol);

        let runner = PipelineRunner::new(stages.clone());
        match runner.evaluate(&symbol).await {
            PipelineOutcome::Record(record) => {
                println!("=== Market Context for {} ===", symbol);
                println!("Trend: {}", record.context.trend);
                println!("Sentiment: {}", record.context.sentiment);
                println!("Momentum: {}", record.context.momentum);
                println!("=== Key Levels for {} ===", symbol);
                println!("Support Levels: {:?}", record.levels.support);
                println!("Resistance Levels: {:?}", record.levels.resistance);
                println!("Max Pain: {:.2}", record.levels.max_pain);
                println!("=== Trade Setup for {} ===", symbol);
                println!("Setup: {}", record.setup.label);
                println!("Confidence: {:.0}%", record.setup.confidence);
                println!("=== Confirmation Signals for {} ===", symbol);
                println!(
                    "Entry: signal={} strength={:.0}",
                    record.confirmation.entry.signal, record.confirmation.entry.strength
                );
                println!(
                    "Exit: signal={} strength={:.0}",
                    record.confirmation.exit.signal, record.confirmation.exit.strength
                );
                println!("=== Risk Management for {} ===", symbol);
                println!(
                    "Position Size: {:.4} of account",
                    record.risk.position_size.recommended
                );
                println!("Stop Loss: {:.2}", record.risk.stop_loss.technical);
                println!("Risk/Reward: {:.2}", record.risk.risk_reward.ratio);
            }
            PipelineOutcome::Skipped { stage, reason } => {
                eprintln!("Failed to analyze {} ({} stage: {})", symbol, stage, reason);
            }
        }
        return Ok(());
    }

    // Default: serve the API.
    info!("Initializing API Server...");
    let app_state = Arc::new(AppState {
        scanner,
        stages,
        config,
        latest: RwLock::new(None),
    });
    run_server(app_state).await;

    Ok(())
}
