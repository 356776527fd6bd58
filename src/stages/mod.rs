//! The five analysis stages and the adapter trait the scan core consumes.

pub mod confirmation;
pub mod key_levels;
pub mod market_context;
pub mod risk;
pub mod trade_setup;

#[cfg(test)]
mod trade_setup_tests;

#[cfg(test)]
mod risk_tests;

use std::sync::Arc;

use async_trait::async_trait;

use crate::config::DataConfig;
use crate::data::provider::MarketDataProvider;
use crate::error::StageError;

pub use confirmation::{Confirmation, SignalCheck};
pub use key_levels::KeyLevels;
pub use market_context::{MarketContext, Trend};
pub use risk::RiskParameters;
pub use trade_setup::TradeSetup;

use confirmation::ConfirmationAnalyzer;
use key_levels::KeyLevelsMapper;
use market_context::MarketContextAnalyzer;
use risk::RiskEngine;
use trade_setup::TradeSetupEngine;

pub type StageResult<T> = Result<T, StageError>;

/// The five stage adapters, in pipeline order. Later stages receive the
/// successful outputs of the earlier ones.
///
/// Implementations must report problems through `StageResult`; the
/// orchestrator additionally catches panics at its boundary, so a
/// misbehaving adapter degrades to a per-symbol skip either way.
#[async_trait]
pub trait AnalysisStages: Send + Sync {
    async fn market_context(&self, symbol: &str) -> StageResult<MarketContext>;

    async fn key_levels(&self, symbol: &str) -> StageResult<KeyLevels>;

    async fn trade_setup(
        &self,
        symbol: &str,
        context: &MarketContext,
        levels: &KeyLevels,
    ) -> StageResult<TradeSetup>;

    async fn confirmation(
        &self,
        symbol: &str,
        context: &MarketContext,
        levels: &KeyLevels,
        setup: &TradeSetup,
    ) -> StageResult<Confirmation>;

    async fn risk_parameters(
        &self,
        symbol: &str,
        context: &MarketContext,
        levels: &KeyLevels,
        setup: &TradeSetup,
    ) -> StageResult<RiskParameters>;
}

/// Production stage set backed by one market data provider.
pub struct StageSet {
    context: MarketContextAnalyzer,
    levels: KeyLevelsMapper,
    setup: TradeSetupEngine,
    confirmation: ConfirmationAnalyzer,
    risk: RiskEngine,
}

impl StageSet {
    pub fn new(provider: Arc<dyn MarketDataProvider>, data: &DataConfig) -> Self {
        Self {
            context: MarketContextAnalyzer::new(provider.clone(), data.lookback_days),
            levels: KeyLevelsMapper::new(provider.clone(), data.max_expirations),
            setup: TradeSetupEngine,
            confirmation: ConfirmationAnalyzer::new(provider, data.confirmation_lookback_days),
            risk: RiskEngine,
        }
    }
}

#[async_trait]
impl AnalysisStages for StageSet {
    async fn market_context(&self, symbol: &str) -> StageResult<MarketContext> {
        self.context.analyze(symbol).await
    }

    async fn key_levels(&self, symbol: &str) -> StageResult<KeyLevels> {
        self.levels.map_levels(symbol).await
    }

    async fn trade_setup(
        &self,
        _symbol: &str,
        context: &MarketContext,
        levels: &KeyLevels,
    ) -> StageResult<TradeSetup> {
        Ok(self.setup.determine_setup(context, levels))
    }

    async fn confirmation(
        &self,
        symbol: &str,
        context: &MarketContext,
        levels: &KeyLevels,
        setup: &TradeSetup,
    ) -> StageResult<Confirmation> {
        self.confirmation
            .get_signals(symbol, context, levels, setup)
            .await
    }

    async fn risk_parameters(
        &self,
        _symbol: &str,
        context: &MarketContext,
        levels: &KeyLevels,
        setup: &TradeSetup,
    ) -> StageResult<RiskParameters> {
        Ok(self.risk.recommendations(context, levels, setup))
    }
}
