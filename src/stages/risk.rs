//! Risk parameters stage: position sizing, stop loss and risk/reward.

use serde::{Deserialize, Serialize};

use super::key_levels::KeyLevels;
use super::market_context::MarketContext;
use super::trade_setup::TradeSetup;
use super::Trend;

/// Account fractions for one position.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PositionSize {
    pub recommended: f64,
    pub conservative: f64,
    pub aggressive: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct StopLoss {
    /// Level-derived stop (support/resistance or EMA based).
    pub technical: f64,
    /// Pure percentage stop from the current price.
    pub percentage: f64,
    pub percentage_value: f64,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RiskReward {
    pub ratio: f64,
    pub reward: f64,
    pub risk: f64,
    pub target_price: f64,
}

/// Payload of the risk-parameters stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RiskParameters {
    pub position_size: PositionSize,
    pub stop_loss: StopLoss,
    pub risk_reward: RiskReward,
}

pub struct RiskEngine;

impl RiskEngine {
    pub fn recommendations(
        &self,
        context: &MarketContext,
        levels: &KeyLevels,
        setup: &TradeSetup,
    ) -> RiskParameters {
        let position_size = position_size(context, setup);
        let stop_loss = stop_loss(context, levels, setup);
        let risk_reward = risk_reward(levels, setup, &stop_loss);

        RiskParameters {
            position_size,
            stop_loss,
            risk_reward,
        }
    }
}

fn position_size(context: &MarketContext, setup: &TradeSetup) -> PositionSize {
    // Higher implied volatility shrinks the base allocation.
    let base_size = if context.vwiv < 0.3 {
        0.02
    } else if context.vwiv < 0.45 {
        0.015
    } else if context.vwiv < 0.6 {
        0.01
    } else {
        0.005
    };

    let gex_factor = if context.gex.abs() > 1000.0 {
        0.7
    } else if context.gex.abs() > 500.0 {
        0.8
    } else {
        1.0
    };

    let confidence_factor = (setup.confidence / 100.0).min(1.0);

    let recommended = base_size * gex_factor * confidence_factor;
    PositionSize {
        recommended,
        conservative: recommended * 0.7,
        aggressive: recommended * 1.3,
    }
}

fn stop_loss(context: &MarketContext, levels: &KeyLevels, setup: &TradeSetup) -> StopLoss {
    let current_price = levels.current_price;
    if current_price <= 0.0 {
        return StopLoss {
            technical: 0.0,
            percentage: 0.0,
            percentage_value: 0.0,
        };
    }

    let percentage_value = if context.vwiv < 0.3 {
        0.02
    } else if context.vwiv < 0.45 {
        0.03
    } else if context.vwiv < 0.6 {
        0.05
    } else {
        0.07
    };

    let technical = match setup.direction {
        Trend::Bullish => match levels.support.first() {
            Some(&s0) => s0 * 0.99,
            None if context.ema20 > 0.0 => context.ema20 * 0.99,
            None => current_price * (1.0 - percentage_value),
        },
        Trend::Bearish => match levels.resistance.first() {
            Some(&r0) => r0 * 1.01,
            None if context.ema20 > 0.0 => context.ema20 * 1.01,
            None => current_price * (1.0 + percentage_value),
        },
        Trend::Neutral => current_price * (1.0 - percentage_value),
    };

    let percentage = if setup.direction == Trend::Bearish {
        current_price * (1.0 + percentage_value)
    } else {
        current_price * (1.0 - percentage_value)
    };

    StopLoss {
        technical,
        percentage,
        percentage_value,
    }
}

fn risk_reward(levels: &KeyLevels, setup: &TradeSetup, stop_loss: &StopLoss) -> RiskReward {
    let current_price = levels.current_price;
    if current_price <= 0.0 {
        return RiskReward {
            ratio: 0.0,
            reward: 0.0,
            risk: 0.0,
            target_price: 0.0,
        };
    }

    let risk = match setup.direction {
        Trend::Bullish => current_price - stop_loss.technical,
        Trend::Bearish => stop_loss.technical - current_price,
        Trend::Neutral => (current_price - stop_loss.technical).abs(),
    };

    let reward = match setup.direction {
        Trend::Bullish => levels
            .resistance
            .first()
            .map(|&r0| r0 - current_price)
            .unwrap_or(current_price * 0.05),
        Trend::Bearish => levels
            .support
            .first()
            .map(|&s0| current_price - s0)
            .unwrap_or(current_price * 0.05),
        Trend::Neutral => current_price * 0.02,
    };

    let ratio = if risk > 0.0 { reward / risk } else { 0.0 };
    let target_price = if setup.direction == Trend::Bearish {
        current_price - reward
    } else {
        current_price + reward
    };

    RiskReward {
        ratio,
        reward,
        risk,
        target_price,
    }
}
