//! Confirmation stage: entry and exit timing signals for a classified setup.
//!
//! Works on a shorter history window than the context stage. Signal
//! strength accumulates per check and fires above 50.

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::data::indicators;
use crate::data::provider::MarketDataProvider;

use super::key_levels::KeyLevels;
use super::market_context::MarketContext;
use super::trade_setup::TradeSetup;
use super::{StageResult, Trend};

const SIGNAL_THRESHOLD: f64 = 50.0;

/// One timing check result (entry or exit side).
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct SignalCheck {
    pub signal: bool,
    pub strength: f64,
    pub reasons: Vec<String>,
}

impl SignalCheck {
    fn none(reason: &str) -> Self {
        Self {
            signal: false,
            strength: 0.0,
            reasons: vec![reason.to_string()],
        }
    }
}

/// Payload of the confirmation stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Confirmation {
    pub entry: SignalCheck,
    pub exit: SignalCheck,
}

/// Last two readings of the derived series, used by the hook checks.
struct Tape {
    close: f64,
    prev_close: f64,
    stoch_k: f64,
    prev_stoch_k: f64,
    stoch_d: f64,
    prev_stoch_d: f64,
    prev_rsi: f64,
    volume_ratio: f64,
}

pub struct ConfirmationAnalyzer {
    provider: Arc<dyn MarketDataProvider>,
    lookback_days: u32,
}

impl ConfirmationAnalyzer {
    pub fn new(provider: Arc<dyn MarketDataProvider>, lookback_days: u32) -> Self {
        Self {
            provider,
            lookback_days,
        }
    }

    pub async fn get_signals(
        &self,
        symbol: &str,
        context: &MarketContext,
        levels: &KeyLevels,
        setup: &TradeSetup,
    ) -> StageResult<Confirmation> {
        let candles = self
            .provider
            .daily_history(symbol, self.lookback_days)
            .await?;
        if candles.len() < 5 {
            // Too little history is a no-signal, not a stage failure.
            return Ok(Confirmation {
                entry: SignalCheck::none("Insufficient data"),
                exit: SignalCheck::none("Insufficient data"),
            });
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let volumes: Vec<f64> = candles.iter().map(|c| c.volume).collect();

        let rsi_series = indicators::rsi(&closes, 14);
        let (stoch_k, stoch_d) = indicators::stochastic(&rsi_series, 14, 3);
        let vol_ratio = indicators::volume_ratio(&volumes, 20);

        let n = closes.len();
        let tape = Tape {
            close: closes[n - 1],
            prev_close: closes[n - 2],
            stoch_k: stoch_k[n - 1],
            prev_stoch_k: stoch_k[n - 2],
            stoch_d: stoch_d[n - 1],
            prev_stoch_d: stoch_d[n - 2],
            prev_rsi: rsi_series[n - 2],
            volume_ratio: vol_ratio[n - 1],
        };

        let entry = match setup.direction {
            Trend::Bullish => check_bullish_entry(&tape, context, levels),
            Trend::Bearish => check_bearish_entry(&tape, context, levels),
            Trend::Neutral => check_neutral_entry(&tape, context, levels),
        };
        let exit = check_exit(&tape, context, levels, setup);

        Ok(Confirmation { entry, exit })
    }
}

fn check_bullish_entry(tape: &Tape, context: &MarketContext, levels: &KeyLevels) -> SignalCheck {
    let mut strength = 0.0;
    let mut reasons = Vec::new();

    if tape.prev_stoch_k < 60.0
        && tape.stoch_k > tape.prev_stoch_k
        && tape.stoch_d > tape.prev_stoch_d
    {
        reasons.push("Stochastic RSI hooking up from below 60".to_string());
        strength += 30.0;
    }

    if tape.volume_ratio > 1.5 {
        reasons.push(format!("Volume spike ({:.2}x average)", tape.volume_ratio));
        strength += 20.0;
    }

    if let Some(&s0) = levels.support.first() {
        if (tape.close - s0).abs() / s0 < 0.02 {
            reasons.push(format!("Price near support level ({:.2})", s0));
            strength += 25.0;
        }
    }

    if tape.close > context.ema10 && tape.close > context.ema20 {
        reasons.push("Price above key EMAs".to_string());
        strength += 15.0;
    }

    if context.rsi > tape.prev_rsi && context.rsi > 50.0 {
        reasons.push(format!("RSI showing upward momentum ({:.2})", context.rsi));
        strength += 10.0;
    }

    SignalCheck {
        signal: strength > SIGNAL_THRESHOLD,
        strength,
        reasons,
    }
}

fn check_bearish_entry(tape: &Tape, context: &MarketContext, levels: &KeyLevels) -> SignalCheck {
    let mut strength = 0.0;
    let mut reasons = Vec::new();

    if tape.prev_stoch_k > 40.0
        && tape.stoch_k < tape.prev_stoch_k
        && tape.stoch_d < tape.prev_stoch_d
    {
        reasons.push("Stochastic RSI hooking down from above 40".to_string());
        strength += 30.0;
    }

    if tape.volume_ratio > 1.5 {
        reasons.push(format!("Volume spike ({:.2}x average)", tape.volume_ratio));
        strength += 20.0;
    }

    if let Some(&r0) = levels.resistance.first() {
        if (tape.close - r0).abs() / r0 < 0.02 {
            reasons.push(format!("Price near resistance level ({:.2})", r0));
            strength += 25.0;
        }
    }

    if tape.close < context.ema10 && tape.close < context.ema20 {
        reasons.push("Price below key EMAs".to_string());
        strength += 15.0;
    }

    if context.rsi < tape.prev_rsi && context.rsi < 50.0 {
        reasons.push(format!("RSI showing downward momentum ({:.2})", context.rsi));
        strength += 10.0;
    }

    SignalCheck {
        signal: strength > SIGNAL_THRESHOLD,
        strength,
        reasons,
    }
}

fn check_neutral_entry(tape: &Tape, context: &MarketContext, levels: &KeyLevels) -> SignalCheck {
    let mut strength = 0.0;
    let mut reasons = Vec::new();

    if levels.max_pain > 0.0 && (tape.close - levels.max_pain).abs() / levels.max_pain < 0.01 {
        reasons.push(format!("Price stalling at Max Pain ({:.2})", levels.max_pain));
        strength += 40.0;
    }

    if context.vwiv < 0.3 {
        reasons.push(format!("Low implied volatility ({:.2})", context.vwiv));
        strength += 20.0;
    }

    if (45.0..=55.0).contains(&context.rsi) {
        reasons.push(format!("RSI in neutral zone ({:.2})", context.rsi));
        strength += 20.0;
    }

    if (40.0..=60.0).contains(&context.stoch_rsi) {
        reasons.push(format!(
            "Stochastic RSI in neutral zone ({:.2})",
            context.stoch_rsi
        ));
        strength += 20.0;
    }

    SignalCheck {
        signal: strength > SIGNAL_THRESHOLD,
        strength,
        reasons,
    }
}

fn check_exit(
    tape: &Tape,
    context: &MarketContext,
    levels: &KeyLevels,
    setup: &TradeSetup,
) -> SignalCheck {
    let mut strength = 0.0;
    let mut reasons = Vec::new();

    match setup.direction {
        Trend::Bullish if context.rsi > 80.0 => {
            reasons.push(format!("RSI overbought ({:.2})", context.rsi));
            strength += 30.0;
        }
        Trend::Bearish if context.rsi < 20.0 => {
            reasons.push(format!("RSI oversold ({:.2})", context.rsi));
            strength += 30.0;
        }
        _ => {}
    }

    match setup.direction {
        Trend::Bullish if tape.prev_stoch_k > tape.stoch_k && tape.prev_stoch_k > 80.0 => {
            reasons.push("Stochastic RSI reversing from overbought".to_string());
            strength += 25.0;
        }
        Trend::Bearish if tape.prev_stoch_k < tape.stoch_k && tape.prev_stoch_k < 20.0 => {
            reasons.push("Stochastic RSI reversing from oversold".to_string());
            strength += 25.0;
        }
        _ => {}
    }

    match setup.direction {
        Trend::Bullish => {
            if let Some(&r0) = levels.resistance.first() {
                if (tape.close - r0).abs() / r0 < 0.01 {
                    reasons.push(format!("Price reaching resistance ({:.2})", r0));
                    strength += 25.0;
                }
            }
            if tape.close < context.ema10 && tape.prev_close > context.ema10 {
                reasons.push("Price breaking below 10 EMA".to_string());
                strength += 20.0;
            }
        }
        Trend::Bearish => {
            if let Some(&s0) = levels.support.first() {
                if (tape.close - s0).abs() / s0 < 0.01 {
                    reasons.push(format!("Price reaching support ({:.2})", s0));
                    strength += 25.0;
                }
            }
            if tape.close > context.ema10 && tape.prev_close < context.ema10 {
                reasons.push("Price breaking above 10 EMA".to_string());
                strength += 20.0;
            }
        }
        Trend::Neutral => {}
    }

    SignalCheck {
        signal: strength > SIGNAL_THRESHOLD,
        strength,
        reasons,
    }
}
