//! Market context stage: trend, sentiment and momentum for one symbol.
//!
//! Trend comes from EMA(10/20/50) alignment, sentiment from the put-call
//! ratio adjusted for implied volatility, momentum from RSI and
//! stochastic RSI agreement.

use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::data::indicators;
use crate::data::provider::MarketDataProvider;
use crate::error::StageError;

use super::StageResult;

/// Bars required before the EMA(50) tail and stochastic RSI are trusted.
const MIN_CONTEXT_BARS: usize = 60;

/// Directional label shared by trend, sentiment and momentum.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Trend {
    Bullish,
    Bearish,
    Neutral,
}

impl fmt::Display for Trend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Trend::Bullish => write!(f, "bullish"),
            Trend::Bearish => write!(f, "bearish"),
            Trend::Neutral => write!(f, "neutral"),
        }
    }
}

/// Payload of the market-context stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct MarketContext {
    pub trend: Trend,
    pub sentiment: Trend,
    pub momentum: Trend,
    /// Put-call volume ratio of the nearest expiration; 0 when no options trade.
    pub pcr: f64,
    /// Volume-weighted implied volatility of the nearest calls.
    pub vwiv: f64,
    /// Gamma exposure. Needs a Greeks-capable provider; 0 otherwise.
    pub gex: f64,
    pub rsi: f64,
    pub stoch_rsi: f64,
    pub ema10: f64,
    pub ema20: f64,
    pub ema50: f64,
}

pub struct MarketContextAnalyzer {
    provider: Arc<dyn MarketDataProvider>,
    lookback_days: u32,
}

impl MarketContextAnalyzer {
    pub fn new(provider: Arc<dyn MarketDataProvider>, lookback_days: u32) -> Self {
        Self {
            provider,
            lookback_days,
        }
    }

    pub async fn analyze(&self, symbol: &str) -> StageResult<MarketContext> {
        let candles = self
            .provider
            .daily_history(symbol, self.lookback_days)
            .await?;
        if candles.len() < MIN_CONTEXT_BARS {
            return Err(StageError::InsufficientHistory {
                have: candles.len(),
                need: MIN_CONTEXT_BARS,
            });
        }

        let closes: Vec<f64> = candles.iter().map(|c| c.close).collect();
        let ema10 = *indicators::ema(&closes, 10).last().unwrap_or(&f64::NAN);
        let ema20 = *indicators::ema(&closes, 20).last().unwrap_or(&f64::NAN);
        let ema50 = *indicators::ema(&closes, 50).last().unwrap_or(&f64::NAN);

        let rsi_series = indicators::rsi(&closes, 14);
        let rsi = *rsi_series.last().unwrap_or(&f64::NAN);
        let (stoch_k, _) = indicators::stochastic(&rsi_series, 14, 3);
        let stoch_rsi = *stoch_k.last().unwrap_or(&f64::NAN);

        // Options data is optional for context: a symbol without a listed
        // chain still gets trend/momentum, with flat sentiment inputs.
        let (pcr, vwiv) = match self.provider.option_chains(symbol, 1).await {
            Ok(chains) => chains
                .first()
                .map(|chain| {
                    let call_volume: f64 = chain.calls.iter().map(|c| c.volume).sum();
                    let put_volume: f64 = chain.puts.iter().map(|p| p.volume).sum();
                    if call_volume > 0.0 {
                        let weighted_iv: f64 = chain
                            .calls
                            .iter()
                            .map(|c| c.implied_volatility * c.volume)
                            .sum();
                        (put_volume / call_volume, weighted_iv / call_volume)
                    } else {
                        (0.0, 0.0)
                    }
                })
                .unwrap_or((0.0, 0.0)),
            Err(e) => {
                warn!("No options data for {} in context stage: {}", symbol, e);
                (0.0, 0.0)
            }
        };

        let trend = determine_trend(&closes, ema10, ema20, ema50);
        let sentiment = determine_sentiment(pcr, vwiv);
        let momentum = determine_momentum(rsi, stoch_rsi);

        Ok(MarketContext {
            trend,
            sentiment,
            momentum,
            pcr,
            vwiv,
            gex: 0.0,
            rsi,
            stoch_rsi,
            ema10,
            ema20,
            ema50,
        })
    }
}

fn determine_trend(closes: &[f64], ema10: f64, ema20: f64, ema50: f64) -> Trend {
    if ema10 > ema20 && ema20 > ema50 {
        return Trend::Bullish;
    }
    if ema10 < ema20 && ema20 < ema50 {
        return Trend::Bearish;
    }

    // Converging EMAs (within 1%) read as a flat market.
    let hi = ema10.max(ema20).max(ema50);
    let lo = ema10.min(ema20).min(ema50);
    if ema20 > 0.0 && (hi - lo) / ema20 < 0.01 {
        return Trend::Neutral;
    }

    // Mixed alignment: fall back to recent price action.
    let last = closes[closes.len() - 1];
    let prior = closes[closes.len() - 5];
    let recent_change = (last - prior) / prior;
    if recent_change > 0.02 {
        Trend::Bullish
    } else if recent_change < -0.02 {
        Trend::Bearish
    } else {
        Trend::Neutral
    }
}

fn determine_sentiment(pcr: f64, vwiv: f64) -> Trend {
    // PCR thresholds widen as implied volatility rises.
    let (bull_below, bear_above) = if vwiv < 0.3 {
        (0.7, 1.3)
    } else if vwiv < 0.5 {
        (0.8, 1.2)
    } else {
        (0.5, 1.5)
    };

    if pcr < bull_below {
        Trend::Bullish
    } else if pcr > bear_above {
        Trend::Bearish
    } else {
        Trend::Neutral
    }
}

#[derive(PartialEq)]
enum Zone {
    Overbought,
    Oversold,
    Bullish,
    Bearish,
    Neutral,
}

fn rsi_zone(rsi: f64) -> Zone {
    if rsi > 70.0 {
        Zone::Overbought
    } else if rsi < 30.0 {
        Zone::Oversold
    } else if rsi > 55.0 {
        Zone::Bullish
    } else if rsi < 45.0 {
        Zone::Bearish
    } else {
        Zone::Neutral
    }
}

fn stoch_zone(stoch_rsi: f64) -> Zone {
    if stoch_rsi > 80.0 {
        Zone::Overbought
    } else if stoch_rsi < 20.0 {
        Zone::Oversold
    } else if stoch_rsi > 60.0 {
        Zone::Bullish
    } else if stoch_rsi < 40.0 {
        Zone::Bearish
    } else {
        Zone::Neutral
    }
}

fn determine_momentum(rsi: f64, stoch_rsi: f64) -> Trend {
    let r = rsi_zone(rsi);
    let s = stoch_zone(stoch_rsi);

    let bullish = |z: &Zone| *z == Zone::Bullish || *z == Zone::Oversold;
    let bearish = |z: &Zone| *z == Zone::Bearish || *z == Zone::Overbought;

    if bullish(&r) && bullish(&s) {
        Trend::Bullish
    } else if bearish(&r) && bearish(&s) {
        Trend::Bearish
    } else {
        Trend::Neutral
    }
}
