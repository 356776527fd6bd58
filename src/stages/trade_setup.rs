//! Setup classification stage: scores bullish, bearish and neutral rule
//! sets over the context and levels payloads and picks the strongest.

use serde::{Deserialize, Serialize};

use super::key_levels::KeyLevels;
use super::market_context::{MarketContext, Trend};

/// A setup must clear this confidence to count as valid; below it the
/// label gets a `weak_` prefix.
const VALID_CONFIDENCE: f64 = 60.0;

/// Payload of the setup-classification stage.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct TradeSetup {
    /// "bullish" | "bearish" | "neutral", prefixed with "weak_" when no
    /// rule set cleared the validity bar.
    pub label: String,
    /// Direction of the winning rule set, weak or not.
    pub direction: Trend,
    /// 0-100 score of the winning rule set.
    pub confidence: f64,
    pub reasons: Vec<String>,
}

#[derive(Clone, Debug)]
pub struct SetupScore {
    pub valid: bool,
    pub confidence: f64,
    pub reasons: Vec<String>,
}

/// Accumulates rule points against the maximum attainable.
struct ScoreCard {
    points: f64,
    max_points: f64,
    reasons: Vec<String>,
}

impl ScoreCard {
    fn new() -> Self {
        Self {
            points: 0.0,
            max_points: 0.0,
            reasons: Vec::new(),
        }
    }

    fn rule(&mut self, weight: f64, earned: f64, reason: Option<String>) {
        self.max_points += weight;
        self.points += earned;
        if let Some(r) = reason {
            self.reasons.push(r);
        }
    }

    fn finish(self) -> SetupScore {
        let confidence = if self.max_points > 0.0 {
            self.points / self.max_points * 100.0
        } else {
            0.0
        };
        SetupScore {
            valid: confidence > VALID_CONFIDENCE,
            confidence,
            reasons: self.reasons,
        }
    }
}

pub struct TradeSetupEngine;

impl TradeSetupEngine {
    pub fn determine_setup(&self, context: &MarketContext, levels: &KeyLevels) -> TradeSetup {
        let mut candidates = [
            (Trend::Bullish, score_bullish(context, levels)),
            (Trend::Bearish, score_bearish(context, levels)),
            (Trend::Neutral, score_neutral(context, levels)),
        ];

        // Valid setups beat invalid ones, then higher confidence wins.
        candidates.sort_by(|a, b| {
            b.1.valid
                .cmp(&a.1.valid)
                .then(b.1.confidence.total_cmp(&a.1.confidence))
        });

        let (direction, score) = candidates[0].clone();
        let label = if score.valid {
            direction.to_string()
        } else {
            format!("weak_{}", direction)
        };

        TradeSetup {
            label,
            direction,
            confidence: score.confidence,
            reasons: score.reasons,
        }
    }
}

fn score_bullish(context: &MarketContext, levels: &KeyLevels) -> SetupScore {
    let mut card = ScoreCard::new();

    match context.trend {
        Trend::Bullish => card.rule(
            3.0,
            3.0,
            Some("Strong bullish trend (EMA alignment)".to_string()),
        ),
        Trend::Neutral => card.rule(3.0, 1.0, Some("Neutral trend".to_string())),
        Trend::Bearish => card.rule(3.0, 0.0, None),
    }

    if context.pcr < 0.8 {
        card.rule(
            2.0,
            2.0,
            Some(format!("Bullish sentiment (PCR: {:.2})", context.pcr)),
        );
    } else if context.pcr < 1.0 {
        card.rule(
            2.0,
            1.0,
            Some(format!("Neutral sentiment (PCR: {:.2})", context.pcr)),
        );
    } else {
        card.rule(2.0, 0.0, None);
    }

    if (55.0..=80.0).contains(&context.rsi) {
        card.rule(
            2.0,
            2.0,
            Some(format!("Bullish momentum (RSI: {:.2})", context.rsi)),
        );
    } else if (45.0..55.0).contains(&context.rsi) {
        card.rule(
            2.0,
            1.0,
            Some(format!("Neutral momentum (RSI: {:.2})", context.rsi)),
        );
    } else {
        card.rule(2.0, 0.0, None);
    }

    if context.stoch_rsi > 60.0 {
        card.rule(
            2.0,
            2.0,
            Some(format!("Bullish Stochastic RSI: {:.2}", context.stoch_rsi)),
        );
    } else if context.stoch_rsi > 40.0 {
        card.rule(
            2.0,
            1.0,
            Some(format!("Neutral Stochastic RSI: {:.2}", context.stoch_rsi)),
        );
    } else {
        card.rule(2.0, 0.0, None);
    }

    match levels.support.first() {
        Some(&s0) if levels.current_price <= s0 * 1.02 => {
            card.rule(3.0, 3.0, Some(format!("Price near support ({:.2})", s0)));
        }
        Some(&s0) if levels.current_price <= s0 * 1.05 => {
            card.rule(
                3.0,
                1.0,
                Some(format!("Price approaching support ({:.2})", s0)),
            );
        }
        _ => card.rule(3.0, 0.0, None),
    }

    if context.gex > 500.0 {
        card.rule(
            2.0,
            2.0,
            Some("Positive GEX indicating bullish stability".to_string()),
        );
    } else {
        card.rule(2.0, 0.0, None);
    }

    card.finish()
}

fn score_bearish(context: &MarketContext, levels: &KeyLevels) -> SetupScore {
    let mut card = ScoreCard::new();

    match context.trend {
        Trend::Bearish => card.rule(
            3.0,
            3.0,
            Some("Strong bearish trend (EMA alignment)".to_string()),
        ),
        Trend::Neutral => card.rule(3.0, 1.0, Some("Neutral trend".to_string())),
        Trend::Bullish => card.rule(3.0, 0.0, None),
    }

    if context.pcr > 1.2 {
        card.rule(
            2.0,
            2.0,
            Some(format!("Bearish sentiment (PCR: {:.2})", context.pcr)),
        );
    } else if context.pcr > 1.0 {
        card.rule(
            2.0,
            1.0,
            Some(format!("Neutral sentiment (PCR: {:.2})", context.pcr)),
        );
    } else {
        card.rule(2.0, 0.0, None);
    }

    if (20.0..=45.0).contains(&context.rsi) {
        card.rule(
            2.0,
            2.0,
            Some(format!("Bearish momentum (RSI: {:.2})", context.rsi)),
        );
    } else if context.rsi > 45.0 && context.rsi <= 55.0 {
        card.rule(
            2.0,
            1.0,
            Some(format!("Neutral momentum (RSI: {:.2})", context.rsi)),
        );
    } else {
        card.rule(2.0, 0.0, None);
    }

    if context.stoch_rsi < 40.0 {
        card.rule(
            2.0,
            2.0,
            Some(format!("Bearish Stochastic RSI: {:.2}", context.stoch_rsi)),
        );
    } else if context.stoch_rsi < 60.0 {
        card.rule(
            2.0,
            1.0,
            Some(format!("Neutral Stochastic RSI: {:.2}", context.stoch_rsi)),
        );
    } else {
        card.rule(2.0, 0.0, None);
    }

    match levels.resistance.first() {
        Some(&r0) if levels.current_price >= r0 * 0.98 => {
            card.rule(3.0, 3.0, Some(format!("Price near resistance ({:.2})", r0)));
        }
        Some(&r0) if levels.current_price >= r0 * 0.95 => {
            card.rule(
                3.0,
                1.0,
                Some(format!("Price approaching resistance ({:.2})", r0)),
            );
        }
        _ => card.rule(3.0, 0.0, None),
    }

    if context.gex < -500.0 {
        card.rule(
            2.0,
            2.0,
            Some("Negative GEX indicating bearish pressure".to_string()),
        );
    } else {
        card.rule(2.0, 0.0, None);
    }

    card.finish()
}

fn score_neutral(context: &MarketContext, levels: &KeyLevels) -> SetupScore {
    let mut card = ScoreCard::new();

    if context.trend == Trend::Neutral {
        card.rule(3.0, 3.0, Some("Neutral trend (flat EMAs)".to_string()));
    } else {
        card.rule(3.0, 0.0, None);
    }

    if (0.8..=1.2).contains(&context.pcr) {
        card.rule(
            2.0,
            2.0,
            Some(format!("Neutral sentiment (PCR: {:.2})", context.pcr)),
        );
    } else {
        card.rule(2.0, 0.0, None);
    }

    if context.vwiv < 0.4 {
        card.rule(
            2.0,
            2.0,
            Some(format!("Low implied volatility ({:.2})", context.vwiv)),
        );
    } else if context.vwiv < 0.5 {
        card.rule(
            2.0,
            1.0,
            Some(format!("Moderate implied volatility ({:.2})", context.vwiv)),
        );
    } else {
        card.rule(2.0, 0.0, None);
    }

    if (45.0..=65.0).contains(&context.rsi) {
        card.rule(
            2.0,
            2.0,
            Some(format!("Neutral momentum (RSI: {:.2})", context.rsi)),
        );
    } else {
        card.rule(2.0, 0.0, None);
    }

    if (25.0..=75.0).contains(&context.stoch_rsi) {
        card.rule(
            2.0,
            2.0,
            Some(format!("Neutral Stochastic RSI: {:.2}", context.stoch_rsi)),
        );
    } else {
        card.rule(2.0, 0.0, None);
    }

    if levels.max_pain > 0.0 {
        let distance = (levels.current_price - levels.max_pain).abs() / levels.max_pain;
        if distance < 0.02 {
            card.rule(
                3.0,
                3.0,
                Some(format!("Price near Max Pain ({:.2})", levels.max_pain)),
            );
        } else if distance < 0.05 {
            card.rule(
                3.0,
                1.0,
                Some(format!("Price approaching Max Pain ({:.2})", levels.max_pain)),
            );
        } else {
            card.rule(3.0, 0.0, None);
        }
    } else {
        card.rule(3.0, 0.0, None);
    }

    if context.gex.abs() < 200.0 {
        card.rule(
            2.0,
            2.0,
            Some("GEX near zero indicating potential breakout".to_string()),
        );
    } else {
        card.rule(2.0, 0.0, None);
    }

    card.finish()
}
