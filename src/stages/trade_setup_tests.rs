//! Unit tests for the setup-classification scoring engine.

#[cfg(test)]
mod trade_setup_tests {
    use crate::stages::key_levels::KeyLevels;
    use crate::stages::market_context::{MarketContext, Trend};
    use crate::stages::trade_setup::TradeSetupEngine;

    fn make_context(trend: Trend, pcr: f64, vwiv: f64, gex: f64, rsi: f64, stoch_rsi: f64) -> MarketContext {
        MarketContext {
            trend,
            sentiment: Trend::Neutral,
            momentum: Trend::Neutral,
            pcr,
            vwiv,
            gex,
            rsi,
            stoch_rsi,
            ema10: 100.0,
            ema20: 100.0,
            ema50: 100.0,
        }
    }

    fn make_levels(support: Vec<f64>, resistance: Vec<f64>, max_pain: f64, current_price: f64) -> KeyLevels {
        KeyLevels {
            support,
            resistance,
            high_gamma: vec![],
            max_pain,
            current_price,
        }
    }

    // ============= Bullish Setup Tests =============

    #[test]
    fn test_textbook_bullish_scores_full_marks() {
        let context = make_context(Trend::Bullish, 0.6, 0.25, 600.0, 60.0, 70.0);
        let levels = make_levels(vec![99.0], vec![120.0], 0.0, 100.0);

        let setup = TradeSetupEngine.determine_setup(&context, &levels);

        assert_eq!(setup.label, "bullish");
        assert_eq!(setup.direction, Trend::Bullish);
        assert_eq!(setup.confidence, 100.0);
        assert!(!setup.reasons.is_empty());
    }

    #[test]
    fn test_bullish_partial_credit_for_neutral_inputs() {
        // Neutral trend and mid-range momentum earn half points, not zero.
        let context = make_context(Trend::Neutral, 0.9, 0.25, 0.0, 50.0, 50.0);
        let levels = make_levels(vec![80.0], vec![120.0], 0.0, 100.0);

        let setup = TradeSetupEngine.determine_setup(&context, &levels);

        // Bullish card: 1/3 trend + 1/2 pcr + 1/2 rsi + 1/2 stoch = 4/14.
        // Neutral card wins here, but the bullish score must be partial.
        assert!(setup.confidence > 0.0);
    }

    // ============= Bearish Setup Tests =============

    #[test]
    fn test_textbook_bearish_scores_full_marks() {
        let context = make_context(Trend::Bearish, 1.5, 0.25, -600.0, 35.0, 30.0);
        let levels = make_levels(vec![80.0], vec![101.0], 0.0, 100.0);

        let setup = TradeSetupEngine.determine_setup(&context, &levels);

        assert_eq!(setup.label, "bearish");
        assert_eq!(setup.direction, Trend::Bearish);
        assert_eq!(setup.confidence, 100.0);
    }

    #[test]
    fn test_price_near_resistance_boosts_bearish() {
        let near = make_levels(vec![], vec![101.0], 0.0, 100.0);
        let far = make_levels(vec![], vec![120.0], 0.0, 100.0);
        let context = make_context(Trend::Bearish, 1.5, 0.25, 0.0, 35.0, 30.0);

        let setup_near = TradeSetupEngine.determine_setup(&context, &near);
        let setup_far = TradeSetupEngine.determine_setup(&context, &far);

        assert!(setup_near.confidence > setup_far.confidence);
    }

    // ============= Neutral Setup Tests =============

    #[test]
    fn test_textbook_neutral_scores_full_marks() {
        let context = make_context(Trend::Neutral, 1.0, 0.25, 0.0, 50.0, 50.0);
        // Price pinned to max pain.
        let levels = make_levels(vec![90.0], vec![110.0], 100.0, 100.0);

        let setup = TradeSetupEngine.determine_setup(&context, &levels);

        assert_eq!(setup.label, "neutral");
        assert_eq!(setup.direction, Trend::Neutral);
        assert_eq!(setup.confidence, 100.0);
    }

    #[test]
    fn test_neutral_ignores_max_pain_when_absent() {
        let context = make_context(Trend::Neutral, 1.0, 0.25, 0.0, 50.0, 50.0);
        let levels = make_levels(vec![], vec![], 0.0, 100.0);

        let setup = TradeSetupEngine.determine_setup(&context, &levels);

        // 13 of 16 points without the max-pain rule.
        assert_eq!(setup.direction, Trend::Neutral);
        assert!(setup.confidence < 100.0);
        assert!(setup.label.starts_with("neutral") || setup.label.starts_with("weak_"));
    }

    // ============= Validity Threshold Tests =============

    #[test]
    fn test_weak_prefix_when_nothing_clears_the_bar() {
        // Conflicting inputs: no direction can score above 60.
        let context = make_context(Trend::Neutral, 1.0, 0.8, 0.0, 90.0, 90.0);
        let levels = make_levels(vec![], vec![], 0.0, 100.0);

        let setup = TradeSetupEngine.determine_setup(&context, &levels);

        assert!(setup.label.starts_with("weak_"), "label was {}", setup.label);
        assert!(setup.confidence <= 60.0);
    }

    #[test]
    fn test_valid_setup_beats_stronger_invalid_one() {
        // Bullish everything except levels: 11/14 ~ 78.6, valid.
        let context = make_context(Trend::Bullish, 0.6, 0.25, 600.0, 60.0, 70.0);
        let levels = make_levels(vec![], vec![], 0.0, 100.0);

        let setup = TradeSetupEngine.determine_setup(&context, &levels);

        assert_eq!(setup.label, "bullish");
        assert!(setup.confidence > 60.0);
    }

    #[test]
    fn test_reasons_describe_earned_rules_only() {
        let context = make_context(Trend::Bullish, 0.6, 0.25, 0.0, 60.0, 70.0);
        let levels = make_levels(vec![], vec![], 0.0, 100.0);

        let setup = TradeSetupEngine.determine_setup(&context, &levels);

        assert!(setup.reasons.iter().any(|r| r.contains("bullish trend")));
        // GEX rule did not fire, so no GEX reason.
        assert!(!setup.reasons.iter().any(|r| r.contains("GEX")));
    }
}
