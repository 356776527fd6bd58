//! Unit tests for position sizing, stop loss and risk/reward math.

#[cfg(test)]
mod risk_tests {
    use crate::stages::key_levels::KeyLevels;
    use crate::stages::market_context::{MarketContext, Trend};
    use crate::stages::risk::RiskEngine;
    use crate::stages::trade_setup::TradeSetup;

    const EPS: f64 = 1e-9;

    fn make_context(vwiv: f64, gex: f64) -> MarketContext {
        MarketContext {
            trend: Trend::Bullish,
            sentiment: Trend::Neutral,
            momentum: Trend::Neutral,
            pcr: 1.0,
            vwiv,
            gex,
            rsi: 50.0,
            stoch_rsi: 50.0,
            ema10: 100.0,
            ema20: 99.0,
            ema50: 98.0,
        }
    }

    fn make_levels(support: Vec<f64>, resistance: Vec<f64>, current_price: f64) -> KeyLevels {
        KeyLevels {
            support,
            resistance,
            high_gamma: vec![],
            max_pain: 0.0,
            current_price,
        }
    }

    fn make_setup(direction: Trend, confidence: f64) -> TradeSetup {
        TradeSetup {
            label: direction.to_string(),
            direction,
            confidence,
            reasons: vec![],
        }
    }

    // ============= Position Size Tests =============

    #[test]
    fn test_position_size_low_vol_full_confidence() {
        let context = make_context(0.2, 0.0);
        let levels = make_levels(vec![98.0], vec![110.0], 100.0);
        let setup = make_setup(Trend::Bullish, 100.0);

        let risk = RiskEngine.recommendations(&context, &levels, &setup);

        assert!((risk.position_size.recommended - 0.02).abs() < EPS);
        assert!((risk.position_size.conservative - 0.014).abs() < EPS);
        assert!((risk.position_size.aggressive - 0.026).abs() < EPS);
    }

    #[test]
    fn test_position_size_shrinks_with_volatility_and_gex() {
        let context = make_context(0.7, 1200.0);
        let levels = make_levels(vec![98.0], vec![110.0], 100.0);
        let setup = make_setup(Trend::Bullish, 50.0);

        let risk = RiskEngine.recommendations(&context, &levels, &setup);

        // 0.005 base * 0.7 gex * 0.5 confidence
        assert!((risk.position_size.recommended - 0.00175).abs() < EPS);
    }

    #[test]
    fn test_confidence_factor_is_capped_at_one() {
        let context = make_context(0.2, 0.0);
        let levels = make_levels(vec![98.0], vec![110.0], 100.0);
        let setup = make_setup(Trend::Bullish, 150.0);

        let risk = RiskEngine.recommendations(&context, &levels, &setup);

        assert!((risk.position_size.recommended - 0.02).abs() < EPS);
    }

    // ============= Stop Loss Tests =============

    #[test]
    fn test_bullish_stop_sits_below_first_support() {
        let context = make_context(0.2, 0.0);
        let levels = make_levels(vec![98.0, 95.0], vec![110.0], 100.0);
        let setup = make_setup(Trend::Bullish, 80.0);

        let risk = RiskEngine.recommendations(&context, &levels, &setup);

        assert!((risk.stop_loss.technical - 98.0 * 0.99).abs() < EPS);
        assert!((risk.stop_loss.percentage_value - 0.02).abs() < EPS);
        assert!((risk.stop_loss.percentage - 98.0).abs() < EPS);
    }

    #[test]
    fn test_bearish_stop_sits_above_first_resistance() {
        let context = make_context(0.2, 0.0);
        let levels = make_levels(vec![90.0], vec![102.0, 105.0], 100.0);
        let setup = make_setup(Trend::Bearish, 80.0);

        let risk = RiskEngine.recommendations(&context, &levels, &setup);

        assert!((risk.stop_loss.technical - 102.0 * 1.01).abs() < EPS);
        assert!((risk.stop_loss.percentage - 102.0).abs() < EPS);
    }

    #[test]
    fn test_stop_falls_back_to_ema_without_levels() {
        let context = make_context(0.2, 0.0);
        let levels = make_levels(vec![], vec![], 100.0);
        let setup = make_setup(Trend::Bullish, 80.0);

        let risk = RiskEngine.recommendations(&context, &levels, &setup);

        assert!((risk.stop_loss.technical - 99.0 * 0.99).abs() < EPS);
    }

    #[test]
    fn test_percentage_stop_widens_with_volatility() {
        let levels = make_levels(vec![98.0], vec![110.0], 100.0);
        let setup = make_setup(Trend::Bullish, 80.0);

        let calm = RiskEngine.recommendations(&make_context(0.2, 0.0), &levels, &setup);
        let wild = RiskEngine.recommendations(&make_context(0.7, 0.0), &levels, &setup);

        assert!((calm.stop_loss.percentage_value - 0.02).abs() < EPS);
        assert!((wild.stop_loss.percentage_value - 0.07).abs() < EPS);
    }

    #[test]
    fn test_zero_price_yields_empty_parameters() {
        let context = make_context(0.2, 0.0);
        let levels = make_levels(vec![], vec![], 0.0);
        let setup = make_setup(Trend::Bullish, 80.0);

        let risk = RiskEngine.recommendations(&context, &levels, &setup);

        assert_eq!(risk.stop_loss.technical, 0.0);
        assert_eq!(risk.risk_reward.ratio, 0.0);
        assert_eq!(risk.risk_reward.target_price, 0.0);
    }

    // ============= Risk/Reward Tests =============

    #[test]
    fn test_bullish_risk_reward_targets_first_resistance() {
        let context = make_context(0.2, 0.0);
        let levels = make_levels(vec![98.0], vec![110.0], 100.0);
        let setup = make_setup(Trend::Bullish, 80.0);

        let risk = RiskEngine.recommendations(&context, &levels, &setup);

        let expected_risk = 100.0 - 98.0 * 0.99;
        assert!((risk.risk_reward.risk - expected_risk).abs() < EPS);
        assert!((risk.risk_reward.reward - 10.0).abs() < EPS);
        assert!((risk.risk_reward.ratio - 10.0 / expected_risk).abs() < EPS);
        assert!((risk.risk_reward.target_price - 110.0).abs() < EPS);
    }

    #[test]
    fn test_bearish_target_is_below_price() {
        let context = make_context(0.2, 0.0);
        let levels = make_levels(vec![92.0], vec![102.0], 100.0);
        let setup = make_setup(Trend::Bearish, 80.0);

        let risk = RiskEngine.recommendations(&context, &levels, &setup);

        assert!((risk.risk_reward.reward - 8.0).abs() < EPS);
        assert!((risk.risk_reward.target_price - 92.0).abs() < EPS);
    }

    #[test]
    fn test_bullish_reward_defaults_without_resistance() {
        let context = make_context(0.2, 0.0);
        let levels = make_levels(vec![98.0], vec![], 100.0);
        let setup = make_setup(Trend::Bullish, 80.0);

        let risk = RiskEngine.recommendations(&context, &levels, &setup);

        // 5% default reward when no resistance is mapped.
        assert!((risk.risk_reward.reward - 5.0).abs() < EPS);
    }

    #[test]
    fn test_neutral_reward_is_two_percent() {
        let context = make_context(0.2, 0.0);
        let levels = make_levels(vec![98.0], vec![110.0], 100.0);
        let setup = make_setup(Trend::Neutral, 80.0);

        let risk = RiskEngine.recommendations(&context, &levels, &setup);

        assert!((risk.risk_reward.reward - 2.0).abs() < EPS);
    }
}
