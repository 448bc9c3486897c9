//! Unit tests for factor scoring

use equitrader::indicators::macd::{CrossoverType, MacdEvaluation};
use equitrader::models::indicators::IndicatorSnapshot;
use equitrader::models::signal::FactorScores;
use equitrader::risk::RiskProfile;
use equitrader::signals::{CrossoverRule, FactorWeights, ScoringModel};
use proptest::prelude::*;

use crate::test_utils::{assert_close, day};

/// Neutral snapshot: price inside flat bands, no trend, flat MACD.
fn snapshot(close: f64) -> IndicatorSnapshot {
    IndicatorSnapshot {
        index: 0,
        timestamp: day(0),
        close,
        ma_short: 100.0,
        ma_long: 100.0,
        ma_trend_long: 100.0,
        bb_mid: 100.0,
        bb_upper: 110.0,
        bb_lower: 90.0,
        bb_width: 0.2,
        bb_width_mean: None,
        macd_line: 0.0,
        macd_signal: 0.0,
        macd_histogram: 0.0,
    }
}

fn macd_eval(crossover: CrossoverType, above: bool, growing: bool, positive_rising: bool) -> MacdEvaluation {
    MacdEvaluation::new(crossover, above, growing, positive_rising, 0.0, 0.0, 0.0)
}

#[test]
fn test_trend_score_rules() {
    let model = ScoringModel::default();

    let mut s = snapshot(110.0);
    s.ma_trend_long = 90.0;
    assert_eq!(model.trend_score(&s), 1.0);

    s.close = 95.0;
    assert_eq!(model.trend_score(&s), 0.5);

    s.close = 110.0;
    s.ma_trend_long = 105.0;
    assert_eq!(model.trend_score(&s), 0.5);

    s.close = 95.0;
    assert_eq!(model.trend_score(&s), 0.0);

    // Equality is not "above".
    s.close = 100.0;
    s.ma_trend_long = 100.0;
    assert_eq!(model.trend_score(&s), 0.0);
}

#[test]
fn test_bollinger_lower_band_cross() {
    let model = ScoringModel::default();
    let mut previous = snapshot(89.0);
    previous.bb_lower = 90.0;
    let mut current = snapshot(92.0);
    current.bb_lower = 91.0;

    assert_close(model.bollinger_score(&current, &previous), 0.7, 1e-12);

    current.bb_width_mean = Some(0.1);
    assert_close(model.bollinger_score(&current, &previous), 1.0, 1e-12);
}

#[test]
fn test_bollinger_mid_band_rising() {
    let model = ScoringModel::default();
    let previous = snapshot(99.0);
    let current = snapshot(100.0);
    assert_close(model.bollinger_score(&current, &previous), 0.5, 1e-12);

    // Falling close inside the mid band earns nothing.
    let previous = snapshot(101.0);
    assert_eq!(model.bollinger_score(&current, &previous), 0.0);

    // Upper part of the band earns nothing either.
    let previous = snapshot(104.0);
    let current = snapshot(106.0);
    assert_eq!(model.bollinger_score(&current, &previous), 0.0);
}

#[test]
fn test_bollinger_expansion_bonus() {
    let model = ScoringModel::default();
    let previous = snapshot(108.0);
    let mut current = snapshot(107.0);

    current.bb_width_mean = Some(0.1);
    assert_close(model.bollinger_score(&current, &previous), 0.3, 1e-12);

    current.bb_width_mean = Some(0.2);
    assert_eq!(model.bollinger_score(&current, &previous), 0.0);

    current.bb_width_mean = None;
    assert_eq!(model.bollinger_score(&current, &previous), 0.0);
}

#[test]
fn test_bollinger_cross_and_mid_band_are_exclusive() {
    let model = ScoringModel::default();
    let mut previous = snapshot(89.0);
    previous.bb_lower = 90.0;
    // Close lands at position 0.5 and is rising, but the cross bonus wins alone.
    let current = snapshot(100.0);
    assert_close(model.bollinger_score(&current, &previous), 0.7, 1e-12);
}

#[test]
fn test_macd_score_rules() {
    let model = ScoringModel::default();

    let bullish = macd_eval(CrossoverType::Bullish, true, true, true);
    assert_close(model.macd_score(&bullish), 1.0, 1e-12);

    let above_growing = macd_eval(CrossoverType::None, true, true, false);
    assert_close(model.macd_score(&above_growing), 0.5, 1e-12);

    let above_growing_rising = macd_eval(CrossoverType::None, true, true, true);
    assert_close(model.macd_score(&above_growing_rising), 0.8, 1e-12);

    let above_shrinking = macd_eval(CrossoverType::None, true, false, true);
    assert_close(model.macd_score(&above_shrinking), 0.3, 1e-12);

    let below = macd_eval(CrossoverType::None, false, true, false);
    assert_eq!(model.macd_score(&below), 0.0);
}

#[test]
fn test_crossover_rule_variants() {
    let bearish = macd_eval(CrossoverType::Bearish, false, false, false);
    let bullish = macd_eval(CrossoverType::Bullish, true, true, false);

    let either = ScoringModel::default();
    assert_eq!(either.crossover_rule(), CrossoverRule::EitherDirection);
    assert_close(either.macd_score(&bearish), 0.7, 1e-12);
    assert_close(either.macd_score(&bullish), 0.7, 1e-12);

    let bullish_only = ScoringModel::default().with_crossover_rule(CrossoverRule::BullishOnly);
    assert_eq!(bullish_only.macd_score(&bearish), 0.0);
    assert_close(bullish_only.macd_score(&bullish), 0.7, 1e-12);

    let signed = ScoringModel::default().with_crossover_rule(CrossoverRule::Signed);
    assert_eq!(signed.macd_score(&bearish), 0.0);
    assert_close(signed.macd_score(&bullish), 0.7, 1e-12);
}

#[test]
fn test_composite_uses_profile_weights() {
    let factors = FactorScores::new(1.0, 0.0, 0.3);
    assert_close(ScoringModel::for_profile(RiskProfile::Moderate).composite(&factors), 0.49, 1e-12);
    assert_close(
        ScoringModel::for_profile(RiskProfile::Conservative).composite(&factors),
        0.56,
        1e-12,
    );
    assert_close(
        ScoringModel::for_profile(RiskProfile::Aggressive).composite(&factors),
        0.42,
        1e-12,
    );
}

#[test]
fn test_score_combines_factors() {
    let model = ScoringModel::default();
    let mut previous = snapshot(99.0);
    previous.macd_line = 0.1;
    previous.macd_signal = 0.2;
    previous.macd_histogram = -0.1;

    let mut current = snapshot(100.0);
    current.ma_trend_long = 90.0;
    current.macd_line = 0.4;
    current.macd_signal = 0.25;
    current.macd_histogram = 0.15;

    let breakdown = model.score(&current, &previous);
    assert_eq!(breakdown.macd.crossover_type, CrossoverType::Bullish);
    // Trend: only the MA alignment half fires (close == ma_long).
    assert_close(breakdown.factors.trend, 0.5, 1e-12);
    assert_close(breakdown.factors.bollinger, 0.5, 1e-12);
    assert_close(breakdown.factors.macd, 1.0, 1e-12);
    assert_close(breakdown.composite, 0.4 * 0.5 + 0.3 * 0.5 + 0.3 * 1.0, 1e-12);
    assert_close(breakdown.bb_position.unwrap(), 0.5, 1e-12);
}

proptest! {
    #[test]
    fn composite_stays_in_unit_interval(
        trend in 0.0f64..=1.0,
        bollinger in 0.0f64..=1.0,
        macd in 0.0f64..=1.0,
        wt in 0.0f64..=1.0,
        share in 0.0f64..=1.0,
    ) {
        let wb = (1.0 - wt) * share;
        let wm = 1.0 - wt - wb;
        prop_assume!(wm >= 0.0);
        let model = ScoringModel::new(FactorWeights::new(wt, wb, wm).unwrap());
        let composite = model.composite(&FactorScores::new(trend, bollinger, macd));
        prop_assert!((0.0..=1.0).contains(&composite));
    }
}
