use equitrader::indicators::macd::*;
use equitrader::models::indicators::MacdIndicator;

#[test]
fn test_bullish_crossover() {
    let previous = MacdIndicator::new(0.2, 0.3);
    let current = MacdIndicator::new(0.5, 0.3);
    let evaluation = evaluate_macd(&previous, &current);

    assert_eq!(evaluation.crossover_type, CrossoverType::Bullish);
    assert!(evaluation.crossover_type.is_crossover());
    assert!(evaluation.above_signal);
    assert!(evaluation.histogram_growing);
    assert!(evaluation.positive_and_rising);
    assert_eq!(evaluation.macd_value, 0.5);
    assert_eq!(evaluation.signal_value, 0.3);
    assert!((evaluation.histogram_value - 0.2).abs() < 1e-12);
}

#[test]
fn test_bearish_crossover() {
    let previous = MacdIndicator::new(0.6, 0.5);
    let current = MacdIndicator::new(0.3, 0.5);
    let evaluation = evaluate_macd(&previous, &current);

    assert_eq!(evaluation.crossover_type, CrossoverType::Bearish);
    assert!(!evaluation.above_signal);
    assert!(!evaluation.histogram_growing);
    assert!(!evaluation.positive_and_rising);
}

#[test]
fn test_touching_signal_line_is_not_a_cross() {
    let previous = MacdIndicator::new(0.5, 0.5);
    let current = MacdIndicator::new(0.7, 0.5);
    assert_eq!(detect_crossover(&previous, &current), CrossoverType::None);

    let previous = MacdIndicator::new(0.4, 0.5);
    let current = MacdIndicator::new(0.5, 0.5);
    assert_eq!(detect_crossover(&previous, &current), CrossoverType::None);
}

#[test]
fn test_no_crossover_staying_above() {
    let previous = MacdIndicator::new(1.0, 0.5);
    let current = MacdIndicator::new(1.2, 0.6);
    let evaluation = evaluate_macd(&previous, &current);

    assert_eq!(evaluation.crossover_type, CrossoverType::None);
    assert!(!evaluation.crossover_type.is_crossover());
    assert!(evaluation.above_signal);
    assert!(evaluation.histogram_growing);
}

#[test]
fn test_negative_rising_macd_is_not_positive_and_rising() {
    let previous = MacdIndicator::new(-0.5, -0.2);
    let current = MacdIndicator::new(-0.3, -0.2);
    let evaluation = evaluate_macd(&previous, &current);

    assert!(!evaluation.positive_and_rising);
    assert!(evaluation.histogram_growing);
}
