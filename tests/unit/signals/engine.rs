//! Unit tests for the signal engine

use equitrader::error::EngineError;
use equitrader::indicators::{IndicatorConfig, IndicatorEngine};
use equitrader::models::signal::{CrossSignal, TradeSignal};
use equitrader::signals::{SignalClassifier, ScoringModel, SignalEngine};

use crate::test_utils::{bars_from_closes, linspace};

fn compact_engine() -> SignalEngine {
    let config = IndicatorConfig::default()
        .with_ma_windows(5, 10, 30)
        .with_bollinger(10, 2.0, 5);
    SignalEngine::new(
        IndicatorEngine::new(config),
        ScoringModel::default(),
        SignalClassifier::default(),
    )
}

/// Steady decline from 150 followed by a sharp rebound on the last bar.
fn rebound_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..60).map(|i| 150.0 - i as f64).collect();
    closes.push(129.0);
    closes
}

/// Steady rise from 100 followed by a sharp drop on the last bar.
fn selloff_closes() -> Vec<f64> {
    let mut closes: Vec<f64> = (0..60).map(|i| 100.0 + i as f64).collect();
    closes.push(139.0);
    closes
}

#[test]
fn test_evaluate_uptrend() {
    let engine = compact_engine();
    let bars = bars_from_closes(&linspace(100.0, 130.0, 60));
    let output = engine.evaluate("AAPL", &bars).unwrap();

    assert_eq!(output.ticker, "AAPL");
    assert!(matches!(output.signal, TradeSignal::Composite(_)));
    assert_eq!(output.price, bars[59].close);

    let score = output.score.unwrap();
    assert!((0.0..=1.0).contains(&score));
    let factors = output.factors.unwrap();
    assert_eq!(factors.trend, 1.0);

    // Three factor reasons, then price, Bollinger and MACD details.
    assert_eq!(output.reasons.len(), 6);
    assert!(output.reasons[0].weight >= output.reasons[1].weight);
    assert!(output.reasons.iter().any(|r| r.description.starts_with("MACD=")));
}

#[test]
fn test_evaluate_insufficient_history() {
    let engine = SignalEngine::default();
    let bars = bars_from_closes(&linspace(100.0, 130.0, 60));
    let err = engine.evaluate("AAPL", &bars).unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientData {
            required: 201,
            actual: 60
        }
    );
}

#[test]
fn test_evaluate_is_repeatable() {
    let engine = compact_engine();
    let bars = bars_from_closes(&rebound_closes());
    let first = engine.evaluate("MSFT", &bars).unwrap();
    let second = engine.evaluate("MSFT", &bars).unwrap();
    assert_eq!(first.score, second.score);
    assert_eq!(first.signal, second.signal);
}

#[test]
fn test_golden_cross() {
    let engine = SignalEngine::default();
    let bars = bars_from_closes(&rebound_closes());
    let output = engine.evaluate_crossover("NVDA", &bars).unwrap();

    assert_eq!(output.signal, TradeSignal::Crossover(CrossSignal::GoldenCross));
    assert!(output.signal.is_entry());
    assert!(output.score.is_none());
    assert!(output.factors.is_none());
    assert_eq!(output.price, 129.0);
}

#[test]
fn test_dead_cross() {
    let engine = SignalEngine::default();
    let bars = bars_from_closes(&selloff_closes());
    let output = engine.evaluate_crossover("NVDA", &bars).unwrap();

    assert_eq!(output.signal, TradeSignal::Crossover(CrossSignal::DeadCross));
    assert!(output.signal.is_exit());
}

#[test]
fn test_no_cross_in_steady_trend() {
    let engine = SignalEngine::default();
    let closes: Vec<f64> = (0..61).map(|i| 100.0 + i as f64).collect();
    let output = engine.evaluate_crossover("NVDA", &bars_from_closes(&closes)).unwrap();
    assert_eq!(output.signal, TradeSignal::Crossover(CrossSignal::NoSignal));
}

#[test]
fn test_crossover_needs_slow_span_plus_one() {
    let engine = SignalEngine::default();
    let closes = linspace(100.0, 110.0, 26);
    let err = engine.evaluate_crossover("AMD", &bars_from_closes(&closes)).unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientData {
            required: 27,
            actual: 26
        }
    );

    let closes = linspace(100.0, 110.0, 27);
    assert!(engine.evaluate_crossover("AMD", &bars_from_closes(&closes)).is_ok());
}

#[test]
fn test_crossover_with_zero_slow_span_needs_two_bars() {
    let config = IndicatorConfig::default().with_ema_spans(0, 0, 0);
    let engine = SignalEngine::new(
        IndicatorEngine::new(config),
        ScoringModel::default(),
        SignalClassifier::default(),
    );

    let err = engine.evaluate_crossover("AMD", &bars_from_closes(&[100.0])).unwrap_err();
    assert_eq!(
        err,
        EngineError::InsufficientData {
            required: 2,
            actual: 1
        }
    );
}
