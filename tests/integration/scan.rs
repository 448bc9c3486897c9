//! Integration tests for universe scans

use equitrader::error::EngineError;
use equitrader::models::market::HistoryInterval;
use equitrader::models::signal::{CrossSignal, TradeSignal};
use equitrader::services::{PaperBroker, RetryPolicy};
use equitrader::signals::SignalEngine;
use equitrader::strategies::{analyze_universe, build_strategy, StrategyKind};

use crate::test_utils::{dead_cross_bars, golden_cross_bars, steady_bars};

fn tickers(list: &[&str]) -> Vec<String> {
    list.iter().map(|t| t.to_string()).collect()
}

#[tokio::test]
async fn crossover_scan_splits_entries_and_exits() {
    let broker = PaperBroker::new(0.0)
        .with_history("NVDA", golden_cross_bars())
        .with_history("AMD", dead_cross_bars())
        .with_history("MSFT", steady_bars());
    let strategy = build_strategy(StrategyKind::Crossover, SignalEngine::default());

    let summary = analyze_universe(
        strategy.as_ref(),
        &broker,
        &tickers(&["NVDA", "AMD", "MSFT", "QQQ"]),
        365,
        HistoryInterval::Daily,
        &RetryPolicy::none(),
    )
    .await;

    assert_eq!(summary.analyzed, 4);
    assert_eq!(summary.entries, vec!["NVDA"]);
    assert_eq!(summary.exits, vec!["AMD"]);
    assert_eq!(summary.neutral, 1);
    assert_eq!(summary.error_count(), 1);
    assert_eq!(summary.errors[0].ticker, "QQQ");
    assert_eq!(summary.outputs.len(), 3);
    assert_eq!(
        summary.outputs[0].signal,
        TradeSignal::Crossover(CrossSignal::GoldenCross)
    );
}

#[tokio::test]
async fn composite_scan_reports_insufficient_history() {
    let broker = PaperBroker::new(0.0).with_history("NVDA", golden_cross_bars());
    let strategy = build_strategy(StrategyKind::Composite, SignalEngine::default());

    let summary = analyze_universe(
        strategy.as_ref(),
        &broker,
        &tickers(&["NVDA"]),
        365,
        HistoryInterval::Daily,
        &RetryPolicy::none(),
    )
    .await;

    assert_eq!(summary.error_count(), 1);
    let expected = EngineError::InsufficientData {
        required: 201,
        actual: 61,
    };
    assert_eq!(summary.errors[0].message, expected.to_string());
}

#[tokio::test]
async fn empty_universe_is_a_no_op() {
    let broker = PaperBroker::new(0.0);
    let strategy = build_strategy(StrategyKind::Crossover, SignalEngine::default());
    let summary = analyze_universe(
        strategy.as_ref(),
        &broker,
        &[],
        365,
        HistoryInterval::Daily,
        &RetryPolicy::none(),
    )
    .await;
    assert_eq!(summary.analyzed, 0);
    assert!(summary.outputs.is_empty());
}
