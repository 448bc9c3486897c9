//! Integration tests for trading sessions: optional scan plus one or two cycles

use std::sync::Arc;

use chrono::{DateTime, TimeZone, Utc};
use equitrader::core::{CandidateMode, MarketPhase, TradingCycleOrchestrator};
use equitrader::metrics::Metrics;
use equitrader::services::PaperBroker;
use equitrader::signals::SignalEngine;
use equitrader::strategies::CrossoverStrategy;
use tokio_test::assert_ok;
use tokio_util::sync::CancellationToken;

use crate::test_utils::{
    dead_cross_bars, golden_cross_bars, orchestrator, settings, steady_bars, today,
};

fn utc(y: i32, m: u32, d: u32, h: u32, min: u32) -> DateTime<Utc> {
    Utc.with_ymd_and_hms(y, m, d, h, min, 0).single().unwrap()
}

fn crossover_session(broker: Arc<PaperBroker>, metrics: Arc<Metrics>) -> TradingCycleOrchestrator {
    let strategy = Arc::new(CrossoverStrategy::new(SignalEngine::default()));
    orchestrator(broker, &["MSFT", "AMD", "NVDA"], strategy, settings()).with_metrics(metrics)
}

fn market() -> Arc<PaperBroker> {
    Arc::new(
        PaperBroker::new(10_000.0)
            .with_today(today())
            .with_history("NVDA", golden_cross_bars())
            .with_history("AMD", dead_cross_bars())
            .with_history("MSFT", steady_bars()),
    )
}

#[tokio::test]
async fn scan_mode_trades_only_the_scan_entries() {
    let broker = market();
    let metrics = Arc::new(Metrics::new().unwrap());
    let mut session = crossover_session(broker.clone(), metrics.clone());

    // 11:00 EDT on a Friday.
    let now = utc(2024, 6, 28, 15, 0);
    let report = assert_ok!(
        session
            .run_session(CandidateMode::Scan, now, &CancellationToken::new())
            .await
    );

    assert_eq!(report.phase, MarketPhase::Regular);
    let scan = report.scan.as_ref().unwrap();
    assert_eq!(scan.entries, vec!["NVDA"]);
    assert_eq!(scan.exits, vec!["AMD"]);

    assert_eq!(report.cycles.len(), 1);
    let cycle = &report.cycles[0];
    assert_eq!(cycle.buy_orders.len(), 1);
    assert_eq!(cycle.buy_orders[0].intent.ticker, "NVDA");
    assert_eq!(cycle.buy_orders[0].intent.quantity, 38);
    // Only the scan's entry reached the strategy during the cycle.
    assert_eq!(metrics.candidates_scored_total.get(), 1);
}

#[tokio::test]
async fn universe_mode_scores_every_ticker() {
    let broker = market();
    let metrics = Arc::new(Metrics::new().unwrap());
    let mut session = crossover_session(broker, metrics.clone());

    let report = assert_ok!(
        session
            .run_session(CandidateMode::Universe, utc(2024, 6, 28, 15, 0), &CancellationToken::new())
            .await
    );

    assert!(report.scan.is_none());
    assert_eq!(report.cycles.len(), 1);
    assert_eq!(report.cycles[0].buy_orders[0].intent.ticker, "NVDA");
    assert_eq!(metrics.candidates_scored_total.get(), 3);
}

#[tokio::test]
async fn pre_market_runs_an_extra_cycle() {
    let broker = market();
    let metrics = Arc::new(Metrics::new().unwrap());
    let mut session = crossover_session(broker.clone(), metrics.clone());

    // 08:45 EDT.
    let now = utc(2024, 6, 28, 12, 45);
    let report = assert_ok!(
        session
            .run_session(CandidateMode::Scan, now, &CancellationToken::new())
            .await
    );

    assert_eq!(report.phase, MarketPhase::PreMarket);
    assert_eq!(report.cycles.len(), 2);
    assert_eq!(report.cycles[0].buy_orders.len(), 1);
    assert_eq!(report.cycles[0].buy_orders[0].intent.quantity, 38);
    // NVDA is held by the second cycle, so nothing is left to buy.
    assert!(report.cycles[1].buy_orders.is_empty());
    assert!(report.cycles[1].sell_orders.is_empty());
    assert_eq!(metrics.cycles_total.get(), 2);
    assert_eq!(broker.position("NVDA").await.unwrap().quantity, 38);
}

#[tokio::test]
async fn cancelled_pre_market_session_skips_the_second_cycle() {
    let broker = market();
    let metrics = Arc::new(Metrics::new().unwrap());
    let mut session = crossover_session(broker.clone(), metrics);

    let cancel = CancellationToken::new();
    cancel.cancel();
    let report = assert_ok!(
        session
            .run_session(CandidateMode::Universe, utc(2024, 6, 28, 12, 45), &cancel)
            .await
    );

    assert_eq!(report.cycles.len(), 1);
    assert!(report.cycles[0].cancelled);
    assert!(broker.filled_orders().await.is_empty());
}

#[tokio::test]
async fn weekend_session_runs_a_single_cycle() {
    let broker = market();
    let metrics = Arc::new(Metrics::new().unwrap());
    let mut session = crossover_session(broker, metrics);

    // 2024-06-29 is a Saturday.
    let report = assert_ok!(
        session
            .run_session(CandidateMode::Universe, utc(2024, 6, 29, 12, 45), &CancellationToken::new())
            .await
    );

    assert_eq!(report.phase, MarketPhase::Closed);
    assert_eq!(report.cycles.len(), 1);
}
