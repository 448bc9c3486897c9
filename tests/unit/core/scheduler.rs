//! Unit tests for the cycle scheduler

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use equitrader::core::{CandidateMode, CycleScheduler, CycleSettings, TradingCycleOrchestrator};
use equitrader::error::EngineError;
use equitrader::portfolio::PortfolioReconciler;
use equitrader::risk::PositionSizer;
use equitrader::services::{PaperBroker, StaticTickerSource};
use equitrader::strategies::CompositeStrategy;
use tokio_util::sync::CancellationToken;

#[test]
fn test_invalid_expression() {
    assert!(matches!(
        CycleScheduler::new("not a cron"),
        Err(EngineError::Configuration(_))
    ));
}

#[test]
fn test_next_after() {
    let scheduler = CycleScheduler::new("0 30 9 * * *").unwrap();
    assert_eq!(scheduler.expression(), "0 30 9 * * *");

    let now = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).single().unwrap();
    let next = scheduler.next_after(now).unwrap();
    assert_eq!(next, Utc.with_ymd_and_hms(2024, 1, 1, 9, 30, 0).single().unwrap());

    let later = scheduler.next_after(next).unwrap();
    assert_eq!(later, Utc.with_ymd_and_hms(2024, 1, 2, 9, 30, 0).single().unwrap());
}

#[tokio::test]
async fn test_run_stops_when_cancelled() {
    let scheduler = CycleScheduler::new("0 0 0 1 1 *").unwrap();
    let mut orchestrator = TradingCycleOrchestrator::new(
        Arc::new(PaperBroker::new(1_000.0)),
        Arc::new(StaticTickerSource::default()),
        Arc::new(CompositeStrategy::default()),
        PortfolioReconciler::default(),
        PositionSizer::default(),
        CycleSettings::default(),
    );

    let cancel = CancellationToken::new();
    cancel.cancel();
    assert_eq!(scheduler.run(&mut orchestrator, CandidateMode::Universe, cancel).await, 0);
}
