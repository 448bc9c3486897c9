//! Equitrader
//!
//! Runs one trading session against the paper account, or a session on every tick of
//! `CYCLE_CRON` until Ctrl-C. A session optionally scans the universe first and adds a
//! cycle during the pre-market hour.

use std::sync::Arc;

use chrono::Utc;
use dotenvy::dotenv;
use equitrader::config::{get_environment, Config};
use equitrader::core::bootstrap;
use equitrader::core::{us_eastern_now, CycleScheduler, CycleSettings, TradingCycleOrchestrator};
use equitrader::logging;
use equitrader::metrics::Metrics;
use equitrader::portfolio::PortfolioReconciler;
use equitrader::strategies::build_strategy;
use tokio::signal;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging()?;

    let config = Config::from_env()?;
    info!(environment = %get_environment(), "Starting Equitrader");
    info!(
        risk_profile = %config.risk_profile,
        strategy = ?config.strategy,
        candidates = ?config.candidate_mode,
        virtual_trading = config.is_virtual_trading,
        "Risk profile {}, max {} positions, {}% budget",
        config.risk_profile,
        config.max_concurrent_positions,
        config.budget_percentage
    );
    if let Some(account) = &config.account_number {
        info!(account = %account, "Account {}", account);
    }
    info!("US/Eastern time {}", us_eastern_now().format("%Y-%m-%d %H:%M %Z"));

    let metrics = Arc::new(Metrics::new()?);
    let broker = bootstrap::paper_broker(&config).await?;
    let tickers = bootstrap::ticker_source(&config)?;
    let strategy = build_strategy(config.strategy, config.signal_engine()?);

    let mut orchestrator = TradingCycleOrchestrator::new(
        broker,
        tickers,
        strategy,
        PortfolioReconciler::new(config.exit_thresholds()),
        config.position_sizer(),
        CycleSettings::from_config(&config),
    )
    .with_metrics(metrics.clone());

    let cancel = CancellationToken::new();
    let on_signal = cancel.clone();
    tokio::spawn(async move {
        if signal::ctrl_c().await.is_ok() {
            warn!("Shutdown requested, cancelling after the current step");
            on_signal.cancel();
        }
    });

    match &config.cycle_cron {
        Some(expr) => {
            let scheduler = CycleScheduler::new(expr)?;
            scheduler.run(&mut orchestrator, config.candidate_mode, cancel).await;
        }
        None => {
            let report = orchestrator
                .run_session(config.candidate_mode, Utc::now(), &cancel)
                .await?;
            println!("{}", serde_json::to_string_pretty(&report)?);
        }
    }

    info!("Metrics:\n{}", metrics.export()?);
    Ok(())
}
