//! Equitrader Scan
//!
//! Analysis only: runs the configured strategy over the ticker universe and prints
//! the entry/exit lists without placing orders.

use dotenvy::dotenv;
use equitrader::config::Config;
use equitrader::core::bootstrap;
use equitrader::logging;
use equitrader::services::{RetryPolicy, TickerSource};
use equitrader::strategies::{analyze_universe, build_strategy};
use tracing::info;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv().ok();
    logging::init_logging()?;

    let config = Config::from_env()?;
    let broker = bootstrap::paper_broker(&config).await?;
    let tickers = bootstrap::ticker_source(&config)?.get_universe().await?;
    let strategy = build_strategy(config.strategy, config.signal_engine()?);

    info!(count = tickers.len(), strategy = strategy.name(), "Scanning {} tickers", tickers.len());

    let summary = analyze_universe(
        strategy.as_ref(),
        broker.as_ref(),
        &tickers,
        config.history_lookback_days,
        config.history_interval,
        &RetryPolicy::default(),
    )
    .await;

    println!("analyzed: {}", summary.analyzed);
    println!("entry ({}): {}", summary.entry_count(), summary.entries.join(", "));
    println!("exit ({}): {}", summary.exit_count(), summary.exits.join(", "));
    println!("neutral: {}", summary.neutral);
    for err in &summary.errors {
        println!("error {}: {}", err.ticker, err.message);
    }

    Ok(())
}
