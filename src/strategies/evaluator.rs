//! Universe scan: run a strategy over many tickers and summarise the signals.

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::models::market::HistoryInterval;
use crate::models::portfolio::TickerError;
use crate::models::signal::SignalOutput;
use crate::services::broker::BrokerPort;
use crate::services::retry::{with_backoff, RetryPolicy};
use crate::strategies::Strategy;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScanSummary {
    pub analyzed: usize,
    /// BUY or GOLDEN_CROSS, in scan order.
    pub entries: Vec<String>,
    /// SELL or DEAD_CROSS, in scan order.
    pub exits: Vec<String>,
    /// HOLD or NO_SIGNAL.
    pub neutral: usize,
    pub errors: Vec<TickerError>,
    pub outputs: Vec<SignalOutput>,
}

impl ScanSummary {
    pub fn entry_count(&self) -> usize {
        self.entries.len()
    }

    pub fn exit_count(&self) -> usize {
        self.exits.len()
    }

    pub fn error_count(&self) -> usize {
        self.errors.len()
    }

    fn record(&mut self, output: SignalOutput) {
        if output.signal.is_entry() {
            self.entries.push(output.ticker.clone());
        } else if output.signal.is_exit() {
            self.exits.push(output.ticker.clone());
        } else {
            self.neutral += 1;
        }
        self.outputs.push(output);
    }
}

/// Evaluate `strategy` for every ticker. Per-ticker failures are collected, never fatal.
pub async fn analyze_universe(
    strategy: &dyn Strategy,
    broker: &dyn BrokerPort,
    tickers: &[String],
    lookback_days: u32,
    interval: HistoryInterval,
    retry: &RetryPolicy,
) -> ScanSummary {
    let mut summary = ScanSummary::default();

    if tickers.is_empty() {
        warn!("Scan: no tickers to analyze");
        return summary;
    }

    for ticker in tickers {
        summary.analyzed += 1;
        let history = with_backoff(retry, "get_price_history", || {
            broker.get_price_history(ticker, lookback_days, interval)
        })
        .await;

        let outcome = history.and_then(|bars| strategy.compute_signal(ticker, &bars));
        match outcome {
            Ok(output) => {
                if output.signal.is_entry() || output.signal.is_exit() {
                    info!(
                        ticker = %ticker,
                        signal = %output.signal,
                        "Scan: {} {}",
                        ticker,
                        output.signal
                    );
                }
                summary.record(output);
            }
            Err(e) => {
                warn!(ticker = %ticker, error = %e, "Scan: {} failed", ticker);
                summary.errors.push(TickerError::new(ticker, &e));
            }
        }
    }

    info!(
        analyzed = summary.analyzed,
        entries = summary.entry_count(),
        exits = summary.exit_count(),
        neutral = summary.neutral,
        errors = summary.error_count(),
        strategy = strategy.name(),
        "Scan: {} tickers, {} entry, {} exit, {} neutral, {} errors",
        summary.analyzed,
        summary.entry_count(),
        summary.exit_count(),
        summary.neutral,
        summary.error_count()
    );
    if !summary.entries.is_empty() {
        info!("Scan: entry signals {:?}", summary.entries);
    }
    if !summary.exits.is_empty() {
        info!("Scan: exit signals {:?}", summary.exits);
    }

    summary
}
