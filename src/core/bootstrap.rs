//! Wiring shared by the binaries: config in, collaborators out.

use std::sync::Arc;

use chrono::Utc;
use tracing::info;

use crate::config::Config;
use crate::error::EngineError;
use crate::services::market_data::{FallbackTickerSource, StaticTickerSource, TickerSource};
use crate::services::paper::PaperBroker;
use crate::services::remote::RemoteTickerSource;

/// Configured list first, then a remote list with the default as fallback, then the default.
pub fn ticker_source(config: &Config) -> Result<Arc<dyn TickerSource>, EngineError> {
    if let Some(tickers) = &config.tickers {
        info!(count = tickers.len(), "Using {} configured tickers", tickers.len());
        return Ok(Arc::new(StaticTickerSource::new(tickers)));
    }
    if let Some(url) = &config.ticker_source_url {
        info!(url = %url, "Fetching ticker universe from {}", url);
        let remote: Arc<dyn TickerSource> = Arc::new(RemoteTickerSource::new(url.clone())?);
        return Ok(Arc::new(FallbackTickerSource::with_default(remote)));
    }
    Ok(Arc::new(StaticTickerSource::default()))
}

/// Paper account seeded from `PAPER_STATE_PATH` when set, else `PAPER_CASH` and no holdings.
pub async fn paper_broker(config: &Config) -> Result<Arc<PaperBroker>, EngineError> {
    if !config.is_virtual_trading {
        return Err(EngineError::Configuration(
            "live trading requires a brokerage adapter; set IS_VIRTUAL_TRADING=true".to_string(),
        ));
    }

    let today = Utc::now().date_naive();
    let broker = match &config.paper_state_path {
        Some(path) => {
            let raw = tokio::fs::read_to_string(path).await.map_err(|e| {
                EngineError::Configuration(format!("cannot read {}: {}", path.display(), e))
            })?;
            let snapshot: serde_json::Value = serde_json::from_str(&raw).map_err(|e| {
                EngineError::Configuration(format!("invalid snapshot {}: {}", path.display(), e))
            })?;
            info!(path = %path.display(), "Loaded paper account from {}", path.display());
            PaperBroker::from_snapshot(&snapshot, today)?
        }
        None => PaperBroker::new(config.paper_cash).with_today(today),
    };

    Ok(Arc::new(broker))
}
