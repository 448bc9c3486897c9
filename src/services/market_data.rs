//! Ticker universe sources.

use std::sync::Arc;

use async_trait::async_trait;
use tracing::{info, warn};

use crate::error::EngineError;

/// Fallback universe: 30 large NASDAQ-100 constituents.
pub const DEFAULT_TICKERS: [&str; 30] = [
    "AAPL", "MSFT", "AMZN", "NVDA", "GOOGL", "META", "GOOG", "TSLA", "AVGO", "PEP", "COST", "CSCO",
    "TMUS", "ADBE", "NFLX", "CMCSA", "AMD", "TXN", "HON", "QCOM", "AMGN", "INTU", "AMAT", "ISRG",
    "ADP", "BKNG", "SBUX", "MDLZ", "ADI", "REGN",
];

pub fn default_tickers() -> Vec<String> {
    DEFAULT_TICKERS.iter().map(|t| t.to_string()).collect()
}

/// Trim, uppercase and de-duplicate tickers, keeping first-seen order.
pub fn normalize_tickers<I, S>(raw: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut out: Vec<String> = Vec::new();
    for ticker in raw {
        let ticker = ticker.as_ref().trim().to_ascii_uppercase();
        if ticker.is_empty() || ticker == "NAN" || out.contains(&ticker) {
            continue;
        }
        out.push(ticker);
    }
    out
}

#[async_trait]
pub trait TickerSource: Send + Sync {
    async fn get_universe(&self) -> Result<Vec<String>, EngineError>;
}

/// Fixed, configured list.
#[derive(Debug, Clone)]
pub struct StaticTickerSource {
    tickers: Vec<String>,
}

impl StaticTickerSource {
    pub fn new<I, S>(tickers: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        Self {
            tickers: normalize_tickers(tickers),
        }
    }
}

impl Default for StaticTickerSource {
    fn default() -> Self {
        Self::new(DEFAULT_TICKERS)
    }
}

#[async_trait]
impl TickerSource for StaticTickerSource {
    async fn get_universe(&self) -> Result<Vec<String>, EngineError> {
        Ok(self.tickers.clone())
    }
}

/// Uses `primary`, falling back to `fallback` when it fails or returns nothing.
pub struct FallbackTickerSource {
    primary: Arc<dyn TickerSource>,
    fallback: Arc<dyn TickerSource>,
}

impl FallbackTickerSource {
    pub fn new(primary: Arc<dyn TickerSource>, fallback: Arc<dyn TickerSource>) -> Self {
        Self { primary, fallback }
    }

    /// Falls back to [`DEFAULT_TICKERS`].
    pub fn with_default(primary: Arc<dyn TickerSource>) -> Self {
        Self::new(primary, Arc::new(StaticTickerSource::default()))
    }
}

#[async_trait]
impl TickerSource for FallbackTickerSource {
    async fn get_universe(&self) -> Result<Vec<String>, EngineError> {
        match self.primary.get_universe().await {
            Ok(tickers) if !tickers.is_empty() => {
                info!(count = tickers.len(), "TickerSource: loaded {} tickers", tickers.len());
                Ok(tickers)
            }
            Ok(_) => {
                warn!("TickerSource: primary source returned no tickers, using fallback list");
                self.fallback.get_universe().await
            }
            Err(e) => {
                warn!(error = %e, "TickerSource: primary source failed, using fallback list");
                self.fallback.get_universe().await
            }
        }
    }
}
