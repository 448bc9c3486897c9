//! Ticker universe fetched over HTTP.

use std::time::Duration;

use async_trait::async_trait;
use tracing::debug;

use crate::error::EngineError;
use crate::services::market_data::{normalize_tickers, TickerSource};

/// GETs a list of tickers: either a JSON array of strings or one ticker per line.
#[derive(Debug, Clone)]
pub struct RemoteTickerSource {
    client: reqwest::Client,
    url: String,
}

impl RemoteTickerSource {
    pub fn new(url: impl Into<String>) -> Result<Self, EngineError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self {
            client,
            url: url.into(),
        })
    }

    pub fn url(&self) -> &str {
        &self.url
    }
}

pub fn parse_ticker_body(body: &str) -> Vec<String> {
    match serde_json::from_str::<Vec<String>>(body) {
        Ok(list) => normalize_tickers(list),
        Err(_) => normalize_tickers(body.lines()),
    }
}

#[async_trait]
impl TickerSource for RemoteTickerSource {
    async fn get_universe(&self) -> Result<Vec<String>, EngineError> {
        let response = self.client.get(&self.url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(EngineError::Connectivity(format!(
                "ticker source {} returned {}",
                self.url, status
            )));
        }
        let body = response.text().await?;
        let tickers = parse_ticker_body(&body);
        debug!(url = %self.url, count = tickers.len(), "RemoteTickerSource: fetched {} tickers", tickers.len());
        Ok(tickers)
    }
}
