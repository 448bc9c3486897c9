//! Unit tests for ticker universe sources

use std::sync::Arc;

use async_trait::async_trait;
use equitrader::error::EngineError;
use equitrader::services::market_data::{default_tickers, normalize_tickers};
use equitrader::services::remote::parse_ticker_body;
use equitrader::services::{FallbackTickerSource, StaticTickerSource, TickerSource, DEFAULT_TICKERS};

struct FailingSource;

#[async_trait]
impl TickerSource for FailingSource {
    async fn get_universe(&self) -> Result<Vec<String>, EngineError> {
        Err(EngineError::Connectivity("down".to_string()))
    }
}

#[test]
fn test_default_universe() {
    let tickers = default_tickers();
    assert_eq!(tickers.len(), 30);
    assert_eq!(tickers[0], "AAPL");
    assert_eq!(tickers.len(), normalize_tickers(DEFAULT_TICKERS).len());
}

#[test]
fn test_normalize_tickers() {
    let tickers = normalize_tickers([" aapl", "MSFT", "", "nan", "AAPL", "msft "]);
    assert_eq!(tickers, vec!["AAPL", "MSFT"]);
}

#[test]
fn test_parse_ticker_body() {
    assert_eq!(parse_ticker_body(r#"["aapl", "nvda"]"#), vec!["AAPL", "NVDA"]);
    assert_eq!(parse_ticker_body("AAPL\nmsft\n\nAAPL\n"), vec!["AAPL", "MSFT"]);
}

#[tokio::test]
async fn test_static_source() {
    let source = StaticTickerSource::new(["amd", "AMD", "intc"]);
    assert_eq!(source.get_universe().await.unwrap(), vec!["AMD", "INTC"]);
}

#[tokio::test]
async fn test_fallback_on_error_and_empty() {
    let source = FallbackTickerSource::with_default(Arc::new(FailingSource));
    assert_eq!(source.get_universe().await.unwrap().len(), 30);

    let empty: Arc<dyn TickerSource> = Arc::new(StaticTickerSource::new(Vec::<String>::new()));
    let source = FallbackTickerSource::new(empty, Arc::new(StaticTickerSource::new(["QQQ"])));
    assert_eq!(source.get_universe().await.unwrap(), vec!["QQQ"]);
}
