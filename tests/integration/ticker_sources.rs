//! Integration tests for remote ticker universes

use std::sync::Arc;

use equitrader::error::EngineError;
use equitrader::services::{FallbackTickerSource, RemoteTickerSource, TickerSource};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

#[tokio::test]
async fn remote_source_reads_json_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/tickers"))
        .respond_with(ResponseTemplate::new(200).set_body_json(vec!["aapl", "MSFT", "aapl"]))
        .expect(1)
        .mount(&server)
        .await;

    let source = RemoteTickerSource::new(format!("{}/tickers", server.uri())).unwrap();
    assert_eq!(source.get_universe().await.unwrap(), vec!["AAPL", "MSFT"]);
}

#[tokio::test]
async fn remote_source_reads_plain_lines() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/nasdaq100.txt"))
        .respond_with(ResponseTemplate::new(200).set_body_string("NVDA\nAMD\n\nINTC\n"))
        .mount(&server)
        .await;

    let source = RemoteTickerSource::new(format!("{}/nasdaq100.txt", server.uri())).unwrap();
    assert_eq!(source.get_universe().await.unwrap(), vec!["NVDA", "AMD", "INTC"]);
}

#[tokio::test]
async fn remote_source_maps_http_errors() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(503))
        .mount(&server)
        .await;

    let source = RemoteTickerSource::new(format!("{}/tickers", server.uri())).unwrap();
    let err = source.get_universe().await.unwrap_err();
    assert!(matches!(err, EngineError::Connectivity(_)));
    assert!(err.is_transient());
}

#[tokio::test]
async fn fallback_covers_remote_outage() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(500))
        .mount(&server)
        .await;

    let remote: Arc<dyn TickerSource> =
        Arc::new(RemoteTickerSource::new(format!("{}/tickers", server.uri())).unwrap());
    let source = FallbackTickerSource::with_default(remote);
    let tickers = source.get_universe().await.unwrap();
    assert_eq!(tickers.len(), 30);
    assert_eq!(tickers[0], "AAPL");
}

#[tokio::test]
async fn fallback_covers_empty_remote_list() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .respond_with(ResponseTemplate::new(200).set_body_string(""))
        .mount(&server)
        .await;

    let remote: Arc<dyn TickerSource> =
        Arc::new(RemoteTickerSource::new(format!("{}/tickers", server.uri())).unwrap());
    let tickers = FallbackTickerSource::with_default(remote).get_universe().await.unwrap();
    assert_eq!(tickers.len(), 30);
}
