//! Brokerage interface the engine consumes.

use async_trait::async_trait;

use crate::error::EngineError;
use crate::models::market::{HistoryInterval, PriceBar, Quote};
use crate::models::portfolio::{OrderAck, OrderIntent, Position};

#[async_trait]
pub trait BrokerPort: Send + Sync {
    /// Authoritative holdings. Only positions with a non-zero quantity are returned.
    async fn get_holdings(&self) -> Result<Vec<Position>, EngineError>;

    async fn get_quote(&self, ticker: &str) -> Result<Quote, EngineError>;

    /// Bars in ascending time order covering roughly `lookback_days`.
    async fn get_price_history(
        &self,
        ticker: &str,
        lookback_days: u32,
        interval: HistoryInterval,
    ) -> Result<Vec<PriceBar>, EngineError>;

    /// A rejected order is `Ok` with `success == false`; `Err` means the call itself failed.
    async fn submit_order(&self, order: &OrderIntent) -> Result<OrderAck, EngineError>;

    async fn get_available_cash(&self) -> Result<f64, EngineError>;
}
