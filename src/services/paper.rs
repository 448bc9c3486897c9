//! In-memory broker for virtual trading and tests.

use std::collections::{HashMap, HashSet};
use std::sync::atomic::{AtomicU64, Ordering};

use async_trait::async_trait;
use chrono::{Duration, NaiveDate, Utc};
use serde_json::Value;
use tokio::sync::RwLock;
use tracing::{debug, info};

use crate::error::EngineError;
use crate::models::market::{HistoryInterval, PriceBar, Quote};
use crate::models::portfolio::{OrderAck, OrderIntent, OrderSide, Position};
use crate::services::adapter;
use crate::services::broker::BrokerPort;

#[derive(Debug, Default)]
struct PaperState {
    cash: f64,
    holdings: HashMap<String, Position>,
    quotes: HashMap<String, f64>,
    histories: HashMap<String, Vec<PriceBar>>,
    rejected: HashSet<String>,
    failing_quotes: HashSet<String>,
    offline: bool,
    orders: Vec<OrderIntent>,
}

/// Simulated account: cash ledger, VWAP holdings, scripted market data.
///
/// Fills are immediate and complete at the order price.
#[derive(Debug)]
pub struct PaperBroker {
    state: RwLock<PaperState>,
    today: NaiveDate,
    order_seq: AtomicU64,
}

impl Default for PaperBroker {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl PaperBroker {
    pub fn new(cash: f64) -> Self {
        Self {
            state: RwLock::new(PaperState {
                cash,
                ..PaperState::default()
            }),
            today: Utc::now().date_naive(),
            order_seq: AtomicU64::new(1),
        }
    }

    /// Date stamped on new positions.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    pub fn with_holding(mut self, position: Position) -> Self {
        if position.quantity > 0 {
            self.state
                .get_mut()
                .holdings
                .insert(position.ticker.clone(), position);
        }
        self
    }

    pub fn with_quote(mut self, ticker: impl Into<String>, price: f64) -> Self {
        self.state.get_mut().quotes.insert(ticker.into(), price);
        self
    }

    pub fn with_history(mut self, ticker: impl Into<String>, bars: Vec<PriceBar>) -> Self {
        self.state.get_mut().histories.insert(ticker.into(), bars);
        self
    }

    /// Every order for `ticker` comes back with `success == false`.
    pub fn with_rejection(mut self, ticker: impl Into<String>) -> Self {
        self.state.get_mut().rejected.insert(ticker.into());
        self
    }

    /// Quotes for `ticker` fail with a transient error.
    pub fn with_failing_quote(mut self, ticker: impl Into<String>) -> Self {
        self.state.get_mut().failing_quotes.insert(ticker.into());
        self
    }

    /// Build from a JSON snapshot:
    /// `{"cash": .., "holdings": [..] | {..}, "quotes": {"T": p}, "histories": {"T": [..]}}`.
    pub fn from_snapshot(snapshot: &Value, today: NaiveDate) -> Result<Self, EngineError> {
        let cash = snapshot.get("cash").and_then(Value::as_f64).unwrap_or(0.0);
        let mut broker = Self::new(cash).with_today(today);

        if let Some(holdings) = snapshot.get("holdings") {
            for position in adapter::normalize_holdings(holdings, today)? {
                broker = broker.with_holding(position);
            }
        }
        if let Some(Value::Object(quotes)) = snapshot.get("quotes") {
            for (ticker, price) in quotes {
                if let Some(price) = price.as_f64() {
                    broker = broker.with_quote(ticker.to_ascii_uppercase(), price);
                }
            }
        }
        if let Some(Value::Object(histories)) = snapshot.get("histories") {
            for (ticker, bars) in histories {
                let bars = adapter::normalize_price_bars(bars)?;
                broker = broker.with_history(ticker.to_ascii_uppercase(), bars);
            }
        }

        Ok(broker)
    }

    pub async fn set_offline(&self, offline: bool) {
        self.state.write().await.offline = offline;
    }

    pub async fn set_quote(&self, ticker: &str, price: f64) {
        self.state.write().await.quotes.insert(ticker.to_string(), price);
    }

    pub async fn cash(&self) -> f64 {
        self.state.read().await.cash
    }

    pub async fn position(&self, ticker: &str) -> Option<Position> {
        self.state.read().await.holdings.get(ticker).cloned()
    }

    /// Every order that was accepted, in submission order.
    pub async fn filled_orders(&self) -> Vec<OrderIntent> {
        self.state.read().await.orders.clone()
    }

    fn next_order_id(&self) -> String {
        format!("PAPER-{:06}", self.order_seq.fetch_add(1, Ordering::SeqCst))
    }
}

fn ensure_online(state: &PaperState) -> Result<(), EngineError> {
    if state.offline {
        return Err(EngineError::Connectivity("paper broker is offline".to_string()));
    }
    Ok(())
}

#[async_trait]
impl BrokerPort for PaperBroker {
    async fn get_holdings(&self) -> Result<Vec<Position>, EngineError> {
        let state = self.state.read().await;
        ensure_online(&state)?;
        let mut holdings: Vec<Position> = state
            .holdings
            .values()
            .filter(|p| p.quantity > 0)
            .cloned()
            .collect();
        holdings.sort_by(|a, b| a.ticker.cmp(&b.ticker));
        Ok(holdings)
    }

    async fn get_quote(&self, ticker: &str) -> Result<Quote, EngineError> {
        let state = self.state.read().await;
        ensure_online(&state)?;
        if state.failing_quotes.contains(ticker) {
            return Err(EngineError::quote_unavailable(ticker, "quote feed error"));
        }

        let price = state
            .quotes
            .get(ticker)
            .copied()
            .or_else(|| state.histories.get(ticker).and_then(|bars| bars.last()).map(|b| b.close))
            .ok_or_else(|| EngineError::quote_unavailable(ticker, "no price available"))?;

        Ok(Quote {
            ticker: ticker.to_string(),
            price,
            timestamp: Utc::now(),
        })
    }

    async fn get_price_history(
        &self,
        ticker: &str,
        lookback_days: u32,
        interval: HistoryInterval,
    ) -> Result<Vec<PriceBar>, EngineError> {
        let state = self.state.read().await;
        ensure_online(&state)?;
        let bars = state.histories.get(ticker).cloned().unwrap_or_default();

        let Some(last) = bars.last().map(|b| b.timestamp) else {
            return Ok(bars);
        };
        let cutoff = last - Duration::days(i64::from(lookback_days));
        let bars: Vec<PriceBar> = bars.into_iter().filter(|b| b.timestamp > cutoff).collect();
        debug!(
            ticker = %ticker,
            interval = %interval,
            bars = bars.len(),
            "PaperBroker: served {} bars for {}",
            bars.len(),
            ticker
        );
        Ok(bars)
    }

    async fn submit_order(&self, order: &OrderIntent) -> Result<OrderAck, EngineError> {
        let mut state = self.state.write().await;
        ensure_online(&state)?;

        if state.rejected.contains(&order.ticker) {
            return Ok(OrderAck::rejected(format!("order for {} rejected", order.ticker)));
        }
        if order.quantity == 0 || !(order.price > 0.0) {
            return Ok(OrderAck::rejected("quantity and price must be positive"));
        }

        let notional = order.notional();
        match order.side {
            OrderSide::Buy => {
                if notional > state.cash {
                    return Ok(OrderAck::rejected(format!(
                        "insufficient cash: need {:.2}, have {:.2}",
                        notional, state.cash
                    )));
                }
                state.cash -= notional;
                let today = self.today;
                state
                    .holdings
                    .entry(order.ticker.clone())
                    .or_insert_with(|| Position::flat(order.ticker.clone(), today))
                    .apply_fill(OrderSide::Buy, order.quantity, order.price, today);
            }
            OrderSide::Sell => {
                let held = state.holdings.get(&order.ticker).map(|p| p.quantity).unwrap_or(0);
                if held < order.quantity {
                    return Ok(OrderAck::rejected(format!(
                        "insufficient shares: hold {}, selling {}",
                        held, order.quantity
                    )));
                }
                state.cash += notional;
                let remaining = state
                    .holdings
                    .get_mut(&order.ticker)
                    .map(|p| p.apply_fill(OrderSide::Sell, order.quantity, order.price, self.today))
                    .unwrap_or(0);
                if remaining == 0 {
                    state.holdings.remove(&order.ticker);
                }
            }
        }

        state.orders.push(order.clone());
        let order_id = self.next_order_id();
        info!(
            ticker = %order.ticker,
            side = %order.side,
            quantity = order.quantity,
            price = order.price,
            order_id = %order_id,
            "PaperBroker: filled {} {} x{} @ {:.2}",
            order.side,
            order.ticker,
            order.quantity,
            order.price
        );
        Ok(OrderAck::accepted(order_id))
    }

    async fn get_available_cash(&self) -> Result<f64, EngineError> {
        let state = self.state.read().await;
        ensure_online(&state)?;
        Ok(state.cash)
    }
}
