use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OrderSide {
    Buy,
    Sell,
}

impl fmt::Display for OrderSide {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            OrderSide::Buy => f.write_str("BUY"),
            OrderSide::Sell => f.write_str("SELL"),
        }
    }
}

/// An open long holding as reported by the broker.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Position {
    pub ticker: String,
    pub quantity: u64,
    /// Volume-weighted average entry price.
    pub average_price: f64,
    pub entry_date: NaiveDate,
}

impl Position {
    pub fn new(
        ticker: impl Into<String>,
        quantity: u64,
        average_price: f64,
        entry_date: NaiveDate,
    ) -> Self {
        Self {
            ticker: ticker.into(),
            quantity,
            average_price,
            entry_date,
        }
    }

    /// Empty position that the first buy fill will open.
    pub fn flat(ticker: impl Into<String>, date: NaiveDate) -> Self {
        Self::new(ticker, 0, 0.0, date)
    }

    pub fn is_flat(&self) -> bool {
        self.quantity == 0
    }

    /// Apply a filled order and return the remaining quantity.
    ///
    /// Buys re-weight the average price; sells only reduce quantity. Selling more
    /// than is held flattens the position.
    pub fn apply_fill(&mut self, side: OrderSide, quantity: u64, price: f64, date: NaiveDate) -> u64 {
        if quantity == 0 {
            return self.quantity;
        }

        match side {
            OrderSide::Buy => {
                if self.is_flat() {
                    self.average_price = price;
                    self.entry_date = date;
                } else {
                    let old_cost = self.quantity as f64 * self.average_price;
                    let new_cost = quantity as f64 * price;
                    self.average_price = (old_cost + new_cost) / (self.quantity + quantity) as f64;
                }
                self.quantity += quantity;
            }
            OrderSide::Sell => {
                self.quantity = self.quantity.saturating_sub(quantity);
                if self.is_flat() {
                    self.average_price = 0.0;
                }
            }
        }

        self.quantity
    }

    /// Unrealized return in percent, or `None` when the inputs cannot support it.
    pub fn profit_rate(&self, current_price: f64) -> Option<f64> {
        if !(self.average_price > 0.0) || !(current_price > 0.0) {
            return None;
        }
        Some((current_price - self.average_price) / self.average_price * 100.0)
    }

    pub fn days_held(&self, today: NaiveDate) -> i64 {
        (today - self.entry_date).num_days()
    }

    pub fn market_value(&self, price: f64) -> f64 {
        self.quantity as f64 * price
    }
}

/// A transient order the engine asks the broker to place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderIntent {
    pub ticker: String,
    pub side: OrderSide,
    pub price: f64,
    pub quantity: u64,
    pub reason: String,
}

impl OrderIntent {
    pub fn notional(&self) -> f64 {
        self.price * self.quantity as f64
    }
}

/// Broker acknowledgement. A rejection is `success == false`, not an error.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderAck {
    pub success: bool,
    pub order_id: Option<String>,
    pub message: Option<String>,
}

impl OrderAck {
    pub fn accepted(order_id: impl Into<String>) -> Self {
        Self {
            success: true,
            order_id: Some(order_id.into()),
            message: None,
        }
    }

    pub fn rejected(message: impl Into<String>) -> Self {
        Self {
            success: false,
            order_id: None,
            message: Some(message.into()),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrderResult {
    pub intent: OrderIntent,
    pub success: bool,
    pub order_id: Option<String>,
    pub message: Option<String>,
}

impl OrderResult {
    pub fn from_ack(intent: OrderIntent, ack: OrderAck) -> Self {
        Self {
            intent,
            success: ack.success,
            order_id: ack.order_id,
            message: ack.message,
        }
    }

    pub fn failed(intent: OrderIntent, message: impl Into<String>) -> Self {
        Self {
            intent,
            success: false,
            order_id: None,
            message: Some(message.into()),
        }
    }
}

/// A per-ticker failure that was isolated from the rest of the cycle.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickerError {
    pub ticker: String,
    pub message: String,
}

impl TickerError {
    pub fn new(ticker: impl Into<String>, message: impl fmt::Display) -> Self {
        Self {
            ticker: ticker.into(),
            message: message.to_string(),
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleTotals {
    pub sells_succeeded: usize,
    pub sells_failed: usize,
    pub sell_value: f64,
    pub buys_succeeded: usize,
    pub buys_failed: usize,
    pub buy_value: f64,
    /// `sell_value - buy_value`, successful orders only.
    pub net_cash_flow: f64,
}

impl CycleTotals {
    pub fn from_orders(sells: &[OrderResult], buys: &[OrderResult]) -> Self {
        let (sells_succeeded, sells_failed, sell_value) = tally(sells);
        let (buys_succeeded, buys_failed, buy_value) = tally(buys);
        Self {
            sells_succeeded,
            sells_failed,
            sell_value,
            buys_succeeded,
            buys_failed,
            buy_value,
            net_cash_flow: sell_value - buy_value,
        }
    }
}

fn tally(orders: &[OrderResult]) -> (usize, usize, f64) {
    let succeeded = orders.iter().filter(|o| o.success).count();
    let value = orders
        .iter()
        .filter(|o| o.success)
        .map(|o| o.intent.notional())
        .sum();
    (succeeded, orders.len() - succeeded, value)
}

/// Outcome of one orchestration pass. Built fresh per call, never persisted.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CycleResult {
    pub sell_orders: Vec<OrderResult>,
    pub buy_orders: Vec<OrderResult>,
    pub totals: CycleTotals,
    pub errors: Vec<TickerError>,
    /// Set when the cancellation token fired between steps.
    pub cancelled: bool,
}

impl CycleResult {
    pub fn finalize(mut self) -> Self {
        self.totals = CycleTotals::from_orders(&self.sell_orders, &self.buy_orders);
        self
    }
}
