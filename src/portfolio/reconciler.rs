use std::collections::BTreeMap;
use std::fmt;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::EngineError;
use crate::models::portfolio::{OrderIntent, OrderSide, Position};
use crate::models::signal::TradeSignal;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum PositionState {
    Held,
    PendingSell,
    Closed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExitReason {
    StopLoss,
    TakeProfit,
    SellSignal,
    MaxHoldingPeriod,
}

impl ExitReason {
    pub fn label(&self) -> &'static str {
        match self {
            ExitReason::StopLoss => "stop-loss",
            ExitReason::TakeProfit => "take-profit",
            ExitReason::SellSignal => "sell signal",
            ExitReason::MaxHoldingPeriod => "max holding period",
        }
    }
}

impl fmt::Display for ExitReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Percent thresholds on profit rate plus the holding-period cap.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitThresholds {
    /// Sell when profit rate is at or below this, e.g. `-7.0`.
    pub stop_loss: f64,
    /// Sell when profit rate is at or above this, e.g. `20.0`.
    pub take_profit: f64,
    /// Sell once held for more than this many days.
    pub max_holding_days: i64,
}

impl Default for ExitThresholds {
    fn default() -> Self {
        Self {
            stop_loss: -7.0,
            take_profit: 20.0,
            max_holding_days: 30,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExitDecision {
    pub ticker: String,
    pub quantity: u64,
    pub price: f64,
    pub profit_rate: f64,
    pub days_held: i64,
    /// Every condition that fired, in check order.
    pub reasons: Vec<ExitReason>,
}

impl ExitDecision {
    pub fn should_sell(&self) -> bool {
        !self.reasons.is_empty()
    }

    pub fn reason_text(&self) -> String {
        self.reasons
            .iter()
            .map(ExitReason::label)
            .collect::<Vec<_>>()
            .join(", ")
    }

    pub fn to_order(&self) -> OrderIntent {
        OrderIntent {
            ticker: self.ticker.clone(),
            side: OrderSide::Sell,
            price: self.price,
            quantity: self.quantity,
            reason: self.reason_text(),
        }
    }
}

#[derive(Debug, Clone)]
struct Tracked {
    position: Position,
    state: PositionState,
}

/// Per-ticker position book for one cycle, rebuilt from broker holdings each time.
#[derive(Debug, Clone, Default)]
pub struct PortfolioReconciler {
    thresholds: ExitThresholds,
    book: BTreeMap<String, Tracked>,
}

impl PortfolioReconciler {
    pub fn new(thresholds: ExitThresholds) -> Self {
        Self {
            thresholds,
            book: BTreeMap::new(),
        }
    }

    pub fn thresholds(&self) -> &ExitThresholds {
        &self.thresholds
    }

    /// Replace all local state with the broker's view. Zero-quantity rows are ignored.
    pub fn rebuild(&mut self, holdings: Vec<Position>) {
        self.book.clear();
        for position in holdings.into_iter().filter(|p| p.quantity > 0) {
            self.book.insert(
                position.ticker.clone(),
                Tracked {
                    position,
                    state: PositionState::Held,
                },
            );
        }
        debug!(count = self.book.len(), "PortfolioReconciler: rebuilt {} positions", self.book.len());
    }

    /// Positions not yet closed, ordered by ticker.
    pub fn open_positions(&self) -> impl Iterator<Item = &Position> {
        self.book
            .values()
            .filter(|t| t.state != PositionState::Closed)
            .map(|t| &t.position)
    }

    pub fn held_count(&self) -> usize {
        self.open_positions().count()
    }

    pub fn position(&self, ticker: &str) -> Option<&Position> {
        self.book.get(ticker).map(|t| &t.position)
    }

    pub fn state(&self, ticker: &str) -> Option<PositionState> {
        self.book.get(ticker).map(|t| t.state)
    }

    /// Check every exit condition for a held ticker.
    ///
    /// Reasons accumulate; the decision sells when at least one fired. Fails without
    /// recommending anything when the price data cannot support a decision.
    pub fn evaluate_exit(
        &self,
        ticker: &str,
        current_price: f64,
        signal: Option<TradeSignal>,
        today: NaiveDate,
    ) -> Result<ExitDecision, EngineError> {
        let tracked = self.book.get(ticker).ok_or_else(|| EngineError::NotHeld {
            ticker: ticker.to_string(),
        })?;
        if tracked.state != PositionState::Held {
            return Err(EngineError::NotHeld {
                ticker: ticker.to_string(),
            });
        }

        let position = &tracked.position;
        if !(position.average_price > 0.0) {
            warn!(ticker = %ticker, "PortfolioReconciler: cannot evaluate {}, no average price", ticker);
            return Err(EngineError::invalid_price(ticker, position.average_price));
        }
        let profit_rate = position
            .profit_rate(current_price)
            .ok_or_else(|| EngineError::invalid_price(ticker, current_price))?;
        let days_held = position.days_held(today);

        let mut reasons = Vec::new();
        if profit_rate <= self.thresholds.stop_loss {
            reasons.push(ExitReason::StopLoss);
        }
        if profit_rate >= self.thresholds.take_profit {
            reasons.push(ExitReason::TakeProfit);
        }
        if signal.map(|s| s.is_exit()).unwrap_or(false) {
            reasons.push(ExitReason::SellSignal);
        }
        if days_held > self.thresholds.max_holding_days {
            reasons.push(ExitReason::MaxHoldingPeriod);
        }

        Ok(ExitDecision {
            ticker: ticker.to_string(),
            quantity: position.quantity,
            price: current_price,
            profit_rate,
            days_held,
            reasons,
        })
    }

    /// HELD -> PENDING_SELL. Returns false when the ticker is not in HELD.
    pub fn mark_pending_sell(&mut self, ticker: &str) -> bool {
        self.transition(ticker, PositionState::Held, PositionState::PendingSell)
    }

    /// PENDING_SELL -> CLOSED on a filled sell.
    pub fn confirm_sell(&mut self, ticker: &str) -> bool {
        self.transition(ticker, PositionState::PendingSell, PositionState::Closed)
    }

    /// PENDING_SELL -> HELD when the sell did not go through.
    pub fn sell_failed(&mut self, ticker: &str) -> bool {
        self.transition(ticker, PositionState::PendingSell, PositionState::Held)
    }

    /// Record a filled buy: opens a position or re-weights the average price.
    pub fn apply_buy(&mut self, ticker: &str, quantity: u64, price: f64, date: NaiveDate) {
        let tracked = self.book.entry(ticker.to_string()).or_insert_with(|| Tracked {
            position: Position::flat(ticker, date),
            state: PositionState::Held,
        });
        if tracked.state == PositionState::Closed {
            tracked.position = Position::flat(ticker, date);
        }
        tracked.position.apply_fill(OrderSide::Buy, quantity, price, date);
        tracked.state = PositionState::Held;
    }

    fn transition(&mut self, ticker: &str, from: PositionState, to: PositionState) -> bool {
        match self.book.get_mut(ticker) {
            Some(tracked) if tracked.state == from => {
                tracked.state = to;
                true
            }
            _ => false,
        }
    }
}
