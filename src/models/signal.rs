use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Decision derived from a composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Signal {
    Buy,
    Sell,
    Hold,
    NoSignal,
}

/// Decision derived from a raw MACD/signal-line crossing.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum CrossSignal {
    GoldenCross,
    DeadCross,
    NoSignal,
}

/// Output of whichever classifier the configured strategy uses.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum TradeSignal {
    Composite(Signal),
    Crossover(CrossSignal),
}

impl TradeSignal {
    /// BUY or GOLDEN_CROSS.
    pub fn is_entry(&self) -> bool {
        matches!(
            self,
            TradeSignal::Composite(Signal::Buy) | TradeSignal::Crossover(CrossSignal::GoldenCross)
        )
    }

    /// SELL or DEAD_CROSS.
    pub fn is_exit(&self) -> bool {
        matches!(
            self,
            TradeSignal::Composite(Signal::Sell) | TradeSignal::Crossover(CrossSignal::DeadCross)
        )
    }

    pub fn label(&self) -> &'static str {
        match self {
            TradeSignal::Composite(Signal::Buy) => "BUY",
            TradeSignal::Composite(Signal::Sell) => "SELL",
            TradeSignal::Composite(Signal::Hold) => "HOLD",
            TradeSignal::Composite(Signal::NoSignal) => "NO_SIGNAL",
            TradeSignal::Crossover(CrossSignal::GoldenCross) => "GOLDEN_CROSS",
            TradeSignal::Crossover(CrossSignal::DeadCross) => "DEAD_CROSS",
            TradeSignal::Crossover(CrossSignal::NoSignal) => "NO_SIGNAL",
        }
    }
}

impl fmt::Display for TradeSignal {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Per-factor scores, each bounded to [0, 1].
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct FactorScores {
    pub trend: f64,
    pub bollinger: f64,
    pub macd: f64,
}

impl FactorScores {
    pub fn new(trend: f64, bollinger: f64, macd: f64) -> Self {
        Self {
            trend: trend.clamp(0.0, 1.0),
            bollinger: bollinger.clamp(0.0, 1.0),
            macd: macd.clamp(0.0, 1.0),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalReason {
    pub description: String,
    pub weight: f64,
}

/// Explainable result of running a strategy over one ticker's history.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SignalOutput {
    pub ticker: String,
    pub signal: TradeSignal,
    /// Composite score in [0, 1]; absent for the crossover strategy.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub score: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub factors: Option<FactorScores>,
    /// Latest close of the evaluated history.
    pub price: f64,
    pub reasons: Vec<SignalReason>,
    pub timestamp: DateTime<Utc>,
}
