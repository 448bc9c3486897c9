//! Shared data models spanning the engine layers.

pub mod indicators;
pub mod market;
pub mod portfolio;
pub mod signal;

pub use indicators::{BollingerBandsIndicator, IndicatorSnapshot, MacdIndicator};
pub use market::{closes, HistoryInterval, PriceBar, Quote};
pub use portfolio::{
    CycleResult, CycleTotals, OrderAck, OrderIntent, OrderResult, OrderSide, Position, TickerError,
};
pub use signal::{CrossSignal, FactorScores, Signal, SignalOutput, SignalReason, TradeSignal};
