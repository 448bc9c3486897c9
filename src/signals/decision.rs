//! Score-to-signal classification

use serde::{Deserialize, Serialize};

use crate::indicators::macd::{detect_crossover, CrossoverType};
use crate::models::indicators::MacdIndicator;
use crate::models::signal::{CrossSignal, Signal};

pub const BUY_THRESHOLD: f64 = 0.7;
pub const SELL_THRESHOLD: f64 = 0.3;

/// Maps a composite score to a discrete signal. Both thresholds are inclusive.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SignalClassifier {
    pub buy_threshold: f64,
    pub sell_threshold: f64,
}

impl Default for SignalClassifier {
    fn default() -> Self {
        Self {
            buy_threshold: BUY_THRESHOLD,
            sell_threshold: SELL_THRESHOLD,
        }
    }
}

impl SignalClassifier {
    /// `NoSignal` for a score that is not a finite number.
    pub fn classify(&self, score: f64) -> Signal {
        if !score.is_finite() {
            Signal::NoSignal
        } else if score >= self.buy_threshold {
            Signal::Buy
        } else if score <= self.sell_threshold {
            Signal::Sell
        } else {
            Signal::Hold
        }
    }

    /// Raw MACD/signal-line crossing across the last two bars, ignoring any composite score.
    pub fn classify_crossover(&self, previous: &MacdIndicator, current: &MacdIndicator) -> CrossSignal {
        match detect_crossover(previous, current) {
            CrossoverType::Bullish => CrossSignal::GoldenCross,
            CrossoverType::Bearish => CrossSignal::DeadCross,
            CrossoverType::None => CrossSignal::NoSignal,
        }
    }
}
