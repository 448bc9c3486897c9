use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum CrossoverType {
    Bullish,
    Bearish,
    None,
}

impl CrossoverType {
    pub fn is_crossover(&self) -> bool {
        !matches!(self, CrossoverType::None)
    }
}

/// MACD state across the last two bars.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct MacdEvaluation {
    pub crossover_type: CrossoverType,
    /// MACD above its signal line on the current bar.
    pub above_signal: bool,
    /// Histogram larger than on the previous bar.
    pub histogram_growing: bool,
    /// MACD positive and larger than on the previous bar.
    pub positive_and_rising: bool,
    pub macd_value: f64,
    pub signal_value: f64,
    pub histogram_value: f64,
}

impl MacdEvaluation {
    pub fn new(
        crossover_type: CrossoverType,
        above_signal: bool,
        histogram_growing: bool,
        positive_and_rising: bool,
        macd_value: f64,
        signal_value: f64,
        histogram_value: f64,
    ) -> Self {
        Self {
            crossover_type,
            above_signal,
            histogram_growing,
            positive_and_rising,
            macd_value,
            signal_value,
            histogram_value,
        }
    }
}
