use crate::indicators::macd::evaluation::{CrossoverType, MacdEvaluation};
use crate::models::indicators::MacdIndicator;

/// Detect a MACD/signal-line crossing between two consecutive bars.
///
/// Both comparisons are strict: touching the signal line is not a cross.
pub fn detect_crossover(previous: &MacdIndicator, current: &MacdIndicator) -> CrossoverType {
    if previous.macd < previous.signal && current.macd > current.signal {
        CrossoverType::Bullish
    } else if previous.macd > previous.signal && current.macd < current.signal {
        CrossoverType::Bearish
    } else {
        CrossoverType::None
    }
}

pub fn evaluate_macd(previous: &MacdIndicator, current: &MacdIndicator) -> MacdEvaluation {
    let crossover_type = detect_crossover(previous, current);
    let above_signal = current.macd > current.signal;
    let histogram_growing = current.histogram > previous.histogram;
    let positive_and_rising = current.macd > 0.0 && current.macd > previous.macd;

    MacdEvaluation::new(
        crossover_type,
        above_signal,
        histogram_growing,
        positive_and_rising,
        current.macd,
        current.signal,
        current.histogram,
    )
}
