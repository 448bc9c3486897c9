//! MACD (Moving Average Convergence Divergence) indicator

use crate::indicators::trend::ema_series;
use crate::models::indicators::MacdIndicator;

/// MACD line, signal line and histogram, one entry per input close.
#[derive(Debug, Clone, PartialEq)]
pub struct MacdSeries {
    pub macd: Vec<f64>,
    pub signal: Vec<f64>,
    pub histogram: Vec<f64>,
}

impl MacdSeries {
    pub fn len(&self) -> usize {
        self.macd.len()
    }

    pub fn is_empty(&self) -> bool {
        self.macd.is_empty()
    }

    pub fn at(&self, index: usize) -> Option<MacdIndicator> {
        Some(MacdIndicator {
            macd: *self.macd.get(index)?,
            signal: *self.signal.get(index)?,
            histogram: *self.histogram.get(index)?,
        })
    }
}

/// Compute the MACD series over closing prices.
///
/// MACD = EMA(fast) - EMA(slow)
/// Signal = EMA(signal) of MACD
/// Histogram = MACD - Signal
///
/// Every EMA uses the unadjusted recursion seeded with the first value.
pub fn macd_series(closes: &[f64], fast_span: usize, slow_span: usize, signal_span: usize) -> MacdSeries {
    let fast = ema_series(closes, fast_span);
    let slow = ema_series(closes, slow_span);

    let macd: Vec<f64> = fast.iter().zip(&slow).map(|(f, s)| f - s).collect();
    let signal = ema_series(&macd, signal_span);
    let histogram = macd.iter().zip(&signal).map(|(m, s)| m - s).collect();

    MacdSeries {
        macd,
        signal,
        histogram,
    }
}
