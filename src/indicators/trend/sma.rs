//! SMA (Simple Moving Average) indicator

use crate::common::math;

/// Rolling SMA aligned with `closes`; `None` until `window` closes exist.
pub fn sma_series(closes: &[f64], window: usize) -> Vec<Option<f64>> {
    math::sma_series(closes, window)
}

/// The three trend averages the scoring model compares.
#[derive(Debug, Clone, PartialEq)]
pub struct MovingAverages {
    pub short: Vec<Option<f64>>,
    pub long: Vec<Option<f64>>,
    pub trend_long: Vec<Option<f64>>,
}

pub fn moving_averages(closes: &[f64], short: usize, long: usize, trend_long: usize) -> MovingAverages {
    MovingAverages {
        short: sma_series(closes, short),
        long: sma_series(closes, long),
        trend_long: sma_series(closes, trend_long),
    }
}
