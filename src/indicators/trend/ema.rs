//! EMA (Exponential Moving Average) indicator

use crate::common::math;

/// EMA series aligned with `closes`, seeded with the first close.
pub fn ema_series(closes: &[f64], span: usize) -> Vec<f64> {
    math::ema_series(closes, span)
}
