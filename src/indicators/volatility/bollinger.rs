//! Bollinger Bands indicator

use crate::common::math;
use crate::models::indicators::BollingerBandsIndicator;

/// Calculate Bollinger Bands over a close series, one entry per input.
///
/// Middle Band = SMA(window)
/// Upper Band = Middle + (k * sample standard deviation)
/// Lower Band = Middle - (k * sample standard deviation)
/// Width = (Upper - Lower) / Middle
///
/// Entries before the first full window are `None`.
pub fn bollinger_series(closes: &[f64], window: usize, k: f64) -> Vec<Option<BollingerBandsIndicator>> {
    let mids = math::sma_series(closes, window);
    let stds = math::std_series(closes, window);

    mids.into_iter()
        .zip(stds)
        .map(|(mid, std)| {
            let middle = mid?;
            let std = std?;
            let upper = middle + k * std;
            let lower = middle - k * std;
            let width = if middle != 0.0 {
                (upper - lower) / middle
            } else {
                0.0
            };
            Some(BollingerBandsIndicator {
                upper,
                middle,
                lower,
                width,
            })
        })
        .collect()
}

/// Rolling mean of the band width; `None` until `window` widths exist.
pub fn width_mean_series(bands: &[Option<BollingerBandsIndicator>], window: usize) -> Vec<Option<f64>> {
    let widths: Vec<Option<f64>> = bands.iter().map(|b| b.map(|b| b.width)).collect();
    math::rolling_mean_of(&widths, window)
}
