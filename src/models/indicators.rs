use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MacdIndicator {
    pub macd: f64,
    pub signal: f64,
    pub histogram: f64,
}

impl MacdIndicator {
    pub fn new(macd: f64, signal: f64) -> Self {
        Self {
            macd,
            signal,
            histogram: macd - signal,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct BollingerBandsIndicator {
    pub upper: f64,
    pub middle: f64,
    pub lower: f64,
    /// `(upper - lower) / middle`
    pub width: f64,
}

impl BollingerBandsIndicator {
    /// Relative position of `price` inside the band: 0 at the lower band, 1 at the upper.
    pub fn position(&self, price: f64) -> Option<f64> {
        let range = self.upper - self.lower;
        if range == 0.0 || !range.is_finite() {
            return None;
        }
        Some((price - self.lower) / range)
    }
}

/// Every indicator value the scoring model reads, taken at one bar index.
///
/// Snapshots are recomputed from the full bar sequence on every evaluation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndicatorSnapshot {
    pub index: usize,
    pub timestamp: DateTime<Utc>,
    pub close: f64,
    /// SMA over the short window (20 by default).
    pub ma_short: f64,
    /// SMA over the long window (50 by default).
    pub ma_long: f64,
    /// SMA over the trend window (200 by default).
    pub ma_trend_long: f64,
    pub bb_mid: f64,
    pub bb_upper: f64,
    pub bb_lower: f64,
    pub bb_width: f64,
    /// Rolling mean of `bb_width`; absent while fewer widths than the window exist.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bb_width_mean: Option<f64>,
    pub macd_line: f64,
    pub macd_signal: f64,
    pub macd_histogram: f64,
}

impl IndicatorSnapshot {
    pub fn bands(&self) -> BollingerBandsIndicator {
        BollingerBandsIndicator {
            upper: self.bb_upper,
            middle: self.bb_mid,
            lower: self.bb_lower,
            width: self.bb_width,
        }
    }

    pub fn macd(&self) -> MacdIndicator {
        MacdIndicator {
            macd: self.macd_line,
            signal: self.macd_signal,
            histogram: self.macd_histogram,
        }
    }

    pub fn bb_position(&self) -> Option<f64> {
        self.bands().position(self.close)
    }
}
