//! Indicator pipeline turning a bar sequence into per-bar snapshots.

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::error::EngineError;
use crate::indicators::momentum::macd_series;
use crate::indicators::trend::moving_averages;
use crate::indicators::volatility::{bollinger_series, width_mean_series};
use crate::models::indicators::IndicatorSnapshot;
use crate::models::market::{closes, PriceBar};

/// Windows and spans used by [`IndicatorEngine`].
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct IndicatorConfig {
    pub ema_short_span: usize,
    pub ema_long_span: usize,
    pub macd_signal_span: usize,
    pub ma_short_window: usize,
    pub ma_long_window: usize,
    pub ma_trend_long_window: usize,
    pub bb_window: usize,
    pub bb_k: f64,
    pub bb_width_mean_window: usize,
}

impl Default for IndicatorConfig {
    fn default() -> Self {
        Self {
            ema_short_span: 12,
            ema_long_span: 26,
            macd_signal_span: 9,
            ma_short_window: 20,
            ma_long_window: 50,
            ma_trend_long_window: 200,
            bb_window: 20,
            bb_k: 2.0,
            bb_width_mean_window: 20,
        }
    }
}

impl IndicatorConfig {
    pub fn with_ema_spans(mut self, short: usize, long: usize, signal: usize) -> Self {
        self.ema_short_span = short;
        self.ema_long_span = long;
        self.macd_signal_span = signal;
        self
    }

    pub fn with_ma_windows(mut self, short: usize, long: usize, trend_long: usize) -> Self {
        self.ma_short_window = short;
        self.ma_long_window = long;
        self.ma_trend_long_window = trend_long;
        self
    }

    pub fn with_bollinger(mut self, window: usize, k: f64, width_mean_window: usize) -> Self {
        self.bb_window = window;
        self.bb_k = k;
        self.bb_width_mean_window = width_mean_window;
        self
    }

    /// Longest moving-average window in use.
    pub fn longest_window(&self) -> usize {
        self.ma_short_window
            .max(self.ma_long_window)
            .max(self.ma_trend_long_window)
            .max(self.bb_window)
    }

    /// Bars needed before a current and a previous snapshot both exist.
    pub fn min_bars(&self) -> usize {
        self.longest_window().max(self.ema_long_span) + 1
    }

    pub fn validate(&self) -> Result<(), EngineError> {
        if self.ema_short_span == 0 || self.macd_signal_span == 0 {
            return Err(EngineError::Configuration(
                "EMA spans must be positive".to_string(),
            ));
        }
        if self.ema_short_span >= self.ema_long_span {
            return Err(EngineError::Configuration(format!(
                "EMA short span {} must be below long span {}",
                self.ema_short_span, self.ema_long_span
            )));
        }
        if self.ma_short_window == 0 || self.ma_long_window == 0 || self.ma_trend_long_window == 0 {
            return Err(EngineError::Configuration(
                "moving-average windows must be positive".to_string(),
            ));
        }
        if self.bb_window < 2 {
            return Err(EngineError::Configuration(format!(
                "Bollinger window must be at least 2, got {}",
                self.bb_window
            )));
        }
        if self.bb_width_mean_window == 0 || !(self.bb_k > 0.0) {
            return Err(EngineError::Configuration(
                "Bollinger width mean window and multiplier must be positive".to_string(),
            ));
        }
        Ok(())
    }
}

/// Stateless indicator calculator. Every call recomputes from the full history.
#[derive(Debug, Clone, Default)]
pub struct IndicatorEngine {
    config: IndicatorConfig,
}

impl IndicatorEngine {
    /// Unchecked; degenerate windows yield no snapshots rather than a panic.
    pub fn new(config: IndicatorConfig) -> Self {
        Self { config }
    }

    pub fn try_new(config: IndicatorConfig) -> Result<Self, EngineError> {
        config.validate()?;
        Ok(Self { config })
    }

    pub fn config(&self) -> &IndicatorConfig {
        &self.config
    }

    pub fn min_bars(&self) -> usize {
        self.config.min_bars()
    }

    /// One snapshot per bar index from the first index where every moving average exists.
    pub fn compute(&self, bars: &[PriceBar]) -> Result<Vec<IndicatorSnapshot>, EngineError> {
        let required = self.min_bars();
        if bars.len() < required {
            return Err(EngineError::InsufficientData {
                required,
                actual: bars.len(),
            });
        }

        let cfg = &self.config;
        let closes = closes(bars);

        let mas = moving_averages(
            &closes,
            cfg.ma_short_window,
            cfg.ma_long_window,
            cfg.ma_trend_long_window,
        );
        let bands = bollinger_series(&closes, cfg.bb_window, cfg.bb_k);
        let width_means = width_mean_series(&bands, cfg.bb_width_mean_window);
        let macd = macd_series(
            &closes,
            cfg.ema_short_span,
            cfg.ema_long_span,
            cfg.macd_signal_span,
        );

        let first = cfg.longest_window().saturating_sub(1);
        let snapshots: Vec<IndicatorSnapshot> = (first..bars.len())
            .filter_map(|i| {
                let band = bands[i]?;
                Some(IndicatorSnapshot {
                    index: i,
                    timestamp: bars[i].timestamp,
                    close: closes[i],
                    ma_short: mas.short[i]?,
                    ma_long: mas.long[i]?,
                    ma_trend_long: mas.trend_long[i]?,
                    bb_mid: band.middle,
                    bb_upper: band.upper,
                    bb_lower: band.lower,
                    bb_width: band.width,
                    bb_width_mean: width_means[i],
                    macd_line: macd.macd[i],
                    macd_signal: macd.signal[i],
                    macd_histogram: macd.histogram[i],
                })
            })
            .collect();

        debug!(
            bars = bars.len(),
            snapshots = snapshots.len(),
            "IndicatorEngine: computed {} snapshots",
            snapshots.len()
        );

        Ok(snapshots)
    }

    /// Current and previous snapshots, the only two the scoring model reads.
    pub fn latest_pair(
        &self,
        bars: &[PriceBar],
    ) -> Result<(IndicatorSnapshot, IndicatorSnapshot), EngineError> {
        let mut snapshots = self.compute(bars)?;
        let actual = bars.len();
        let required = self.min_bars();
        let current = snapshots
            .pop()
            .ok_or(EngineError::InsufficientData { required, actual })?;
        let previous = snapshots
            .pop()
            .ok_or(EngineError::InsufficientData { required, actual })?;
        Ok((current, previous))
    }
}
