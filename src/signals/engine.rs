//! Main signal evaluation engine: indicators, scoring and classification in one pass.

use chrono::Utc;
use tracing::debug;

use crate::error::EngineError;
use crate::indicators::engine::IndicatorEngine;
use crate::indicators::momentum::macd_series;
use crate::models::market::{closes, PriceBar};
use crate::models::signal::{SignalOutput, SignalReason, TradeSignal};
use crate::signals::aggregation::Aggregator;
use crate::signals::decision::SignalClassifier;
use crate::signals::scoring::ScoringModel;

#[derive(Debug, Clone, Default)]
pub struct SignalEngine {
    indicators: IndicatorEngine,
    scoring: ScoringModel,
    classifier: SignalClassifier,
}

impl SignalEngine {
    pub fn new(indicators: IndicatorEngine, scoring: ScoringModel, classifier: SignalClassifier) -> Self {
        Self {
            indicators,
            scoring,
            classifier,
        }
    }

    pub fn indicators(&self) -> &IndicatorEngine {
        &self.indicators
    }

    pub fn scoring(&self) -> &ScoringModel {
        &self.scoring
    }

    pub fn classifier(&self) -> &SignalClassifier {
        &self.classifier
    }

    /// Composite evaluation of the latest bar.
    pub fn evaluate(&self, ticker: &str, bars: &[PriceBar]) -> Result<SignalOutput, EngineError> {
        let (current, previous) = self.indicators.latest_pair(bars)?;
        let breakdown = self.scoring.score(&current, &previous);
        let signal = self.classifier.classify(breakdown.composite);
        let reasons = Aggregator::generate_reasons(&breakdown, self.scoring.weights(), &current);

        debug!(
            ticker = %ticker,
            score = breakdown.composite,
            trend = breakdown.factors.trend,
            bollinger = breakdown.factors.bollinger,
            macd = breakdown.factors.macd,
            "SignalEngine: {} scored {:.3}",
            ticker,
            breakdown.composite
        );

        Ok(SignalOutput {
            ticker: ticker.to_string(),
            signal: TradeSignal::Composite(signal),
            score: Some(breakdown.composite),
            factors: Some(breakdown.factors),
            price: current.close,
            reasons,
            timestamp: Utc::now(),
        })
    }

    /// Crossover-only evaluation. Needs just enough bars for the slow EMA plus one.
    pub fn evaluate_crossover(&self, ticker: &str, bars: &[PriceBar]) -> Result<SignalOutput, EngineError> {
        let cfg = self.indicators.config();
        let required = cfg.ema_long_span.max(1) + 1;
        if bars.len() < required {
            return Err(EngineError::InsufficientData {
                required,
                actual: bars.len(),
            });
        }

        let closes = closes(bars);
        let series = macd_series(
            &closes,
            cfg.ema_short_span,
            cfg.ema_long_span,
            cfg.macd_signal_span,
        );
        let last = series.len() - 1;
        let (previous, current) = match (series.at(last - 1), series.at(last)) {
            (Some(p), Some(c)) => (p, c),
            _ => {
                return Err(EngineError::InsufficientData {
                    required,
                    actual: bars.len(),
                })
            }
        };

        let signal = self.classifier.classify_crossover(&previous, &current);
        debug!(
            ticker = %ticker,
            macd = current.macd,
            signal_line = current.signal,
            "SignalEngine: {} crossover {:?}",
            ticker,
            signal
        );

        Ok(SignalOutput {
            ticker: ticker.to_string(),
            signal: TradeSignal::Crossover(signal),
            score: None,
            factors: None,
            price: closes[last],
            reasons: vec![SignalReason {
                description: format!(
                    "MACD={:.4}, Signal={:.4}, Histogram={:.4} (previous MACD={:.4}, Signal={:.4})",
                    current.macd, current.signal, current.histogram, previous.macd, previous.signal
                ),
                weight: 1.0,
            }],
            timestamp: Utc::now(),
        })
    }
}
