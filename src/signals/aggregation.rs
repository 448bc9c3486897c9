//! Explainability for composite evaluations

use crate::indicators::macd::CrossoverType;
use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::SignalReason;
use crate::signals::categories::{FactorCategory, FactorWeights};
use crate::signals::scoring::ScoreBreakdown;

pub struct Aggregator;

impl Aggregator {
    /// Contribution of each factor to the composite, largest first.
    pub fn contributions(breakdown: &ScoreBreakdown, weights: &FactorWeights) -> Vec<(FactorCategory, f64)> {
        let mut contributions: Vec<(FactorCategory, f64)> = FactorCategory::ALL
            .iter()
            .map(|&category| {
                let score = match category {
                    FactorCategory::Trend => breakdown.factors.trend,
                    FactorCategory::Bollinger => breakdown.factors.bollinger,
                    FactorCategory::Macd => breakdown.factors.macd,
                };
                (category, score * weights.get(category))
            })
            .collect();
        contributions.sort_by(|a, b| b.1.total_cmp(&a.1));
        contributions
    }

    /// Generate explainability breakdown
    pub fn generate_reasons(
        breakdown: &ScoreBreakdown,
        weights: &FactorWeights,
        current: &IndicatorSnapshot,
    ) -> Vec<SignalReason> {
        let mut reasons = Vec::new();

        for (category, contribution) in Self::contributions(breakdown, weights) {
            let score = match category {
                FactorCategory::Trend => breakdown.factors.trend,
                FactorCategory::Bollinger => breakdown.factors.bollinger,
                FactorCategory::Macd => breakdown.factors.macd,
            };
            reasons.push(SignalReason {
                description: format!(
                    "{}: {:.2}% (weight {:.2})",
                    category,
                    score * 100.0,
                    weights.get(category)
                ),
                weight: contribution,
            });
        }

        reasons.push(SignalReason {
            description: format!(
                "Price {:.2}, short MA {:.2}, long MA {:.2}, trend MA {:.2}",
                current.close, current.ma_short, current.ma_long, current.ma_trend_long
            ),
            weight: 0.0,
        });

        let position = breakdown
            .bb_position
            .map(|p| format!("{:.2}", p))
            .unwrap_or_else(|| "n/a".to_string());
        let width_mean = current
            .bb_width_mean
            .map(|m| format!("{:.4}", m))
            .unwrap_or_else(|| "n/a".to_string());
        reasons.push(SignalReason {
            description: format!(
                "Bollinger width {:.4} (mean {}), band position {}",
                current.bb_width, width_mean, position
            ),
            weight: 0.0,
        });

        let crossover = match breakdown.macd.crossover_type {
            CrossoverType::Bullish => ", bullish crossover",
            CrossoverType::Bearish => ", bearish crossover",
            CrossoverType::None => "",
        };
        reasons.push(SignalReason {
            description: format!(
                "MACD={:.4}, Signal={:.4}, Histogram={:.4}{}",
                breakdown.macd.macd_value,
                breakdown.macd.signal_value,
                breakdown.macd.histogram_value,
                crossover
            ),
            weight: 0.0,
        });

        reasons
    }
}
