//! Per-factor scoring of indicator snapshots

use serde::{Deserialize, Serialize};

use crate::indicators::macd::{evaluate_macd, CrossoverType, MacdEvaluation};
use crate::models::indicators::IndicatorSnapshot;
use crate::models::signal::FactorScores;
use crate::risk::profile::RiskProfile;
use crate::signals::categories::FactorWeights;

const TREND_ABOVE_MA_LONG: f64 = 0.5;
const TREND_MA_ALIGNMENT: f64 = 0.5;

const BB_EXPANSION: f64 = 0.3;
const BB_LOWER_CROSS: f64 = 0.7;
const BB_MID_RISING: f64 = 0.5;
const BB_MID_LOW: f64 = 0.3;
const BB_MID_HIGH: f64 = 0.7;

const MACD_CROSSOVER: f64 = 0.7;
const MACD_ABOVE_GROWING: f64 = 0.5;
const MACD_POSITIVE_RISING: f64 = 0.3;

/// How a MACD/signal-line crossing contributes to the MACD factor.
///
/// `EitherDirection` rewards bearish crossings as well as bullish ones, which is the
/// deployed behavior even though the composite score reads as bullish-only.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum CrossoverRule {
    #[default]
    EitherDirection,
    BullishOnly,
    /// Bullish adds the bonus, bearish subtracts it.
    Signed,
}

/// Factor scores plus the composite for one evaluation.
#[derive(Debug, Clone)]
pub struct ScoreBreakdown {
    pub factors: FactorScores,
    pub composite: f64,
    pub macd: MacdEvaluation,
    pub bb_position: Option<f64>,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScoringModel {
    weights: FactorWeights,
    crossover_rule: CrossoverRule,
}

impl Default for ScoringModel {
    fn default() -> Self {
        Self::for_profile(RiskProfile::default())
    }
}

impl ScoringModel {
    pub fn new(weights: FactorWeights) -> Self {
        Self {
            weights,
            crossover_rule: CrossoverRule::default(),
        }
    }

    pub fn for_profile(profile: RiskProfile) -> Self {
        Self::new(profile.weights())
    }

    pub fn with_crossover_rule(mut self, rule: CrossoverRule) -> Self {
        self.crossover_rule = rule;
        self
    }

    pub fn weights(&self) -> &FactorWeights {
        &self.weights
    }

    pub fn crossover_rule(&self) -> CrossoverRule {
        self.crossover_rule
    }

    /// 0.5 for close above the long MA, 0.5 more for the long MA above the trend MA.
    pub fn trend_score(&self, current: &IndicatorSnapshot) -> f64 {
        let mut score = 0.0;
        if current.close > current.ma_long {
            score += TREND_ABOVE_MA_LONG;
        }
        if current.ma_long > current.ma_trend_long {
            score += TREND_MA_ALIGNMENT;
        }
        score
    }

    pub fn bollinger_score(&self, current: &IndicatorSnapshot, previous: &IndicatorSnapshot) -> f64 {
        let mut score = 0.0;

        if let Some(mean) = current.bb_width_mean {
            if current.bb_width > mean {
                score += BB_EXPANSION;
            }
        }

        let crossed_lower = previous.close <= previous.bb_lower && current.close > current.bb_lower;
        if crossed_lower {
            score += BB_LOWER_CROSS;
        } else if let Some(position) = current.bb_position() {
            let rising = current.close > previous.close;
            if (BB_MID_LOW..=BB_MID_HIGH).contains(&position) && rising {
                score += BB_MID_RISING;
            }
        }

        score.clamp(0.0, 1.0)
    }

    pub fn macd_score(&self, evaluation: &MacdEvaluation) -> f64 {
        let crossover = match (self.crossover_rule, evaluation.crossover_type) {
            (_, CrossoverType::None) => None,
            (CrossoverRule::EitherDirection, _) => Some(MACD_CROSSOVER),
            (CrossoverRule::BullishOnly, CrossoverType::Bullish) => Some(MACD_CROSSOVER),
            (CrossoverRule::BullishOnly, CrossoverType::Bearish) => None,
            (CrossoverRule::Signed, CrossoverType::Bullish) => Some(MACD_CROSSOVER),
            (CrossoverRule::Signed, CrossoverType::Bearish) => Some(-MACD_CROSSOVER),
        };

        let mut score = match crossover {
            Some(bonus) => bonus,
            None if evaluation.above_signal && evaluation.histogram_growing => MACD_ABOVE_GROWING,
            None => 0.0,
        };

        if evaluation.positive_and_rising {
            score += MACD_POSITIVE_RISING;
        }

        score.clamp(0.0, 1.0)
    }

    pub fn composite(&self, factors: &FactorScores) -> f64 {
        let total = factors.trend * self.weights.trend()
            + factors.bollinger * self.weights.bollinger()
            + factors.macd * self.weights.macd();
        total.clamp(0.0, 1.0)
    }

    pub fn score(&self, current: &IndicatorSnapshot, previous: &IndicatorSnapshot) -> ScoreBreakdown {
        let macd = evaluate_macd(&previous.macd(), &current.macd());
        let factors = FactorScores::new(
            self.trend_score(current),
            self.bollinger_score(current, previous),
            self.macd_score(&macd),
        );
        let composite = self.composite(&factors);

        ScoreBreakdown {
            factors,
            composite,
            macd,
            bb_position: current.bb_position(),
        }
    }
}
