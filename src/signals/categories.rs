//! Factor category definitions and weights

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;

const WEIGHT_TOLERANCE: f64 = 1e-9;

/// The three factors that feed the composite score.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FactorCategory {
    Trend,
    Bollinger,
    Macd,
}

impl FactorCategory {
    pub const ALL: [FactorCategory; 3] = [
        FactorCategory::Trend,
        FactorCategory::Bollinger,
        FactorCategory::Macd,
    ];

    pub fn name(&self) -> &'static str {
        match self {
            FactorCategory::Trend => "Trend",
            FactorCategory::Bollinger => "Bollinger",
            FactorCategory::Macd => "MACD",
        }
    }
}

impl fmt::Display for FactorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Weight vector for the composite score. Always non-negative and summing to 1.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct FactorWeights {
    trend: f64,
    bollinger: f64,
    macd: f64,
}

impl FactorWeights {
    pub fn new(trend: f64, bollinger: f64, macd: f64) -> Result<Self, EngineError> {
        if trend < 0.0 || bollinger < 0.0 || macd < 0.0 {
            return Err(EngineError::Configuration(
                "All factor weights must be non-negative".to_string(),
            ));
        }
        let total = trend + bollinger + macd;
        if (total - 1.0).abs() > WEIGHT_TOLERANCE {
            return Err(EngineError::Configuration(format!(
                "Factor weights must sum to 1.0, got: {}",
                total
            )));
        }
        Ok(Self {
            trend,
            bollinger,
            macd,
        })
    }

    /// Table weights that are known to be valid.
    pub(crate) const fn from_table(trend: f64, bollinger: f64, macd: f64) -> Self {
        Self {
            trend,
            bollinger,
            macd,
        }
    }

    pub fn trend(&self) -> f64 {
        self.trend
    }

    pub fn bollinger(&self) -> f64 {
        self.bollinger
    }

    pub fn macd(&self) -> f64 {
        self.macd
    }

    /// Get weight for a category
    pub fn get(&self, category: FactorCategory) -> f64 {
        match category {
            FactorCategory::Trend => self.trend,
            FactorCategory::Bollinger => self.bollinger,
            FactorCategory::Macd => self.macd,
        }
    }

    pub fn sum(&self) -> f64 {
        self.trend + self.bollinger + self.macd
    }

    /// Verify weights sum to 1.0
    pub fn verify(&self) -> bool {
        (self.sum() - 1.0).abs() <= WEIGHT_TOLERANCE
    }
}
