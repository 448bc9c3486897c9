use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::signals::categories::FactorWeights;

/// Investor risk appetite. Selects the composite weights and the exit distances.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskProfile {
    Conservative,
    #[default]
    Moderate,
    Aggressive,
}

impl RiskProfile {
    pub const ALL: [RiskProfile; 3] = [
        RiskProfile::Conservative,
        RiskProfile::Moderate,
        RiskProfile::Aggressive,
    ];

    pub fn weights(&self) -> FactorWeights {
        match self {
            RiskProfile::Conservative => FactorWeights::from_table(0.5, 0.3, 0.2),
            RiskProfile::Moderate => FactorWeights::from_table(0.4, 0.3, 0.3),
            RiskProfile::Aggressive => FactorWeights::from_table(0.3, 0.3, 0.4),
        }
    }

    /// Distance below entry for the stop-loss price, as a fraction.
    pub fn stop_loss_pct(&self) -> f64 {
        match self {
            RiskProfile::Conservative => 0.05,
            RiskProfile::Moderate => 0.07,
            RiskProfile::Aggressive => 0.10,
        }
    }

    /// Distance above entry for the take-profit price, as a fraction.
    pub fn take_profit_pct(&self) -> f64 {
        match self {
            RiskProfile::Conservative => 0.15,
            RiskProfile::Moderate => 0.20,
            RiskProfile::Aggressive => 0.30,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            RiskProfile::Conservative => "CONSERVATIVE",
            RiskProfile::Moderate => "MODERATE",
            RiskProfile::Aggressive => "AGGRESSIVE",
        }
    }
}

impl fmt::Display for RiskProfile {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Accepts the profile names and the numeric levels `1`, `2`, `3`.
impl FromStr for RiskProfile {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "1" | "conservative" => Ok(RiskProfile::Conservative),
            "2" | "moderate" => Ok(RiskProfile::Moderate),
            "3" | "aggressive" => Ok(RiskProfile::Aggressive),
            other => Err(EngineError::Configuration(format!(
                "unknown risk profile '{}'",
                other
            ))),
        }
    }
}
