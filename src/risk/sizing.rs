use serde::{Deserialize, Serialize};

use crate::risk::profile::RiskProfile;

/// Protective exit prices for a new entry.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ExitLevels {
    pub stop_loss: f64,
    pub take_profit: f64,
}

/// Turns a risk profile and a budget into exit prices and share counts.
#[derive(Debug, Clone, Copy, Default, PartialEq, Serialize, Deserialize)]
pub struct PositionSizer {
    profile: RiskProfile,
    stop_loss_override: Option<f64>,
    take_profit_override: Option<f64>,
}

impl PositionSizer {
    pub fn new(profile: RiskProfile) -> Self {
        Self {
            profile,
            stop_loss_override: None,
            take_profit_override: None,
        }
    }

    /// Override the profile's stop-loss distance (fraction, e.g. `0.08`).
    pub fn with_stop_loss_pct(mut self, pct: f64) -> Self {
        self.stop_loss_override = Some(pct);
        self
    }

    /// Override the profile's take-profit distance (fraction, e.g. `0.25`).
    pub fn with_take_profit_pct(mut self, pct: f64) -> Self {
        self.take_profit_override = Some(pct);
        self
    }

    pub fn profile(&self) -> RiskProfile {
        self.profile
    }

    /// `None` for a non-positive entry price.
    pub fn exit_levels(&self, entry_price: f64) -> Option<ExitLevels> {
        if !(entry_price > 0.0) {
            return None;
        }
        let risk = self.stop_loss_override.unwrap_or(self.profile.stop_loss_pct());
        let reward = self
            .take_profit_override
            .unwrap_or(self.profile.take_profit_pct());
        Some(ExitLevels {
            stop_loss: entry_price * (1.0 - risk),
            take_profit: entry_price * (1.0 + reward),
        })
    }

    /// Whole shares affordable with `budget` at `price`.
    ///
    /// Returns 0 when either input is non-positive or not even one share fits; callers skip the order.
    pub fn quantity(&self, budget: f64, price: f64) -> u64 {
        if !(price > 0.0) || !(budget > 0.0) {
            return 0;
        }
        let shares = (budget / price).floor();
        if shares < 1.0 || !shares.is_finite() {
            return 0;
        }
        shares as u64
    }

    /// Equal-weight budget per candidate: `cash * pct / 100 / candidates`.
    pub fn allocate(&self, available_cash: f64, budget_percentage: f64, candidates: usize) -> f64 {
        if candidates == 0 || !(available_cash > 0.0) || !(budget_percentage > 0.0) {
            return 0.0;
        }
        available_cash * budget_percentage / 100.0 / candidates as f64
    }
}
