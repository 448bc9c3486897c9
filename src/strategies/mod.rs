//! Strategy variants that turn a price history into a signal.

pub mod composite;
pub mod crossover;
pub mod evaluator;

use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::EngineError;
use crate::models::market::PriceBar;
use crate::models::signal::SignalOutput;
use crate::signals::engine::SignalEngine;

pub use composite::CompositeStrategy;
pub use crossover::CrossoverStrategy;
pub use evaluator::{analyze_universe, ScanSummary};

/// Capability every strategy variant exposes to the orchestrator.
pub trait Strategy: Send + Sync {
    fn name(&self) -> &'static str;

    fn compute_signal(&self, ticker: &str, history: &[PriceBar]) -> Result<SignalOutput, EngineError>;
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategyKind {
    #[default]
    Composite,
    Crossover,
}

impl std::str::FromStr for StrategyKind {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "composite" | "tbm" => Ok(StrategyKind::Composite),
            "crossover" | "macd" => Ok(StrategyKind::Crossover),
            other => Err(EngineError::Configuration(format!(
                "unknown strategy '{}'",
                other
            ))),
        }
    }
}

pub fn build_strategy(kind: StrategyKind, engine: SignalEngine) -> Arc<dyn Strategy> {
    match kind {
        StrategyKind::Composite => Arc::new(CompositeStrategy::new(engine)),
        StrategyKind::Crossover => Arc::new(CrossoverStrategy::new(engine)),
    }
}
