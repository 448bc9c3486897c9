use crate::error::EngineError;
use crate::models::market::PriceBar;
use crate::models::signal::SignalOutput;
use crate::signals::engine::SignalEngine;
use crate::strategies::Strategy;

/// Golden/dead cross of MACD against its signal line. Emits no composite score.
#[derive(Debug, Clone, Default)]
pub struct CrossoverStrategy {
    engine: SignalEngine,
}

impl CrossoverStrategy {
    pub fn new(engine: SignalEngine) -> Self {
        Self { engine }
    }
}

impl Strategy for CrossoverStrategy {
    fn name(&self) -> &'static str {
        "crossover"
    }

    fn compute_signal(&self, ticker: &str, history: &[PriceBar]) -> Result<SignalOutput, EngineError> {
        self.engine.evaluate_crossover(ticker, history)
    }
}
