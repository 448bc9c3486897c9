use crate::error::EngineError;
use crate::models::market::PriceBar;
use crate::models::signal::SignalOutput;
use crate::signals::engine::SignalEngine;
use crate::strategies::Strategy;

/// Trend, Bollinger and MACD factors combined into a weighted composite score.
#[derive(Debug, Clone, Default)]
pub struct CompositeStrategy {
    engine: SignalEngine,
}

impl CompositeStrategy {
    pub fn new(engine: SignalEngine) -> Self {
        Self { engine }
    }
}

impl Strategy for CompositeStrategy {
    fn name(&self) -> &'static str {
        "composite"
    }

    fn compute_signal(&self, ticker: &str, history: &[PriceBar]) -> Result<SignalOutput, EngineError> {
        self.engine.evaluate(ticker, history)
    }
}
