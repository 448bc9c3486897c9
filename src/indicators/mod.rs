pub mod engine;
pub mod macd;
pub mod momentum;
pub mod trend;
pub mod volatility;

pub use engine::{IndicatorConfig, IndicatorEngine};
