//! Signal evaluation: factor scoring, aggregation and classification.

pub mod aggregation;
pub mod categories;
pub mod decision;
pub mod engine;
pub mod scoring;

pub use aggregation::*;
pub use categories::*;
pub use decision::*;
pub use engine::SignalEngine;
pub use scoring::*;
