//! Position tracking and exit evaluation.

pub mod reconciler;

pub use reconciler::{ExitDecision, ExitReason, ExitThresholds, PortfolioReconciler, PositionState};
