//! Equity trading engine: technical indicators, composite scoring, risk policy and the
//! per-cycle orchestration that turns them into broker orders.

pub mod common;
pub mod config;
pub mod core;
pub mod error;
pub mod indicators;
pub mod logging;
pub mod metrics;
pub mod models;
pub mod portfolio;
pub mod risk;
pub mod services;
pub mod signals;
pub mod strategies;

pub use error::{EngineError, EngineResult};
