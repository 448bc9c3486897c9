//! Core application primitives (orchestrator, scheduling, market session)

pub mod bootstrap;
pub mod cycle;
pub mod scheduler;
pub mod session;

pub use cycle::{CandidateMode, CandidateSource, CycleSettings, SessionReport, TradingCycleOrchestrator};
pub use scheduler::CycleScheduler;
pub use session::{is_pre_market, is_regular_session, market_phase, us_eastern_now, MarketPhase};
