//! Risk profiles and position sizing.

pub mod profile;
pub mod sizing;

pub use profile::RiskProfile;
pub use sizing::{ExitLevels, PositionSizer};
