//! Collaborators at the engine boundary: broker, ticker universe and retry plumbing.

pub mod adapter;
pub mod broker;
pub mod market_data;
pub mod paper;
pub mod remote;
pub mod retry;

pub use broker::BrokerPort;
pub use market_data::{FallbackTickerSource, StaticTickerSource, TickerSource, DEFAULT_TICKERS};
pub use paper::PaperBroker;
pub use remote::RemoteTickerSource;
pub use retry::{with_backoff, RetryPolicy};
