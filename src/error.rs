//! Error taxonomy shared by the decision engine and its collaborators.

use thiserror::Error;

/// Errors raised while turning price history into orders.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum EngineError {
    /// Too few price bars to compute every indicator. Local, never retried.
    #[error("insufficient data: need {required} bars, got {actual}")]
    InsufficientData { required: usize, actual: usize },

    /// The broker could not produce a quote for the ticker.
    #[error("quote unavailable for {ticker}: {reason}")]
    QuoteUnavailable { ticker: String, reason: String },

    /// Transport-level failure talking to an external service.
    #[error("connectivity error: {0}")]
    Connectivity(String),

    /// Non-positive price or quantity handed to a sizing or order routine.
    #[error("invalid price for {ticker}: {value}")]
    InvalidPrice { ticker: String, value: f64 },

    /// Exit evaluation asked for a ticker that is not in the holdings snapshot.
    #[error("{ticker} is not held")]
    NotHeld { ticker: String },

    /// Malformed risk, weight or scheduling settings. Fatal at startup.
    #[error("configuration error: {0}")]
    Configuration(String),
}

impl EngineError {
    /// Whether the caller may retry the failed call with backoff.
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            EngineError::QuoteUnavailable { .. } | EngineError::Connectivity(_)
        )
    }

    pub fn quote_unavailable(ticker: impl Into<String>, reason: impl Into<String>) -> Self {
        EngineError::QuoteUnavailable {
            ticker: ticker.into(),
            reason: reason.into(),
        }
    }

    pub fn invalid_price(ticker: impl Into<String>, value: f64) -> Self {
        EngineError::InvalidPrice {
            ticker: ticker.into(),
            value,
        }
    }
}

impl From<reqwest::Error> for EngineError {
    fn from(err: reqwest::Error) -> Self {
        EngineError::Connectivity(err.to_string())
    }
}

pub type EngineResult<T> = Result<T, EngineError>;
