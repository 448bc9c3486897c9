//! Bounded exponential backoff for transient broker reads.

use std::future::Future;
use std::time::Duration;

use backon::{ExponentialBuilder, Retryable};
use tracing::warn;

use crate::error::EngineError;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RetryPolicy {
    pub min_delay: Duration,
    pub factor: f32,
    pub max_retries: usize,
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            min_delay: Duration::from_millis(500),
            factor: 2.0,
            max_retries: 3,
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// Single attempt, no sleeping.
    pub fn none() -> Self {
        Self {
            max_retries: 0,
            ..Self::default()
        }
    }

    pub fn with_min_delay(mut self, delay: Duration) -> Self {
        self.min_delay = delay;
        self
    }

    pub fn with_max_retries(mut self, retries: usize) -> Self {
        self.max_retries = retries;
        self
    }

    pub fn without_jitter(mut self) -> Self {
        self.jitter = false;
        self
    }

    fn builder(&self) -> ExponentialBuilder {
        let builder = ExponentialBuilder::default()
            .with_min_delay(self.min_delay)
            .with_factor(self.factor)
            .with_max_times(self.max_retries);
        if self.jitter {
            builder.with_jitter()
        } else {
            builder
        }
    }
}

/// Run `call` and retry it while it fails with a transient error.
///
/// Non-transient errors are returned on the first failure.
pub async fn with_backoff<T, F, Fut>(policy: &RetryPolicy, operation: &str, call: F) -> Result<T, EngineError>
where
    F: FnMut() -> Fut,
    Fut: Future<Output = Result<T, EngineError>>,
{
    call.retry(policy.builder())
        .sleep(tokio::time::sleep)
        .when(EngineError::is_transient)
        .notify(|err: &EngineError, delay: Duration| {
            warn!(
                operation = %operation,
                error = %err,
                delay_ms = delay.as_millis() as u64,
                "Retry: {} failed, retrying in {:?}",
                operation,
                delay
            );
        })
        .await
}
