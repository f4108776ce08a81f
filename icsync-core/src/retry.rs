//! Bounded retry with exponential backoff for store writes.

use std::future::Future;
use std::time::Duration;

use serde::Deserialize;

use crate::error::SyncResult;

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub initial_backoff_ms: u64,
    pub max_backoff_ms: u64,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff_ms: 500,
            max_backoff_ms: 8_000,
        }
    }
}

impl RetryPolicy {
    /// A single attempt, no retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Sleep before attempt `attempt + 1`.
    pub fn delay(&self, attempt: u32) -> Duration {
        let exponent = 2u64.saturating_pow(attempt.saturating_sub(1));
        let millis = self
            .initial_backoff_ms
            .saturating_mul(exponent)
            .min(self.max_backoff_ms);
        Duration::from_millis(millis)
    }
}

/// Run `op` until it succeeds, fails with a non-retryable error, or runs out
/// of attempts. Returns the last result with the number of attempts made.
pub async fn with_retry<T, F, Fut>(policy: &RetryPolicy, what: &str, mut op: F) -> (SyncResult<T>, u32)
where
    F: FnMut() -> Fut,
    Fut: Future<Output = SyncResult<T>>,
{
    let attempts = policy.max_attempts.max(1);
    let mut attempt = 1;

    loop {
        match op().await {
            Err(e) if e.is_retryable() && attempt < attempts => {
                let delay = policy.delay(attempt);
                tracing::warn!(
                    what,
                    attempt,
                    attempts,
                    ?delay,
                    error = %e,
                    "write failed, retrying"
                );
                tokio::time::sleep(delay).await;
                attempt += 1;
            }
            result => return (result, attempt),
        }
    }
}
