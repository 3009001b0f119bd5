//! Retry with exponential backoff for transient store failures.

use std::future::Future;
use std::time::Duration;

use crate::config::database::DatabaseConfig;
use crate::result::AppResult;

/// Bounded exponential backoff.
///
/// The first retry waits `base_delay`, each following retry doubles the
/// wait, and no wait exceeds `max_delay`. Only errors whose kind is
/// transient are retried.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    /// Retries after the first attempt.
    pub max_retries: u32,
    /// Wait before the first retry.
    pub base_delay: Duration,
    /// Upper bound on any single wait.
    pub max_delay: Duration,
}

impl RetryPolicy {
    /// Create a policy with a one second base delay.
    pub fn new(max_retries: u32, max_delay: Duration) -> Self {
        Self {
            max_retries,
            base_delay: Duration::from_secs(1),
            max_delay,
        }
    }

    /// A policy that never retries.
    pub fn none() -> Self {
        Self::new(0, Duration::ZERO)
    }

    /// Build the policy from the database settings.
    pub fn from_config(config: &DatabaseConfig) -> Self {
        Self::new(
            config.max_retries,
            Duration::from_secs(config.max_retry_delay_seconds),
        )
    }

    /// Wait before retry number `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let multiplier = 2_u32.saturating_pow(attempt.saturating_sub(1));
        self.base_delay
            .saturating_mul(multiplier)
            .min(self.max_delay)
    }

    /// Run `operation`, retrying transient failures.
    pub async fn run<T, F, Fut>(&self, name: &str, mut operation: F) -> AppResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = AppResult<T>>,
    {
        let mut attempt = 0;
        loop {
            match operation().await {
                Ok(value) => {
                    if attempt > 0 {
                        tracing::info!(operation = name, attempts = attempt + 1, "Recovered after retry");
                    }
                    return Ok(value);
                }
                Err(e) if e.is_transient() && attempt < self.max_retries => {
                    attempt += 1;
                    let delay = self.delay_for(attempt);
                    tracing::warn!(
                        operation = name,
                        attempt,
                        delay_ms = delay.as_millis() as u64,
                        error = %e,
                        "Transient failure, retrying"
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(e) => return Err(e),
            }
        }
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::new(3, Duration::from_secs(30))
    }
}
