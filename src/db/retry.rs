use std::{future::Future, time::Duration};

use tracing::{debug, error, warn};

use super::StorageError;

/// Fixed-delay retry: up to `max_attempts` tries, sleeping `delay` between
/// them, for errors that `retryable` accepts. No backoff, no jitter.
#[derive(Clone, Copy)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
    pub retryable: fn(&StorageError) -> bool,
}

impl std::fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_attempts", &self.max_attempts)
            .field("delay", &self.delay)
            .finish_non_exhaustive()
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::fixed(5, Duration::from_secs(1))
    }
}

impl RetryPolicy {
    /// Retries only transient storage failures.
    pub fn fixed(max_attempts: u32, delay: Duration) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            delay,
            retryable: StorageError::is_transient,
        }
    }

    pub async fn run<T, F, Fut>(&self, mut op: F) -> Result<T, StorageError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, StorageError>>,
    {
        let mut attempt = 1;
        loop {
            match op().await {
                Ok(value) => return Ok(value),
                Err(err) if (self.retryable)(&err) => {
                    if attempt >= self.max_attempts {
                        error!(error = %err, attempts = attempt, "database operation failed");
                        return Err(err);
                    }
                    warn!(error = %err, attempt, max_attempts = self.max_attempts, "database busy; retrying");
                    tokio::time::sleep(self.delay).await;
                    attempt += 1;
                }
                Err(err) => {
                    debug!(error = %err, "database operation failed; not retryable");
                    return Err(err);
                }
            }
        }
    }
}
