//! Bounded retries with uniform random jitter.
//!
//! The delay is a flat random range rather than exponential backoff: the
//! failures this tool sees are remote-side rate limiting and path-lock
//! contention between its own workers, so spacing attempts apart randomly is
//! what matters.

use std::future::Future;
use std::time::Duration;

use rand::Rng;
use tokio_util::sync::CancellationToken;

use uplink_storage::{StorageError, StorageResult};

/// Retry configuration for a fallible async operation.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    pub max_retries: u32,
    pub min_delay: Duration,
    pub max_delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_retries: 3,
            min_delay: Duration::from_millis(500),
            max_delay: Duration::from_millis(2000),
        }
    }
}

impl RetryPolicy {
    /// Run `op` up to `max_retries + 1` times.
    ///
    /// Returns the first success, stops immediately on a non-retryable error
    /// or cancellation, and otherwise sleeps a random duration in
    /// `[min_delay, max_delay]` between attempts. The final attempt's error is
    /// returned unchanged so callers can inspect the original kind.
    pub async fn run<T, F, Fut>(
        &self,
        cancel: &CancellationToken,
        mut op: F,
    ) -> StorageResult<T>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = StorageResult<T>>,
    {
        let mut attempt: u32 = 0;
        loop {
            if cancel.is_cancelled() {
                return Err(StorageError::Cancelled);
            }

            let result = tokio::select! {
                result = op() => result,
                _ = cancel.cancelled() => return Err(StorageError::Cancelled),
            };

            match result {
                Ok(value) => return Ok(value),
                Err(err) if !err.is_retryable() => return Err(err),
                Err(err) => {
                    if attempt >= self.max_retries {
                        return Err(err);
                    }
                    attempt += 1;
                    tracing::warn!(
                        attempt,
                        max_retries = self.max_retries,
                        error = %err,
                        "Attempt failed, retrying after jittered delay"
                    );
                    self.sleep_jittered(cancel).await?;
                }
            }
        }
    }

    async fn sleep_jittered(&self, cancel: &CancellationToken) -> StorageResult<()> {
        let delay = jittered_delay(self.min_delay, self.max_delay);
        tokio::select! {
            _ = tokio::time::sleep(delay) => Ok(()),
            _ = cancel.cancelled() => Err(StorageError::Cancelled),
        }
    }
}

fn jittered_delay(min: Duration, max: Duration) -> Duration {
    if max <= min {
        return min;
    }
    rand::rng().random_range(min..=max)
}
