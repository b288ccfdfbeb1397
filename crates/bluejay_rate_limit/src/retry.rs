//! Bounded retry policy for classifier calls.

use bluejay_error::{ClassifierError, ClassifierErrorKind};
use std::future::Future;
use std::time::Duration;
use tokio_retry2::strategy::{ExponentialBackoff, jitter};
use tokio_retry2::{Retry, RetryError};
use tracing::{debug, warn};

/// Bounded attempts with exponential backoff and an overall deadline.
///
/// # Examples
///
/// ```
/// use bluejay_rate_limit::RetryPolicy;
/// use std::time::Duration;
///
/// let policy = RetryPolicy::default();
/// assert_eq!(*policy.max_attempts(), 3);
/// assert_eq!(*policy.total_timeout(), Duration::from_secs(60));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, derive_getters::Getters)]
pub struct RetryPolicy {
    /// Total attempts including the first
    max_attempts: u32,
    /// Base delay of the backoff schedule
    initial_backoff: Duration,
    /// Upper bound for a single delay
    max_backoff: Duration,
    /// Deadline for all attempts together
    total_timeout: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_backoff: Duration::from_secs(1),
            max_backoff: Duration::from_secs(10),
            total_timeout: Duration::from_secs(60),
        }
    }
}

impl RetryPolicy {
    /// Create a policy. `max_attempts` is clamped to at least one.
    pub fn new(
        max_attempts: u32,
        initial_backoff: Duration,
        max_backoff: Duration,
        total_timeout: Duration,
    ) -> Self {
        Self {
            max_attempts: max_attempts.max(1),
            initial_backoff,
            max_backoff,
            total_timeout,
        }
    }

    /// Run `operation` under this policy.
    ///
    /// Retryable failures are retried until attempts run out, which yields
    /// [`ClassifierErrorKind::Exhausted`]. Non-retryable failures are returned
    /// at once. Running past the deadline yields
    /// [`ClassifierErrorKind::Timeout`].
    pub async fn run<T, F, Fut>(&self, mut operation: F) -> Result<T, ClassifierError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ClassifierError>>,
    {
        let strategy = ExponentialBackoff::from_millis(self.initial_backoff.as_millis() as u64)
            .factor(2)
            .max_delay(self.max_backoff)
            .map(jitter)
            .take(self.max_attempts as usize - 1);

        let mut attempt = 0u32;
        let retried = Retry::spawn(strategy, || {
            attempt += 1;
            let current = attempt;
            let call = operation();
            async move {
                match call.await {
                    Ok(value) => Ok(value),
                    Err(e) if e.is_retryable() => {
                        warn!(error = %e, attempt = current, "Classifier call failed, will retry");
                        Err(RetryError::Transient {
                            err: e,
                            retry_after: None,
                        })
                    }
                    Err(e) => {
                        debug!(error = %e, "Permanent classifier error, failing immediately");
                        Err(RetryError::Permanent(e))
                    }
                }
            }
        });

        match tokio::time::timeout(self.total_timeout, retried).await {
            Ok(Ok(value)) => Ok(value),
            Ok(Err(e)) if e.is_retryable() => Err(ClassifierError::new(
                ClassifierErrorKind::Exhausted {
                    attempts: self.max_attempts,
                },
            )),
            Ok(Err(e)) => Err(e),
            Err(_) => Err(ClassifierError::new(ClassifierErrorKind::Timeout(
                self.total_timeout.as_secs(),
            ))),
        }
    }
}
