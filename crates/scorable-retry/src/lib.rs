//! Retry manager for Scorable API calls.
//!
//! Wraps any asynchronous operation returning `Result<T, ScorableError>` and
//! re-runs it on failure according to a [`RetryPolicy`]:
//!
//! - **Exponential backoff**: `min(max_delay, base_delay * multiplier^n)`
//! - **Jitter**: full (default), equal, or none, always within `[0, delay]`
//! - **Retry condition**: transient failures only by default (server, quota,
//!   transport); replaceable per policy
//! - **Per-call overrides** and **cancellation** of pending waits
//! - **Event system**: observability through retry events
//!
//! The manager never inspects successful results; only failures drive
//! retry decisions.
//!
//! # Examples
//!
//! ```
//! use scorable_core::ScorableError;
//! use scorable_retry::{Jitter, RetryManager, RetryPolicy};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), ScorableError> {
//! let manager = RetryManager::builder()
//!     .name("judges")
//!     .policy(
//!         RetryPolicy::builder()
//!             .max_retries(2)
//!             .base_delay(Duration::from_millis(100))
//!             .jitter(Jitter::Full)
//!             .build(),
//!     )
//!     .on_retry(|attempt, delay| println!("retry {} after {:?}", attempt, delay))
//!     .build();
//!
//! let score = manager
//!     .execute(|| async { Ok::<_, ScorableError>(0.92) })
//!     .await?;
//! assert_eq!(score, 0.92);
//! # Ok(())
//! # }
//! ```

mod backoff;
mod config;
mod events;
mod layer;
mod policy;

pub use backoff::{ExponentialBackoff, FnInterval, IntervalFunction, Jitter};
pub use config::RetryManagerBuilder;
pub use events::RetryEvent;
pub use layer::{Retry, RetryLayer};
pub use policy::{default_retry_condition, RetryCondition, RetryPolicy, RetryPolicyBuilder};

use crate::config::RetryConfig;
use scorable_core::{ErrorKind, ScorableError};
use std::future::Future;
use std::sync::Arc;
use std::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Re-executes failing operations under a [`RetryPolicy`].
///
/// Cloning is cheap; clones share policy, name and listeners.
#[derive(Clone)]
pub struct RetryManager {
    config: Arc<RetryConfig>,
}

impl RetryManager {
    /// Creates a manager with the given policy and no listeners.
    pub fn new(policy: RetryPolicy) -> Self {
        RetryManagerBuilder::new().policy(policy).build()
    }

    pub fn builder() -> RetryManagerBuilder {
        RetryManagerBuilder::new()
    }

    pub(crate) fn from_config(config: RetryConfig) -> Self {
        #[cfg(feature = "metrics")]
        {
            describe_counter!(
                "retry_calls_total",
                "Total number of retried operations by outcome (success, exhausted, ignored, cancelled)"
            );
            describe_counter!(
                "retry_attempts_total",
                "Total number of retry attempts (excluding the initial attempt)"
            );
        }

        Self {
            config: Arc::new(config),
        }
    }

    pub fn policy(&self) -> &RetryPolicy {
        &self.config.policy
    }

    pub fn name(&self) -> &str {
        &self.config.name
    }

    /// Runs `operation` under the manager's policy.
    ///
    /// `operation` is called once per attempt and must produce a fresh future
    /// each time.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, ScorableError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScorableError>>,
    {
        self.run(operation, &self.config.policy, futures::future::pending::<()>())
            .await
    }

    /// Runs `operation` under `policy` instead of the manager's own.
    pub async fn execute_with<F, Fut, T>(
        &self,
        operation: F,
        policy: &RetryPolicy,
    ) -> Result<T, ScorableError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScorableError>>,
    {
        self.run(operation, policy, futures::future::pending::<()>()).await
    }

    /// Runs `operation` until it settles or `cancel` completes.
    ///
    /// Cancellation abandons the in-flight attempt or backoff wait, makes no
    /// further attempts and returns a [`ErrorKind::Cancelled`] error.
    ///
    /// ```
    /// use scorable_core::{ErrorKind, ScorableError};
    /// use scorable_retry::RetryManager;
    ///
    /// # async fn example() {
    /// let manager = RetryManager::default();
    /// let (stop, stopped) = tokio::sync::oneshot::channel::<()>();
    /// stop.send(()).unwrap();
    ///
    /// let err = manager
    ///     .execute_with_cancel(
    ///         || async { Err::<(), _>(ScorableError::new(503, "x", None, None)) },
    ///         async move {
    ///             let _ = stopped.await;
    ///         },
    ///     )
    ///     .await
    ///     .unwrap_err();
    /// assert_eq!(err.kind(), ErrorKind::Cancelled);
    /// # }
    /// ```
    pub async fn execute_with_cancel<F, Fut, T, C>(
        &self,
        operation: F,
        cancel: C,
    ) -> Result<T, ScorableError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScorableError>>,
        C: Future<Output = ()>,
    {
        self.run(operation, &self.config.policy, cancel).await
    }

    async fn run<F, Fut, T, C>(
        &self,
        mut operation: F,
        policy: &RetryPolicy,
        cancel: C,
    ) -> Result<T, ScorableError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScorableError>>,
        C: Future<Output = ()>,
    {
        let mut cancel = std::pin::pin!(cancel);
        let mut attempt = 0;

        loop {
            let outcome = tokio::select! {
                biased;
                _ = &mut cancel => return Err(self.cancelled(attempt + 1)),
                result = operation() => result,
            };

            let error = match outcome {
                Ok(value) => {
                    self.emit(RetryEvent::Success {
                        component_name: self.config.name.clone(),
                        timestamp: Instant::now(),
                        attempts: attempt + 1,
                    });

                    #[cfg(feature = "metrics")]
                    counter!("retry_calls_total", "retry" => self.config.name.clone(), "result" => "success").increment(1);

                    #[cfg(feature = "tracing")]
                    debug!(retry = %self.config.name, attempts = attempt + 1, "Operation succeeded");

                    return Ok(value);
                }
                Err(error) => error,
            };

            if is_terminal(error.kind()) || !policy.should_retry(&error) {
                self.emit(RetryEvent::IgnoredError {
                    component_name: self.config.name.clone(),
                    timestamp: Instant::now(),
                    attempts: attempt + 1,
                    kind: error.kind(),
                });

                #[cfg(feature = "metrics")]
                counter!("retry_calls_total", "retry" => self.config.name.clone(), "result" => "ignored").increment(1);

                #[cfg(feature = "tracing")]
                debug!(
                    retry = %self.config.name,
                    kind = %error.kind(),
                    status = error.status(),
                    "Error not retryable"
                );

                return Err(error);
            }

            if attempt >= policy.max_retries() {
                self.emit(RetryEvent::Error {
                    component_name: self.config.name.clone(),
                    timestamp: Instant::now(),
                    attempts: attempt + 1,
                    kind: error.kind(),
                });

                #[cfg(feature = "metrics")]
                counter!("retry_calls_total", "retry" => self.config.name.clone(), "result" => "exhausted").increment(1);

                #[cfg(feature = "tracing")]
                warn!(
                    retry = %self.config.name,
                    attempts = attempt + 1,
                    kind = %error.kind(),
                    status = error.status(),
                    "Retries exhausted"
                );

                return Err(error);
            }

            let delay = policy.delay_for(attempt);
            self.emit(RetryEvent::Retry {
                component_name: self.config.name.clone(),
                timestamp: Instant::now(),
                attempt: attempt + 1,
                delay,
                kind: error.kind(),
            });

            #[cfg(feature = "metrics")]
            counter!("retry_attempts_total", "retry" => self.config.name.clone()).increment(1);

            #[cfg(feature = "tracing")]
            debug!(
                retry = %self.config.name,
                attempt = attempt + 1,
                delay_ms = delay.as_millis() as u64,
                kind = %error.kind(),
                "Retrying after failure"
            );

            tokio::select! {
                biased;
                _ = &mut cancel => return Err(self.cancelled(attempt + 1)),
                _ = tokio::time::sleep(delay) => {}
            }

            attempt += 1;
        }
    }

    fn cancelled(&self, attempts: usize) -> ScorableError {
        self.emit(RetryEvent::Cancelled {
            component_name: self.config.name.clone(),
            timestamp: Instant::now(),
            attempts,
        });

        #[cfg(feature = "metrics")]
        counter!("retry_calls_total", "retry" => self.config.name.clone(), "result" => "cancelled").increment(1);

        #[cfg(feature = "tracing")]
        debug!(retry = %self.config.name, attempts, "Operation cancelled");

        ScorableError::cancelled()
    }

    fn emit(&self, event: RetryEvent) {
        self.config.event_listeners.emit(&event);
    }
}

impl Default for RetryManager {
    fn default() -> Self {
        RetryManagerBuilder::new().build()
    }
}

impl std::fmt::Debug for RetryManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RetryManager")
            .field("name", &self.config.name)
            .field("policy", &self.config.policy)
            .finish()
    }
}

// Failures produced by the caller's own limits surface without using a retry.
fn is_terminal(kind: ErrorKind) -> bool {
    matches!(
        kind,
        ErrorKind::QueueFull | ErrorKind::Cancelled | ErrorKind::Timeout
    )
}
