use crate::backoff::{ExponentialBackoff, IntervalFunction, Jitter};
use scorable_core::{ConfigError, ScorableError};
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

/// Decides whether a failed attempt may be retried.
pub type RetryCondition = Arc<dyn Fn(&ScorableError) -> bool + Send + Sync>;

/// Retries transport failures, server errors and quota errors only.
///
/// Validation, not-found and authentication failures are permanent for an
/// identical request and are surfaced immediately.
pub fn default_retry_condition(error: &ScorableError) -> bool {
    error.is_transient()
}

/// Immutable retry settings.
///
/// `max_retries` counts retries, not attempts: `max_retries = 0` runs the
/// operation exactly once.
#[derive(Clone)]
pub struct RetryPolicy {
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f64,
    jitter: Jitter,
    interval_fn: Arc<dyn IntervalFunction>,
    retry_condition: Option<RetryCondition>,
}

impl RetryPolicy {
    pub fn builder() -> RetryPolicyBuilder {
        RetryPolicyBuilder::new()
    }

    pub fn max_retries(&self) -> usize {
        self.max_retries
    }

    pub fn base_delay(&self) -> Duration {
        self.base_delay
    }

    pub fn max_delay(&self) -> Duration {
        self.max_delay
    }

    pub fn backoff_multiplier(&self) -> f64 {
        self.backoff_multiplier
    }

    pub fn jitter(&self) -> Jitter {
        self.jitter
    }

    /// Applies the configured retry condition (or the default one).
    pub fn should_retry(&self, error: &ScorableError) -> bool {
        match &self.retry_condition {
            Some(condition) => condition(error),
            None => default_retry_condition(error),
        }
    }

    /// Delay between attempt `attempt` and `attempt + 1`, never above `max_delay`.
    pub fn delay_for(&self, attempt: usize) -> Duration {
        self.interval_fn.next_interval(attempt).min(self.max_delay)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        RetryPolicyBuilder::new().build()
    }
}

impl fmt::Debug for RetryPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("RetryPolicy")
            .field("max_retries", &self.max_retries)
            .field("base_delay", &self.base_delay)
            .field("max_delay", &self.max_delay)
            .field("backoff_multiplier", &self.backoff_multiplier)
            .field("jitter", &self.jitter)
            .field("custom_condition", &self.retry_condition.is_some())
            .finish()
    }
}

/// Builder for [`RetryPolicy`].
pub struct RetryPolicyBuilder {
    max_retries: usize,
    base_delay: Duration,
    max_delay: Duration,
    backoff_multiplier: f64,
    jitter: Jitter,
    interval_fn: Option<Arc<dyn IntervalFunction>>,
    retry_condition: Option<RetryCondition>,
}

impl Default for RetryPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryPolicyBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - max_retries: 3
    /// - base_delay: 1s
    /// - max_delay: 30s
    /// - backoff_multiplier: 2.0
    /// - jitter: [`Jitter::Full`]
    /// - retry condition: [`default_retry_condition`]
    pub fn new() -> Self {
        Self {
            max_retries: 3,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(30),
            backoff_multiplier: 2.0,
            jitter: Jitter::Full,
            interval_fn: None,
            retry_condition: None,
        }
    }

    /// Number of retries after the initial attempt.
    pub fn max_retries(mut self, max_retries: usize) -> Self {
        self.max_retries = max_retries;
        self
    }

    /// Delay before the first retry. Must be non-zero.
    pub fn base_delay(mut self, delay: Duration) -> Self {
        self.base_delay = delay;
        self
    }

    /// Upper bound for any single delay. Must be at least `base_delay`.
    pub fn max_delay(mut self, delay: Duration) -> Self {
        self.max_delay = delay;
        self
    }

    /// Growth factor between consecutive delays. Must be greater than 1.
    pub fn backoff_multiplier(mut self, multiplier: f64) -> Self {
        self.backoff_multiplier = multiplier;
        self
    }

    pub fn jitter(mut self, jitter: Jitter) -> Self {
        self.jitter = jitter;
        self
    }

    /// Replaces the exponential schedule with a custom one.
    ///
    /// Delays are still capped at `max_delay`.
    pub fn backoff<I>(mut self, interval_fn: I) -> Self
    where
        I: IntervalFunction + 'static,
    {
        self.interval_fn = Some(Arc::new(interval_fn));
        self
    }

    /// Replaces the default retry condition.
    ///
    /// Queue-full, cancellation and timeout failures are never retried,
    /// whatever the condition returns.
    pub fn retry_on<F>(mut self, condition: F) -> Self
    where
        F: Fn(&ScorableError) -> bool + Send + Sync + 'static,
    {
        self.retry_condition = Some(Arc::new(condition));
        self
    }

    /// Builds the policy, rejecting out-of-range values.
    pub fn try_build(self) -> Result<RetryPolicy, ConfigError> {
        if self.base_delay.is_zero() {
            return Err(ConfigError::out_of_range("base_delay", "> 0", self.base_delay));
        }
        if self.max_delay < self.base_delay {
            return Err(ConfigError::out_of_range(
                "max_delay",
                ">= base_delay",
                self.max_delay,
            ));
        }
        if !(self.backoff_multiplier.is_finite() && self.backoff_multiplier > 1.0) {
            return Err(ConfigError::out_of_range(
                "backoff_multiplier",
                "> 1.0",
                self.backoff_multiplier,
            ));
        }
        Ok(self.assemble())
    }

    /// Builds the policy, replacing out-of-range values.
    ///
    /// A zero `base_delay` becomes 1ms, a `max_delay` below `base_delay` is
    /// raised to it, and an invalid multiplier falls back to 2.0.
    pub fn build(mut self) -> RetryPolicy {
        if self.base_delay.is_zero() {
            self.base_delay = Duration::from_millis(1);
        }
        if self.max_delay < self.base_delay {
            self.max_delay = self.base_delay;
        }
        if !(self.backoff_multiplier.is_finite() && self.backoff_multiplier > 1.0) {
            self.backoff_multiplier = 2.0;
        }
        self.assemble()
    }

    fn assemble(self) -> RetryPolicy {
        let interval_fn = self.interval_fn.unwrap_or_else(|| {
            Arc::new(
                ExponentialBackoff::new(self.base_delay)
                    .multiplier(self.backoff_multiplier)
                    .max_delay(self.max_delay)
                    .jitter(self.jitter),
            )
        });

        RetryPolicy {
            max_retries: self.max_retries,
            base_delay: self.base_delay,
            max_delay: self.max_delay,
            backoff_multiplier: self.backoff_multiplier,
            jitter: self.jitter,
            interval_fn,
            retry_condition: self.retry_condition,
        }
    }
}
