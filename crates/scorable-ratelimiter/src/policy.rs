use scorable_core::ConfigError;
use std::time::Duration;

/// What happens to a call that arrives while the window is full.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Strategy {
    /// Wait in FIFO order until a slot frees, up to `max_queue_size` waiters.
    #[default]
    Queue,
    /// Fail immediately with a quota error.
    Reject,
}

/// Immutable sliding-window settings.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RateLimitPolicy {
    max_requests: usize,
    window: Duration,
    strategy: Strategy,
    max_queue_size: usize,
}

impl RateLimitPolicy {
    pub fn builder() -> RateLimitPolicyBuilder {
        RateLimitPolicyBuilder::new()
    }

    /// Requests admitted per trailing window.
    pub fn max_requests(&self) -> usize {
        self.max_requests
    }

    pub fn window(&self) -> Duration {
        self.window
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    /// Waiters allowed at once. Ignored by [`Strategy::Reject`].
    pub fn max_queue_size(&self) -> usize {
        self.max_queue_size
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        RateLimitPolicyBuilder::new().build()
    }
}

/// Builder for [`RateLimitPolicy`].
#[derive(Debug, Clone)]
pub struct RateLimitPolicyBuilder {
    max_requests: usize,
    window: Duration,
    strategy: Strategy,
    max_queue_size: usize,
}

impl Default for RateLimitPolicyBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimitPolicyBuilder {
    /// Creates a new builder with defaults.
    ///
    /// Defaults:
    /// - max_requests: 100
    /// - window: 60s
    /// - strategy: [`Strategy::Queue`]
    /// - max_queue_size: 100
    pub fn new() -> Self {
        Self {
            max_requests: 100,
            window: Duration::from_secs(60),
            strategy: Strategy::Queue,
            max_queue_size: 100,
        }
    }

    /// Maximum admissions within any trailing `window`. Must be non-zero.
    pub fn max_requests(mut self, max_requests: usize) -> Self {
        self.max_requests = max_requests;
        self
    }

    /// Length of the sliding window. Must be non-zero.
    pub fn window(mut self, window: Duration) -> Self {
        self.window = window;
        self
    }

    pub fn strategy(mut self, strategy: Strategy) -> Self {
        self.strategy = strategy;
        self
    }

    /// Maximum number of queued callers. New arrivals beyond it fail with a
    /// queue-full error.
    pub fn max_queue_size(mut self, max_queue_size: usize) -> Self {
        self.max_queue_size = max_queue_size;
        self
    }

    /// Builds the policy, rejecting out-of-range values.
    pub fn try_build(self) -> Result<RateLimitPolicy, ConfigError> {
        if self.max_requests == 0 {
            return Err(ConfigError::out_of_range("max_requests", "> 0", self.max_requests));
        }
        if self.window.is_zero() {
            return Err(ConfigError::out_of_range("window", "> 0", self.window));
        }
        Ok(self.assemble())
    }

    /// Builds the policy, raising zero `max_requests` to 1 and a zero
    /// `window` to 1ms.
    pub fn build(mut self) -> RateLimitPolicy {
        self.max_requests = self.max_requests.max(1);
        if self.window.is_zero() {
            self.window = Duration::from_millis(1);
        }
        self.assemble()
    }

    fn assemble(self) -> RateLimitPolicy {
        RateLimitPolicy {
            max_requests: self.max_requests,
            window: self.window,
            strategy: self.strategy,
            max_queue_size: self.max_queue_size,
        }
    }
}
