use crate::events::{RateLimiterEvent, RejectionReason};
use crate::policy::RateLimitPolicy;
use crate::RateLimiter;
use scorable_core::events::{EventListeners, FnListener};
use std::time::Duration;

/// Builder for [`RateLimiter`].
pub struct RateLimiterBuilder {
    policy: RateLimitPolicy,
    event_listeners: EventListeners<RateLimiterEvent>,
    name: String,
}

impl Default for RateLimiterBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RateLimiterBuilder {
    /// Creates a new builder with [`RateLimitPolicy::default`] and the name
    /// `"<unnamed>"`.
    pub fn new() -> Self {
        Self {
            policy: RateLimitPolicy::default(),
            event_listeners: EventListeners::new(),
            name: "<unnamed>".to_string(),
        }
    }

    pub fn policy(mut self, policy: RateLimitPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the name for this rate limiter instance (used in events).
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback when a permit is acquired.
    ///
    /// Called with the time the caller spent queued; zero when a slot was
    /// free on arrival.
    ///
    /// # Example
    /// ```rust
    /// use scorable_ratelimiter::RateLimiter;
    /// use std::time::Duration;
    ///
    /// let limiter = RateLimiter::builder()
    ///     .on_permit_acquired(|waited| {
    ///         if waited > Duration::ZERO {
    ///             println!("queued for {:?}", waited);
    ///         }
    ///     })
    ///     .build();
    /// ```
    pub fn on_permit_acquired<F>(mut self, f: F) -> Self
    where
        F: Fn(Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RateLimiterEvent::PermitAcquired { wait_duration, .. } = event {
                f(*wait_duration);
            }
        }));
        self
    }

    /// Registers a callback when a caller is refused, either because the
    /// window is full under [`Strategy::Reject`](crate::Strategy::Reject) or
    /// because the queue is full.
    pub fn on_permit_rejected<F>(mut self, f: F) -> Self
    where
        F: Fn(RejectionReason) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RateLimiterEvent::PermitRejected { reason, .. } = event {
                f(*reason);
            }
        }));
        self
    }

    /// Registers a callback when a caller joins the wait queue.
    ///
    /// Called with the queue length including the new caller.
    pub fn on_queued<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RateLimiterEvent::Queued { queue_size, .. } = event {
                f(*queue_size);
            }
        }));
        self
    }

    pub fn build(self) -> RateLimiter {
        RateLimiter::from_parts(self.policy, self.event_listeners, self.name)
    }
}
