use crate::events::RetryEvent;
use crate::policy::RetryPolicy;
use crate::RetryManager;
use scorable_core::events::{EventListeners, FnListener};
use scorable_core::ErrorKind;
use std::time::Duration;

/// Settings shared by every clone of a [`RetryManager`].
pub(crate) struct RetryConfig {
    pub(crate) policy: RetryPolicy,
    pub(crate) event_listeners: EventListeners<RetryEvent>,
    pub(crate) name: String,
}

/// Builder for [`RetryManager`].
pub struct RetryManagerBuilder {
    policy: RetryPolicy,
    event_listeners: EventListeners<RetryEvent>,
    name: String,
}

impl Default for RetryManagerBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl RetryManagerBuilder {
    /// Creates a new builder with [`RetryPolicy::default`] and no listeners.
    pub fn new() -> Self {
        Self {
            policy: RetryPolicy::default(),
            event_listeners: EventListeners::new(),
            name: "<unnamed>".to_string(),
        }
    }

    /// Sets the policy used by [`RetryManager::execute`].
    pub fn policy(mut self, policy: RetryPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Sets the name reported in events, logs and metrics.
    pub fn name<S: Into<String>>(mut self, name: S) -> Self {
        self.name = name.into();
        self
    }

    /// Registers a callback invoked before each backoff wait.
    ///
    /// Receives the 1-indexed retry number and the delay about to be slept.
    ///
    /// # Example
    /// ```rust
    /// use scorable_retry::RetryManager;
    ///
    /// let manager = RetryManager::builder()
    ///     .on_retry(|attempt, delay| {
    ///         println!("retry {} in {:?}", attempt, delay);
    ///     })
    ///     .build();
    /// ```
    pub fn on_retry<F>(mut self, f: F) -> Self
    where
        F: Fn(usize, Duration) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Retry { attempt, delay, .. } = event {
                f(*attempt, *delay);
            }
        }));
        self
    }

    /// Registers a callback invoked on success with the total attempt count.
    pub fn on_success<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Success { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback invoked when every allowed attempt has failed.
    pub fn on_error<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Error { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    /// Registers a callback invoked when a failure is surfaced without retry
    /// because the retry condition rejected it.
    pub fn on_ignored_error<F>(mut self, f: F) -> Self
    where
        F: Fn(ErrorKind) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::IgnoredError { kind, .. } = event {
                f(*kind);
            }
        }));
        self
    }

    /// Registers a callback invoked when the caller cancels mid-flight.
    pub fn on_cancelled<F>(mut self, f: F) -> Self
    where
        F: Fn(usize) + Send + Sync + 'static,
    {
        self.event_listeners.add(FnListener::new(move |event| {
            if let RetryEvent::Cancelled { attempts, .. } = event {
                f(*attempts);
            }
        }));
        self
    }

    pub fn build(self) -> RetryManager {
        RetryManager::from_config(RetryConfig {
            policy: self.policy,
            event_listeners: self.event_listeners,
            name: self.name,
        })
    }
}
