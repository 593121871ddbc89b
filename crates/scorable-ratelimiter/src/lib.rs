//! Sliding-window rate limiter for Scorable API calls.
//!
//! Every call routed through one [`RateLimiter`] contends for the same
//! window: at most `max_requests` admissions within any trailing `window`.
//! A call arriving while the window is full is either rejected or queued,
//! depending on the [`Strategy`].
//!
//! # Features
//!
//! - **Sliding log**: admission times are kept and expire individually
//! - **FIFO queue**: waiters are admitted strictly in arrival order
//! - **Bounded queue**: arrivals beyond `max_queue_size` fail immediately
//! - **Status**: remaining slots, reset time and queue length on demand
//! - **Event system**: observability through rate limiter events
//!
//! # Examples
//!
//! ```
//! use scorable_core::ScorableError;
//! use scorable_ratelimiter::{RateLimitPolicy, RateLimiter, Strategy};
//! use std::time::Duration;
//!
//! # async fn example() -> Result<(), ScorableError> {
//! let limiter = RateLimiter::builder()
//!     .name("scorable")
//!     .policy(
//!         RateLimitPolicy::builder()
//!             .max_requests(50)
//!             .window(Duration::from_secs(60))
//!             .strategy(Strategy::Queue)
//!             .max_queue_size(100)
//!             .build(),
//!     )
//!     .on_permit_rejected(|reason| println!("rejected: {}", reason))
//!     .build();
//!
//! let judges = limiter
//!     .execute(|| async { Ok::<_, ScorableError>(vec!["helpfulness"]) })
//!     .await?;
//! assert_eq!(judges.len(), 1);
//! assert_eq!(limiter.status().requests_remaining, 49);
//! # Ok(())
//! # }
//! ```

mod config;
mod events;
mod layer;
mod policy;
mod window;

pub use config::RateLimiterBuilder;
pub use events::{RateLimiterEvent, RejectionReason};
pub use layer::{RateLimit, RateLimiterLayer};
pub use policy::{RateLimitPolicy, RateLimitPolicyBuilder, Strategy};

use crate::window::WindowState;
use scorable_core::events::EventListeners;
use scorable_core::ScorableError;
use std::future::Future;
use std::sync::{Arc, Mutex, MutexGuard};
use std::time::Duration;
use tokio::sync::Notify;
use tokio::time::Instant;

#[cfg(feature = "metrics")]
use metrics::{counter, describe_counter, describe_histogram, histogram};

#[cfg(feature = "tracing")]
use tracing::{debug, warn};

/// Snapshot of a limiter's window.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RateLimitStatus {
    /// Slots still free in the current window.
    pub requests_remaining: usize,
    /// When the oldest admission leaves the window; `now` when none are held.
    pub reset_time: Instant,
    /// Time until `reset_time`.
    pub reset_after: Duration,
    /// Callers currently waiting for a slot.
    pub queue_size: usize,
}

struct Inner {
    policy: RateLimitPolicy,
    state: Mutex<WindowState>,
    notify: Notify,
    event_listeners: EventListeners<RateLimiterEvent>,
    name: String,
}

/// Shared sliding-window limiter.
///
/// Cloning is cheap and clones share one window and one queue, so a client
/// holds exactly one limiter for all its calls.
#[derive(Clone)]
pub struct RateLimiter {
    inner: Arc<Inner>,
}

impl RateLimiter {
    /// Creates a limiter with the given policy and no listeners.
    pub fn new(policy: RateLimitPolicy) -> Self {
        RateLimiterBuilder::new().policy(policy).build()
    }

    pub fn builder() -> RateLimiterBuilder {
        RateLimiterBuilder::new()
    }

    pub(crate) fn from_parts(
        policy: RateLimitPolicy,
        event_listeners: EventListeners<RateLimiterEvent>,
        name: String,
    ) -> Self {
        #[cfg(feature = "metrics")]
        {
            describe_counter!(
                "ratelimiter_calls_total",
                "Total number of rate limiter decisions (acquired, throttled, queue_full)"
            );
            describe_histogram!(
                "ratelimiter_wait_duration_seconds",
                "Time callers spent queued before admission"
            );
        }

        Self {
            inner: Arc::new(Inner {
                policy,
                state: Mutex::new(WindowState::new()),
                notify: Notify::new(),
                event_listeners,
                name,
            }),
        }
    }

    pub fn policy(&self) -> &RateLimitPolicy {
        &self.inner.policy
    }

    pub fn name(&self) -> &str {
        &self.inner.name
    }

    /// Waits for a slot and returns how long the caller was queued.
    ///
    /// Fails with a `429/"throttled"` error under [`Strategy::Reject`] when
    /// the window is full, or a `429/"queue_full"` error when the queue is at
    /// capacity. Dropping the returned future while queued gives the place
    /// up to the next waiter.
    pub async fn acquire(&self) -> Result<Duration, ScorableError> {
        let policy = &self.inner.policy;
        let arrived = Instant::now();

        let (ticket, queue_size) = {
            let mut state = self.lock();
            state.prune(arrived, policy.window());

            if state.queue_is_empty() && state.has_slot(policy.max_requests()) {
                state.admit(arrived);
                drop(state);
                self.on_acquired(Duration::ZERO);
                return Ok(Duration::ZERO);
            }

            match policy.strategy() {
                Strategy::Reject => {
                    let retry_after = state
                        .reset_time(arrived, policy.window())
                        .saturating_duration_since(arrived);
                    drop(state);
                    self.on_rejected(RejectionReason::Throttled);
                    return Err(ScorableError::throttled(Some(retry_after)));
                }
                Strategy::Queue => {
                    if state.queue_len() >= policy.max_queue_size() {
                        drop(state);
                        self.on_rejected(RejectionReason::QueueFull);
                        return Err(ScorableError::queue_full(policy.max_queue_size()));
                    }
                    let ticket = state.enqueue();
                    (ticket, state.queue_len())
                }
            }
        };

        self.emit(RateLimiterEvent::Queued {
            component_name: self.inner.name.clone(),
            timestamp: std::time::Instant::now(),
            queue_size,
        });

        #[cfg(feature = "tracing")]
        debug!(ratelimiter = %self.inner.name, queue_size, "Call queued");

        let mut waiter = Waiter {
            inner: &self.inner,
            ticket,
            admitted: false,
        };

        loop {
            // Registered before the state check so a release in between is
            // not missed.
            let released = self.inner.notify.notified();

            let wake_at = {
                let mut state = self.lock();
                let now = Instant::now();
                state.prune(now, policy.window());

                if state.is_head(ticket) {
                    if state.has_slot(policy.max_requests()) {
                        state.pop_head();
                        state.admit(now);
                        waiter.admitted = true;
                        drop(state);

                        // The next head may fit in the same window.
                        self.inner.notify.notify_waiters();

                        let waited = now.saturating_duration_since(arrived);
                        self.on_acquired(waited);
                        return Ok(waited);
                    }
                    Some(state.reset_time(now, policy.window()))
                } else {
                    None
                }
            };

            match wake_at {
                Some(deadline) => {
                    tokio::select! {
                        _ = released => {}
                        _ = tokio::time::sleep_until(deadline) => {}
                    }
                }
                None => released.await,
            }
        }
    }

    /// Acquires a slot, then runs `operation`.
    ///
    /// The operation never runs when admission fails.
    pub async fn execute<F, Fut, T>(&self, operation: F) -> Result<T, ScorableError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ScorableError>>,
    {
        self.acquire().await?;
        operation().await
    }

    /// Current window usage.
    pub fn status(&self) -> RateLimitStatus {
        let policy = &self.inner.policy;
        let now = Instant::now();
        let mut state = self.lock();
        state.prune(now, policy.window());

        let reset_time = state.reset_time(now, policy.window());
        RateLimitStatus {
            requests_remaining: policy.max_requests().saturating_sub(state.in_window()),
            reset_time,
            reset_after: reset_time.saturating_duration_since(now),
            queue_size: state.queue_len(),
        }
    }

    fn lock(&self) -> MutexGuard<'_, WindowState> {
        self.inner.lock()
    }

    fn on_acquired(&self, wait_duration: Duration) {
        self.emit(RateLimiterEvent::PermitAcquired {
            component_name: self.inner.name.clone(),
            timestamp: std::time::Instant::now(),
            wait_duration,
        });

        #[cfg(feature = "metrics")]
        {
            counter!("ratelimiter_calls_total", "ratelimiter" => self.inner.name.clone(), "result" => "acquired").increment(1);
            histogram!("ratelimiter_wait_duration_seconds", "ratelimiter" => self.inner.name.clone())
                .record(wait_duration.as_secs_f64());
        }

        #[cfg(feature = "tracing")]
        debug!(
            ratelimiter = %self.inner.name,
            wait_ms = wait_duration.as_millis() as u64,
            "Permit acquired"
        );
    }

    fn on_rejected(&self, reason: RejectionReason) {
        self.emit(RateLimiterEvent::PermitRejected {
            component_name: self.inner.name.clone(),
            timestamp: std::time::Instant::now(),
            reason,
        });

        #[cfg(feature = "metrics")]
        counter!("ratelimiter_calls_total", "ratelimiter" => self.inner.name.clone(), "result" => reason.as_str()).increment(1);

        #[cfg(feature = "tracing")]
        warn!(ratelimiter = %self.inner.name, %reason, "Permit rejected");
    }

    fn emit(&self, event: RateLimiterEvent) {
        self.inner.event_listeners.emit(&event);
    }
}

impl Inner {
    // A panicking listener never runs under the lock, so poisoning only
    // follows a bug elsewhere; the window itself stays consistent.
    fn lock(&self) -> MutexGuard<'_, WindowState> {
        self.state.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }
}

impl Default for RateLimiter {
    fn default() -> Self {
        RateLimiterBuilder::new().build()
    }
}

impl std::fmt::Debug for RateLimiter {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RateLimiter")
            .field("name", &self.inner.name)
            .field("policy", &self.inner.policy)
            .finish()
    }
}

/// Queue position of one caller; releases it if the caller goes away.
struct Waiter<'a> {
    inner: &'a Inner,
    ticket: u64,
    admitted: bool,
}

impl Drop for Waiter<'_> {
    fn drop(&mut self) {
        if self.admitted {
            return;
        }
        let removed = self.inner.lock().remove(self.ticket);
        if removed {
            self.inner.notify.notify_waiters();
        }
    }
}
