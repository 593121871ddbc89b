use scorable_core::events::ClientEvent;
use std::fmt;
use std::time::{Duration, Instant};

/// Why a caller was refused a permit.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectionReason {
    /// The window was full and the strategy is [`Strategy::Reject`](crate::Strategy::Reject).
    Throttled,
    /// The wait queue was at `max_queue_size`.
    QueueFull,
}

impl RejectionReason {
    pub fn as_str(self) -> &'static str {
        match self {
            RejectionReason::Throttled => "throttled",
            RejectionReason::QueueFull => "queue_full",
        }
    }
}

impl fmt::Display for RejectionReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Events emitted by the [`RateLimiter`](crate::RateLimiter).
#[derive(Debug, Clone)]
pub enum RateLimiterEvent {
    /// A caller was admitted after waiting `wait_duration` (zero when a slot
    /// was free on arrival).
    PermitAcquired {
        component_name: String,
        timestamp: Instant,
        wait_duration: Duration,
    },
    PermitRejected {
        component_name: String,
        timestamp: Instant,
        reason: RejectionReason,
    },
    /// A caller joined the wait queue, which now holds `queue_size` entries.
    Queued {
        component_name: String,
        timestamp: Instant,
        queue_size: usize,
    },
}

impl ClientEvent for RateLimiterEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RateLimiterEvent::PermitAcquired { .. } => "PermitAcquired",
            RateLimiterEvent::PermitRejected { .. } => "PermitRejected",
            RateLimiterEvent::Queued { .. } => "Queued",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RateLimiterEvent::PermitAcquired { timestamp, .. }
            | RateLimiterEvent::PermitRejected { timestamp, .. }
            | RateLimiterEvent::Queued { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            RateLimiterEvent::PermitAcquired { component_name, .. }
            | RateLimiterEvent::PermitRejected { component_name, .. }
            | RateLimiterEvent::Queued { component_name, .. } => component_name,
        }
    }
}
