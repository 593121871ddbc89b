use scorable_core::events::ClientEvent;
use scorable_core::ErrorKind;
use std::time::{Duration, Instant};

/// Events emitted by the [`RetryManager`](crate::RetryManager).
#[derive(Debug, Clone)]
pub enum RetryEvent {
    /// An attempt failed and a retry is scheduled after `delay`.
    ///
    /// `attempt` is 1-indexed: 1 is the first retry.
    Retry {
        component_name: String,
        timestamp: Instant,
        attempt: usize,
        delay: Duration,
        kind: ErrorKind,
    },
    /// The operation succeeded after `attempts` attempts.
    Success {
        component_name: String,
        timestamp: Instant,
        attempts: usize,
    },
    /// Every allowed attempt failed.
    Error {
        component_name: String,
        timestamp: Instant,
        attempts: usize,
        kind: ErrorKind,
    },
    /// A failure the retry condition refused to retry.
    IgnoredError {
        component_name: String,
        timestamp: Instant,
        attempts: usize,
        kind: ErrorKind,
    },
    /// The caller cancelled during an attempt or a backoff wait.
    Cancelled {
        component_name: String,
        timestamp: Instant,
        attempts: usize,
    },
}

impl ClientEvent for RetryEvent {
    fn event_type(&self) -> &'static str {
        match self {
            RetryEvent::Retry { .. } => "Retry",
            RetryEvent::Success { .. } => "Success",
            RetryEvent::Error { .. } => "Error",
            RetryEvent::IgnoredError { .. } => "IgnoredError",
            RetryEvent::Cancelled { .. } => "Cancelled",
        }
    }

    fn timestamp(&self) -> Instant {
        match self {
            RetryEvent::Retry { timestamp, .. }
            | RetryEvent::Success { timestamp, .. }
            | RetryEvent::Error { timestamp, .. }
            | RetryEvent::IgnoredError { timestamp, .. }
            | RetryEvent::Cancelled { timestamp, .. } => *timestamp,
        }
    }

    fn component_name(&self) -> &str {
        match self {
            RetryEvent::Retry { component_name, .. }
            | RetryEvent::Success { component_name, .. }
            | RetryEvent::Error { component_name, .. }
            | RetryEvent::IgnoredError { component_name, .. }
            | RetryEvent::Cancelled { component_name, .. } => component_name,
        }
    }
}
