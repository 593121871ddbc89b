use std::collections::VecDeque;
use std::time::Duration;
use tokio::time::Instant;

/// Sliding log of admission times plus the FIFO of waiting tickets.
#[derive(Debug, Default)]
pub(crate) struct WindowState {
    log: VecDeque<Instant>,
    queue: VecDeque<u64>,
    next_ticket: u64,
}

impl WindowState {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Drops admissions that left the trailing window.
    pub(crate) fn prune(&mut self, now: Instant, window: Duration) {
        while let Some(&admitted) = self.log.front() {
            if now.saturating_duration_since(admitted) >= window {
                self.log.pop_front();
            } else {
                break;
            }
        }
    }

    pub(crate) fn has_slot(&self, max_requests: usize) -> bool {
        self.log.len() < max_requests
    }

    pub(crate) fn admit(&mut self, now: Instant) {
        self.log.push_back(now);
    }

    pub(crate) fn in_window(&self) -> usize {
        self.log.len()
    }

    /// When the oldest admission expires, or `now` when the log is empty.
    pub(crate) fn reset_time(&self, now: Instant, window: Duration) -> Instant {
        self.log.front().map_or(now, |&oldest| oldest + window)
    }

    pub(crate) fn enqueue(&mut self) -> u64 {
        let ticket = self.next_ticket;
        self.next_ticket = self.next_ticket.wrapping_add(1);
        self.queue.push_back(ticket);
        ticket
    }

    pub(crate) fn is_head(&self, ticket: u64) -> bool {
        self.queue.front() == Some(&ticket)
    }

    pub(crate) fn pop_head(&mut self) {
        self.queue.pop_front();
    }

    /// Removes an abandoned ticket wherever it sits in the queue.
    pub(crate) fn remove(&mut self, ticket: u64) -> bool {
        match self.queue.iter().position(|&t| t == ticket) {
            Some(index) => {
                self.queue.remove(index);
                true
            }
            None => false,
        }
    }

    pub(crate) fn queue_len(&self) -> usize {
        self.queue.len()
    }

    pub(crate) fn queue_is_empty(&self) -> bool {
        self.queue.is_empty()
    }
}
