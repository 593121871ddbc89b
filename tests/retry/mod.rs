//! Tests for the retry manager.
//!
//! Test organization:
//! - backoff.rs: Delay schedule and jitter bounds
//! - behavior.rs: Attempt counting and retry conditions
//! - cancellation.rs: Cancellation during attempts and backoff waits
//! - events.rs: Event listeners and the tower layer

mod backoff;
mod behavior;
mod cancellation;
mod events;
