//! Core infrastructure for the Scorable client.
//!
//! This crate provides functionality shared by the retry manager, the rate
//! limiter and the client facade:
//! - [`ScorableError`], the normalized failure type, and its [`ErrorKind`] taxonomy
//! - Event listeners for observability
//! - [`ConfigError`] for policy validation

pub mod error;
pub mod events;

pub use error::{ConfigError, ErrorDetails, ErrorKind, Result, ScorableError, TRANSPORT_STATUS};
pub use events::{ClientEvent, EventListener, EventListeners, FnListener};
