//! Rust client for the Scorable evaluation API.
//!
//! Every resource call goes through the same resilience stack: a
//! [`RetryManager`] on the outside and a shared [`RateLimiter`] on the
//! inside, so each attempt (retries included) waits for its own slot in the
//! client's window. An optional deadline covers the whole call.
//!
//! # Examples
//!
//! ```no_run
//! use scorable::{ClientConfig, ExecutionPayload, Scorable};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Scorable::new(ClientConfig::new("sk-..."))?;
//!
//! let result = client
//!     .evaluators()
//!     .execute_by_name(
//!         "Politeness",
//!         &ExecutionPayload::new("Where is my order?", "It ships tomorrow."),
//!     )
//!     .await?;
//! println!("score: {:?}", result.score);
//! # Ok(())
//! # }
//! ```
//!
//! Failures are [`ScorableError`]s and can be classified with
//! [`ScorableError::kind`] or the status/code predicates:
//!
//! ```
//! use scorable::{ErrorKind, ScorableError};
//!
//! let err = ScorableError::from_response(429, b"", "LIST_JUDGES_FAILED", None::<String>);
//! assert!(err.is_quota_error());
//! assert_eq!(err.kind(), ErrorKind::QuotaExceeded);
//! ```

mod client;
mod config;
pub mod resources;
pub mod transport;

pub use client::{BuildError, Scorable, ScorableBuilder};
pub use config::{
    ClientConfig, JitterSetting, RateLimitSettings, RetrySettings, StrategySetting,
    API_KEY_ENV, API_URL_ENV, DEFAULT_BASE_URL,
};
pub use resources::{ExecutionPayload, ListParams, PaginatedResponse};
pub use transport::{ApiRequest, ApiResponse, Method, Transport};

#[cfg(feature = "reqwest")]
pub use transport::ReqwestTransport;

pub use scorable_core::{ConfigError, ErrorDetails, ErrorKind, Result, ScorableError};
pub use scorable_ratelimiter::{
    RateLimitPolicy, RateLimitStatus, RateLimiter, RateLimiterEvent, RejectionReason, Strategy,
};
pub use scorable_retry::{Jitter, RetryEvent, RetryManager, RetryPolicy};
