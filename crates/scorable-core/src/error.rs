//! The normalized failure type shared by every Scorable client layer.
//!
//! Raw failures come in two shapes: an HTTP response with a status and a
//! (usually JSON problem-details) body, or a transport-level failure with no
//! status at all. Both are folded into a single [`ScorableError`] that keeps
//! the status, a machine-readable code, the parsed body and a human message.
//!
//! # Classification
//!
//! The `is_*_error` predicates are labels, not a partition: a `429` whose body
//! says `code: "invalid"` is both a quota error and a validation error.
//! Retry decisions use the single [`ErrorKind`] assigned at construction.
//!
//! ```
//! use scorable_core::{ErrorKind, ScorableError};
//!
//! let body = br#"{"detail": "Not found.", "code": "not_found"}"#;
//! let err = ScorableError::from_response(404, body, "GET_JUDGE_FAILED", None::<String>);
//!
//! assert_eq!(err.status(), 404);
//! assert_eq!(err.code(), "not_found");
//! assert_eq!(err.message(), "Not found.");
//! assert_eq!(err.kind(), ErrorKind::NotFound);
//! assert!(err.is_not_found_error());
//! assert!(!err.is_transient());
//! ```

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use std::fmt;
use std::time::Duration;

/// Status assigned to failures that never produced an HTTP response.
pub const TRANSPORT_STATUS: u16 = 500;

/// Problem-details body returned by the API on failure.
///
/// Known fields are typed; everything else is preserved in `extra`. Bodies
/// that are not JSON objects are kept verbatim under the `"body"` key.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ErrorDetails {
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub error_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub title: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl ErrorDetails {
    /// Parses a response body. Returns `None` for an empty body.
    pub fn from_body(body: &[u8]) -> Option<Self> {
        if body.iter().all(u8::is_ascii_whitespace) {
            return None;
        }

        match serde_json::from_slice::<Value>(body) {
            Ok(Value::Object(map)) => Some(Self::from_object(map)),
            Ok(other) => Some(Self::opaque(other)),
            Err(_) => Some(Self::opaque(Value::String(
                String::from_utf8_lossy(body).into_owned(),
            ))),
        }
    }

    // Typed fields that are not text (e.g. DRF's `"detail": ["..."]`) are
    // flattened when they are lists of strings and left in `extra` otherwise,
    // so `code` survives either way.
    fn from_object(mut extra: Map<String, Value>) -> Self {
        let mut take = |key: &str| {
            let value = extra.get(key).and_then(text);
            if value.is_some() || extra.get(key).is_some_and(Value::is_null) {
                extra.remove(key);
            }
            value
        };

        let error_type = take("type");
        let title = take("title");
        let detail = take("detail");
        let instance = take("instance");

        Self {
            error_type,
            title,
            detail,
            instance,
            extra,
        }
    }

    fn opaque(body: Value) -> Self {
        let mut extra = Map::new();
        extra.insert("body".to_string(), body);
        Self {
            extra,
            ..Self::default()
        }
    }

    /// The error code carried by the body, if any.
    pub fn code(&self) -> Option<&str> {
        self.extra.get("code").and_then(Value::as_str)
    }
}

fn text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Array(items) if !items.is_empty() => items
            .iter()
            .map(|item| item.as_str())
            .collect::<Option<Vec<_>>>()
            .map(|parts| parts.join(" ")),
        _ => None,
    }
}

/// The failure taxonomy used for retry and propagation decisions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// 401 or an authentication code. Permanent.
    Authentication,
    /// 400 or a validation/parse code. Permanent.
    Validation,
    /// 404 or `not_found`. Permanent.
    NotFound,
    /// 429 / `throttled`, from the API or from the local rate limiter. Transient.
    QuotaExceeded,
    /// Status >= 500 from the API. Transient.
    Server,
    /// Network-level failure with no HTTP status. Transient.
    Transport,
    /// The local rate limiter's wait queue was full.
    QueueFull,
    /// The caller cancelled the operation.
    Cancelled,
    /// The caller-level deadline expired.
    Timeout,
    /// Any other non-success status.
    Api,
}

impl ErrorKind {
    /// Kinds that are retried by the default retry condition.
    pub fn is_transient(self) -> bool {
        matches!(
            self,
            ErrorKind::QuotaExceeded | ErrorKind::Server | ErrorKind::Transport
        )
    }

    /// Kinds that will fail identically on an identical request.
    pub fn is_permanent(self) -> bool {
        matches!(
            self,
            ErrorKind::Authentication | ErrorKind::Validation | ErrorKind::NotFound
        )
    }

    pub fn as_str(self) -> &'static str {
        match self {
            ErrorKind::Authentication => "authentication",
            ErrorKind::Validation => "validation",
            ErrorKind::NotFound => "not_found",
            ErrorKind::QuotaExceeded => "quota_exceeded",
            ErrorKind::Server => "server",
            ErrorKind::Transport => "transport",
            ErrorKind::QueueFull => "queue_full",
            ErrorKind::Cancelled => "cancelled",
            ErrorKind::Timeout => "timeout",
            ErrorKind::Api => "api",
        }
    }
}

impl fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A failed call against the Scorable API or one of the client's own layers.
///
/// Instances are immutable once built.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
#[error("{message}")]
pub struct ScorableError {
    status: u16,
    code: String,
    kind: ErrorKind,
    details: Option<ErrorDetails>,
    message: String,
    retry_after: Option<Duration>,
}

impl ScorableError {
    /// Builds an error from its parts, classifying it by status and code.
    ///
    /// The message resolves, in order, to `message`, `details.detail`,
    /// `details.title`, then `"API Error {status}: {code}"`.
    pub fn new(
        status: u16,
        code: impl Into<String>,
        details: Option<ErrorDetails>,
        message: Option<String>,
    ) -> Self {
        let code = code.into();
        let kind = classify(status, &code);
        let message = message
            .or_else(|| details.as_ref().and_then(|d| d.detail.clone()))
            .or_else(|| details.as_ref().and_then(|d| d.title.clone()))
            .unwrap_or_else(|| format!("API Error {}: {}", status, code));

        Self {
            status,
            code,
            kind,
            details,
            message,
            retry_after: None,
        }
    }

    /// Normalizes a non-success HTTP response.
    ///
    /// `fallback_code` is the operation-specific code (e.g. `"LIST_JUDGES_FAILED"`)
    /// used when the body does not carry its own `code`.
    pub fn from_response(
        status: u16,
        body: &[u8],
        fallback_code: &str,
        message: Option<impl Into<String>>,
    ) -> Self {
        let details = ErrorDetails::from_body(body);
        let code = details
            .as_ref()
            .and_then(ErrorDetails::code)
            .unwrap_or(fallback_code)
            .to_string();
        Self::new(status, code, details, message.map(Into::into))
    }

    /// A failure that never reached an HTTP response (DNS, connect, reset, ...).
    ///
    /// The status is reported as [`TRANSPORT_STATUS`]; the code is only as
    /// reliable as the caller's choice of `code`.
    pub fn transport(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            status: TRANSPORT_STATUS,
            code: code.into(),
            kind: ErrorKind::Transport,
            details: None,
            message: message.into(),
            retry_after: None,
        }
    }

    /// The local rate limiter refused the call (strategy `reject`).
    pub fn throttled(retry_after: Option<Duration>) -> Self {
        Self {
            status: 429,
            code: "throttled".to_string(),
            kind: ErrorKind::QuotaExceeded,
            details: None,
            message: "Rate limit exceeded".to_string(),
            retry_after,
        }
    }

    /// The local rate limiter's wait queue is at capacity.
    pub fn queue_full(max_queue_size: usize) -> Self {
        Self {
            status: 429,
            code: "queue_full".to_string(),
            kind: ErrorKind::QueueFull,
            details: None,
            message: format!("Rate limit queue is full ({} waiting)", max_queue_size),
            retry_after: None,
        }
    }

    /// The caller cancelled the call.
    pub fn cancelled() -> Self {
        Self {
            status: 499,
            code: "cancelled".to_string(),
            kind: ErrorKind::Cancelled,
            details: None,
            message: "Operation was cancelled".to_string(),
            retry_after: None,
        }
    }

    /// The caller-level deadline covering queueing and all attempts expired.
    pub fn timeout(after: Duration) -> Self {
        Self {
            status: 408,
            code: "timeout".to_string(),
            kind: ErrorKind::Timeout,
            details: None,
            message: format!("Operation timed out after {:?}", after),
            retry_after: None,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    pub fn code(&self) -> &str {
        &self.code
    }

    pub fn kind(&self) -> ErrorKind {
        self.kind
    }

    pub fn details(&self) -> Option<&ErrorDetails> {
        self.details.as_ref()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// How long until the limiter expects a slot to free, when known.
    pub fn retry_after(&self) -> Option<Duration> {
        self.retry_after
    }

    /// `401`, or code `authentication_failed` / `not_authenticated`.
    pub fn is_authentication_error(&self) -> bool {
        is_authentication(self.status, &self.code)
    }

    /// `429`, or code `throttled`.
    pub fn is_quota_error(&self) -> bool {
        is_quota(self.status, &self.code)
    }

    /// `400`, or code `invalid` / `parse_error`.
    pub fn is_validation_error(&self) -> bool {
        is_validation(self.status, &self.code)
    }

    /// `404`, or code `not_found`.
    pub fn is_not_found_error(&self) -> bool {
        is_not_found(self.status, &self.code)
    }

    /// Any status >= 500, including transport failures.
    pub fn is_server_error(&self) -> bool {
        self.status >= 500
    }

    /// Whether the default retry condition would retry this error.
    pub fn is_transient(&self) -> bool {
        self.kind.is_transient()
    }
}

fn is_authentication(status: u16, code: &str) -> bool {
    status == 401 || code == "authentication_failed" || code == "not_authenticated"
}

fn is_quota(status: u16, code: &str) -> bool {
    status == 429 || code == "throttled"
}

fn is_validation(status: u16, code: &str) -> bool {
    status == 400 || code == "invalid" || code == "parse_error"
}

fn is_not_found(status: u16, code: &str) -> bool {
    status == 404 || code == "not_found"
}

// Permanent labels win over transient ones so a mislabelled response is
// never retried into a guaranteed failure.
fn classify(status: u16, code: &str) -> ErrorKind {
    if is_authentication(status, code) {
        ErrorKind::Authentication
    } else if is_validation(status, code) {
        ErrorKind::Validation
    } else if is_not_found(status, code) {
        ErrorKind::NotFound
    } else if is_quota(status, code) {
        ErrorKind::QuotaExceeded
    } else if status >= 500 {
        ErrorKind::Server
    } else {
        ErrorKind::Api
    }
}

/// Result alias used throughout the client.
pub type Result<T> = std::result::Result<T, ScorableError>;

/// Rejected policy values reported by the fallible builders.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ConfigError {
    #[error("{field} must be {expected}, got {actual}")]
    OutOfRange {
        field: &'static str,
        expected: &'static str,
        actual: String,
    },
    #[error("environment variable {0} is not set")]
    MissingEnv(&'static str),
}

impl ConfigError {
    pub fn out_of_range(field: &'static str, expected: &'static str, actual: impl fmt::Debug) -> Self {
        ConfigError::OutOfRange {
            field,
            expected,
            actual: format!("{:?}", actual),
        }
    }
}
