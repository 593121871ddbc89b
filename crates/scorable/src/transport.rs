//! The seam between the client and HTTP.
//!
//! Resources describe calls as [`ApiRequest`]s; a [`Transport`] turns them
//! into [`ApiResponse`]s. A transport only fails for calls that never got an
//! HTTP response; status handling stays in the client.

use futures::future::BoxFuture;
use scorable_core::ScorableError;
use serde::de::DeserializeOwned;
use serde::Serialize;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
    Patch,
    Delete,
}

impl Method {
    pub fn as_str(self) -> &'static str {
        match self {
            Method::Get => "GET",
            Method::Post => "POST",
            Method::Patch => "PATCH",
            Method::Delete => "DELETE",
        }
    }
}

/// A call relative to the API base URL.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiRequest {
    pub method: Method,
    /// Path starting with `/`, e.g. `/v1/judges/`.
    pub path: String,
    pub query: Vec<(String, String)>,
    pub body: Option<serde_json::Value>,
}

impl ApiRequest {
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            query: Vec::new(),
            body: None,
        }
    }

    pub fn get(path: impl Into<String>) -> Self {
        Self::new(Method::Get, path)
    }

    pub fn post(path: impl Into<String>) -> Self {
        Self::new(Method::Post, path)
    }

    pub fn patch(path: impl Into<String>) -> Self {
        Self::new(Method::Patch, path)
    }

    pub fn delete(path: impl Into<String>) -> Self {
        Self::new(Method::Delete, path)
    }

    /// Appends a query parameter.
    pub fn query(mut self, key: impl Into<String>, value: impl ToString) -> Self {
        self.query.push((key.into(), value.to_string()));
        self
    }

    /// Appends a query parameter when `value` is present.
    pub fn query_opt<V: ToString>(self, key: impl Into<String>, value: Option<V>) -> Self {
        match value {
            Some(value) => self.query(key, value),
            None => self,
        }
    }

    /// Sets a JSON body.
    pub fn json<B: Serialize>(mut self, body: &B) -> Result<Self, ScorableError> {
        let value = serde_json::to_value(body).map_err(|e| {
            ScorableError::new(
                400,
                "invalid",
                None,
                Some(format!("Failed to encode request body: {}", e)),
            )
        })?;
        self.body = Some(value);
        Ok(self)
    }
}

/// Status and raw body of an HTTP response.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ApiResponse {
    pub status: u16,
    pub body: Vec<u8>,
}

impl ApiResponse {
    pub fn new(status: u16, body: impl Into<Vec<u8>>) -> Self {
        Self {
            status,
            body: body.into(),
        }
    }

    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Decodes the body as JSON.
    ///
    /// A body that does not match `T` is reported with the response status
    /// and the code `"invalid_response"`.
    pub fn json<T: DeserializeOwned>(&self) -> Result<T, ScorableError> {
        serde_json::from_slice(&self.body).map_err(|e| {
            ScorableError::new(
                self.status,
                "invalid_response",
                None,
                Some(format!("Failed to decode response body: {}", e)),
            )
        })
    }
}

/// Sends [`ApiRequest`]s.
///
/// Implementations must return `Ok` for every HTTP response, whatever its
/// status, and fail only with [`ScorableError::transport`] errors.
pub trait Transport: Send + Sync {
    fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ScorableError>>;
}

#[cfg(feature = "reqwest")]
pub use self::http::ReqwestTransport;

#[cfg(feature = "reqwest")]
mod http {
    use super::{ApiRequest, ApiResponse, Method, Transport};
    use futures::future::BoxFuture;
    use reqwest::header::{HeaderMap, HeaderValue, AUTHORIZATION, CONTENT_TYPE, USER_AGENT};
    use scorable_core::ScorableError;
    use std::time::Duration;

    const USER_AGENT_VALUE: &str = concat!("scorable-rs/", env!("CARGO_PKG_VERSION"));

    /// [`Transport`] over a shared `reqwest::Client`.
    ///
    /// Every request carries `Authorization: Api-Key <key>`.
    #[derive(Debug, Clone)]
    pub struct ReqwestTransport {
        client: reqwest::Client,
        base_url: String,
    }

    impl ReqwestTransport {
        pub fn new(api_key: &str, base_url: &str) -> Result<Self, ScorableError> {
            Self::with_timeout(api_key, base_url, None)
        }

        /// Like [`new`](Self::new), with a per-request timeout on the
        /// underlying HTTP client.
        pub fn with_timeout(
            api_key: &str,
            base_url: &str,
            timeout: Option<Duration>,
        ) -> Result<Self, ScorableError> {
            let mut auth = HeaderValue::from_str(&format!("Api-Key {}", api_key)).map_err(|_| {
                ScorableError::new(
                    401,
                    "authentication_failed",
                    None,
                    Some("API key contains invalid header characters".to_string()),
                )
            })?;
            auth.set_sensitive(true);

            let mut default_headers = HeaderMap::new();
            default_headers.insert(AUTHORIZATION, auth);
            default_headers.insert(USER_AGENT, HeaderValue::from_static(USER_AGENT_VALUE));

            let mut builder = reqwest::Client::builder().default_headers(default_headers);
            if let Some(timeout) = timeout {
                builder = builder.timeout(timeout);
            }
            let client = builder.build().map_err(|e| {
                ScorableError::transport(
                    "CLIENT_BUILD_FAILED",
                    format!("failed to create HTTP client: {}", e),
                )
            })?;

            Ok(Self {
                client,
                base_url: base_url.trim_end_matches('/').to_string(),
            })
        }

        pub fn base_url(&self) -> &str {
            &self.base_url
        }

        fn url(&self, request: &ApiRequest) -> Result<reqwest::Url, ScorableError> {
            let mut url = reqwest::Url::parse(&format!("{}{}", self.base_url, request.path))
                .map_err(|e| {
                    ScorableError::transport("INVALID_URL", format!("invalid request URL: {}", e))
                })?;
            if !request.query.is_empty() {
                url.query_pairs_mut().extend_pairs(&request.query);
            }
            Ok(url)
        }

        async fn execute(&self, request: ApiRequest) -> Result<ApiResponse, ScorableError> {
            let url = self.url(&request)?;
            let method = match request.method {
                Method::Get => reqwest::Method::GET,
                Method::Post => reqwest::Method::POST,
                Method::Patch => reqwest::Method::PATCH,
                Method::Delete => reqwest::Method::DELETE,
            };

            let mut builder = self.client.request(method, url);
            if let Some(body) = &request.body {
                let bytes = serde_json::to_vec(body).map_err(|e| {
                    ScorableError::transport("ENCODE_FAILED", format!("failed to encode body: {}", e))
                })?;
                builder = builder
                    .header(CONTENT_TYPE, "application/json")
                    .body(bytes);
            }

            let response = builder.send().await.map_err(network_error)?;
            let status = response.status().as_u16();
            let body = response.bytes().await.map_err(network_error)?;

            Ok(ApiResponse::new(status, body.to_vec()))
        }
    }

    impl Transport for ReqwestTransport {
        fn send(&self, request: ApiRequest) -> BoxFuture<'_, Result<ApiResponse, ScorableError>> {
            Box::pin(self.execute(request))
        }
    }

    fn network_error(error: reqwest::Error) -> ScorableError {
        let code = if error.is_timeout() {
            "NETWORK_TIMEOUT"
        } else {
            "NETWORK_ERROR"
        };
        ScorableError::transport(code, error.to_string())
    }
}
