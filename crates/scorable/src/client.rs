use crate::config::ClientConfig;
use crate::resources::{
    EvaluatorsResource, ExecutionLogsResource, JudgesResource, ModelsResource, ObjectivesResource,
};
use crate::transport::{ApiRequest, ApiResponse, Transport};
use scorable_core::{ConfigError, ScorableError};
use scorable_ratelimiter::{RateLimitPolicy, RateLimitStatus, RateLimiter};
use scorable_retry::{RetryManager, RetryPolicy};
use serde::de::DeserializeOwned;
use std::future::Future;
use std::sync::{Arc, Mutex, PoisonError};
use std::time::Duration;

#[cfg(feature = "tracing")]
use tracing::debug;

/// Failure to assemble a [`Scorable`] client.
#[derive(Debug, thiserror::Error)]
pub enum BuildError {
    #[error("invalid configuration: {0}")]
    Config(#[from] ConfigError),
    #[error("transport setup failed: {0}")]
    Transport(#[source] ScorableError),
}

struct ClientInner {
    transport: Arc<dyn Transport>,
    retry: RetryManager,
    limiter: RateLimiter,
    timeout: Option<Duration>,
}

/// Scorable API client.
///
/// Owns one retry manager, one rate limiter and one transport. Clones share
/// all three, so every clone draws from the same rate-limit window.
#[derive(Clone)]
pub struct Scorable {
    inner: Arc<ClientInner>,
}

impl Scorable {
    /// Creates a client over HTTP from `config`.
    #[cfg(feature = "reqwest")]
    pub fn new(config: ClientConfig) -> Result<Self, BuildError> {
        let transport = crate::transport::ReqwestTransport::new(&config.api_key, config.base_url())
            .map_err(BuildError::Transport)?;
        Self::from_config(config, transport)
    }

    /// Creates a client over HTTP from `SCORABLE_API_KEY` and `SCORABLE_API_URL`.
    #[cfg(feature = "reqwest")]
    pub fn from_env() -> Result<Self, BuildError> {
        Self::new(ClientConfig::from_env()?)
    }

    /// Creates a client from `config` over a caller-supplied transport.
    ///
    /// The transport is expected to already point at `config.base_url()`.
    pub fn from_config<T>(config: ClientConfig, transport: T) -> Result<Self, BuildError>
    where
        T: Transport + 'static,
    {
        let mut builder = Scorable::builder(transport)
            .retry_policy(config.retry_policy()?)
            .rate_limit_policy(config.rate_limit_policy()?);
        if let Some(timeout) = config.timeout() {
            builder = builder.timeout(timeout);
        }
        Ok(builder.build())
    }

    pub fn builder<T>(transport: T) -> ScorableBuilder
    where
        T: Transport + 'static,
    {
        ScorableBuilder::new(Arc::new(transport))
    }

    pub fn judges(&self) -> JudgesResource<'_> {
        JudgesResource::new(self)
    }

    pub fn evaluators(&self) -> EvaluatorsResource<'_> {
        EvaluatorsResource::new(self)
    }

    pub fn execution_logs(&self) -> ExecutionLogsResource<'_> {
        ExecutionLogsResource::new(self)
    }

    pub fn objectives(&self) -> ObjectivesResource<'_> {
        ObjectivesResource::new(self)
    }

    pub fn models(&self) -> ModelsResource<'_> {
        ModelsResource::new(self)
    }

    pub fn retry_manager(&self) -> &RetryManager {
        &self.inner.retry
    }

    pub fn rate_limiter(&self) -> &RateLimiter {
        &self.inner.limiter
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.inner.timeout
    }

    pub fn rate_limit_status(&self) -> RateLimitStatus {
        self.inner.limiter.status()
    }

    /// Runs `operation` under the client's retry policy only.
    pub async fn with_retry<F, Fut, T>(&self, operation: F) -> Result<T, ScorableError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScorableError>>,
    {
        self.bounded(self.inner.retry.execute(operation)).await
    }

    /// Runs `operation` once, after the rate limiter admits it.
    pub async fn with_rate_limit<F, Fut, T>(&self, operation: F) -> Result<T, ScorableError>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T, ScorableError>>,
    {
        self.bounded(self.inner.limiter.execute(operation)).await
    }

    /// Runs `operation` with retry outside rate limiting.
    ///
    /// Every attempt, the first and each retry, waits for its own slot, so
    /// a retried call draws from the window like a new call would.
    /// `operation` is only called once its attempt has been admitted.
    pub async fn with_retry_and_rate_limit<F, Fut, T>(
        &self,
        operation: F,
    ) -> Result<T, ScorableError>
    where
        F: FnMut() -> Fut,
        Fut: Future<Output = Result<T, ScorableError>>,
    {
        let limiter = &self.inner.limiter;
        // Attempts run one at a time; the lock only hands the closure to
        // whichever attempt was admitted.
        let operation = Mutex::new(operation);
        let operation = &operation;

        self.bounded(self.inner.retry.execute(move || async move {
            limiter.acquire().await?;
            let attempt = {
                let mut operation = operation.lock().unwrap_or_else(PoisonError::into_inner);
                (*operation)()
            };
            attempt.await
        }))
        .await
    }

    // The deadline covers queueing and every attempt; an attempt in flight
    // when it fires is dropped.
    async fn bounded<Fut, T>(&self, call: Fut) -> Result<T, ScorableError>
    where
        Fut: Future<Output = Result<T, ScorableError>>,
    {
        match self.inner.timeout {
            Some(deadline) => match tokio::time::timeout(deadline, call).await {
                Ok(result) => result,
                Err(_) => {
                    #[cfg(feature = "tracing")]
                    debug!(timeout_ms = deadline.as_millis() as u64, "Call timed out");

                    Err(ScorableError::timeout(deadline))
                }
            },
            None => call.await,
        }
    }

    /// Sends `request` through retry and rate limiting, mapping non-2xx
    /// responses to errors carrying `code` and `message`.
    pub(crate) async fn send(
        &self,
        request: ApiRequest,
        code: &'static str,
        message: String,
    ) -> Result<ApiResponse, ScorableError> {
        let transport = Arc::clone(&self.inner.transport);
        let request = &request;
        let message = &message;

        self.with_retry_and_rate_limit(|| {
            let transport = Arc::clone(&transport);
            let request = request.clone();
            let message = message.clone();
            async move {
                let response = transport.send(request).await?;
                if response.is_success() {
                    Ok(response)
                } else {
                    Err(ScorableError::from_response(
                        response.status,
                        &response.body,
                        code,
                        Some(message),
                    ))
                }
            }
        })
        .await
    }

    pub(crate) async fn send_json<T: DeserializeOwned>(
        &self,
        request: ApiRequest,
        code: &'static str,
        message: String,
    ) -> Result<T, ScorableError> {
        self.send(request, code, message).await?.json()
    }
}

impl std::fmt::Debug for Scorable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Scorable")
            .field("retry", &self.inner.retry)
            .field("limiter", &self.inner.limiter)
            .field("timeout", &self.inner.timeout)
            .finish()
    }
}

/// Builder for [`Scorable`] over a caller-supplied transport.
pub struct ScorableBuilder {
    transport: Arc<dyn Transport>,
    retry: Option<RetryManager>,
    limiter: Option<RateLimiter>,
    retry_policy: RetryPolicy,
    rate_limit_policy: RateLimitPolicy,
    timeout: Option<Duration>,
}

impl ScorableBuilder {
    fn new(transport: Arc<dyn Transport>) -> Self {
        Self {
            transport,
            retry: None,
            limiter: None,
            retry_policy: RetryPolicy::default(),
            rate_limit_policy: RateLimitPolicy::default(),
            timeout: None,
        }
    }

    pub fn retry_policy(mut self, policy: RetryPolicy) -> Self {
        self.retry_policy = policy;
        self
    }

    pub fn rate_limit_policy(mut self, policy: RateLimitPolicy) -> Self {
        self.rate_limit_policy = policy;
        self
    }

    /// Uses a prepared manager (with its own name and listeners) instead of
    /// one built from [`retry_policy`](Self::retry_policy).
    pub fn retry_manager(mut self, manager: RetryManager) -> Self {
        self.retry = Some(manager);
        self
    }

    /// Uses a prepared limiter instead of one built from
    /// [`rate_limit_policy`](Self::rate_limit_policy). Passing a clone of
    /// another client's limiter makes both share one window.
    pub fn rate_limiter(mut self, limiter: RateLimiter) -> Self {
        self.limiter = Some(limiter);
        self
    }

    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }

    pub fn build(self) -> Scorable {
        let retry = self.retry.unwrap_or_else(|| {
            RetryManager::builder()
                .name("scorable")
                .policy(self.retry_policy)
                .build()
        });
        let limiter = self.limiter.unwrap_or_else(|| {
            RateLimiter::builder()
                .name("scorable")
                .policy(self.rate_limit_policy)
                .build()
        });

        Scorable {
            inner: Arc::new(ClientInner {
                transport: self.transport,
                retry,
                limiter,
                timeout: self.timeout,
            }),
        }
    }
}
