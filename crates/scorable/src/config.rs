use scorable_core::ConfigError;
use scorable_ratelimiter::{RateLimitPolicy, Strategy};
use scorable_retry::{Jitter, RetryPolicy};
use serde::Deserialize;
use std::time::Duration;

pub const DEFAULT_BASE_URL: &str = "https://api.scorable.ai";

pub const API_KEY_ENV: &str = "SCORABLE_API_KEY";
pub const API_URL_ENV: &str = "SCORABLE_API_URL";

/// Client settings, loadable from any serde format.
///
/// Every field except `api_key` is optional; omitted values take the
/// defaults of [`RetryPolicy`] and [`RateLimitPolicy`].
///
/// ```
/// use scorable::ClientConfig;
///
/// let config: ClientConfig = serde_json::from_str(
///     r#"{
///         "api_key": "sk-test",
///         "retry": { "max_retries": 5, "base_delay_ms": 500 },
///         "rate_limit": { "max_requests": 50, "strategy": "reject" }
///     }"#,
/// )
/// .unwrap();
///
/// assert_eq!(config.retry_policy().unwrap().max_retries(), 5);
/// ```
#[derive(Debug, Clone, Default, Deserialize)]
pub struct ClientConfig {
    pub api_key: String,
    #[serde(default)]
    pub base_url: Option<String>,
    /// Deadline for a whole call, covering queueing and every attempt.
    #[serde(default)]
    pub timeout_ms: Option<u64>,
    #[serde(default)]
    pub retry: RetrySettings,
    #[serde(default)]
    pub rate_limit: RateLimitSettings,
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RetrySettings {
    pub max_retries: Option<usize>,
    pub base_delay_ms: Option<u64>,
    pub max_delay_ms: Option<u64>,
    pub backoff_multiplier: Option<f64>,
    pub jitter: Option<JitterSetting>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JitterSetting {
    None,
    Full,
    Equal,
}

impl From<JitterSetting> for Jitter {
    fn from(setting: JitterSetting) -> Self {
        match setting {
            JitterSetting::None => Jitter::None,
            JitterSetting::Full => Jitter::Full,
            JitterSetting::Equal => Jitter::Equal,
        }
    }
}

#[derive(Debug, Clone, Default, Deserialize)]
pub struct RateLimitSettings {
    pub max_requests: Option<usize>,
    pub window_ms: Option<u64>,
    pub strategy: Option<StrategySetting>,
    pub max_queue_size: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum StrategySetting {
    Queue,
    Reject,
}

impl From<StrategySetting> for Strategy {
    fn from(setting: StrategySetting) -> Self {
        match setting {
            StrategySetting::Queue => Strategy::Queue,
            StrategySetting::Reject => Strategy::Reject,
        }
    }
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            ..Self::default()
        }
    }

    /// Reads `SCORABLE_API_KEY` (required) and `SCORABLE_API_URL`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let api_key = std::env::var(API_KEY_ENV).map_err(|_| ConfigError::MissingEnv(API_KEY_ENV))?;
        Ok(Self {
            api_key,
            base_url: std::env::var(API_URL_ENV).ok(),
            ..Self::default()
        })
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    pub fn base_url(&self) -> &str {
        self.base_url.as_deref().unwrap_or(DEFAULT_BASE_URL)
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.timeout_ms.map(Duration::from_millis)
    }

    /// Builds the retry policy, rejecting out-of-range values.
    pub fn retry_policy(&self) -> Result<RetryPolicy, ConfigError> {
        let settings = &self.retry;
        let mut builder = RetryPolicy::builder();
        if let Some(max_retries) = settings.max_retries {
            builder = builder.max_retries(max_retries);
        }
        if let Some(ms) = settings.base_delay_ms {
            builder = builder.base_delay(Duration::from_millis(ms));
        }
        if let Some(ms) = settings.max_delay_ms {
            builder = builder.max_delay(Duration::from_millis(ms));
        }
        if let Some(multiplier) = settings.backoff_multiplier {
            builder = builder.backoff_multiplier(multiplier);
        }
        if let Some(jitter) = settings.jitter {
            builder = builder.jitter(jitter.into());
        }
        builder.try_build()
    }

    /// Builds the rate-limit policy, rejecting out-of-range values.
    pub fn rate_limit_policy(&self) -> Result<RateLimitPolicy, ConfigError> {
        let settings = &self.rate_limit;
        let mut builder = RateLimitPolicy::builder();
        if let Some(max_requests) = settings.max_requests {
            builder = builder.max_requests(max_requests);
        }
        if let Some(ms) = settings.window_ms {
            builder = builder.window(Duration::from_millis(ms));
        }
        if let Some(strategy) = settings.strategy {
            builder = builder.strategy(strategy.into());
        }
        if let Some(max_queue_size) = settings.max_queue_size {
            builder = builder.max_queue_size(max_queue_size);
        }
        builder.try_build()
    }
}
