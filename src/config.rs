//! Client configuration.

use std::env;
use std::time::Duration;

use crate::credentials::MAX_TOKEN_LIFETIME;

/// Default App Store Connect API root.
pub const DEFAULT_API_URL: &str = "https://api.appstoreconnect.apple.com/v1";

/// Transport and pagination settings for [`AnalyticsClient`](crate::AnalyticsClient).
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// API root; relative resource paths are joined onto it.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
    /// User agent string.
    pub user_agent: String,
    /// Retry behavior for transient failures.
    pub retry: RetryPolicy,
    /// Lifetime of each minted token.
    pub token_lifetime: Duration,
    /// Maximum pages followed for one collection.
    pub max_pages: u32,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_API_URL.to_string(),
            timeout: Duration::from_secs(300),
            user_agent: format!("asc-analytics/{}", env!("CARGO_PKG_VERSION")),
            retry: RetryPolicy::default(),
            token_lifetime: MAX_TOKEN_LIFETIME,
            max_pages: 1000,
        }
    }
}

impl ClientConfig {
    /// Default configuration with `ASC_API_URL` applied when set.
    pub fn from_env() -> Self {
        let mut config = Self::default();
        if let Ok(url) = env::var("ASC_API_URL") {
            config.base_url = url;
        }
        config
    }

    /// Use a different API root.
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Use a different retry policy.
    #[must_use]
    pub fn with_retry(mut self, retry: RetryPolicy) -> Self {
        self.retry = retry;
        self
    }
}

/// Exponential backoff settings.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    /// Total attempts per request, including the first.
    pub max_attempts: u32,
    /// Delay before the first retry.
    pub initial_delay: Duration,
    /// Factor applied to the delay after each retry.
    pub backoff_multiplier: f64,
    /// Upper bound for a single delay.
    pub max_delay: Duration,
    /// Randomize delays by up to ±25%.
    pub jitter: bool,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 3,
            initial_delay: Duration::from_secs(1),
            backoff_multiplier: 2.0,
            max_delay: Duration::from_secs(30),
            jitter: true,
        }
    }
}

impl RetryPolicy {
    /// A policy that never retries.
    pub fn none() -> Self {
        Self {
            max_attempts: 1,
            ..Self::default()
        }
    }

    /// Same attempt count with near-zero delays, for tests against local servers.
    pub fn immediate(max_attempts: u32) -> Self {
        Self {
            max_attempts,
            initial_delay: Duration::from_millis(1),
            backoff_multiplier: 1.0,
            max_delay: Duration::from_millis(1),
            jitter: false,
        }
    }

    /// Delay to wait before retry number `retry` (1-based).
    pub fn delay_for(&self, retry: u32) -> Duration {
        let exponent = retry.saturating_sub(1).min(16) as i32;
        let secs = self.initial_delay.as_secs_f64() * self.backoff_multiplier.powi(exponent);
        let capped = Duration::try_from_secs_f64(secs.max(0.0))
            .unwrap_or(self.max_delay)
            .min(self.max_delay);

        if self.jitter {
            add_jitter(capped)
        } else {
            capped
        }
    }
}

fn add_jitter(delay: Duration) -> Duration {
    use rand::Rng;

    let factor = rand::thread_rng().gen_range(0.75..=1.25);
    Duration::try_from_secs_f64(delay.as_secs_f64() * factor).unwrap_or(delay)
}
