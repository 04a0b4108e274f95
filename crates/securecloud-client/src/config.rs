//! Client configuration.

use std::time::Duration;

use securecloud_core::{ApiUrl, RealtimeUrl, Result};

/// Timeout applied to every HTTP request and realtime handshake.
pub const REQUEST_TIMEOUT: Duration = Duration::from_secs(30);

/// Environment variable holding the REST base URL.
pub const API_URL_ENV: &str = "SECURECLOUD_API_URL";

/// Environment variable holding the realtime URL.
pub const REALTIME_URL_ENV: &str = "SECURECLOUD_WS_URL";

/// REST base URL used when the environment does not supply one.
pub const DEFAULT_API_URL: &str = "http://localhost:8080/api/v1";

/// Realtime URL used when the environment does not supply one.
pub const DEFAULT_REALTIME_URL: &str = "ws://localhost:8080";

/// Reconnection budget for the realtime channel.
///
/// Delays double from `base_delay` and never exceed `max_delay`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReconnectPolicy {
    /// Automatic attempts allowed after a failure before giving up.
    pub max_attempts: u32,
    /// Delay before the first attempt.
    pub base_delay: Duration,
    /// Upper bound on any delay.
    pub max_delay: Duration,
}

impl Default for ReconnectPolicy {
    fn default() -> Self {
        Self {
            max_attempts: 5,
            base_delay: Duration::from_secs(1),
            max_delay: Duration::from_secs(5),
        }
    }
}

impl ReconnectPolicy {
    /// Delay before reconnection attempt `attempt` (1-based).
    pub fn delay_for(&self, attempt: u32) -> Duration {
        let exponent = attempt.saturating_sub(1).min(16);
        self.base_delay
            .saturating_mul(1u32 << exponent)
            .min(self.max_delay)
    }
}

/// Everything needed to build a [`SecureCloud`](crate::SecureCloud) client.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Versioned REST base URL.
    pub api_url: ApiUrl,
    /// Realtime endpoint.
    pub realtime_url: RealtimeUrl,
    /// Per-request timeout.
    pub request_timeout: Duration,
    /// Realtime reconnection budget.
    pub reconnect: ReconnectPolicy,
}

impl ClientConfig {
    /// Create a configuration with the fixed timeout and reconnection budget.
    pub fn new(api_url: ApiUrl, realtime_url: RealtimeUrl) -> Self {
        Self {
            api_url,
            realtime_url,
            request_timeout: REQUEST_TIMEOUT,
            reconnect: ReconnectPolicy::default(),
        }
    }

    /// Load URLs from `SECURECLOUD_API_URL` and `SECURECLOUD_WS_URL`,
    /// falling back to the localhost defaults.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load URLs through an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let api_url = lookup(API_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_API_URL.to_string());
        let realtime_url = lookup(REALTIME_URL_ENV)
            .filter(|v| !v.trim().is_empty())
            .unwrap_or_else(|| DEFAULT_REALTIME_URL.to_string());

        Ok(Self::new(
            ApiUrl::new(api_url.trim())?,
            RealtimeUrl::new(realtime_url.trim())?,
        ))
    }

    /// Replace the reconnection budget.
    pub fn with_reconnect(mut self, reconnect: ReconnectPolicy) -> Self {
        self.reconnect = reconnect;
        self
    }
}
