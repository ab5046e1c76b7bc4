//! Client configuration

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::{
    auth_endpoints, DEFAULT_BASE_URL, DEFAULT_RETRY_ATTEMPTS, DEFAULT_RETRY_DELAY_MS,
    DEFAULT_SAFE_LOCATION, DEFAULT_TIMEOUT_MS,
};
use crate::errors::{MarketlinkError, Result};

/// Settings of the request executor.
///
/// Durations are stored in milliseconds so the struct maps one-to-one onto
/// the `MARKETLINK_*_MS` environment variables and config files.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ClientConfig {
    /// Base URL prepended to every request path
    pub base_url: String,
    /// Per-attempt cancellation guard
    pub timeout_ms: u64,
    /// Maximum transport attempts per request
    pub retry_attempts: u32,
    /// Base retry delay, multiplied by the attempt number
    pub retry_delay_ms: u64,
    /// Path of the token refresh exchange
    pub refresh_endpoint: String,
    /// Location the session is sent to on auth failure
    pub safe_location: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub user_agent: Option<String>,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout_ms: DEFAULT_TIMEOUT_MS,
            retry_attempts: DEFAULT_RETRY_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            refresh_endpoint: auth_endpoints::REFRESH_TOKEN.to_string(),
            safe_location: DEFAULT_SAFE_LOCATION.to_string(),
            user_agent: None,
        }
    }
}

impl ClientConfig {
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self { base_url: base_url.into(), ..Self::default() }
    }

    #[must_use]
    pub const fn timeout(&self) -> Duration {
        Duration::from_millis(self.timeout_ms)
    }

    #[must_use]
    pub const fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_ms)
    }

    /// Check invariants the executor relies on.
    ///
    /// # Errors
    ///
    /// Returns [`MarketlinkError::Config`] for an empty base URL, zero
    /// attempts or a zero timeout.
    pub fn validate(&self) -> Result<()> {
        if self.base_url.trim().is_empty() {
            return Err(MarketlinkError::Config("base_url must not be empty".to_string()));
        }
        if url::Url::parse(&self.base_url).is_err() {
            return Err(MarketlinkError::Config(format!("invalid base_url: {}", self.base_url)));
        }
        if self.retry_attempts == 0 {
            return Err(MarketlinkError::Config("retry_attempts must be at least 1".to_string()));
        }
        if self.timeout_ms == 0 {
            return Err(MarketlinkError::Config("timeout_ms must be greater than 0".to_string()));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = ClientConfig::default();
        assert_eq!(config.timeout(), Duration::from_secs(30));
        assert_eq!(config.retry_attempts, 3);
        assert_eq!(config.retry_delay(), Duration::from_secs(1));
        assert_eq!(config.refresh_endpoint, "/api/auth/token/refresh/");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_bad_values() {
        assert!(ClientConfig::new("").validate().is_err());
        assert!(ClientConfig::new("not a url").validate().is_err());
        assert!(ClientConfig { retry_attempts: 0, ..ClientConfig::default() }.validate().is_err());
    }

    #[test]
    fn test_partial_toml_uses_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"base_url": "https://api.example.com", "retry_attempts": 5}"#)
                .unwrap();
        assert_eq!(config.base_url, "https://api.example.com");
        assert_eq!(config.retry_attempts, 5);
        assert_eq!(config.timeout_ms, DEFAULT_TIMEOUT_MS);
    }
}
