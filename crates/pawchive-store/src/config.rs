//! Backend connection settings

use crate::error::StoreError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Environment variable overriding [`BackendConfig::url`]
pub const URL_ENV: &str = "PAWCHIVE_URL";
/// Environment variable overriding [`BackendConfig::anon_key`]
pub const ANON_KEY_ENV: &str = "PAWCHIVE_ANON_KEY";

/// Backend connection configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BackendConfig {
    /// Project base URL, e.g. `https://xyz.supabase.co`
    pub url: String,
    /// Public (anon) API key
    pub anon_key: String,
    /// Storage bucket for stray photos
    pub photo_bucket: String,
    /// Polling change feed interval in milliseconds
    pub poll_interval_ms: u64,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
}

impl BackendConfig {
    /// Create default configuration
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// With base URL
    #[inline]
    #[must_use]
    pub fn with_url(mut self, url: impl Into<String>) -> Self {
        self.url = url.into();
        self
    }

    /// With API key
    #[inline]
    #[must_use]
    pub fn with_anon_key(mut self, key: impl Into<String>) -> Self {
        self.anon_key = key.into();
        self
    }

    /// With polling interval
    #[inline]
    #[must_use]
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval_ms = u64::try_from(interval.as_millis()).unwrap_or(u64::MAX);
        self
    }

    /// Polling interval as a duration (at least 1ms)
    #[inline]
    #[must_use]
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }

    /// HTTP timeout as a duration
    #[inline]
    #[must_use]
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    /// Override URL and key from the process environment
    #[must_use]
    pub fn apply_env(self) -> Self {
        self.apply_env_with(|name| std::env::var(name).ok())
    }

    /// Override URL and key from `lookup`
    #[must_use]
    pub fn apply_env_with(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup(URL_ENV).filter(|v| !v.is_empty()) {
            self.url = url;
        }
        if let Some(key) = lookup(ANON_KEY_ENV).filter(|v| !v.is_empty()) {
            self.anon_key = key;
        }
        self
    }

    /// Check that a REST backend can be built from this
    ///
    /// # Errors
    /// - `StoreError::Config` if the URL is empty or not http(s)
    pub fn validate(&self) -> Result<(), StoreError> {
        if self.url.trim().is_empty() {
            return Err(StoreError::Config(format!(
                "backend url is not set (config file or {URL_ENV})"
            )));
        }
        if !(self.url.starts_with("http://") || self.url.starts_with("https://")) {
            return Err(StoreError::Config(format!(
                "backend url must be http(s): '{}'",
                self.url
            )));
        }
        Ok(())
    }
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            anon_key: String::new(),
            photo_bucket: "stray-photos".to_string(),
            poll_interval_ms: 5_000,
            request_timeout_secs: 10,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = BackendConfig::new();
        assert_eq!(config.photo_bucket, "stray-photos");
        assert_eq!(config.poll_interval(), Duration::from_secs(5));
    }

    #[test]
    fn env_overrides_file_values() {
        let config = BackendConfig::new()
            .with_url("https://file.example")
            .apply_env_with(|name| match name {
                URL_ENV => Some("https://env.example".to_string()),
                ANON_KEY_ENV => Some(String::new()),
                _ => None,
            });
        assert_eq!(config.url, "https://env.example");
        assert_eq!(config.anon_key, "");
    }

    #[test]
    fn validate_rejects_missing_or_bad_url() {
        assert!(matches!(
            BackendConfig::new().validate(),
            Err(StoreError::Config(_))
        ));
        assert!(BackendConfig::new().with_url("ftp://x").validate().is_err());
        assert!(BackendConfig::new()
            .with_url("https://x.example")
            .validate()
            .is_ok());
    }

    #[test]
    fn poll_interval_never_zero() {
        let config = BackendConfig::new().with_poll_interval(Duration::ZERO);
        assert_eq!(config.poll_interval(), Duration::from_millis(1));
    }

    #[test]
    fn partial_config_keeps_defaults() {
        let config: BackendConfig =
            serde_json::from_str(r#"{"url": "https://x.example"}"#).unwrap();
        assert_eq!(config.url, "https://x.example");
        assert_eq!(config.photo_bucket, "stray-photos");
    }
}
