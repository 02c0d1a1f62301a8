//! Centralized configuration management for refugee-flows

use std::path::PathBuf;
use std::time::Duration;

use anyhow::{Context, Result};
use reqwest::Url;

use crate::candidates::DEFAULT_BASE_URL;
use crate::retry::{RetryPolicy, DEFAULT_REQUEST_DELAY};

/// Application configuration
#[derive(Debug, Clone)]
pub struct Config {
    /// Remote directory every report is published under
    pub base_url: String,
    /// Root of the downloaded documents tree
    pub output_dir: PathBuf,
    /// Directory holding the resolution cache files
    pub metadata_dir: PathBuf,
    /// Directory for the log file
    pub log_dir: PathBuf,
    /// Rate limiting configuration
    pub rate_limits: RateLimits,
    /// HTTP client configuration
    pub http: HttpConfig,
}

/// Rate limiting configuration
#[derive(Debug, Clone)]
pub struct RateLimits {
    /// Delay between two consecutive requests (milliseconds)
    pub request_delay_ms: u64,
    /// Optional cap on brute-force attempts per language
    pub max_attempts_per_language: Option<usize>,
}

/// HTTP client configuration
#[derive(Debug, Clone, Default)]
pub struct HttpConfig {
    /// Request timeout in seconds; the client default (none) when unset
    pub timeout_seconds: Option<u64>,
    /// User agent string; no header when unset
    pub user_agent: Option<String>,
}

impl Default for RateLimits {
    fn default() -> Self {
        Self {
            request_delay_ms: DEFAULT_REQUEST_DELAY.as_millis() as u64,
            max_attempts_per_language: None,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            output_dir: PathBuf::from("output"),
            metadata_dir: PathBuf::from("metadata"),
            log_dir: PathBuf::from("."),
            rate_limits: RateLimits::default(),
            http: HttpConfig::default(),
        }
    }
}

impl Config {
    /// Load configuration from environment variables and defaults
    pub fn from_env() -> Result<Self> {
        let defaults = Config::default();

        let base_url = std::env::var("REFUGEE_FLOWS_BASE_URL").unwrap_or(defaults.base_url);

        let output_dir = std::env::var("REFUGEE_FLOWS_OUTPUT_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.output_dir);

        let metadata_dir = std::env::var("REFUGEE_FLOWS_METADATA_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.metadata_dir);

        let log_dir = std::env::var("REFUGEE_FLOWS_LOG_DIR")
            .map(PathBuf::from)
            .unwrap_or(defaults.log_dir);

        let rate_limits = RateLimits {
            request_delay_ms: parse_env_var("REFUGEE_FLOWS_REQUEST_DELAY_MS")?
                .unwrap_or(defaults.rate_limits.request_delay_ms),
            max_attempts_per_language: parse_env_var("REFUGEE_FLOWS_MAX_ATTEMPTS")?,
        };

        let http = HttpConfig {
            timeout_seconds: parse_env_var("REFUGEE_FLOWS_HTTP_TIMEOUT_SECONDS")?,
            user_agent: std::env::var("REFUGEE_FLOWS_USER_AGENT").ok(),
        };

        Ok(Config {
            base_url,
            output_dir,
            metadata_dir,
            log_dir,
            rate_limits,
            http,
        })
    }

    /// Get request delay as Duration
    pub fn request_delay(&self) -> Duration {
        Duration::from_millis(self.rate_limits.request_delay_ms)
    }

    pub fn retry_policy(&self) -> RetryPolicy {
        let policy = RetryPolicy::fixed(self.request_delay());
        match self.rate_limits.max_attempts_per_language {
            Some(cap) => policy.with_max_attempts(cap),
            None => policy,
        }
    }

    /// Validate configuration. Any failure here is fatal.
    pub fn validate(&self) -> Result<()> {
        let url = Url::parse(&self.base_url)
            .with_context(|| format!("Invalid base URL: {}", self.base_url))?;

        if !matches!(url.scheme(), "http" | "https") {
            return Err(anyhow::anyhow!(
                "Base URL must use http or https: {}",
                self.base_url
            ));
        }

        if !self.base_url.ends_with('/') {
            return Err(anyhow::anyhow!(
                "Base URL must end with '/': {}",
                self.base_url
            ));
        }

        if url.query().is_some() || url.fragment().is_some() {
            return Err(anyhow::anyhow!(
                "Base URL must not carry a query or fragment: {}",
                self.base_url
            ));
        }

        if self.rate_limits.max_attempts_per_language == Some(0) {
            return Err(anyhow::anyhow!("Max attempts per language must be at least 1"));
        }

        Ok(())
    }
}

/// Helper function to parse environment variable as a specific type
fn parse_env_var<T>(var_name: &str) -> Result<Option<T>>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display + Send + Sync + std::error::Error + 'static,
{
    match std::env::var(var_name) {
        Ok(val) => val.parse().map(Some).with_context(|| {
            format!("Failed to parse environment variable {} = '{}'", var_name, val)
        }),
        Err(_) => Ok(None),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_defaults() {
        let config = Config::default();
        assert_eq!(config.base_url, "http://media.gov.gr/images/prosfygiko/");
        assert_eq!(config.output_dir, PathBuf::from("output"));
        assert_eq!(config.metadata_dir, PathBuf::from("metadata"));
        assert_eq!(config.request_delay(), Duration::from_millis(50));
        assert!(config.http.timeout_seconds.is_none());
        assert!(config.http.user_agent.is_none());
        assert_eq!(config.retry_policy(), RetryPolicy::default());
    }

    #[test]
    fn test_config_validation() {
        Config::default().validate().unwrap();

        for bad in [
            "not a url",
            "ftp://media.gov.gr/images/prosfygiko/",
            "http://media.gov.gr/images/prosfygiko",
            "http://media.gov.gr/images/?x=1/",
        ] {
            let config = Config {
                base_url: bad.to_string(),
                ..Config::default()
            };
            assert!(config.validate().is_err(), "{} should be rejected", bad);
        }
    }

    #[test]
    fn test_retry_policy_cap() {
        let mut config = Config::default();
        config.rate_limits.max_attempts_per_language = Some(3);
        assert_eq!(config.retry_policy().max_attempts, Some(3));

        config.rate_limits.max_attempts_per_language = Some(0);
        assert!(config.validate().is_err());
    }
}
