//! Client configuration.
//!
//! # Environment Variables
//!
//! - `TODO_API_URL`: base URL of the API, including the `/api` prefix
//!   (default: `http://localhost:5000/api`)
//! - `TODO_API_TIMEOUT_SECS`: per-request timeout in seconds (default: 30)

use std::env;
use std::time::Duration;

use crate::infrastructure::ConfigurationError;

const DEFAULT_BASE_URL: &str = "http://localhost:5000/api";
const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Where the client sends requests and how long it waits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientConfig {
    /// Base URL without a trailing slash.
    pub base_url: String,
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

impl ClientConfig {
    /// Creates a configuration for the given base URL.
    #[must_use]
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: normalize_base_url(&base_url.into()),
            ..Self::default()
        }
    }

    /// Creates a configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidValue` if `TODO_API_URL` is blank
    /// or `TODO_API_TIMEOUT_SECS` is not a positive integer.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let base_url = match env::var("TODO_API_URL") {
            Ok(value) if value.trim().is_empty() => {
                return Err(ConfigurationError::InvalidValue {
                    key: "TODO_API_URL".to_string(),
                    message: "must not be empty".to_string(),
                });
            }
            Ok(value) => normalize_base_url(&value),
            Err(_) => DEFAULT_BASE_URL.to_string(),
        };

        let timeout = match env::var("TODO_API_TIMEOUT_SECS") {
            Ok(value) => parse_timeout(&value)?,
            Err(_) => Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        };

        Ok(Self { base_url, timeout })
    }
}

fn normalize_base_url(value: &str) -> String {
    value.trim().trim_end_matches('/').to_string()
}

fn parse_timeout(value: &str) -> Result<Duration, ConfigurationError> {
    match value.trim().parse::<u64>() {
        Ok(0) | Err(_) => Err(ConfigurationError::InvalidValue {
            key: "TODO_API_TIMEOUT_SECS".to_string(),
            message: format!("expected a positive integer, got '{value}'"),
        }),
        Ok(seconds) => Ok(Duration::from_secs(seconds)),
    }
}
