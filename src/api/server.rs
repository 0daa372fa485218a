//! Server bind configuration.
//!
//! # Environment Variables
//!
//! - `HOST`: bind address (default: `0.0.0.0`)
//! - `PORT`: bind port (default: `5000`)

use std::env;
use std::net::SocketAddr;

use crate::infrastructure::ConfigurationError;

const DEFAULT_HOST: &str = "0.0.0.0";
const DEFAULT_PORT: u16 = 5000;

/// Address the HTTP server listens on.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: DEFAULT_HOST.to_string(),
            port: DEFAULT_PORT,
        }
    }
}

impl ServerConfig {
    /// Reads `HOST` and `PORT`.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidValue` if `PORT` is not a valid
    /// port number.
    pub fn from_env() -> Result<Self, ConfigurationError> {
        let host = env::var("HOST")
            .ok()
            .map(|value| value.trim().to_string())
            .filter(|value| !value.is_empty())
            .unwrap_or_else(|| DEFAULT_HOST.to_string());

        let port = match env::var("PORT") {
            Ok(value) => parse_port(&value)?,
            Err(_) => DEFAULT_PORT,
        };

        Ok(Self { host, port })
    }

    /// Resolves the socket address to bind.
    ///
    /// # Errors
    ///
    /// Returns `ConfigurationError::InvalidValue` if `host` is not an IP
    /// address.
    pub fn socket_address(&self) -> Result<SocketAddr, ConfigurationError> {
        format!("{}:{}", self.host, self.port)
            .parse()
            .map_err(|error| ConfigurationError::InvalidValue {
                key: "HOST".to_string(),
                message: format!("'{}' is not a valid address: {error}", self.host),
            })
    }
}

fn parse_port(value: &str) -> Result<u16, ConfigurationError> {
    value
        .trim()
        .parse()
        .map_err(|_| ConfigurationError::InvalidValue {
            key: "PORT".to_string(),
            message: format!("expected a port number, got '{value}'"),
        })
}
