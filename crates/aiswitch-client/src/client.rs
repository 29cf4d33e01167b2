//! Shared HTTP client utilities

use crate::{ClientError, Result};
use reqwest::{Client, ClientBuilder};
use std::time::Duration;
use tracing::debug;

/// HTTP client configuration
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout in seconds
    pub timeout_secs: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Maximum number of idle connections per host
    pub pool_max_idle_per_host: usize,

    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            // Every call is a small config or log read; the backend is local
            timeout_secs: 30,
            connect_timeout_secs: 5,
            pool_max_idle_per_host: 4,
            user_agent: format!("aiswitch/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Set the request timeout
    pub fn with_timeout_secs(mut self, timeout_secs: u64) -> Self {
        self.timeout_secs = timeout_secs;
        self
    }
}

/// Create a configured HTTP client
pub fn create_client(config: &HttpClientConfig) -> Result<Client> {
    debug!(
        timeout_secs = config.timeout_secs,
        connect_timeout_secs = config.connect_timeout_secs,
        "Creating HTTP client"
    );

    ClientBuilder::new()
        .timeout(Duration::from_secs(config.timeout_secs))
        .connect_timeout(Duration::from_secs(config.connect_timeout_secs))
        .pool_max_idle_per_host(config.pool_max_idle_per_host)
        .pool_idle_timeout(Duration::from_secs(90))
        .user_agent(&config.user_agent)
        .build()
        .map_err(|e| ClientError::Config(format!("Failed to create HTTP client: {}", e)))
}
