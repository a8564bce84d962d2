//! HTTP client with rate limiting
//!
//! Sends one [`RequestSpec`] and reports what came back. Status codes are
//! not interpreted here: classification and retries belong to the stream
//! reader and its error handler, so a 429 or 500 is returned as an ordinary
//! [`ResponsePage`]. Only transport failures become errors.

use super::rate_limit::{RateLimiter, RateLimiterConfig};
use super::response::ResponsePage;
use crate::error::{Error, Result};
use crate::request::RequestSpec;
use crate::types::StringMap;
use reqwest::Client;
use std::time::Duration;
use tracing::debug;

/// Configuration for the HTTP client
#[derive(Debug, Clone)]
pub struct HttpClientConfig {
    /// Request timeout; zero disables it
    pub timeout: Duration,
    /// Rate limiter configuration
    pub rate_limit: Option<RateLimiterConfig>,
    /// Default headers for all requests
    pub default_headers: StringMap,
    /// User agent string
    pub user_agent: String,
}

impl Default for HttpClientConfig {
    fn default() -> Self {
        Self {
            timeout: Duration::from_secs(30),
            rate_limit: None,
            default_headers: StringMap::new(),
            user_agent: format!("export-cdk/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl HttpClientConfig {
    /// Create a new config builder
    pub fn builder() -> HttpClientConfigBuilder {
        HttpClientConfigBuilder::default()
    }
}

/// Builder for HTTP client config
#[derive(Debug, Default)]
pub struct HttpClientConfigBuilder {
    config: HttpClientConfig,
}

impl HttpClientConfigBuilder {
    /// Set the request timeout
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set rate limiter
    pub fn rate_limit(mut self, config: RateLimiterConfig) -> Self {
        self.config.rate_limit = Some(config);
        self
    }

    /// Disable rate limiting
    pub fn no_rate_limit(mut self) -> Self {
        self.config.rate_limit = None;
        self
    }

    /// Add a default header
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.insert(key.into(), value.into());
        self
    }

    /// Set user agent
    pub fn user_agent(mut self, agent: impl Into<String>) -> Self {
        self.config.user_agent = agent.into();
        self
    }

    /// Build the config
    pub fn build(self) -> HttpClientConfig {
        self.config
    }
}

/// HTTP client with optional rate limiting
#[derive(Clone)]
pub struct HttpClient {
    client: Client,
    config: HttpClientConfig,
    rate_limiter: Option<RateLimiter>,
}

impl HttpClient {
    /// Create a new HTTP client with default configuration
    pub fn new() -> Result<Self> {
        Self::with_config(HttpClientConfig::default())
    }

    /// Create a new HTTP client with custom configuration
    pub fn with_config(config: HttpClientConfig) -> Result<Self> {
        let mut builder = Client::builder().user_agent(&config.user_agent);
        if !config.timeout.is_zero() {
            builder = builder.timeout(config.timeout);
        }
        let client = builder
            .build()
            .map_err(|e| Error::config(format!("Failed to build HTTP client: {e}")))?;

        let rate_limiter = config.rate_limit.as_ref().map(RateLimiter::new);

        Ok(Self {
            client,
            config,
            rate_limiter,
        })
    }

    /// Client configuration
    pub fn config(&self) -> &HttpClientConfig {
        &self.config
    }

    /// Check if rate limiting is enabled
    pub fn has_rate_limiter(&self) -> bool {
        self.rate_limiter.is_some()
    }

    /// Issue a request once
    pub async fn send(&self, spec: &RequestSpec) -> Result<ResponsePage> {
        // Wait for rate limiter
        if let Some(ref limiter) = self.rate_limiter {
            limiter.wait().await;
        }

        let mut req = self
            .client
            .request(spec.method.into(), spec.url.clone())
            .timeout(self.config.timeout);

        for (key, value) in &self.config.default_headers {
            req = req.header(key.as_str(), value.as_str());
        }
        for (key, value) in &spec.headers {
            req = req.header(key.as_str(), value.as_str());
        }
        if !spec.query.is_empty() {
            req = req.query(&spec.query);
        }
        if let Some(ref body) = spec.body {
            req = req.json(body);
        }

        let response = req.send().await.map_err(|e| self.transport_error(&e))?;

        let status = response.status().as_u16();
        let headers = response.headers().clone();
        let body = response
            .text()
            .await
            .map_err(|e| self.transport_error(&e))?;

        debug!(status, bytes = body.len(), "Response received");
        Ok(ResponsePage::new(status, headers, body))
    }

    #[allow(clippy::cast_possible_truncation)]
    fn transport_error(&self, e: &reqwest::Error) -> Error {
        if e.is_timeout() {
            Error::Timeout {
                timeout_ms: self.config.timeout.as_millis() as u64,
            }
        } else {
            Error::network(e.to_string())
        }
    }
}

impl std::fmt::Debug for HttpClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpClient")
            .field("config", &self.config)
            .field("has_rate_limiter", &self.rate_limiter.is_some())
            .finish_non_exhaustive()
    }
}
