//! Transport configuration.

use std::time::Duration;
use url::Url;

use crate::retry::RetryConfig;

/// Transport configuration.
#[derive(Debug, Clone)]
pub struct TransportConfig {
    /// Cluster node URLs.
    pub nodes: Vec<Url>,
    /// Basic auth username, used when a node URL carries no credentials.
    pub username: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
    /// Request timeout enforced by the HTTP client.
    pub timeout: Duration,
    /// Connection timeout.
    pub connect_timeout: Duration,
    /// Idle timeout for pooled connections.
    pub pool_idle_timeout: Duration,
    /// Maximum idle connections per host.
    pub pool_max_idle_per_host: usize,
    /// Headers added to every request unless the request sets them.
    pub default_headers: Vec<(String, String)>,
    /// User agent string.
    pub user_agent: String,
    /// Gzip-compress request bodies.
    pub compress_request_body: bool,
    /// Retry configuration.
    pub retry: RetryConfig,
    /// Initial time a failed node stays out of rotation.
    pub resurrect_timeout: Duration,
}

impl Default for TransportConfig {
    fn default() -> Self {
        Self {
            nodes: Vec::new(),
            username: None,
            password: None,
            timeout: Duration::from_secs(30),
            connect_timeout: Duration::from_secs(10),
            pool_idle_timeout: Duration::from_secs(90),
            pool_max_idle_per_host: 32,
            default_headers: Vec::new(),
            user_agent: default_user_agent(),
            compress_request_body: false,
            retry: RetryConfig::default(),
            resurrect_timeout: Duration::from_secs(60),
        }
    }
}

impl TransportConfig {
    /// Create a new configuration builder.
    pub fn builder() -> TransportConfigBuilder {
        TransportConfigBuilder::default()
    }
}

/// `quarry/<version> (<os> <arch>; Rust)`.
fn default_user_agent() -> String {
    format!(
        "quarry/{} ({} {}; Rust)",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Builder for transport configuration.
#[derive(Debug, Default)]
pub struct TransportConfigBuilder {
    config: TransportConfig,
}

impl TransportConfigBuilder {
    /// Add a node URL.
    pub fn node(mut self, url: Url) -> Self {
        self.config.nodes.push(url);
        self
    }

    /// Replace the node URLs.
    pub fn nodes(mut self, urls: Vec<Url>) -> Self {
        self.config.nodes = urls;
        self
    }

    /// Set basic authentication credentials.
    pub fn basic_auth(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.config.username = Some(username.into());
        self.config.password = Some(password.into());
        self
    }

    /// Set the request timeout.
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.config.timeout = timeout;
        self
    }

    /// Set the connection timeout.
    pub fn connect_timeout(mut self, timeout: Duration) -> Self {
        self.config.connect_timeout = timeout;
        self
    }

    /// Set the connection pool idle timeout.
    pub fn pool_idle_timeout(mut self, timeout: Duration) -> Self {
        self.config.pool_idle_timeout = timeout;
        self
    }

    /// Set the maximum idle connections per host.
    pub fn pool_max_idle_per_host(mut self, max: usize) -> Self {
        self.config.pool_max_idle_per_host = max;
        self
    }

    /// Add a default header for all requests.
    pub fn default_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.config.default_headers.push((name.into(), value.into()));
        self
    }

    /// Set the user agent string.
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.config.user_agent = user_agent.into();
        self
    }

    /// Enable or disable gzip compression of request bodies.
    pub fn compress_request_body(mut self, enable: bool) -> Self {
        self.config.compress_request_body = enable;
        self
    }

    /// Set retry configuration.
    pub fn retry(mut self, config: RetryConfig) -> Self {
        self.config.retry = config;
        self
    }

    /// Set the initial resurrect timeout for failed nodes.
    pub fn resurrect_timeout(mut self, timeout: Duration) -> Self {
        self.config.resurrect_timeout = timeout;
        self
    }

    /// Build the configuration.
    pub fn build(self) -> TransportConfig {
        self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = TransportConfig::default();
        assert!(config.nodes.is_empty());
        assert_eq!(config.timeout, Duration::from_secs(30));
        assert!(!config.compress_request_body);
        assert!(config.user_agent.starts_with("quarry/"));
        assert_eq!(config.retry.max_retries, 3);
    }

    #[test]
    fn test_builder() {
        let config = TransportConfig::builder()
            .node(Url::parse("http://localhost:9200").unwrap())
            .basic_auth("admin", "admin")
            .default_header("x-team", "search")
            .compress_request_body(true)
            .retry(RetryConfig::disabled())
            .build();

        assert_eq!(config.nodes.len(), 1);
        assert_eq!(config.username.as_deref(), Some("admin"));
        assert_eq!(config.default_headers, vec![("x-team".into(), "search".into())]);
        assert!(config.compress_request_body);
        assert!(config.retry.disabled);
    }
}
