//! Client configuration.

use quarry_transport::TransportConfig;
use thiserror::Error;
use tracing::debug;
use url::Url;

/// Address used when none is configured.
pub const DEFAULT_ADDRESS: &str = "http://localhost:9200";

/// Environment variable holding a comma-separated list of addresses.
pub const ADDRESS_ENV: &str = "OPENSEARCH_URL";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// An address could not be parsed as a URL.
    #[error("Invalid address {address:?}: {source}")]
    InvalidUrl {
        /// The offending address.
        address: String,
        /// Parser error.
        source: url::ParseError,
    },
}

/// OpenSearch client configuration.
#[derive(Debug, Clone, Default)]
pub struct ClientConfig {
    /// Node addresses. Empty means [`DEFAULT_ADDRESS`].
    pub addresses: Vec<String>,
    /// Basic auth username.
    pub username: Option<String>,
    /// Basic auth password.
    pub password: Option<String>,
    /// Transport settings. Its node list and credentials are filled in from
    /// this configuration.
    pub transport: TransportConfig,
}

impl ClientConfig {
    /// Create a configuration for a single address.
    pub fn new(address: impl Into<String>) -> Self {
        Self {
            addresses: vec![address.into()],
            ..Default::default()
        }
    }

    /// Create a configuration for several addresses.
    pub fn cluster<I, S>(addresses: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            addresses: addresses.into_iter().map(Into::into).collect(),
            ..Default::default()
        }
    }

    /// Create a configuration from `OPENSEARCH_URL`.
    ///
    /// Falls back to [`DEFAULT_ADDRESS`] when the variable is unset or empty.
    pub fn from_env() -> Self {
        let addresses = std::env::var(ADDRESS_ENV)
            .map(|value| split_addresses(&value))
            .unwrap_or_default();
        debug!(?addresses, "Loaded addresses from environment");
        Self {
            addresses,
            ..Default::default()
        }
    }

    /// Set basic authentication credentials.
    pub fn with_basic_auth(
        mut self,
        username: impl Into<String>,
        password: impl Into<String>,
    ) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Set transport settings.
    pub fn with_transport(mut self, transport: TransportConfig) -> Self {
        self.transport = transport;
        self
    }

    /// Parse the configured addresses, trailing `/` trimmed.
    pub fn urls(&self) -> Result<Vec<Url>, ConfigError> {
        if self.addresses.is_empty() {
            return Ok(vec![parse_address(DEFAULT_ADDRESS)?]);
        }
        self.addresses.iter().map(|a| parse_address(a)).collect()
    }

    /// Resolve into the transport configuration.
    ///
    /// Explicit credentials win; otherwise credentials embedded in the first
    /// address are used.
    pub fn into_transport_config(self) -> Result<TransportConfig, ConfigError> {
        let urls = self.urls()?;
        let mut transport = self.transport;

        match (self.username, self.password) {
            (Some(username), Some(password)) => {
                transport.username = Some(username);
                transport.password = Some(password);
            }
            _ => {
                if let Some(first) = urls.first()
                    && !first.username().is_empty()
                {
                    transport.username = Some(first.username().to_string());
                    transport.password = first.password().map(str::to_string);
                }
            }
        }

        transport.nodes = urls;
        Ok(transport)
    }
}

/// Split a comma-separated address list, dropping blanks.
fn split_addresses(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(String::from)
        .collect()
}

fn parse_address(address: &str) -> Result<Url, ConfigError> {
    let trimmed = address.trim().trim_end_matches('/');
    Url::parse(trimmed).map_err(|source| ConfigError::InvalidUrl {
        address: address.to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_address() {
        let urls = ClientConfig::default().urls().unwrap();
        assert_eq!(urls.len(), 1);
        assert_eq!(urls[0].as_str(), "http://localhost:9200/");
    }

    #[test]
    fn test_split_addresses() {
        assert_eq!(
            split_addresses(" http://a:9200 ,http://b:9200/,, "),
            vec!["http://a:9200".to_string(), "http://b:9200/".to_string()]
        );
        assert!(split_addresses("").is_empty());
    }

    #[test]
    fn test_trailing_slash_trimmed() {
        let urls = ClientConfig::new("https://search.internal:9200/proxy/")
            .urls()
            .unwrap();
        assert_eq!(urls[0].path(), "/proxy");
    }

    #[test]
    fn test_invalid_address() {
        let err = ClientConfig::cluster(["http://ok:9200", "not a url"])
            .urls()
            .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidUrl { ref address, .. } if address == "not a url"));
    }

    #[test]
    fn test_credentials_from_first_address() {
        let transport = ClientConfig::cluster(["http://admin:s3cret@a:9200", "http://b:9200"])
            .into_transport_config()
            .unwrap();

        assert_eq!(transport.nodes.len(), 2);
        assert_eq!(transport.username.as_deref(), Some("admin"));
        assert_eq!(transport.password.as_deref(), Some("s3cret"));
    }

    #[test]
    fn test_explicit_credentials_win() {
        let transport = ClientConfig::new("http://admin:s3cret@a:9200")
            .with_basic_auth("reader", "r")
            .into_transport_config()
            .unwrap();

        assert_eq!(transport.username.as_deref(), Some("reader"));
        assert_eq!(transport.password.as_deref(), Some("r"));
    }

    #[test]
    fn test_transport_settings_kept() {
        let transport = ClientConfig::new("http://a:9200")
            .with_transport(TransportConfig::builder().compress_request_body(true).build())
            .into_transport_config()
            .unwrap();

        assert!(transport.compress_request_body);
        assert_eq!(transport.nodes[0].host_str(), Some("a"));
    }
}
