//! Transport error types.

use thiserror::Error;

/// Result type for transport operations.
pub type Result<T> = std::result::Result<T, TransportError>;

/// Failures raised before or while a response is received.
///
/// None of these carry an HTTP status: a status code means the server
/// answered, which is a response, not a transport error.
#[derive(Debug, Error)]
pub enum TransportError {
    /// Connection could not be established or was dropped.
    #[error("Connection error: {0}")]
    Connection(String),

    /// Request timed out at the HTTP client level.
    #[error("Request timed out")]
    Timeout,

    /// The caller cancelled the request.
    #[error("Request cancelled")]
    Cancelled,

    /// The caller's deadline passed before the request completed.
    #[error("Request deadline exceeded")]
    DeadlineExceeded,

    /// Every node in the pool is unusable.
    #[error("Cannot get connection: {0}")]
    NoConnection(String),

    /// A node or request URL is malformed.
    #[error("Invalid URL: {0}")]
    InvalidUrl(String),

    /// A header name or value is malformed.
    #[error("Invalid header: {0}")]
    InvalidHeader(String),

    /// The request body could not be gzip-compressed.
    #[error("Failed to compress request body: {0}")]
    Compression(#[source] std::io::Error),

    /// The response body stream failed mid-read.
    #[error("Failed to read response body: {0}")]
    Body(String),

    /// Underlying HTTP client error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("URL parse error: {0}")]
    UrlParse(#[from] url::ParseError),
}

impl TransportError {
    /// Check if this is a timeout error.
    pub fn is_timeout(&self) -> bool {
        matches!(self, Self::Timeout) || matches!(self, Self::Http(e) if e.is_timeout())
    }

    /// Check if this is a connection error.
    pub fn is_connection(&self) -> bool {
        matches!(self, Self::Connection(_)) || matches!(self, Self::Http(e) if e.is_connect())
    }

    /// Check if the caller aborted the request through its context.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Cancelled | Self::DeadlineExceeded)
    }

    /// Check if the failure happened at network level and the request may be
    /// sent again to another node.
    pub(crate) fn is_network(&self) -> bool {
        match self {
            Self::Connection(_) | Self::Timeout => true,
            Self::Http(e) => e.is_connect() || e.is_timeout() || e.is_request(),
            _ => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classification_helpers() {
        assert!(TransportError::Timeout.is_timeout());
        assert!(TransportError::Connection("refused".into()).is_connection());
        assert!(TransportError::Cancelled.is_cancellation());
        assert!(TransportError::DeadlineExceeded.is_cancellation());
        assert!(!TransportError::InvalidUrl("x".into()).is_network());
    }

    #[test]
    fn test_display() {
        let err = TransportError::NoConnection("all nodes dead".into());
        assert_eq!(err.to_string(), "Cannot get connection: all nodes dead");
    }
}
