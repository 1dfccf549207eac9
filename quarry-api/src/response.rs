//! Buffered response returned alongside every dispatch outcome.

use bytes::Bytes;
use http::{HeaderMap, StatusCode};
use quarry_transport::status_line;
use serde::de::DeserializeOwned;
use std::borrow::Cow;

/// Status, headers and the fully read body of a round trip.
///
/// The dispatcher drains and releases the transport body before handing
/// this out, so it can be kept, cloned and inspected freely.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Response {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Response body.
    pub body: Bytes,
}

impl Response {
    /// Create a response.
    pub fn new(status: StatusCode, headers: HeaderMap, body: impl Into<Bytes>) -> Self {
        Self {
            status,
            headers,
            body: body.into(),
        }
    }

    /// Check if the status denotes an error (400 and above).
    pub fn is_error(&self) -> bool {
        self.status.as_u16() >= 400
    }

    /// Status line such as `404 Not Found`.
    pub fn status_line(&self) -> String {
        status_line(self.status)
    }

    /// Header value as a string, if present and valid UTF-8.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers.get(name).and_then(|v| v.to_str().ok())
    }

    /// Body as text, replacing invalid UTF-8.
    pub fn text(&self) -> Cow<'_, str> {
        String::from_utf8_lossy(&self.body)
    }

    /// Decode the body as JSON.
    pub fn json<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_slice(&self.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use http::HeaderValue;

    #[test]
    fn test_accessors() {
        let mut headers = HeaderMap::new();
        headers.insert("x-opaque-id", HeaderValue::from_static("abc"));
        let response = Response::new(StatusCode::NOT_FOUND, headers, r#"{"found":false}"#);

        assert!(response.is_error());
        assert_eq!(response.status_line(), "404 Not Found");
        assert_eq!(response.header("x-opaque-id"), Some("abc"));
        assert_eq!(response.text(), r#"{"found":false}"#);

        let value: serde_json::Value = response.json().unwrap();
        assert_eq!(value["found"], false);
    }

    #[test]
    fn test_default_is_empty_success() {
        let response = Response::default();
        assert_eq!(response.status, StatusCode::OK);
        assert!(!response.is_error());
        assert!(response.body.is_empty());
    }
}
