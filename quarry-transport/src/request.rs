//! Wire-level request description.

use bytes::Bytes;
use http::{HeaderMap, HeaderName, HeaderValue, Method};
use std::collections::BTreeMap;

use crate::{Result, TransportError};

/// A fully resolved HTTP request, ready for a [`Transport`](crate::Transport).
///
/// `path` is relative to the node URL and already percent-safe. Query
/// parameter keys are unique; multi-valued parameters are comma-joined by
/// whoever builds the request.
#[derive(Debug, Clone)]
pub struct WireRequest {
    /// HTTP method.
    pub method: Method,
    /// Request path, starting with `/`.
    pub path: String,
    /// Optional request body.
    pub body: Option<Bytes>,
    /// Query parameters.
    pub params: BTreeMap<String, String>,
    /// Header overrides.
    pub headers: HeaderMap,
}

impl WireRequest {
    /// Create a request without body, parameters or headers.
    pub fn new(method: Method, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            body: None,
            params: BTreeMap::new(),
            headers: HeaderMap::new(),
        }
    }

    /// Set the request body.
    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = Some(body.into());
        self
    }

    /// Set a query parameter, replacing any previous value for the key.
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Merge a set of query parameters.
    pub fn with_params<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (k, v) in params {
            self.params.insert(k.into(), v.into());
        }
        self
    }

    /// Set a header override.
    pub fn with_header(mut self, name: &str, value: &str) -> Result<Self> {
        let name = HeaderName::try_from(name)
            .map_err(|e| TransportError::InvalidHeader(format!("{name}: {e}")))?;
        let value = HeaderValue::try_from(value)
            .map_err(|e| TransportError::InvalidHeader(format!("{name}: {e}")))?;
        self.headers.insert(name, value);
        Ok(self)
    }

    /// Merge header overrides.
    pub fn with_headers(mut self, headers: HeaderMap) -> Self {
        self.headers.extend(headers);
        self
    }

    /// Render the query parameters, percent-encoded, without the leading `?`.
    pub fn query_string(&self) -> String {
        if self.params.is_empty() {
            return String::new();
        }
        serde_urlencoded::to_string(&self.params).unwrap_or_default()
    }

    /// Check whether the request carries a non-empty body.
    pub fn has_body(&self) -> bool {
        self.body.as_ref().is_some_and(|b| !b.is_empty())
    }
}
