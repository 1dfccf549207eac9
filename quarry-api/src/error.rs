//! Error types for dispatched requests.

use http::StatusCode;
use quarry_transport::{TransportError, status_line};
use serde::{Deserialize, Deserializer};
use std::fmt;
use thiserror::Error;

use crate::config::ConfigError;
use crate::response::Response;

/// Result type alias for API operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Marker carried by [`UnknownError`] when a failure response had no body.
pub const EMPTY_BODY: &str = "unexpected empty body";

/// Everything a dispatch call can fail with.
///
/// Variants that are produced after a response arrived carry the buffered
/// [`Response`], so callers can still look at the status and headers.
#[derive(Debug, Error)]
pub enum Error {
    /// The client configuration is unusable.
    #[error(transparent)]
    Config(#[from] ConfigError),

    /// The request body could not be serialized. Nothing was sent.
    #[error("Failed to serialize request body: {0}")]
    BodySerialization(#[source] serde_json::Error),

    /// No response was received: connection failure, timeout or cancellation.
    #[error(transparent)]
    Transport(#[from] TransportError),

    /// A response arrived but its body could not be read.
    #[error("Failed to read response body, status: {}", status_line(*status))]
    ReadBody {
        /// Status of the response whose body failed.
        status: StatusCode,
        /// Underlying stream error.
        source: TransportError,
    },

    /// A body could not be decoded as JSON.
    #[error("Failed to decode response body: {source}")]
    Decode {
        /// Decoder error.
        source: serde_json::Error,
        /// The response that failed to decode.
        response: Box<Response>,
    },

    /// The server answered with a failure status and a classified body.
    #[error("{error}")]
    Api {
        /// Classified error body.
        #[source]
        error: ApiError,
        /// The failure response.
        response: Box<Response>,
    },

    /// The server answered with a failure status and the caller asked for
    /// no body, so only the status line is reported.
    #[error("status: {}", response.status_line())]
    Status {
        /// The failure response.
        response: Box<Response>,
    },
}

impl Error {
    /// The buffered response, when one was received.
    pub fn response(&self) -> Option<&Response> {
        match self {
            Self::Decode { response, .. } | Self::Api { response, .. } | Self::Status { response } => {
                Some(response)
            }
            _ => None,
        }
    }

    /// HTTP status of the response, when one was received.
    pub fn status(&self) -> Option<StatusCode> {
        match self {
            Self::ReadBody { status, .. } => Some(*status),
            other => other.response().map(|r| r.status),
        }
    }

    /// The classified error body, for [`Error::Api`].
    pub fn api_error(&self) -> Option<&ApiError> {
        match self {
            Self::Api { error, .. } => Some(error),
            _ => None,
        }
    }

    /// Check if the server answered 404.
    pub fn is_not_found(&self) -> bool {
        self.status() == Some(StatusCode::NOT_FOUND)
    }

    /// Check if the caller's context cancelled the call or its deadline passed.
    pub fn is_cancellation(&self) -> bool {
        matches!(self, Self::Transport(e) if e.is_cancellation())
    }
}

/// A failure body, classified by shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ApiError {
    /// `{"error": {"type", "reason", "root_cause"}, "status"}`.
    #[error(transparent)]
    Structured(#[from] StructuredError),

    /// `{"error": "<message>", "status"}`, and every 405.
    #[error(transparent)]
    String(#[from] StringError),

    /// Anything else. The raw body is kept.
    #[error(transparent)]
    Unknown(#[from] UnknownError),
}

impl ApiError {
    /// Status code reported for the error.
    pub fn status(&self) -> u16 {
        match self {
            Self::Structured(e) => e.status,
            Self::String(e) => e.status,
            Self::Unknown(e) => e.status,
        }
    }

    /// Error type for structured errors, such as `index_not_found_exception`.
    pub fn kind(&self) -> Option<&str> {
        match self {
            Self::Structured(e) => Some(&e.kind),
            _ => None,
        }
    }
}

/// Structured error envelope.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error(
    "status: {status}, type: {kind}, reason: {reason}, root_cause: {}",
    RootCauses(root_cause)
)]
pub struct StructuredError {
    /// Status from the body.
    pub status: u16,
    /// Error type.
    pub kind: String,
    /// Human-readable reason.
    pub reason: String,
    /// Underlying causes.
    pub root_cause: Vec<RootCause>,
    /// Index involved, if any.
    pub index: Option<String>,
    /// UUID of the index involved, if any.
    pub index_uuid: Option<String>,
}

/// One entry of `root_cause`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct RootCause {
    /// Cause type.
    #[serde(rename = "type", default, deserialize_with = "null_as_default")]
    pub kind: String,
    /// Cause reason.
    #[serde(default, deserialize_with = "null_as_default")]
    pub reason: String,
    /// Index involved, if any.
    #[serde(default)]
    pub index: Option<String>,
    /// UUID of the index involved, if any.
    #[serde(default)]
    pub index_uuid: Option<String>,
}

/// Reads `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

struct RootCauses<'a>(&'a [RootCause]);

impl fmt::Display for RootCauses<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("[")?;
        for (i, cause) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}: {}", cause.kind, cause.reason)?;
        }
        f.write_str("]")
    }
}

/// Error whose `error` field is a bare string.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("status: {status}, error: {message}")]
pub struct StringError {
    /// Status code.
    pub status: u16,
    /// Error message.
    pub message: String,
}

/// Failure body that matched no known shape.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("status: {status}, {}", describe_body(body))]
pub struct UnknownError {
    /// HTTP status code.
    pub status: u16,
    /// Raw body, `None` when the response had no body.
    pub body: Option<String>,
}

fn describe_body(body: &Option<String>) -> String {
    match body {
        Some(body) => format!("body: {body}"),
        None => EMPTY_BODY.to_string(),
    }
}

impl UnknownError {
    /// Error for a failure response without a body.
    pub fn empty(status: u16) -> Self {
        Self { status, body: None }
    }

    /// Error keeping the raw body.
    pub fn raw(status: u16, body: &[u8]) -> Self {
        Self {
            status,
            body: Some(String::from_utf8_lossy(body).into_owned()),
        }
    }

    /// Check if the response had no body.
    pub fn is_empty_body(&self) -> bool {
        self.body.is_none()
    }
}
