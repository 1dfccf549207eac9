//! Raw HTTP response as returned by a transport.

use bytes::{Bytes, BytesMut};
use futures::stream::{self, BoxStream, StreamExt};
use http::{HeaderMap, StatusCode};

use crate::{Result, TransportError};

/// Boxed stream of body chunks.
pub type BodyStream = BoxStream<'static, Result<Bytes>>;

/// Owned response body stream.
///
/// The underlying stream (and with it the connection) is released when the
/// body is consumed by [`read_all`](Self::read_all) or [`close`](Self::close),
/// or when it is dropped. Since both methods take `self`, a body is released
/// exactly once.
pub struct ResponseBody {
    stream: BodyStream,
}

impl ResponseBody {
    /// Wrap a chunk stream.
    pub fn from_stream(stream: BodyStream) -> Self {
        Self { stream }
    }

    /// Body backed by an in-memory buffer.
    pub fn from_bytes(bytes: impl Into<Bytes>) -> Self {
        let bytes = bytes.into();
        Self::from_stream(stream::once(async move { Ok::<_, TransportError>(bytes) }).boxed())
    }

    /// Body with no content.
    pub fn empty() -> Self {
        Self::from_stream(stream::empty::<Result<Bytes>>().boxed())
    }

    /// Body backed by a reqwest response.
    pub(crate) fn from_reqwest(response: reqwest::Response) -> Self {
        Self::from_stream(
            response
                .bytes_stream()
                .map(|chunk| chunk.map_err(|e| TransportError::Body(e.to_string())))
                .boxed(),
        )
    }

    /// Drain the stream into memory, then release it.
    pub async fn read_all(mut self) -> Result<Bytes> {
        let mut buf = BytesMut::new();
        while let Some(chunk) = self.stream.next().await {
            buf.extend_from_slice(&chunk?);
        }
        Ok(buf.freeze())
    }

    /// Release the stream without reading it.
    pub fn close(self) {
        drop(self.stream);
    }
}

impl std::fmt::Debug for ResponseBody {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ResponseBody").finish_non_exhaustive()
    }
}

/// Executed HTTP result: status, headers and an unread body.
#[derive(Debug)]
pub struct RawResponse {
    /// Status code.
    pub status: StatusCode,
    /// Response headers.
    pub headers: HeaderMap,
    /// Body stream, `None` when the transport produced no body at all.
    pub body: Option<ResponseBody>,
}

impl RawResponse {
    /// Create a response.
    pub fn new(status: StatusCode, headers: HeaderMap, body: Option<ResponseBody>) -> Self {
        Self {
            status,
            headers,
            body,
        }
    }

    /// Create a response from a reqwest response without reading its body.
    pub(crate) fn from_reqwest(response: reqwest::Response) -> Self {
        let status = response.status();
        let headers = response.headers().clone();
        Self::new(status, headers, Some(ResponseBody::from_reqwest(response)))
    }

    /// Check if the status denotes an error (400 and above).
    pub fn is_error(&self) -> bool {
        self.status.as_u16() >= 400
    }

    /// Status line such as `404 Not Found`.
    pub fn status_line(&self) -> String {
        status_line(self.status)
    }

    /// Release the body without reading it.
    pub fn close(self) {
        if let Some(body) = self.body {
            body.close();
        }
    }
}

/// Render a status code with its canonical reason phrase.
pub fn status_line(status: StatusCode) -> String {
    match status.canonical_reason() {
        Some(reason) => format!("{} {}", status.as_u16(), reason),
        None => status.as_u16().to_string(),
    }
}
