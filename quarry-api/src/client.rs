//! The typed dispatcher.

use bytes::Bytes;
use quarry_transport::{HttpTransport, Transport};
use serde::de::DeserializeOwned;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, info};

use crate::classify::classify;
use crate::config::ClientConfig;
use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::request::ApiRequest;
use crate::response::Response;

/// A decoded success body together with the response it came from.
#[derive(Debug, Clone)]
pub struct Dispatched<D> {
    /// Decoded body.
    pub data: D,
    /// Buffered response.
    pub response: Response,
}

impl<D> Dispatched<D> {
    /// The response the data was decoded from.
    pub fn inspect(&self) -> &Response {
        &self.response
    }

    /// Split into data and response.
    pub fn into_parts(self) -> (D, Response) {
        (self.data, self.response)
    }
}

/// OpenSearch client.
///
/// Stateless apart from the shared transport: clones are cheap and calls
/// from many tasks may run concurrently against the same instance.
pub struct Client<T: Transport = HttpTransport> {
    transport: Arc<T>,
}

impl<T: Transport> Clone for Client<T> {
    fn clone(&self) -> Self {
        Self {
            transport: Arc::clone(&self.transport),
        }
    }
}

impl Client<HttpTransport> {
    /// Create a client over HTTP.
    pub fn new(config: ClientConfig) -> Result<Self> {
        let transport_config = config.into_transport_config()?;
        info!(nodes = ?transport_config.nodes, "Initializing OpenSearch client");
        let transport = HttpTransport::new(transport_config)?;
        Ok(Self::with_transport(transport))
    }

    /// Create a client from `OPENSEARCH_URL`.
    pub fn from_env() -> Result<Self> {
        Self::new(ClientConfig::from_env())
    }
}

impl<T: Transport> Client<T> {
    /// Create a client over any transport.
    pub fn with_transport(transport: T) -> Self {
        Self {
            transport: Arc::new(transport),
        }
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Send a request and decode a successful JSON body into `D`.
    ///
    /// Failure statuses are classified into [`Error::Api`]. A body that is
    /// not valid JSON for `D`, or a 405 body that is not JSON at all, is
    /// reported as [`Error::Decode`].
    pub async fn dispatch<D, R>(&self, ctx: &RequestContext, request: &R) -> Result<Dispatched<D>>
    where
        D: DeserializeOwned,
        R: ApiRequest + ?Sized,
    {
        let response = self.round_trip(ctx, request).await?;

        if response.is_error() {
            return Err(match classify(response.status, &response.body) {
                Ok(error) => {
                    debug!(status = response.status.as_u16(), error = %error, "Request failed");
                    Error::Api {
                        error,
                        response: Box::new(response),
                    }
                }
                Err(source) => Error::Decode {
                    source,
                    response: Box::new(response),
                },
            });
        }

        match serde_json::from_slice(&response.body) {
            Ok(data) => Ok(Dispatched { data, response }),
            Err(source) => Err(Error::Decode {
                source,
                response: Box::new(response),
            }),
        }
    }

    /// Send a request when only success or failure matters.
    ///
    /// The body is not parsed: a failure status yields [`Error::Status`]
    /// carrying the status line and the buffered response.
    pub async fn perform<R>(&self, ctx: &RequestContext, request: &R) -> Result<Response>
    where
        R: ApiRequest + ?Sized,
    {
        let response = self.round_trip(ctx, request).await?;
        if response.is_error() {
            return Err(Error::Status {
                response: Box::new(response),
            });
        }
        Ok(response)
    }

    /// Build, send and buffer. The transport body is released on every path.
    async fn round_trip<R>(&self, ctx: &RequestContext, request: &R) -> Result<Response>
    where
        R: ApiRequest + ?Sized,
    {
        let wire = request.build().map_err(Error::BodySerialization)?;
        let method = wire.method.clone();
        let path = wire.path.clone();
        let started = Instant::now();

        let raw = ctx.run(self.transport.perform(wire)).await?;
        let status = raw.status;
        let body = match raw.body {
            Some(body) => ctx.run(body.read_all()).await.map_err(|source| {
                if source.is_cancellation() {
                    Error::Transport(source)
                } else {
                    Error::ReadBody { status, source }
                }
            })?,
            None => Bytes::new(),
        };

        debug!(
            method = %method,
            path = %path,
            status = status.as_u16(),
            elapsed = ?started.elapsed(),
            "Request dispatched"
        );

        Ok(Response {
            status,
            headers: raw.headers,
            body,
        })
    }
}

impl<T: Transport> std::fmt::Debug for Client<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Client").finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ApiError;
    use async_trait::async_trait;
    use futures::Stream;
    use http::{HeaderMap, StatusCode};
    use quarry_transport::{Method, RawResponse, ResponseBody, TransportError, WireRequest};
    use serde::Deserialize;
    use std::collections::HashMap;
    use std::pin::Pin;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::task::{Context, Poll};
    use tokio_util::sync::CancellationToken;

    /// Body stream that counts how often it is released.
    struct TrackedBody {
        chunk: Option<Bytes>,
        closes: Arc<AtomicUsize>,
    }

    impl Stream for TrackedBody {
        type Item = quarry_transport::Result<Bytes>;

        fn poll_next(mut self: Pin<&mut Self>, _cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
            Poll::Ready(self.chunk.take().map(Ok))
        }
    }

    impl Drop for TrackedBody {
        fn drop(&mut self) {
            self.closes.fetch_add(1, Ordering::SeqCst);
        }
    }

    /// Transport answering every request with a fixed status and body.
    struct SpyTransport {
        status: StatusCode,
        body: &'static str,
        calls: AtomicUsize,
        closes: Arc<AtomicUsize>,
    }

    impl SpyTransport {
        fn new(status: u16, body: &'static str) -> Self {
            Self {
                status: StatusCode::from_u16(status).unwrap(),
                body,
                calls: AtomicUsize::new(0),
                closes: Arc::new(AtomicUsize::new(0)),
            }
        }

        fn calls(&self) -> usize {
            self.calls.load(Ordering::SeqCst)
        }

        fn closes(&self) -> usize {
            self.closes.load(Ordering::SeqCst)
        }
    }

    #[async_trait]
    impl Transport for SpyTransport {
        async fn perform(&self, _request: WireRequest) -> quarry_transport::Result<RawResponse> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            let body = TrackedBody {
                chunk: Some(Bytes::from_static(self.body.as_bytes())),
                closes: self.closes.clone(),
            };
            Ok(RawResponse::new(
                self.status,
                HeaderMap::new(),
                Some(ResponseBody::from_stream(Box::pin(body))),
            ))
        }
    }

    /// Transport echoing the request path back as JSON.
    struct EchoTransport;

    #[async_trait]
    impl Transport for EchoTransport {
        async fn perform(&self, request: WireRequest) -> quarry_transport::Result<RawResponse> {
            tokio::task::yield_now().await;
            let body = serde_json::json!({ "path": request.path, "q": request.params.get("q") });
            Ok(RawResponse::new(
                StatusCode::OK,
                HeaderMap::new(),
                Some(ResponseBody::from_bytes(body.to_string())),
            ))
        }
    }

    /// Request whose body cannot be serialized.
    struct Unserializable;

    impl ApiRequest for Unserializable {
        fn build(&self) -> std::result::Result<WireRequest, serde_json::Error> {
            let mut body = HashMap::new();
            body.insert((1u8, 2u8), "pair");
            let bytes = crate::request::json_body(&body)?;
            Ok(WireRequest::new(Method::POST, "/_bulk").with_body(bytes))
        }
    }

    #[derive(Debug, Deserialize)]
    struct Info {
        name: String,
    }

    fn get(path: &str) -> WireRequest {
        WireRequest::new(Method::GET, path)
    }

    #[tokio::test]
    async fn test_success_decodes_and_closes_once() {
        let client = Client::with_transport(SpyTransport::new(200, r#"{"name":"node-1"}"#));
        let ctx = RequestContext::background();

        let result = client.dispatch::<Info, _>(&ctx, &get("/")).await.unwrap();
        assert_eq!(result.data.name, "node-1");
        assert_eq!(result.inspect().status, StatusCode::OK);
        assert_eq!(client.transport().closes(), 1);
    }

    #[tokio::test]
    async fn test_decode_failure_keeps_response_and_closes_once() {
        let client = Client::with_transport(SpyTransport::new(200, r#"{"unexpected":true}"#));
        let ctx = RequestContext::background();

        let err = client.dispatch::<Info, _>(&ctx, &get("/")).await.unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert_eq!(err.status(), Some(StatusCode::OK));
        assert_eq!(client.transport().closes(), 1);
    }

    #[tokio::test]
    async fn test_classified_error_closes_once() {
        let client = Client::with_transport(SpyTransport::new(
            404,
            r#"{"error":{"type":"index_not_found_exception","reason":"no such index [logs]"},"status":404}"#,
        ));
        let ctx = RequestContext::background();

        let err = client
            .dispatch::<serde_json::Value, _>(&ctx, &get("/logs"))
            .await
            .unwrap_err();
        let Some(ApiError::Structured(api)) = err.api_error() else {
            panic!("expected structured error, got {err:?}");
        };
        assert_eq!(api.kind, "index_not_found_exception");
        assert_eq!(err.response().unwrap().status, StatusCode::NOT_FOUND);
        assert_eq!(client.transport().closes(), 1);
    }

    #[tokio::test]
    async fn test_method_not_allowed_non_json_is_decode_error() {
        let client = Client::with_transport(SpyTransport::new(405, "Method Not Allowed"));
        let ctx = RequestContext::background();

        let err = client
            .dispatch::<serde_json::Value, _>(&ctx, &get("/"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Decode { .. }));
        assert_eq!(client.transport().closes(), 1);
    }

    #[tokio::test]
    async fn test_perform_reports_status_only() {
        let client = Client::with_transport(SpyTransport::new(404, "this is not json"));
        let ctx = RequestContext::background();

        let err = client.perform(&ctx, &get("/missing")).await.unwrap_err();
        assert!(matches!(err, Error::Status { .. }));
        assert_eq!(err.to_string(), "status: 404 Not Found");
        assert_eq!(err.response().unwrap().status, StatusCode::NOT_FOUND);
        assert_eq!(client.transport().closes(), 1);
    }

    #[tokio::test]
    async fn test_perform_success_closes_once() {
        let client = Client::with_transport(SpyTransport::new(200, ""));
        let ctx = RequestContext::background();

        let response = client.perform(&ctx, &get("/")).await.unwrap();
        assert_eq!(response.status, StatusCode::OK);
        assert_eq!(client.transport().closes(), 1);
    }

    #[tokio::test]
    async fn test_serialization_failure_never_sends() {
        let client = Client::with_transport(SpyTransport::new(200, "{}"));
        let ctx = RequestContext::background();

        let err = client
            .dispatch::<serde_json::Value, _>(&ctx, &Unserializable)
            .await
            .unwrap_err();
        assert!(matches!(err, Error::BodySerialization(_)));
        assert_eq!(client.transport().calls(), 0);
        assert_eq!(client.transport().closes(), 0);
    }

    #[tokio::test]
    async fn test_cancelled_context_is_a_transport_error() {
        let client = Client::with_transport(SpyTransport::new(200, "{}"));
        let token = CancellationToken::new();
        token.cancel();
        let ctx = RequestContext::background().with_cancellation(token);

        let err = client
            .dispatch::<serde_json::Value, _>(&ctx, &get("/"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Transport(TransportError::Cancelled)));
        assert!(err.is_cancellation());
        assert!(err.response().is_none());
        assert_eq!(client.transport().calls(), 0);
    }

    #[tokio::test]
    async fn test_read_failure_reports_status() {
        struct BrokenBody;

        #[async_trait]
        impl Transport for BrokenBody {
            async fn perform(&self, _request: WireRequest) -> quarry_transport::Result<RawResponse> {
                let chunks: Vec<quarry_transport::Result<Bytes>> =
                    vec![Err(TransportError::Body("connection reset".into()))];
                Ok(RawResponse::new(
                    StatusCode::OK,
                    HeaderMap::new(),
                    Some(ResponseBody::from_stream(Box::pin(futures::stream::iter(chunks)))),
                ))
            }
        }

        let client = Client::with_transport(BrokenBody);
        let err = client
            .dispatch::<serde_json::Value, _>(&RequestContext::background(), &get("/"))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::ReadBody { status: StatusCode::OK, .. }));
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_dispatch() {
        #[derive(Debug, Deserialize)]
        struct Echo {
            path: String,
            q: Option<String>,
        }

        let client = Client::with_transport(EchoTransport);
        let handles: Vec<_> = (0..64)
            .map(|i| {
                let client = client.clone();
                tokio::spawn(async move {
                    let request = get(&format!("/index-{i}/_search")).with_param("q", i.to_string());
                    let echo = client
                        .dispatch::<Echo, _>(&RequestContext::background(), &request)
                        .await
                        .unwrap();
                    (i, echo.data)
                })
            })
            .collect();

        for handle in handles {
            let (i, echo) = handle.await.unwrap();
            assert_eq!(echo.path, format!("/index-{i}/_search"));
            assert_eq!(echo.q, Some(i.to_string()));
        }
    }
}
