//! Transport trait and the reqwest-backed implementation.

use async_trait::async_trait;
use base64::Engine;
use bytes::Bytes;
use flate2::{Compression, write::GzEncoder};
use http::{HeaderMap, HeaderName, HeaderValue, header};
use std::io::Write;
use std::sync::Arc;
use std::time::Instant;
use tracing::{debug, warn};
use url::Url;

use crate::metrics::{Metrics, MetricsRecorder};
use crate::pool::{Node, NodePool};
use crate::{RawResponse, Result, TransportConfig, TransportError, WireRequest};

/// Executes wire requests against a cluster.
///
/// Implementations own connection management, retries and node selection.
/// They must be safe to share between tasks.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Execute a request and return the raw response with its body unread.
    async fn perform(&self, request: WireRequest) -> Result<RawResponse>;
}

#[async_trait]
impl<T: Transport + ?Sized> Transport for Arc<T> {
    async fn perform(&self, request: WireRequest) -> Result<RawResponse> {
        (**self).perform(request).await
    }
}

/// HTTP transport over a pool of cluster nodes.
#[derive(Clone)]
pub struct HttpTransport {
    inner: reqwest::Client,
    config: Arc<TransportConfig>,
    default_headers: Arc<HeaderMap>,
    pool: Arc<NodePool>,
    metrics: Arc<MetricsRecorder>,
}

impl HttpTransport {
    /// Create a new transport with the given configuration.
    pub fn new(config: TransportConfig) -> Result<Self> {
        let inner = reqwest::Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .pool_idle_timeout(config.pool_idle_timeout)
            .pool_max_idle_per_host(config.pool_max_idle_per_host)
            .user_agent(&config.user_agent)
            .gzip(true)
            .build()?;

        let mut default_headers = HeaderMap::new();
        for (name, value) in &config.default_headers {
            let name = HeaderName::try_from(name.as_str())
                .map_err(|e| TransportError::InvalidHeader(format!("{name}: {e}")))?;
            let value = HeaderValue::try_from(value.as_str())
                .map_err(|e| TransportError::InvalidHeader(format!("{name}: {e}")))?;
            default_headers.append(name, value);
        }

        let pool = NodePool::new(config.nodes.clone(), config.resurrect_timeout);

        Ok(Self {
            inner,
            config: Arc::new(config),
            default_headers: Arc::new(default_headers),
            pool: Arc::new(pool),
            metrics: Arc::new(MetricsRecorder::default()),
        })
    }

    /// Get the transport configuration.
    pub fn config(&self) -> &TransportConfig {
        &self.config
    }

    /// Configured node URLs.
    pub fn urls(&self) -> Vec<Url> {
        self.pool.urls()
    }

    /// Snapshot of the round-trip counters.
    pub fn metrics(&self) -> Metrics {
        self.metrics.snapshot()
    }

    /// Merge default headers and compress the body, once per request.
    fn prepare(&self, mut request: WireRequest) -> Result<WireRequest> {
        for (name, value) in self.default_headers.iter() {
            if !request.headers.contains_key(name) {
                request.headers.insert(name.clone(), value.clone());
            }
        }

        if request.has_body() && !request.headers.contains_key(header::CONTENT_TYPE) {
            request.headers.insert(
                header::CONTENT_TYPE,
                HeaderValue::from_static("application/json"),
            );
        }

        if self.config.compress_request_body
            && let Some(body) = request.body.take()
        {
            request.body = Some(gzip(&body)?);
            request.headers.insert(
                header::CONTENT_ENCODING,
                HeaderValue::from_static("gzip"),
            );
        }

        Ok(request)
    }

    /// Basic auth from the node URL, falling back to configured credentials.
    fn authorization(&self, node: &Url) -> Option<HeaderValue> {
        let credentials = if !node.username().is_empty() {
            Some((node.username().to_string(), node.password().unwrap_or("").to_string()))
        } else {
            match (&self.config.username, &self.config.password) {
                (Some(user), Some(pass)) if !user.is_empty() && !pass.is_empty() => {
                    Some((user.clone(), pass.clone()))
                }
                _ => None,
            }
        }?;

        let encoded = base64::engine::general_purpose::STANDARD
            .encode(format!("{}:{}", credentials.0, credentials.1));
        HeaderValue::try_from(format!("Basic {encoded}")).ok()
    }

    async fn attempt(&self, node: &Node, request: &WireRequest) -> Result<reqwest::Response> {
        let url = request_url(node.url(), request);
        let mut headers = request.headers.clone();
        if !headers.contains_key(header::AUTHORIZATION)
            && let Some(auth) = self.authorization(node.url())
        {
            headers.insert(header::AUTHORIZATION, auth);
        }

        let mut builder = self
            .inner
            .request(request.method.clone(), url)
            .headers(headers);
        if let Some(body) = &request.body {
            builder = builder.body(body.clone());
        }

        Ok(builder.send().await?)
    }

    async fn backoff(&self, attempt: u32) {
        let delay = self.config.retry.delay_for_attempt(attempt);
        if !delay.is_zero() {
            tokio::time::sleep(delay).await;
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn perform(&self, request: WireRequest) -> Result<RawResponse> {
        let request = self.prepare(request)?;
        let retry = &self.config.retry;
        let attempts = retry.attempts();
        let mut attempt = 0;

        loop {
            attempt += 1;
            let node = self.pool.next()?;
            let started = Instant::now();
            self.metrics.record_request();

            match self.attempt(&node, &request).await {
                Ok(response) => {
                    self.pool.mark_alive(&node);
                    let status = response.status().as_u16();
                    self.metrics.record_response(status);
                    debug!(
                        method = %request.method,
                        path = %request.path,
                        node = %node.url(),
                        status,
                        elapsed = ?started.elapsed(),
                        "Round trip completed"
                    );

                    if attempt < attempts && retry.should_retry_status(status) {
                        warn!(attempt, status, "Retrying request due to status code");
                        drop(response);
                        self.backoff(attempt).await;
                        continue;
                    }

                    return Ok(RawResponse::from_reqwest(response));
                }
                Err(error) => {
                    self.metrics.record_failure();
                    if error.is_network() {
                        self.pool.mark_failed(&node);
                    }

                    if attempt < attempts && retry.should_retry_error(&error) {
                        warn!(attempt, error = %error, "Retrying request due to error");
                        self.backoff(attempt).await;
                        continue;
                    }

                    debug!(
                        method = %request.method,
                        path = %request.path,
                        node = %node.url(),
                        error = %error,
                        "Round trip failed"
                    );
                    return Err(error);
                }
            }
        }
    }
}

impl std::fmt::Debug for HttpTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpTransport")
            .field("nodes", &self.pool.urls())
            .finish()
    }
}

/// Join the node base path with the request path and attach the query.
fn request_url(node: &Url, request: &WireRequest) -> Url {
    let mut url = node.clone();
    let _ = url.set_username("");
    let _ = url.set_password(None);

    let base = node.path().trim_end_matches('/');
    url.set_path(&format!("{base}{}", request.path));

    let query = request.query_string();
    url.set_query(if query.is_empty() { None } else { Some(&query) });
    url
}

fn gzip(body: &[u8]) -> Result<Bytes> {
    let mut encoder = GzEncoder::new(Vec::with_capacity(body.len() / 2), Compression::default());
    encoder.write_all(body).map_err(TransportError::Compression)?;
    let compressed = encoder.finish().map_err(TransportError::Compression)?;
    Ok(Bytes::from(compressed))
}
