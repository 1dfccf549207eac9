//! # Quarry Transport
//!
//! The HTTP layer underneath the Quarry OpenSearch client. It takes fully
//! resolved [`WireRequest`]s, sends them to one of the configured cluster
//! nodes and hands back a [`RawResponse`] whose body has not been read yet.
//!
//! ## Features
//!
//! - **Node pool**: Round-robin selection with dead-node tracking
//! - **Retry**: Retries on connection errors and on 502/503/504 by default
//! - **Compression**: Optional gzip request bodies, transparent gzip responses
//! - **Authentication**: Basic auth from node URLs or configuration
//! - **Metrics**: Request, failure and per-status counters
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quarry_transport::{HttpTransport, Method, Transport, TransportConfig, Url, WireRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = TransportConfig::builder()
//!         .node(Url::parse("http://localhost:9200")?)
//!         .build();
//!     let transport = HttpTransport::new(config)?;
//!
//!     let response = transport.perform(WireRequest::new(Method::GET, "/")).await?;
//!     println!("Status: {}", response.status);
//!
//!     if let Some(body) = response.body {
//!         let bytes = body.read_all().await?;
//!         println!("{}", String::from_utf8_lossy(&bytes));
//!     }
//!     Ok(())
//! }
//! ```

mod client;
mod config;
mod error;
mod metrics;
mod pool;
mod request;
mod response;
mod retry;

pub use client::{HttpTransport, Transport};
pub use config::{TransportConfig, TransportConfigBuilder};
pub use error::{Result, TransportError};
pub use metrics::Metrics;
pub use pool::{Node, NodePool};
pub use request::WireRequest;
pub use response::{BodyStream, RawResponse, ResponseBody, status_line};
pub use retry::{Backoff, DEFAULT_MAX_RETRIES, RetryConfig};

// Re-export common types
pub use bytes::Bytes;
pub use http::{HeaderMap, HeaderValue, Method, StatusCode, header};
pub use url::Url;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::client::{HttpTransport, Transport};
    pub use crate::config::{TransportConfig, TransportConfigBuilder};
    pub use crate::error::{Result, TransportError};
    pub use crate::request::WireRequest;
    pub use crate::response::{RawResponse, ResponseBody};
    pub use crate::retry::{Backoff, RetryConfig};
    pub use http::{HeaderMap, Method, StatusCode, header};
}
