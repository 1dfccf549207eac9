//! Typed OpenSearch API on top of `quarry-transport`.
//!
//! This crate provides:
//! - A generic dispatcher that sends any [`ApiRequest`] and decodes the reply
//! - Classification of error bodies into [`ApiError`] variants
//! - Per-call deadlines and cancellation through [`RequestContext`]
//! - Endpoint wrappers for info, indices, documents, search, cat and cluster health
//!
//! # Example
//!
//! ```rust,no_run
//! use quarry_api::{Client, ClientConfig, RequestContext, SearchReq};
//! use serde::Deserialize;
//! use serde_json::json;
//! use std::time::Duration;
//!
//! #[derive(Debug, Deserialize)]
//! struct Article {
//!     title: String,
//! }
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = Client::new(ClientConfig::new("http://localhost:9200"))?;
//!     let ctx = RequestContext::background().with_timeout(Duration::from_secs(5));
//!
//!     let info = client.info(&ctx, Default::default()).await?;
//!     println!("Connected to {}", info.version.number);
//!
//!     let results = client
//!         .search(
//!             &ctx,
//!             SearchReq {
//!                 indices: vec!["articles".into()],
//!                 body: Some(json!({"query": {"match": {"title": "hello"}}})),
//!                 ..Default::default()
//!             },
//!         )
//!         .await?;
//!
//!     let articles: Vec<Article> = results.documents()?;
//!     println!("{} hits", articles.len());
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

mod classify;
mod client;
mod config;
mod context;
mod error;
mod params;
mod request;
mod response;

pub mod endpoints;

pub use classify::classify;
pub use client::{Client, Dispatched};
pub use config::{ADDRESS_ENV, ClientConfig, ConfigError, DEFAULT_ADDRESS};
pub use context::RequestContext;
pub use endpoints::*;
pub use error::{
    ApiError, EMPTY_BODY, Error, Result, RootCause, StringError, StructuredError, UnknownError,
};
pub use params::{CommonParams, QueryParams, format_duration, to_option};
pub use request::{ApiRequest, json_body};
pub use response::Response;

pub use quarry_transport::{
    HeaderMap, HttpTransport, Method, RetryConfig, StatusCode, Transport, TransportConfig,
    TransportError, WireRequest,
};
pub use tokio_util::sync::CancellationToken;

/// Prelude for common imports.
pub mod prelude {
    pub use crate::{
        ApiError, ApiRequest, Client, ClientConfig, Error, RequestContext, Response, Result,
    };
    pub use quarry_transport::{Method, Transport, WireRequest};
}
