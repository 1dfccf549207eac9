//! # Quarry
//!
//! An async OpenSearch REST client.
//!
//! Every call goes through one generic dispatcher: a request value builds
//! its wire form, the transport sends it to a cluster node, the body is read
//! and released, and the outcome is either a typed value or a classified
//! error. Both sides keep the raw [`Response`] for inspection.
//!
//! ## Crates
//!
//! - [`transport`]: node pool, retry, compression and authentication
//! - [`api`]: dispatcher, error classification and endpoint wrappers
//! - [`logging`]: optional `tracing` subscriber setup
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use quarry::prelude::*;
//! use quarry::IndicesCreateReq;
//!
//! #[tokio::main]
//! async fn main() -> std::result::Result<(), Box<dyn std::error::Error>> {
//!     quarry::logging::init()?;
//!
//!     let client = Client::from_env()?;
//!     let ctx = RequestContext::background();
//!
//!     let created = client
//!         .indices()
//!         .create(&ctx, IndicesCreateReq { index: "articles".into(), ..Default::default() })
//!         .await;
//!
//!     match created {
//!         Ok(resp) => println!("created {}", resp.index),
//!         Err(err) => match err.api_error() {
//!             Some(api) => println!("rejected: {api}"),
//!             None => return Err(err.into()),
//!         },
//!     }
//!     Ok(())
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod logging;

pub use quarry_api as api;
pub use quarry_api::*;
pub use quarry_transport as transport;

/// Prelude for common imports.
pub mod prelude {
    pub use quarry_api::prelude::*;
    pub use quarry_api::{CancellationToken, Dispatched, StatusCode};
}
