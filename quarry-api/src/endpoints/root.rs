//! Cluster root: `GET /` and `HEAD /`.

use http::HeaderMap;
use quarry_transport::{Method, Transport, WireRequest};
use serde::Deserialize;

use super::{execute, inspectable};
use crate::client::Client;
use crate::context::RequestContext;
use crate::error::{Error, Result};
use crate::params::{CommonParams, QueryParams};
use crate::request::ApiRequest;
use crate::response::Response;

/// `GET /`.
#[derive(Debug, Clone, Default)]
pub struct InfoReq {
    /// Query parameters.
    pub params: InfoParams,
    /// Header overrides.
    pub headers: HeaderMap,
}

/// Parameters for [`InfoReq`].
#[derive(Debug, Clone, Default)]
pub struct InfoParams {
    /// Parameters shared by every endpoint.
    pub common: CommonParams,
}

impl ApiRequest for InfoReq {
    fn build(&self) -> std::result::Result<WireRequest, serde_json::Error> {
        Ok(WireRequest::new(Method::GET, "/")
            .with_params(QueryParams::new().common(&self.params.common).into_map())
            .with_headers(self.headers.clone()))
    }
}

/// Cluster name and version.
#[derive(Debug, Clone, Deserialize)]
pub struct InfoResp {
    /// Node name.
    pub name: String,
    /// Cluster name.
    pub cluster_name: String,
    /// Cluster UUID.
    pub cluster_uuid: String,
    /// Version details.
    pub version: InfoVersion,
    /// Tagline.
    #[serde(default)]
    pub tagline: String,
    #[serde(skip)]
    response: Response,
}

/// Version section of [`InfoResp`].
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct InfoVersion {
    /// Distribution, `opensearch` for OpenSearch.
    pub distribution: String,
    /// Version number.
    pub number: String,
    /// Build type.
    pub build_type: String,
    /// Build hash.
    pub build_hash: String,
    /// Build date.
    pub build_date: String,
    /// Whether this is a snapshot build.
    pub build_snapshot: bool,
    /// Lucene version.
    pub lucene_version: String,
    /// Oldest wire-compatible version.
    pub minimum_wire_compatibility_version: String,
    /// Oldest index-compatible version.
    pub minimum_index_compatibility_version: String,
}

inspectable!(InfoResp);

/// `HEAD /`.
#[derive(Debug, Clone, Default)]
pub struct PingReq {
    /// Header overrides.
    pub headers: HeaderMap,
}

impl ApiRequest for PingReq {
    fn build(&self) -> std::result::Result<WireRequest, serde_json::Error> {
        Ok(WireRequest::new(Method::HEAD, "/").with_headers(self.headers.clone()))
    }
}

impl<T: Transport> Client<T> {
    /// Cluster information.
    pub async fn info(&self, ctx: &RequestContext, req: InfoReq) -> Result<InfoResp> {
        execute(self, ctx, &req).await
    }

    /// Check that the cluster answers. Any failure status is `false`;
    /// transport failures are errors.
    pub async fn ping(&self, ctx: &RequestContext) -> Result<bool> {
        match self.perform(ctx, &PingReq::default()).await {
            Ok(_) => Ok(true),
            Err(Error::Status { .. }) => Ok(false),
            Err(err) => Err(err),
        }
    }
}
