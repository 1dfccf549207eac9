//! Index management.

use http::HeaderMap;
use quarry_transport::{Method, Transport, WireRequest};
use serde::Deserialize;
use serde_json::Value;
use std::time::Duration;

use super::{ResponseShards, execute, exists, index_list, inspectable, segment};
use crate::client::Client;
use crate::context::RequestContext;
use crate::error::Result;
use crate::params::{CommonParams, QueryParams};
use crate::request::{ApiRequest, json_body};
use crate::response::Response;

/// Index operations, obtained from [`Client::indices`].
#[derive(Debug)]
pub struct Indices<'a, T: Transport> {
    client: &'a Client<T>,
}

impl<T: Transport> Client<T> {
    /// Index operations.
    pub fn indices(&self) -> Indices<'_, T> {
        Indices { client: self }
    }
}

impl<T: Transport> Indices<'_, T> {
    /// Create an index.
    pub async fn create(&self, ctx: &RequestContext, req: IndicesCreateReq) -> Result<IndicesCreateResp> {
        execute(self.client, ctx, &req).await
    }

    /// Delete one or more indices.
    pub async fn delete(&self, ctx: &RequestContext, req: IndicesDeleteReq) -> Result<IndicesDeleteResp> {
        execute(self.client, ctx, &req).await
    }

    /// Check whether all of the given indices exist.
    pub async fn exists(&self, ctx: &RequestContext, req: IndicesExistsReq) -> Result<bool> {
        exists(self.client, ctx, &req).await
    }

    /// Refresh indices, or every index when none is given.
    pub async fn refresh(&self, ctx: &RequestContext, req: IndicesRefreshReq) -> Result<IndicesRefreshResp> {
        execute(self.client, ctx, &req).await
    }
}

/// `PUT /{index}`.
#[derive(Debug, Clone, Default)]
pub struct IndicesCreateReq {
    /// Index name.
    pub index: String,
    /// Settings, mappings and aliases.
    pub body: Option<Value>,
    /// Query parameters.
    pub params: IndicesCreateParams,
    /// Header overrides.
    pub headers: HeaderMap,
}

/// Parameters for [`IndicesCreateReq`].
#[derive(Debug, Clone, Default)]
pub struct IndicesCreateParams {
    /// Active shard copies to wait for.
    pub wait_for_active_shards: Option<String>,
    /// Time to wait for the cluster manager.
    pub cluster_manager_timeout: Option<Duration>,
    /// Time to wait for the response.
    pub timeout: Option<Duration>,
    /// Parameters shared by every endpoint.
    pub common: CommonParams,
}

impl IndicesCreateParams {
    fn query(&self) -> QueryParams {
        QueryParams::new()
            .set_str("wait_for_active_shards", self.wait_for_active_shards.as_deref())
            .set_duration("cluster_manager_timeout", self.cluster_manager_timeout)
            .set_duration("timeout", self.timeout)
            .common(&self.common)
    }
}

impl ApiRequest for IndicesCreateReq {
    fn build(&self) -> std::result::Result<WireRequest, serde_json::Error> {
        let mut wire = WireRequest::new(Method::PUT, format!("/{}", segment(&self.index)))
            .with_params(self.params.query().into_map())
            .with_headers(self.headers.clone());
        if let Some(body) = &self.body {
            wire = wire.with_body(json_body(body)?);
        }
        Ok(wire)
    }
}

/// Result of creating an index.
#[derive(Debug, Clone, Deserialize)]
pub struct IndicesCreateResp {
    /// Whether the cluster acknowledged the creation.
    pub acknowledged: bool,
    /// Whether the requested shard copies started in time.
    #[serde(default)]
    pub shards_acknowledged: bool,
    /// Index name.
    pub index: String,
    #[serde(skip)]
    response: Response,
}

/// `DELETE /{indices}`.
#[derive(Debug, Clone, Default)]
pub struct IndicesDeleteReq {
    /// Index names or patterns. Must not be empty: an empty list builds
    /// `DELETE /`.
    pub indices: Vec<String>,
    /// Query parameters.
    pub params: IndicesDeleteParams,
    /// Header overrides.
    pub headers: HeaderMap,
}

/// Parameters for [`IndicesDeleteReq`].
#[derive(Debug, Clone, Default)]
pub struct IndicesDeleteParams {
    /// Succeed when a wildcard matches nothing.
    pub allow_no_indices: Option<bool>,
    /// Which index states wildcards expand to.
    pub expand_wildcards: Option<String>,
    /// Ignore missing or closed indices.
    pub ignore_unavailable: Option<bool>,
    /// Time to wait for the cluster manager.
    pub cluster_manager_timeout: Option<Duration>,
    /// Time to wait for the response.
    pub timeout: Option<Duration>,
    /// Parameters shared by every endpoint.
    pub common: CommonParams,
}

impl IndicesDeleteParams {
    fn query(&self) -> QueryParams {
        QueryParams::new()
            .set_opt("allow_no_indices", self.allow_no_indices)
            .set_str("expand_wildcards", self.expand_wildcards.as_deref())
            .set_opt("ignore_unavailable", self.ignore_unavailable)
            .set_duration("cluster_manager_timeout", self.cluster_manager_timeout)
            .set_duration("timeout", self.timeout)
            .common(&self.common)
    }
}

impl ApiRequest for IndicesDeleteReq {
    fn build(&self) -> std::result::Result<WireRequest, serde_json::Error> {
        debug_assert!(!self.indices.is_empty(), "index delete needs at least one index");
        Ok(
            WireRequest::new(Method::DELETE, format!("/{}", index_list(&self.indices)))
                .with_params(self.params.query().into_map())
                .with_headers(self.headers.clone()),
        )
    }
}

/// Result of deleting indices.
#[derive(Debug, Clone, Deserialize)]
pub struct IndicesDeleteResp {
    /// Whether the cluster acknowledged the deletion.
    pub acknowledged: bool,
    #[serde(skip)]
    response: Response,
}

/// `HEAD /{indices}`.
#[derive(Debug, Clone, Default)]
pub struct IndicesExistsReq {
    /// Index names or patterns. Must not be empty: an empty list builds
    /// `HEAD /`, which answers like a ping.
    pub indices: Vec<String>,
    /// Query parameters.
    pub params: IndicesExistsParams,
    /// Header overrides.
    pub headers: HeaderMap,
}

/// Parameters for [`IndicesExistsReq`].
#[derive(Debug, Clone, Default)]
pub struct IndicesExistsParams {
    /// Succeed when a wildcard matches nothing.
    pub allow_no_indices: Option<bool>,
    /// Which index states wildcards expand to.
    pub expand_wildcards: Option<String>,
    /// Ignore missing or closed indices.
    pub ignore_unavailable: Option<bool>,
    /// Answer from the local node only.
    pub local: Option<bool>,
    /// Parameters shared by every endpoint.
    pub common: CommonParams,
}

impl ApiRequest for IndicesExistsReq {
    fn build(&self) -> std::result::Result<WireRequest, serde_json::Error> {
        debug_assert!(!self.indices.is_empty(), "index exists needs at least one index");
        let params = QueryParams::new()
            .set_opt("allow_no_indices", self.params.allow_no_indices)
            .set_str("expand_wildcards", self.params.expand_wildcards.as_deref())
            .set_opt("ignore_unavailable", self.params.ignore_unavailable)
            .set_opt("local", self.params.local)
            .common(&self.params.common);
        Ok(
            WireRequest::new(Method::HEAD, format!("/{}", index_list(&self.indices)))
                .with_params(params.into_map())
                .with_headers(self.headers.clone()),
        )
    }
}

/// `POST /{indices}/_refresh` or `POST /_refresh`.
#[derive(Debug, Clone, Default)]
pub struct IndicesRefreshReq {
    /// Index names or patterns. Empty refreshes every index.
    pub indices: Vec<String>,
    /// Query parameters.
    pub params: IndicesRefreshParams,
    /// Header overrides.
    pub headers: HeaderMap,
}

/// Parameters for [`IndicesRefreshReq`].
#[derive(Debug, Clone, Default)]
pub struct IndicesRefreshParams {
    /// Succeed when a wildcard matches nothing.
    pub allow_no_indices: Option<bool>,
    /// Which index states wildcards expand to.
    pub expand_wildcards: Option<String>,
    /// Ignore missing or closed indices.
    pub ignore_unavailable: Option<bool>,
    /// Parameters shared by every endpoint.
    pub common: CommonParams,
}

impl ApiRequest for IndicesRefreshReq {
    fn build(&self) -> std::result::Result<WireRequest, serde_json::Error> {
        let path = if self.indices.is_empty() {
            "/_refresh".to_string()
        } else {
            format!("/{}/_refresh", index_list(&self.indices))
        };
        let params = QueryParams::new()
            .set_opt("allow_no_indices", self.params.allow_no_indices)
            .set_str("expand_wildcards", self.params.expand_wildcards.as_deref())
            .set_opt("ignore_unavailable", self.params.ignore_unavailable)
            .common(&self.params.common);
        Ok(WireRequest::new(Method::POST, path)
            .with_params(params.into_map())
            .with_headers(self.headers.clone()))
    }
}

/// Result of a refresh.
#[derive(Debug, Clone, Deserialize)]
pub struct IndicesRefreshResp {
    /// Shard summary.
    #[serde(rename = "_shards")]
    pub shards: ResponseShards,
    #[serde(skip)]
    response: Response,
}

inspectable!(IndicesCreateResp, IndicesDeleteResp, IndicesRefreshResp);
