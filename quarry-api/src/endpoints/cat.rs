//! Compact cluster listings. Always requested as JSON.

use http::HeaderMap;
use quarry_transport::{Method, Transport, WireRequest};
use serde::Deserialize;
use std::time::Duration;

use super::index_list;
use crate::client::Client;
use crate::context::RequestContext;
use crate::error::Result;
use crate::params::{CommonParams, QueryParams};
use crate::request::ApiRequest;
use crate::response::Response;

/// Cat operations, obtained from [`Client::cat`].
#[derive(Debug)]
pub struct Cat<'a, T: Transport> {
    client: &'a Client<T>,
}

impl<T: Transport> Client<T> {
    /// Cat operations.
    pub fn cat(&self) -> Cat<'_, T> {
        Cat { client: self }
    }
}

impl<T: Transport> Cat<'_, T> {
    /// List indices.
    pub async fn indices(&self, ctx: &RequestContext, req: CatIndicesReq) -> Result<CatIndicesResp> {
        let (indices, response) = self
            .client
            .dispatch::<Vec<CatIndexResp>, _>(ctx, &req)
            .await?
            .into_parts();
        Ok(CatIndicesResp { indices, response })
    }
}

/// `GET /_cat/indices[/{indices}]`.
#[derive(Debug, Clone, Default)]
pub struct CatIndicesReq {
    /// Index names or patterns. Empty lists every index.
    pub indices: Vec<String>,
    /// Query parameters.
    pub params: CatIndicesParams,
    /// Header overrides.
    pub headers: HeaderMap,
}

/// Parameters for [`CatIndicesReq`].
#[derive(Debug, Clone, Default)]
pub struct CatIndicesParams {
    /// Unit for byte values, such as `b` or `kb`.
    pub bytes: Option<String>,
    /// Which index states wildcards expand to.
    pub expand_wildcards: Option<String>,
    /// Only indices with this health.
    pub health: Option<String>,
    /// Time to wait for the cluster manager.
    pub cluster_manager_timeout: Option<Duration>,
    /// Only primary shard figures.
    pub pri: Option<bool>,
    /// Unit for time values.
    pub time: Option<String>,
    /// Columns to return.
    pub h: Vec<String>,
    /// Columns to sort by.
    pub s: Vec<String>,
    /// Parameters shared by every endpoint.
    pub common: CommonParams,
}

impl ApiRequest for CatIndicesReq {
    fn build(&self) -> std::result::Result<WireRequest, serde_json::Error> {
        let path = if self.indices.is_empty() {
            "/_cat/indices".to_string()
        } else {
            format!("/_cat/indices/{}", index_list(&self.indices))
        };
        let p = &self.params;
        let params = QueryParams::new()
            .set_str("bytes", p.bytes.as_deref())
            .set_str("expand_wildcards", p.expand_wildcards.as_deref())
            .set_str("health", p.health.as_deref())
            .set_duration("cluster_manager_timeout", p.cluster_manager_timeout)
            .set_opt("pri", p.pri)
            .set_str("time", p.time.as_deref())
            .set_list("h", &p.h)
            .set_list("s", &p.s)
            .common(&p.common)
            .set("format", "json");
        Ok(WireRequest::new(Method::GET, path)
            .with_params(params.into_map())
            .with_headers(self.headers.clone()))
    }
}

/// Index listing.
#[derive(Debug, Clone)]
pub struct CatIndicesResp {
    /// One row per index.
    pub indices: Vec<CatIndexResp>,
    response: Response,
}

impl CatIndicesResp {
    /// The response this listing was decoded from.
    pub fn inspect(&self) -> &Response {
        &self.response
    }
}

/// One index row. Figures arrive as strings; accessors parse them.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct CatIndexResp {
    /// `green`, `yellow` or `red`.
    pub health: String,
    /// `open` or `close`.
    pub status: String,
    /// Index name.
    pub index: String,
    /// Index UUID.
    pub uuid: String,
    /// Primary shard count.
    pub pri: Option<String>,
    /// Replica count.
    pub rep: Option<String>,
    /// Document count.
    #[serde(rename = "docs.count")]
    pub docs_count: Option<String>,
    /// Deleted document count.
    #[serde(rename = "docs.deleted")]
    pub docs_deleted: Option<String>,
    /// Store size, null for new indices.
    #[serde(rename = "store.size")]
    pub store_size: Option<String>,
    /// Primary store size.
    #[serde(rename = "pri.store.size")]
    pub pri_store_size: Option<String>,
}

impl CatIndexResp {
    /// Primary shard count.
    pub fn primaries(&self) -> Option<u32> {
        self.pri.as_deref().and_then(|v| v.parse().ok())
    }

    /// Replica count.
    pub fn replicas(&self) -> Option<u32> {
        self.rep.as_deref().and_then(|v| v.parse().ok())
    }

    /// Document count.
    pub fn doc_count(&self) -> Option<u64> {
        self.docs_count.as_deref().and_then(|v| v.parse().ok())
    }
}
