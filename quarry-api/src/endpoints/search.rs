//! Search.

use http::HeaderMap;
use quarry_transport::{Method, Transport, WireRequest};
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::fmt;
use std::time::Duration;

use super::{ResponseShards, execute, index_list, inspectable};
use crate::client::Client;
use crate::context::RequestContext;
use crate::error::Result;
use crate::params::{CommonParams, QueryParams};
use crate::request::{ApiRequest, json_body};
use crate::response::Response;

impl<T: Transport> Client<T> {
    /// Run a search.
    pub async fn search(&self, ctx: &RequestContext, req: SearchReq) -> Result<SearchResp> {
        execute(self, ctx, &req).await
    }
}

/// `POST /{indices}/_search`, or `POST /_search` across every index.
#[derive(Debug, Clone, Default)]
pub struct SearchReq {
    /// Index names or patterns. Empty searches every index.
    pub indices: Vec<String>,
    /// Search body: query, aggregations, sort and so on.
    pub body: Option<Value>,
    /// Query parameters.
    pub params: SearchParams,
    /// Header overrides.
    pub headers: HeaderMap,
}

/// How hits are counted.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TrackTotalHits {
    /// Count accurately, or not at all.
    Enabled(bool),
    /// Count accurately up to this many hits.
    UpTo(u64),
}

impl fmt::Display for TrackTotalHits {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Enabled(enabled) => write!(f, "{enabled}"),
            Self::UpTo(limit) => write!(f, "{limit}"),
        }
    }
}

/// Parameters for [`SearchReq`].
#[derive(Debug, Clone, Default)]
pub struct SearchParams {
    /// Succeed when a wildcard matches nothing.
    pub allow_no_indices: Option<bool>,
    /// Return partial results when some shards fail.
    pub allow_partial_search_results: Option<bool>,
    /// Analyzer for the `q` query string.
    pub analyzer: Option<String>,
    /// `AND` or `OR` for the `q` query string.
    pub default_operator: Option<String>,
    /// Default field for the `q` query string.
    pub df: Option<String>,
    /// Which index states wildcards expand to.
    pub expand_wildcards: Option<String>,
    /// Explain scoring per hit.
    pub explain: Option<bool>,
    /// Offset of the first hit.
    pub from: Option<u32>,
    /// Ignore missing or closed indices.
    pub ignore_unavailable: Option<bool>,
    /// Shard copy preference.
    pub preference: Option<String>,
    /// Query in Lucene query string syntax.
    pub query: Option<String>,
    /// Use the shard request cache.
    pub request_cache: Option<bool>,
    /// Routing values.
    pub routing: Vec<String>,
    /// Keep a scroll context alive for this long.
    pub scroll: Option<Duration>,
    /// `query_then_fetch` or `dfs_query_then_fetch`.
    pub search_type: Option<String>,
    /// Return sequence number and primary term per hit.
    pub seq_no_primary_term: Option<bool>,
    /// Number of hits.
    pub size: Option<u32>,
    /// `field:direction` pairs.
    pub sort: Vec<String>,
    /// Source fields to leave out.
    pub source_excludes: Vec<String>,
    /// Source fields to keep.
    pub source_includes: Vec<String>,
    /// Stop after this many documents per shard.
    pub terminate_after: Option<u32>,
    /// Search timeout.
    pub timeout: Option<Duration>,
    /// Compute scores even when sorting on a field.
    pub track_scores: Option<bool>,
    /// How hits are counted.
    pub track_total_hits: Option<TrackTotalHits>,
    /// Prefix aggregation names with their type.
    pub typed_keys: Option<bool>,
    /// Return the version per hit.
    pub version: Option<bool>,
    /// Parameters shared by every endpoint.
    pub common: CommonParams,
}

impl SearchParams {
    fn query(&self) -> QueryParams {
        QueryParams::new()
            .set_opt("allow_no_indices", self.allow_no_indices)
            .set_opt("allow_partial_search_results", self.allow_partial_search_results)
            .set_str("analyzer", self.analyzer.as_deref())
            .set_str("default_operator", self.default_operator.as_deref())
            .set_str("df", self.df.as_deref())
            .set_str("expand_wildcards", self.expand_wildcards.as_deref())
            .set_opt("explain", self.explain)
            .set_opt("from", self.from)
            .set_opt("ignore_unavailable", self.ignore_unavailable)
            .set_str("preference", self.preference.as_deref())
            .set_str("q", self.query.as_deref())
            .set_opt("request_cache", self.request_cache)
            .set_list("routing", &self.routing)
            .set_duration("scroll", self.scroll)
            .set_str("search_type", self.search_type.as_deref())
            .set_opt("seq_no_primary_term", self.seq_no_primary_term)
            .set_opt("size", self.size)
            .set_list("sort", &self.sort)
            .set_list("_source_excludes", &self.source_excludes)
            .set_list("_source_includes", &self.source_includes)
            .set_opt("terminate_after", self.terminate_after)
            .set_duration("timeout", self.timeout)
            .set_opt("track_scores", self.track_scores)
            .set_opt("track_total_hits", self.track_total_hits)
            .set_opt("typed_keys", self.typed_keys)
            .set_opt("version", self.version)
            .common(&self.common)
    }
}

impl ApiRequest for SearchReq {
    fn build(&self) -> std::result::Result<WireRequest, serde_json::Error> {
        let path = if self.indices.is_empty() {
            "/_search".to_string()
        } else {
            format!("/{}/_search", index_list(&self.indices))
        };
        let mut wire = WireRequest::new(Method::POST, path)
            .with_params(self.params.query().into_map())
            .with_headers(self.headers.clone());
        if let Some(body) = &self.body {
            wire = wire.with_body(json_body(body)?);
        }
        Ok(wire)
    }
}

/// Search results.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchResp {
    /// Time taken, in milliseconds.
    pub took: u64,
    /// Whether the search timed out.
    pub timed_out: bool,
    /// Shard summary.
    #[serde(rename = "_shards")]
    pub shards: ResponseShards,
    /// Hits.
    pub hits: SearchHits,
    /// Scroll id, when a scroll was requested.
    #[serde(rename = "_scroll_id", default)]
    pub scroll_id: Option<String>,
    /// Aggregation results.
    #[serde(default)]
    pub aggregations: Option<Value>,
    #[serde(skip)]
    response: Response,
}

/// The `hits` section.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct SearchHits {
    /// Total matches, absent when tracking is disabled.
    pub total: Option<SearchHitsTotal>,
    /// Highest score.
    pub max_score: Option<f64>,
    /// Returned hits.
    pub hits: Vec<SearchHit>,
}

/// Total hit count.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SearchHitsTotal {
    /// Count.
    pub value: u64,
    /// `eq` when exact, `gte` when a lower bound.
    pub relation: String,
}

/// One hit.
#[derive(Debug, Clone, Deserialize)]
pub struct SearchHit {
    /// Index the hit came from.
    #[serde(rename = "_index")]
    pub index: String,
    /// Document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Relevance score.
    #[serde(rename = "_score", default)]
    pub score: Option<f64>,
    /// Raw document source.
    #[serde(rename = "_source", default)]
    pub source: Option<Value>,
    /// Version, when requested.
    #[serde(rename = "_version", default)]
    pub version: Option<i64>,
    /// Sequence number, when requested.
    #[serde(rename = "_seq_no", default)]
    pub seq_no: Option<i64>,
    /// Primary term, when requested.
    #[serde(rename = "_primary_term", default)]
    pub primary_term: Option<i64>,
    /// Sort values.
    #[serde(default)]
    pub sort: Option<Vec<Value>>,
    /// Highlighted fragments by field.
    #[serde(default)]
    pub highlight: Option<HashMap<String, Vec<String>>>,
    /// Requested stored or docvalue fields.
    #[serde(default)]
    pub fields: Option<HashMap<String, Value>>,
}

impl SearchHit {
    /// Decode the document source.
    pub fn source_as<D: DeserializeOwned>(&self) -> Option<serde_json::Result<D>> {
        self.source.as_ref().map(|s| D::deserialize(s))
    }
}

impl SearchResp {
    /// Decode every hit source, skipping hits without one.
    pub fn documents<D: DeserializeOwned>(&self) -> serde_json::Result<Vec<D>> {
        self.hits.hits.iter().filter_map(|hit| hit.source_as::<D>()).collect()
    }
}

inspectable!(SearchResp);
