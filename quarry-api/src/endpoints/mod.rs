//! Endpoint wrappers.
//!
//! Each endpoint is a request struct implementing [`ApiRequest`], a params
//! struct whose unset fields are left out of the query string, and a
//! response struct that keeps the [`Response`] it was decoded from.

mod cat;
mod cluster;
mod document;
mod indices;
mod root;
mod search;
mod shards;

pub use cat::{Cat, CatIndexResp, CatIndicesParams, CatIndicesReq, CatIndicesResp};
pub use cluster::{Cluster, ClusterHealthParams, ClusterHealthReq, ClusterHealthResp};
pub use document::{
    DocumentDeleteParams, DocumentDeleteReq, DocumentDeleteResp, DocumentExistsParams,
    DocumentExistsReq, DocumentGetParams, DocumentGetReq, DocumentGetResp, DocumentIndexParams,
    DocumentIndexReq, DocumentIndexResp, Documents,
};
pub use indices::{
    Indices, IndicesCreateParams, IndicesCreateReq, IndicesCreateResp, IndicesDeleteParams,
    IndicesDeleteReq, IndicesDeleteResp, IndicesExistsParams, IndicesExistsReq,
    IndicesRefreshParams, IndicesRefreshReq, IndicesRefreshResp,
};
pub use root::{InfoParams, InfoReq, InfoResp, InfoVersion, PingReq};
pub use search::{
    SearchHit, SearchHits, SearchHitsTotal, SearchParams, SearchReq, SearchResp, TrackTotalHits,
};
pub use shards::{ResponseShards, ResponseShardsFailure, ShardFailureReason};

use percent_encoding::{AsciiSet, CONTROLS, utf8_percent_encode};
use quarry_transport::Transport;
use serde::de::DeserializeOwned;

use crate::client::Client;
use crate::context::RequestContext;
use crate::error::Result;
use crate::request::ApiRequest;
use crate::response::Response;

/// Characters escaped inside a path segment.
const PATH_SEGMENT: &AsciiSet = &CONTROLS
    .add(b' ')
    .add(b'"')
    .add(b'#')
    .add(b'%')
    .add(b'/')
    .add(b'<')
    .add(b'>')
    .add(b'?')
    .add(b'\\')
    .add(b'^')
    .add(b'`')
    .add(b'{')
    .add(b'|')
    .add(b'}');

/// Percent-encode one path segment.
pub(crate) fn segment(value: &str) -> String {
    utf8_percent_encode(value, PATH_SEGMENT).to_string()
}

/// Encode and comma-join index names.
pub(crate) fn index_list(indices: &[String]) -> String {
    indices
        .iter()
        .map(|index| segment(index))
        .collect::<Vec<_>>()
        .join(",")
}

/// Response types that keep the response they were decoded from.
pub(crate) trait Attach {
    fn attach(&mut self, response: Response);
}

/// Add `inspect()` to response types with a `response` field.
macro_rules! inspectable {
    ($($ty:ty),+ $(,)?) => {
        $(
            impl $ty {
                /// The response this value was decoded from.
                pub fn inspect(&self) -> &$crate::response::Response {
                    &self.response
                }
            }

            impl $crate::endpoints::Attach for $ty {
                fn attach(&mut self, response: $crate::response::Response) {
                    self.response = response;
                }
            }
        )+
    };
}
pub(crate) use inspectable;

/// Dispatch and keep the response on the decoded value.
pub(crate) async fn execute<T, R, D>(
    client: &Client<T>,
    ctx: &RequestContext,
    request: &R,
) -> Result<D>
where
    T: Transport,
    R: ApiRequest,
    D: DeserializeOwned + Attach,
{
    let (mut data, response) = client.dispatch::<D, R>(ctx, request).await?.into_parts();
    data.attach(response);
    Ok(data)
}

/// `HEAD`-style existence check: 404 is `false`, not an error.
pub(crate) async fn exists<T, R>(client: &Client<T>, ctx: &RequestContext, request: &R) -> Result<bool>
where
    T: Transport,
    R: ApiRequest,
{
    match client.perform(ctx, request).await {
        Ok(_) => Ok(true),
        Err(err) if err.is_not_found() => Ok(false),
        Err(err) => Err(err),
    }
}
