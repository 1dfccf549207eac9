//! Single-document operations.

use http::HeaderMap;
use quarry_transport::{Method, Transport, WireRequest};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

use super::{ResponseShards, execute, exists, inspectable, segment};
use crate::client::Client;
use crate::context::RequestContext;
use crate::error::Result;
use crate::params::{CommonParams, QueryParams};
use crate::request::{ApiRequest, json_body};
use crate::response::Response;

/// Document operations, obtained from [`Client::documents`].
#[derive(Debug)]
pub struct Documents<'a, T: Transport> {
    client: &'a Client<T>,
}

impl<T: Transport> Client<T> {
    /// Document operations.
    pub fn documents(&self) -> Documents<'_, T> {
        Documents { client: self }
    }
}

impl<T: Transport> Documents<'_, T> {
    /// Index a document, with an explicit or generated id.
    pub async fn index<B>(&self, ctx: &RequestContext, req: DocumentIndexReq<B>) -> Result<DocumentIndexResp>
    where
        B: Serialize + Send + Sync,
    {
        execute(self.client, ctx, &req).await
    }

    /// Fetch a document.
    ///
    /// A missing document is a 404 whose body is not an error report, so it
    /// surfaces as an unknown API error; check [`Error::is_not_found`].
    ///
    /// [`Error::is_not_found`]: crate::Error::is_not_found
    pub async fn get(&self, ctx: &RequestContext, req: DocumentGetReq) -> Result<DocumentGetResp> {
        execute(self.client, ctx, &req).await
    }

    /// Check whether a document exists.
    pub async fn exists(&self, ctx: &RequestContext, req: DocumentExistsReq) -> Result<bool> {
        exists(self.client, ctx, &req).await
    }

    /// Delete a document.
    pub async fn delete(&self, ctx: &RequestContext, req: DocumentDeleteReq) -> Result<DocumentDeleteResp> {
        execute(self.client, ctx, &req).await
    }
}

fn document_path(index: &str, id: &str) -> String {
    format!("/{}/_doc/{}", segment(index), segment(id))
}

/// `PUT /{index}/_doc/{id}`, or `POST /{index}/_doc` without an id.
#[derive(Debug, Clone, Default)]
pub struct DocumentIndexReq<B = Value> {
    /// Target index.
    pub index: String,
    /// Document id. `None` lets the cluster generate one.
    pub id: Option<String>,
    /// Document source.
    pub body: B,
    /// Query parameters.
    pub params: DocumentIndexParams,
    /// Header overrides.
    pub headers: HeaderMap,
}

/// Parameters for [`DocumentIndexReq`].
#[derive(Debug, Clone, Default)]
pub struct DocumentIndexParams {
    /// Only write if the primary term matches.
    pub if_primary_term: Option<i64>,
    /// Only write if the sequence number matches.
    pub if_seq_no: Option<i64>,
    /// `index` or `create`.
    pub op_type: Option<String>,
    /// Ingest pipeline.
    pub pipeline: Option<String>,
    /// `true`, `false` or `wait_for`.
    pub refresh: Option<String>,
    /// Require the target to be an alias.
    pub require_alias: Option<bool>,
    /// Routing value.
    pub routing: Option<String>,
    /// Time to wait for active shards.
    pub timeout: Option<Duration>,
    /// Explicit version.
    pub version: Option<i64>,
    /// Version type.
    pub version_type: Option<String>,
    /// Active shard copies to wait for.
    pub wait_for_active_shards: Option<String>,
    /// Parameters shared by every endpoint.
    pub common: CommonParams,
}

impl DocumentIndexParams {
    fn query(&self) -> QueryParams {
        QueryParams::new()
            .set_opt("if_primary_term", self.if_primary_term)
            .set_opt("if_seq_no", self.if_seq_no)
            .set_str("op_type", self.op_type.as_deref())
            .set_str("pipeline", self.pipeline.as_deref())
            .set_str("refresh", self.refresh.as_deref())
            .set_opt("require_alias", self.require_alias)
            .set_str("routing", self.routing.as_deref())
            .set_duration("timeout", self.timeout)
            .set_opt("version", self.version)
            .set_str("version_type", self.version_type.as_deref())
            .set_str("wait_for_active_shards", self.wait_for_active_shards.as_deref())
            .common(&self.common)
    }
}

impl<B: Serialize + Send + Sync> ApiRequest for DocumentIndexReq<B> {
    fn build(&self) -> std::result::Result<WireRequest, serde_json::Error> {
        let body = json_body(&self.body)?;
        let (method, path) = match &self.id {
            Some(id) => (Method::PUT, document_path(&self.index, id)),
            None => (Method::POST, format!("/{}/_doc", segment(&self.index))),
        };
        Ok(WireRequest::new(method, path)
            .with_body(body)
            .with_params(self.params.query().into_map())
            .with_headers(self.headers.clone()))
    }
}

/// Result of a write.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentIndexResp {
    /// Index written to.
    #[serde(rename = "_index")]
    pub index: String,
    /// Document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// New version.
    #[serde(rename = "_version")]
    pub version: i64,
    /// `created` or `updated`.
    pub result: String,
    /// Shard summary.
    #[serde(rename = "_shards")]
    pub shards: ResponseShards,
    /// Sequence number.
    #[serde(rename = "_seq_no", default)]
    pub seq_no: i64,
    /// Primary term.
    #[serde(rename = "_primary_term", default)]
    pub primary_term: i64,
    /// Whether a refresh was forced.
    #[serde(default)]
    pub forced_refresh: bool,
    #[serde(skip)]
    response: Response,
}

/// `GET /{index}/_doc/{id}`.
#[derive(Debug, Clone, Default)]
pub struct DocumentGetReq {
    /// Index name.
    pub index: String,
    /// Document id.
    pub id: String,
    /// Query parameters.
    pub params: DocumentGetParams,
    /// Header overrides.
    pub headers: HeaderMap,
}

/// Parameters for [`DocumentGetReq`].
#[derive(Debug, Clone, Default)]
pub struct DocumentGetParams {
    /// Shard copy preference.
    pub preference: Option<String>,
    /// Read in real time rather than from the last refresh.
    pub realtime: Option<bool>,
    /// Refresh the shard before reading.
    pub refresh: Option<bool>,
    /// Routing value.
    pub routing: Option<String>,
    /// Return the source, or not.
    pub source: Option<bool>,
    /// Source fields to leave out.
    pub source_excludes: Vec<String>,
    /// Source fields to keep.
    pub source_includes: Vec<String>,
    /// Stored fields to return.
    pub stored_fields: Vec<String>,
    /// Expected version.
    pub version: Option<i64>,
    /// Version type.
    pub version_type: Option<String>,
    /// Parameters shared by every endpoint.
    pub common: CommonParams,
}

impl ApiRequest for DocumentGetReq {
    fn build(&self) -> std::result::Result<WireRequest, serde_json::Error> {
        let p = &self.params;
        let params = QueryParams::new()
            .set_str("preference", p.preference.as_deref())
            .set_opt("realtime", p.realtime)
            .set_opt("refresh", p.refresh)
            .set_str("routing", p.routing.as_deref())
            .set_opt("_source", p.source)
            .set_list("_source_excludes", &p.source_excludes)
            .set_list("_source_includes", &p.source_includes)
            .set_list("stored_fields", &p.stored_fields)
            .set_opt("version", p.version)
            .set_str("version_type", p.version_type.as_deref())
            .common(&p.common);
        Ok(WireRequest::new(Method::GET, document_path(&self.index, &self.id))
            .with_params(params.into_map())
            .with_headers(self.headers.clone()))
    }
}

/// A fetched document.
#[derive(Debug, Clone, Deserialize)]
pub struct DocumentGetResp {
    /// Index name.
    #[serde(rename = "_index")]
    pub index: String,
    /// Document id.
    #[serde(rename = "_id")]
    pub id: String,
    /// Version.
    #[serde(rename = "_version", default)]
    pub version: Option<i64>,
    /// Sequence number.
    #[serde(rename = "_seq_no", default)]
    pub seq_no: Option<i64>,
    /// Primary term.
    #[serde(rename = "_primary_term", default)]
    pub primary_term: Option<i64>,
    /// Whether the document was found.
    pub found: bool,
    /// Raw document source.
    #[serde(rename = "_source", default)]
    pub source: Option<Value>,
    #[serde(skip)]
    response: Response,
}

impl DocumentGetResp {
    /// Decode the document source.
    pub fn source_as<D: DeserializeOwned>(&self) -> Option<serde_json::Result<D>> {
        self.source.as_ref().map(|s| D::deserialize(s))
    }
}

/// `HEAD /{index}/_doc/{id}`.
#[derive(Debug, Clone, Default)]
pub struct DocumentExistsReq {
    /// Index name.
    pub index: String,
    /// Document id.
    pub id: String,
    /// Query parameters.
    pub params: DocumentExistsParams,
    /// Header overrides.
    pub headers: HeaderMap,
}

/// Parameters for [`DocumentExistsReq`].
#[derive(Debug, Clone, Default)]
pub struct DocumentExistsParams {
    /// Shard copy preference.
    pub preference: Option<String>,
    /// Read in real time rather than from the last refresh.
    pub realtime: Option<bool>,
    /// Routing value.
    pub routing: Option<String>,
    /// Parameters shared by every endpoint.
    pub common: CommonParams,
}

impl ApiRequest for DocumentExistsReq {
    fn build(&self) -> std::result::Result<WireRequest, serde_json::Error> {
        let params = QueryParams::new()
            .set_str("preference", self.params.preference.as_deref())
            .set_opt("realtime", self.params.realtime)
            .set_str("routing", self.params.routing.as_deref())
            .common(&self.params.common);
        Ok(WireRequest::new(Method::HEAD, document_path(&self.index, &self.id))
            .with_params(params.into_map())
            .with_headers(self.headers.clone()))
    }
}

/// `DELETE /{index}/_doc/{id}`.
#[derive(Debug, Clone, Default)]
pub struct DocumentDeleteReq {
    /// Index name.
    pub index: String,
    /// Document id.
    pub id: String,
    /// Query parameters.
    pub params: DocumentDeleteParams,
    /// Header overrides.
    pub headers: HeaderMap,
}

/// Parameters for [`DocumentDeleteReq`].
#[derive(Debug, Clone, Default)]
pub struct DocumentDeleteParams {
    /// Only delete if the primary term matches.
    pub if_primary_term: Option<i64>,
    /// Only delete if the sequence number matches.
    pub if_seq_no: Option<i64>,
    /// `true`, `false` or `wait_for`.
    pub refresh: Option<String>,
    /// Routing value.
    pub routing: Option<String>,
    /// Time to wait for active shards.
    pub timeout: Option<Duration>,
    /// Expected version.
    pub version: Option<i64>,
    /// Version type.
    pub version_type: Option<String>,
    /// Active shard copies to wait for.
    pub wait_for_active_shards: Option<String>,
    /// Parameters shared by every endpoint.
    pub common: CommonParams,
}

impl ApiRequest for DocumentDeleteReq {
    fn build(&self) -> std::result::Result<WireRequest, serde_json::Error> {
        let p = &self.params;
        let params = QueryParams::new()
            .set_opt("if_primary_term", p.if_primary_term)
            .set_opt("if_seq_no", p.if_seq_no)
            .set_str("refresh", p.refresh.as_deref())
            .set_str("routing", p.routing.as_deref())
            .set_duration("timeout", p.timeout)
            .set_opt("version", p.version)
            .set_str("version_type", p.version_type.as_deref())
            .set_str("wait_for_active_shards", p.wait_for_active_shards.as_deref())
            .common(&p.common);
        Ok(WireRequest::new(Method::DELETE, document_path(&self.index, &self.id))
            .with_params(params.into_map())
            .with_headers(self.headers.clone()))
    }
}

/// Result of a delete; same shape as a write.
pub type DocumentDeleteResp = DocumentIndexResp;

inspectable!(DocumentIndexResp, DocumentGetResp);

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::collections::HashMap;

    #[test]
    fn test_index_with_id() {
        let req = DocumentIndexReq {
            index: "logs".into(),
            id: Some("a/1".into()),
            body: json!({"message": "hello"}),
            params: DocumentIndexParams {
                refresh: Some("wait_for".into()),
                ..Default::default()
            },
            ..Default::default()
        };
        let wire = req.build().unwrap();

        assert_eq!(wire.method, Method::PUT);
        assert_eq!(wire.path, "/logs/_doc/a%2F1");
        assert_eq!(wire.params["refresh"], "wait_for");
        assert_eq!(wire.body.as_deref(), Some(br#"{"message":"hello"}"#.as_slice()));
    }

    #[test]
    fn test_index_without_id() {
        #[derive(Serialize)]
        struct Event {
            kind: &'static str,
        }

        let req = DocumentIndexReq {
            index: "events".into(),
            id: None,
            body: Event { kind: "login" },
            params: DocumentIndexParams::default(),
            headers: HeaderMap::new(),
        };
        let wire = req.build().unwrap();

        assert_eq!(wire.method, Method::POST);
        assert_eq!(wire.path, "/events/_doc");
        assert_eq!(wire.body.as_deref(), Some(br#"{"kind":"login"}"#.as_slice()));
    }

    #[test]
    fn test_index_body_serialization_failure() {
        let mut body = HashMap::new();
        body.insert(vec![1u8], 1);
        let req = DocumentIndexReq {
            index: "logs".into(),
            id: None,
            body,
            params: DocumentIndexParams::default(),
            headers: HeaderMap::new(),
        };
        assert!(req.build().is_err());
    }

    #[test]
    fn test_get_source_filtering() {
        let wire = DocumentGetReq {
            index: "logs".into(),
            id: "1".into(),
            params: DocumentGetParams {
                source_includes: vec!["a".into(), "b".into()],
                realtime: Some(false),
                ..Default::default()
            },
            ..Default::default()
        }
        .build()
        .unwrap();

        assert_eq!(wire.method, Method::GET);
        assert_eq!(wire.path, "/logs/_doc/1");
        assert_eq!(wire.params["_source_includes"], "a,b");
        assert_eq!(wire.params["realtime"], "false");
    }

    #[test]
    fn test_exists_and_delete_requests() {
        let exists = DocumentExistsReq {
            index: "logs".into(),
            id: "1".into(),
            ..Default::default()
        }
        .build()
        .unwrap();
        assert_eq!(exists.method, Method::HEAD);
        assert_eq!(exists.path, "/logs/_doc/1");

        let delete = DocumentDeleteReq {
            index: "logs".into(),
            id: "1".into(),
            params: DocumentDeleteParams {
                if_seq_no: Some(0),
                if_primary_term: Some(1),
                ..Default::default()
            },
            ..Default::default()
        }
        .build()
        .unwrap();
        assert_eq!(delete.method, Method::DELETE);
        assert_eq!(delete.params["if_seq_no"], "0");
        assert_eq!(delete.params["if_primary_term"], "1");
    }

    #[test]
    fn test_get_response_source() {
        #[derive(Debug, Deserialize)]
        struct Log {
            message: String,
        }

        let resp: DocumentGetResp = serde_json::from_str(
            r#"{"_index":"logs","_id":"1","_version":2,"_seq_no":5,"_primary_term":1,
                "found":true,"_source":{"message":"hello"}}"#,
        )
        .unwrap();

        assert!(resp.found);
        let log: Log = resp.source_as().unwrap().unwrap();
        assert_eq!(log.message, "hello");
    }
}
