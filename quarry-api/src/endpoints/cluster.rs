//! Cluster health.

use http::HeaderMap;
use quarry_transport::{Method, Transport, WireRequest};
use serde::Deserialize;
use serde_json::Value;
use std::collections::HashMap;
use std::time::Duration;

use super::{execute, index_list, inspectable};
use crate::client::Client;
use crate::context::RequestContext;
use crate::error::Result;
use crate::params::{CommonParams, QueryParams};
use crate::request::ApiRequest;
use crate::response::Response;

/// Cluster operations, obtained from [`Client::cluster`].
#[derive(Debug)]
pub struct Cluster<'a, T: Transport> {
    client: &'a Client<T>,
}

impl<T: Transport> Client<T> {
    /// Cluster operations.
    pub fn cluster(&self) -> Cluster<'_, T> {
        Cluster { client: self }
    }
}

impl<T: Transport> Cluster<'_, T> {
    /// Cluster health, optionally narrowed to some indices.
    pub async fn health(&self, ctx: &RequestContext, req: ClusterHealthReq) -> Result<ClusterHealthResp> {
        execute(self.client, ctx, &req).await
    }
}

/// `GET /_cluster/health[/{indices}]`.
#[derive(Debug, Clone, Default)]
pub struct ClusterHealthReq {
    /// Index names or patterns.
    pub indices: Vec<String>,
    /// Query parameters.
    pub params: ClusterHealthParams,
    /// Header overrides.
    pub headers: HeaderMap,
}

/// Parameters for [`ClusterHealthReq`].
#[derive(Debug, Clone, Default)]
pub struct ClusterHealthParams {
    /// Which index states wildcards expand to.
    pub expand_wildcards: Option<String>,
    /// `cluster`, `indices` or `shards`.
    pub level: Option<String>,
    /// Answer from the local node only.
    pub local: Option<bool>,
    /// Time to wait for the cluster manager.
    pub cluster_manager_timeout: Option<Duration>,
    /// Time to wait for the conditions below.
    pub timeout: Option<Duration>,
    /// Active shard copies to wait for.
    pub wait_for_active_shards: Option<String>,
    /// Wait until this many nodes, such as `>=3`.
    pub wait_for_nodes: Option<String>,
    /// Wait until queued events of this priority are processed.
    pub wait_for_events: Option<String>,
    /// Wait until no shard is relocating.
    pub wait_for_no_relocating_shards: Option<bool>,
    /// Wait until no shard is initializing.
    pub wait_for_no_initializing_shards: Option<bool>,
    /// Wait until this status or better.
    pub wait_for_status: Option<String>,
    /// Parameters shared by every endpoint.
    pub common: CommonParams,
}

impl ApiRequest for ClusterHealthReq {
    fn build(&self) -> std::result::Result<WireRequest, serde_json::Error> {
        let path = if self.indices.is_empty() {
            "/_cluster/health".to_string()
        } else {
            format!("/_cluster/health/{}", index_list(&self.indices))
        };
        let p = &self.params;
        let params = QueryParams::new()
            .set_str("expand_wildcards", p.expand_wildcards.as_deref())
            .set_str("level", p.level.as_deref())
            .set_opt("local", p.local)
            .set_duration("cluster_manager_timeout", p.cluster_manager_timeout)
            .set_duration("timeout", p.timeout)
            .set_str("wait_for_active_shards", p.wait_for_active_shards.as_deref())
            .set_str("wait_for_nodes", p.wait_for_nodes.as_deref())
            .set_str("wait_for_events", p.wait_for_events.as_deref())
            .set_opt("wait_for_no_relocating_shards", p.wait_for_no_relocating_shards)
            .set_opt("wait_for_no_initializing_shards", p.wait_for_no_initializing_shards)
            .set_str("wait_for_status", p.wait_for_status.as_deref())
            .common(&p.common);
        Ok(WireRequest::new(Method::GET, path)
            .with_params(params.into_map())
            .with_headers(self.headers.clone()))
    }
}

/// Cluster health.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct ClusterHealthResp {
    /// Cluster name.
    pub cluster_name: String,
    /// `green`, `yellow` or `red`.
    pub status: String,
    /// Whether the wait conditions timed out.
    pub timed_out: bool,
    /// Node count.
    pub number_of_nodes: u32,
    /// Data node count.
    pub number_of_data_nodes: u32,
    /// Active primary shards.
    pub active_primary_shards: u32,
    /// Active shards.
    pub active_shards: u32,
    /// Relocating shards.
    pub relocating_shards: u32,
    /// Initializing shards.
    pub initializing_shards: u32,
    /// Unassigned shards.
    pub unassigned_shards: u32,
    /// Unassigned shards whose allocation is delayed.
    pub delayed_unassigned_shards: u32,
    /// Pending cluster tasks.
    pub number_of_pending_tasks: u32,
    /// Outstanding shard fetches.
    pub number_of_in_flight_fetch: u32,
    /// Longest task wait, in milliseconds.
    pub task_max_waiting_in_queue_millis: u64,
    /// Share of active shards.
    pub active_shards_percent_as_number: f64,
    /// Per-index health, when `level` asks for it.
    pub indices: Option<HashMap<String, Value>>,
    #[serde(skip)]
    response: Response,
}

inspectable!(ClusterHealthResp);

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_health_request() {
        let wire = ClusterHealthReq {
            indices: vec!["logs".into()],
            params: ClusterHealthParams {
                wait_for_status: Some("yellow".into()),
                timeout: Some(Duration::from_secs(30)),
                ..Default::default()
            },
            ..Default::default()
        }
        .build()
        .unwrap();

        assert_eq!(wire.method, Method::GET);
        assert_eq!(wire.path, "/_cluster/health/logs");
        assert_eq!(wire.params["wait_for_status"], "yellow");
        assert_eq!(wire.params["timeout"], "30000ms");
    }

    #[test]
    fn test_health_response_decodes() {
        let health: ClusterHealthResp = serde_json::from_str(
            r#"{"cluster_name":"docker-cluster","status":"green","timed_out":false,
                "number_of_nodes":1,"number_of_data_nodes":1,"active_primary_shards":3,
                "active_shards":3,"relocating_shards":0,"initializing_shards":0,
                "unassigned_shards":0,"delayed_unassigned_shards":0,
                "number_of_pending_tasks":0,"number_of_in_flight_fetch":0,
                "task_max_waiting_in_queue_millis":0,
                "active_shards_percent_as_number":100.0}"#,
        )
        .unwrap();

        assert_eq!(health.status, "green");
        assert_eq!(health.active_shards, 3);
        assert!(health.indices.is_none());
    }
}
