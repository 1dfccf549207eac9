use serde::Deserialize;
use serde_json::Value;

/// Shard summary included in many responses as `_shards`.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResponseShards {
    /// Shards the request was sent to.
    pub total: u32,
    /// Shards that succeeded.
    pub successful: u32,
    /// Shards that failed.
    pub failed: u32,
    /// Failure details.
    pub failures: Vec<ResponseShardsFailure>,
    /// Shards skipped.
    pub skipped: u32,
}

impl ResponseShards {
    /// Check if every shard succeeded.
    pub fn all_successful(&self) -> bool {
        self.failed == 0 && self.failures.is_empty()
    }
}

/// One failed shard.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
#[serde(default)]
pub struct ResponseShardsFailure {
    /// Shard number.
    pub shard: i32,
    /// Index name, or null for some failure kinds.
    pub index: Value,
    /// Why the shard failed.
    pub reason: ShardFailureReason,
}

/// Reason of a shard failure.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ShardFailureReason {
    /// Error type.
    #[serde(rename = "type")]
    pub kind: String,
    /// Error reason.
    pub reason: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_with_failures() {
        let shards: ResponseShards = serde_json::from_str(
            r#"{
                "total": 2, "successful": 1, "failed": 1, "skipped": 0,
                "failures": [{
                    "shard": 0,
                    "index": "logs",
                    "reason": {"type": "query_shard_exception", "reason": "failed to create query"}
                }]
            }"#,
        )
        .unwrap();

        assert!(!shards.all_successful());
        assert_eq!(shards.failures[0].index, "logs");
        assert_eq!(shards.failures[0].reason.kind, "query_shard_exception");
    }

    #[test]
    fn test_missing_fields_default() {
        let shards: ResponseShards =
            serde_json::from_str(r#"{"total": 1, "successful": 1, "failed": 0}"#).unwrap();
        assert!(shards.all_successful());
        assert_eq!(shards.skipped, 0);
    }
}
