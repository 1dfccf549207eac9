//! Round-trip counters.

use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};

/// Snapshot of transport counters. Serializes for export to a stats endpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct Metrics {
    /// Attempts sent, retries included.
    pub requests: u64,
    /// Attempts that failed without a response.
    pub failures: u64,
    /// Responses received, by status code.
    pub responses: BTreeMap<u16, u64>,
}

#[derive(Debug, Default)]
pub(crate) struct MetricsRecorder {
    requests: AtomicU64,
    failures: AtomicU64,
    responses: Mutex<BTreeMap<u16, u64>>,
}

impl MetricsRecorder {
    pub(crate) fn record_request(&self) {
        self.requests.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_failure(&self) {
        self.failures.fetch_add(1, Ordering::Relaxed);
    }

    pub(crate) fn record_response(&self, status: u16) {
        *self.responses.lock().entry(status).or_insert(0) += 1;
    }

    pub(crate) fn snapshot(&self) -> Metrics {
        Metrics {
            requests: self.requests.load(Ordering::Relaxed),
            failures: self.failures.load(Ordering::Relaxed),
            responses: self.responses.lock().clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_snapshot() {
        let recorder = MetricsRecorder::default();
        recorder.record_request();
        recorder.record_request();
        recorder.record_failure();
        recorder.record_response(200);
        recorder.record_response(503);
        recorder.record_response(200);

        let metrics = recorder.snapshot();
        assert_eq!(metrics.requests, 2);
        assert_eq!(metrics.failures, 1);
        assert_eq!(metrics.responses.get(&200), Some(&2));
        assert_eq!(metrics.responses.get(&503), Some(&1));
    }

    #[test]
    fn test_snapshot_serializes() {
        let recorder = MetricsRecorder::default();
        recorder.record_request();
        recorder.record_response(404);

        let json = serde_json::to_value(recorder.snapshot()).unwrap();
        assert_eq!(
            json,
            serde_json::json!({"requests": 1, "failures": 0, "responses": {"404": 1}})
        );
    }
}
