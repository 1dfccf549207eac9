//! Node pool with round-robin selection and dead-node tracking.

use parking_lot::Mutex;
use std::time::{Duration, Instant};
use tracing::{debug, warn};
use url::Url;

use crate::{Result, TransportError};

/// Cap for the resurrect timeout, as a multiple of the initial timeout.
const RESURRECT_TIMEOUT_FACTOR_CUTOFF: u32 = 5;

/// Node selected for one attempt.
#[derive(Debug, Clone)]
pub struct Node {
    index: usize,
    url: Url,
}

impl Node {
    /// Node base URL.
    pub fn url(&self) -> &Url {
        &self.url
    }
}

#[derive(Debug)]
struct NodeState {
    url: Url,
    failures: u32,
    failed_at: Option<Instant>,
    dead_until: Option<Instant>,
}

#[derive(Debug)]
struct PoolState {
    nodes: Vec<NodeState>,
    cursor: usize,
}

/// Pool of cluster nodes.
///
/// Nodes are handed out round-robin. A node that fails at connection level is
/// skipped until its resurrect timeout elapses; the timeout doubles with each
/// consecutive failure. A pool with a single node never marks it dead.
#[derive(Debug)]
pub struct NodePool {
    state: Mutex<PoolState>,
    resurrect_timeout: Duration,
}

impl NodePool {
    /// Create a pool over the given node URLs.
    pub fn new(urls: Vec<Url>, resurrect_timeout: Duration) -> Self {
        let nodes = urls
            .into_iter()
            .map(|url| NodeState {
                url,
                failures: 0,
                failed_at: None,
                dead_until: None,
            })
            .collect();

        Self {
            state: Mutex::new(PoolState { nodes, cursor: 0 }),
            resurrect_timeout,
        }
    }

    /// Configured node URLs.
    pub fn urls(&self) -> Vec<Url> {
        self.state.lock().nodes.iter().map(|n| n.url.clone()).collect()
    }

    /// Number of nodes currently considered dead.
    pub fn dead_count(&self) -> usize {
        let now = Instant::now();
        self.state
            .lock()
            .nodes
            .iter()
            .filter(|n| n.dead_until.is_some_and(|until| until > now))
            .count()
    }

    /// Select the next node.
    pub fn next(&self) -> Result<Node> {
        let mut state = self.state.lock();
        let len = state.nodes.len();
        if len == 0 {
            return Err(TransportError::NoConnection("no nodes configured".into()));
        }

        let now = Instant::now();
        for offset in 0..len {
            let index = (state.cursor + offset) % len;
            let node = &mut state.nodes[index];
            match node.dead_until {
                Some(until) if until > now => continue,
                Some(_) => {
                    debug!(node = %node.url, "Resurrecting node");
                    node.dead_until = None;
                }
                None => {}
            }
            let url = node.url.clone();
            state.cursor = (index + 1) % len;
            return Ok(Node { index, url });
        }

        // Every node is dead: force the one that failed least recently.
        let index = state
            .nodes
            .iter()
            .enumerate()
            .min_by_key(|(_, n)| n.failed_at)
            .map(|(i, _)| i)
            .unwrap_or(0);
        let node = &mut state.nodes[index];
        warn!(node = %node.url, "All nodes dead, forcing resurrection");
        node.dead_until = None;
        let url = node.url.clone();
        state.cursor = (index + 1) % len;
        Ok(Node { index, url })
    }

    /// Record a connection-level failure for a node.
    pub fn mark_failed(&self, node: &Node) {
        let mut state = self.state.lock();
        if state.nodes.len() <= 1 {
            return;
        }
        let initial = self.resurrect_timeout;
        if let Some(n) = state.nodes.get_mut(node.index) {
            n.failures = n.failures.saturating_add(1);
            let factor = 1u32 << (n.failures - 1).min(RESURRECT_TIMEOUT_FACTOR_CUTOFF);
            let timeout = initial.saturating_mul(factor);
            let now = Instant::now();
            n.failed_at = Some(now);
            n.dead_until = Some(now + timeout);
            warn!(node = %n.url, failures = n.failures, ?timeout, "Marking node as dead");
        }
    }

    /// Record a successful round trip for a node.
    pub fn mark_alive(&self, node: &Node) {
        let mut state = self.state.lock();
        if let Some(n) = state.nodes.get_mut(node.index) {
            n.failures = 0;
            n.failed_at = None;
            n.dead_until = None;
        }
    }
}
