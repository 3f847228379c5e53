//! Message counters and cycle deduplication.

use std::collections::HashMap;
use std::ops::AddAssign;

use serde::Serialize;

use crate::graph::NodeId;
use crate::protocol::{path_key, MessageKind};

/// Messages processed, by kind.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct MessageCounts {
    /// Forward messages
    pub forward: u64,
    /// Backward messages
    pub backward: u64,
    /// Publish messages
    pub publish: u64,
    /// Broadcast messages
    pub broadcast: u64,
}

impl MessageCounts {
    /// Count one message of `kind`.
    pub fn record(&mut self, kind: MessageKind) {
        *self.slot(kind) += 1;
    }

    /// Count for `kind`.
    pub fn get(&self, kind: MessageKind) -> u64 {
        match kind {
            MessageKind::Forward => self.forward,
            MessageKind::Backward => self.backward,
            MessageKind::Publish => self.publish,
            MessageKind::Broadcast => self.broadcast,
        }
    }

    /// Sum over all kinds.
    pub fn total(&self) -> u64 {
        self.forward + self.backward + self.publish + self.broadcast
    }

    fn slot(&mut self, kind: MessageKind) -> &mut u64 {
        match kind {
            MessageKind::Forward => &mut self.forward,
            MessageKind::Backward => &mut self.backward,
            MessageKind::Publish => &mut self.publish,
            MessageKind::Broadcast => &mut self.broadcast,
        }
    }
}

impl AddAssign for MessageCounts {
    fn add_assign(&mut self, other: Self) {
        for kind in MessageKind::ALL {
            *self.slot(kind) += other.get(kind);
        }
    }
}

/// Distinct cycles keyed by their space-joined path.
#[derive(Debug, Clone, Default)]
pub struct CycleSet {
    /// path key -> edges on the cycle (`len(path) - 1`)
    cycles: HashMap<String, usize>,
    edge_count: usize,
}

impl CycleSet {
    /// Create an empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a cycle path. Returns `true` if its key was new.
    pub fn insert(&mut self, path: &[NodeId]) -> bool {
        self.insert_key(path_key(path), path.len().saturating_sub(1))
    }

    fn insert_key(&mut self, key: String, edges: usize) -> bool {
        if self.cycles.contains_key(&key) {
            return false;
        }
        self.cycles.insert(key, edges);
        self.edge_count += edges;
        true
    }

    /// Union `other` into this set. Returns the edges contributed by keys that
    /// were new here.
    pub fn merge(&mut self, other: CycleSet) -> usize {
        let before = self.edge_count;
        for (key, edges) in other.cycles {
            self.insert_key(key, edges);
        }
        self.edge_count - before
    }

    /// Whether the path key is present.
    pub fn contains(&self, key: &str) -> bool {
        self.cycles.contains_key(key)
    }

    /// Number of distinct cycles.
    pub fn len(&self) -> usize {
        self.cycles.len()
    }

    /// Whether no cycle was recorded.
    pub fn is_empty(&self) -> bool {
        self.cycles.is_empty()
    }

    /// Edges summed over distinct cycles.
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    /// Path keys in sorted order.
    pub fn keys(&self) -> Vec<&str> {
        let mut keys: Vec<&str> = self.cycles.keys().map(String::as_str).collect();
        keys.sort_unstable();
        keys
    }
}
