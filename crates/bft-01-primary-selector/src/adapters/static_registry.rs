//! Fixed rank table with a mutable liveness overlay.

use crate::ports::NodeRegistry;
use parking_lot::RwLock;
use shared_types::NodeName;
use std::collections::HashSet;

/// Registry over a rank-ordered list of node names.
#[derive(Debug, Default)]
pub struct StaticNodeRegistry {
    ranked: Vec<NodeName>,
    unreachable: RwLock<HashSet<NodeName>>,
}

impl StaticNodeRegistry {
    /// Ranks follow the iteration order of `names`.
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            ranked: names.into_iter().map(|n| NodeName::new(n)).collect(),
            unreachable: RwLock::new(HashSet::new()),
        }
    }

    pub fn names(&self) -> &[NodeName] {
        &self.ranked
    }

    pub fn mark_unreachable(&self, name: &NodeName) {
        self.unreachable.write().insert(name.clone());
    }

    pub fn mark_reachable(&self, name: &NodeName) {
        self.unreachable.write().remove(name);
    }
}

impl NodeRegistry for StaticNodeRegistry {
    fn total_nodes(&self) -> usize {
        self.ranked.len()
    }

    fn name_by_rank(&self, rank: usize) -> Option<NodeName> {
        self.ranked.get(rank).cloned()
    }

    fn rank_of(&self, name: &NodeName) -> Option<usize> {
        self.ranked.iter().position(|n| n == name)
    }

    fn is_node_reachable(&self, name: &NodeName) -> bool {
        !self.unreachable.read().contains(name)
    }
}
