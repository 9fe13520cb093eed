//! Driven Ports (SPI - Outbound Dependencies)

use shared_types::NodeName;

/// Pool membership as seen by this node.
///
/// The rank table is fixed after startup; every honest node holds the same
/// one, which is what makes round-robin selection agree across replicas.
pub trait NodeRegistry: Send + Sync {
    /// Number of nodes in the pool (`n`).
    fn total_nodes(&self) -> usize;

    /// Name of the node at `rank`, `None` when out of range.
    fn name_by_rank(&self, rank: usize) -> Option<NodeName>;

    /// Rank of `name`, `None` for nodes outside the pool.
    fn rank_of(&self, name: &NodeName) -> Option<usize>;

    /// Liveness hint used to skip unreachable ranks during fallback
    /// selection. Every node is reachable unless overridden.
    fn is_node_reachable(&self, _name: &NodeName) -> bool {
        true
    }
}
