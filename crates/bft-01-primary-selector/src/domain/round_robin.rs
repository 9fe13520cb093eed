//! Round-robin primary computation
//!
//! `rank = (view_no + instance_id) mod total_nodes`. Unreachable ranks and
//! an optional excluded node are skipped in ascending rank order, wrapping
//! around the pool.

use crate::ports::NodeRegistry;
use shared_types::{InstanceId, NodeName, ViewNo};

/// Base rank for an instance in a view.
pub fn base_rank(instance_id: InstanceId, view_no: ViewNo, total_nodes: usize) -> usize {
    let n = total_nodes as u64;
    ((view_no.0 % n + u64::from(instance_id.0) % n) % n) as usize
}

/// Fallback primary for `instance_id` in `view_no`.
///
/// Pure: identical registries and inputs give identical results on every
/// node. Returns `None` only for an empty pool.
pub fn compute_fallback_primary<R>(
    instance_id: InstanceId,
    view_no: ViewNo,
    registry: &R,
) -> Option<NodeName>
where
    R: NodeRegistry + ?Sized,
{
    select_rank(instance_id, view_no, registry, None)
}

/// Like [`compute_fallback_primary`] but never returns `exclude` unless it
/// is the only node in the pool.
pub fn select_rank<R>(
    instance_id: InstanceId,
    view_no: ViewNo,
    registry: &R,
    exclude: Option<&NodeName>,
) -> Option<NodeName>
where
    R: NodeRegistry + ?Sized,
{
    let total = registry.total_nodes();
    if total == 0 {
        return None;
    }
    let start = base_rank(instance_id, view_no, total);

    let candidates = (0..total).filter_map(|offset| registry.name_by_rank((start + offset) % total));
    let mut first_allowed = None;
    for name in candidates {
        if exclude == Some(&name) {
            continue;
        }
        if registry.is_node_reachable(&name) {
            return Some(name);
        }
        first_allowed.get_or_insert(name);
    }
    // Nothing reachable: keep the deterministic choice.
    first_allowed.or_else(|| registry.name_by_rank(start))
}
