//! # Core Domain Entities
//!
//! Identifiers shared by every subsystem of the replica core.
//!
//! ## Clusters
//!
//! - **Instances & Views**: `InstanceId`, `ViewNo`
//! - **Ordered Log**: `SeqNo`, `Hash`
//! - **Membership**: `NodeName`

use serde::{Deserialize, Serialize};
use std::fmt;

// =============================================================================
// CLUSTER A: THE ORDERED LOG
// =============================================================================

/// A 32-byte hash (SHA-256).
pub type Hash = [u8; 32];

/// Position of an entry in the ordered log of one instance (1-based).
pub type SeqNo = u64;

/// Render a hash as a short hex prefix for log fields.
pub fn short_hex(hash: &Hash) -> String {
    hex::encode(&hash[..6])
}

// =============================================================================
// CLUSTER B: INSTANCES & VIEWS
// =============================================================================

/// Identifier of a consensus instance. Instance 0 is the master.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct InstanceId(pub u32);

impl InstanceId {
    /// The master instance, ordering the authoritative log.
    pub const MASTER: InstanceId = InstanceId(0);

    /// Whether this is the master instance.
    #[must_use]
    pub fn is_master(self) -> bool {
        self.0 == 0
    }

    /// Index into per-instance tables.
    #[must_use]
    pub fn index(self) -> usize {
        self.0 as usize
    }
}

impl fmt::Display for InstanceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u32> for InstanceId {
    fn from(id: u32) -> Self {
        Self(id)
    }
}

/// View number. Global to the node and never moves backward.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default, Serialize, Deserialize,
)]
pub struct ViewNo(pub u64);

impl ViewNo {
    /// The view following this one.
    #[must_use]
    pub fn next(self) -> ViewNo {
        ViewNo(self.0.saturating_add(1))
    }
}

impl fmt::Display for ViewNo {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl From<u64> for ViewNo {
    fn from(view: u64) -> Self {
        Self(view)
    }
}

// =============================================================================
// CLUSTER C: MEMBERSHIP
// =============================================================================

/// Name of a peer node (e.g. "Alpha"). Ordered lexicographically.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct NodeName(String);

impl NodeName {
    /// Create a node name.
    pub fn new(name: impl Into<String>) -> Self {
        Self(name.into())
    }

    /// Borrow as `&str`.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Name of this node's replica for an instance, e.g. `Alpha:1`.
    #[must_use]
    pub fn replica_name(&self, instance_id: InstanceId) -> String {
        format!("{}:{}", self.0, instance_id.0)
    }
}

impl fmt::Display for NodeName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for NodeName {
    fn from(name: &str) -> Self {
        Self(name.to_string())
    }
}

impl From<String> for NodeName {
    fn from(name: String) -> Self {
        Self(name)
    }
}
