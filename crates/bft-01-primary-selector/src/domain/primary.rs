//! Primary record

use serde::{Deserialize, Serialize};
use shared_types::{NodeName, ViewNo};

/// How a primary was decided.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub enum PrimarySource {
    /// Deterministic round robin.
    Fallback,
    /// `2f+1` peer declarations.
    Quorum,
}

/// The recognized primary of one instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryRecord {
    pub name: NodeName,
    /// View in which the primary was installed.
    pub epoch: ViewNo,
    pub source: PrimarySource,
}
