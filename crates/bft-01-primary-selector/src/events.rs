//! Notifications produced by primary selection.

use serde::{Deserialize, Serialize};
use shared_types::{InstanceId, NodeName, ViewNo};

/// A primary was installed for an instance.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct PrimaryChanged {
    pub instance_id: InstanceId,
    pub view_no: ViewNo,
    pub primary: NodeName,
    /// `true` when a quorum of declarations decided, `false` for fallback.
    pub quorum_confirmed: bool,
}
