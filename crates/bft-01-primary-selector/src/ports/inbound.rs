//! Driving Ports (API - Inbound)

use crate::error::SelectionResult;
use crate::events::PrimaryChanged;
use shared_types::{ViewChangeDone, ViewNo};

/// Capability set shared by every primary decision strategy.
///
/// Implemented by the quorum-capable
/// [`PrimarySelector`](crate::PrimarySelector) and by the pure
/// [`RoundRobinDecider`](crate::RoundRobinDecider).
pub trait PrimaryDecider: Send + Sync {
    /// Move to `view_no` and return the primaries installed as a result.
    fn handle_view_change(&self, view_no: ViewNo) -> SelectionResult<Vec<PrimaryChanged>>;

    /// Install a primary for every instance lacking one.
    fn decide_primaries(&self) -> SelectionResult<Vec<PrimaryChanged>>;

    /// Messages that bring a lagging or newly joined node up to date.
    fn sync_lagging_node(&self) -> Vec<ViewChangeDone>;

    /// Current view.
    fn view_no(&self) -> ViewNo;
}
