//! # Catch-up → Checkpoint Store bridge
//!
//! Implements the catch-up coordinator's `CatchupObserver` port by resetting
//! the instance's checkpoint windows to the caught-up sequence number.

use bft_02_checkpoints::{CheckpointApi, CheckpointResult, CheckpointStore, WatermarkWindow};
use bft_03_catchup::CatchupObserver;
use parking_lot::Mutex;
use shared_types::{InstanceId, SeqNo};
use std::collections::HashMap;
use std::sync::Arc;
use tracing::{info, warn};

/// Resets checkpoint windows when a catch-up session completes.
///
/// The observer is called synchronously while the coordinator holds the
/// session; the outcome is parked here until the node collects it.
pub struct CheckpointResetObserver {
    checkpoints: Arc<CheckpointStore>,
    resets: Mutex<HashMap<InstanceId, CheckpointResult<WatermarkWindow>>>,
}

impl CheckpointResetObserver {
    pub fn new(checkpoints: Arc<CheckpointStore>) -> Self {
        Self {
            checkpoints,
            resets: Mutex::new(HashMap::new()),
        }
    }

    /// Outcome of the last reset for `instance_id`, if not yet collected.
    pub fn take_reset(&self, instance_id: InstanceId) -> Option<CheckpointResult<WatermarkWindow>> {
        self.resets.lock().remove(&instance_id)
    }
}

impl CatchupObserver for CheckpointResetObserver {
    fn catchup_completed(&self, instance_id: InstanceId, last_seq_no: SeqNo) {
        let result = self.checkpoints.reset_after_catchup(instance_id, last_seq_no);
        match &result {
            Ok(window) => info!(
                instance_id = %instance_id,
                h = window.low(),
                H = window.high(),
                "Checkpoints reset after catch-up"
            ),
            Err(err) => warn!(
                instance_id = %instance_id,
                last_seq_no,
                error = %err,
                "Could not reset checkpoints after catch-up"
            ),
        }
        self.resets.lock().insert(instance_id, result);
    }
}
