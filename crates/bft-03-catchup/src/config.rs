//! Catch-up configuration

use serde::{Deserialize, Serialize};
use std::time::Duration;

use crate::error::{CatchupError, CatchupResult};

/// Catch-up Coordinator configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CatchupConfig {
    /// Number of consensus instances (master + backups)
    pub instance_count: usize,
    /// Seconds a session may run before it is aborted
    pub proof_timeout_secs: u64,
    /// Largest number of entries requested from one peer at a time
    pub max_batch_size: u64,
}

impl Default for CatchupConfig {
    fn default() -> Self {
        Self {
            instance_count: 2,
            proof_timeout_secs: 60,
            max_batch_size: 500,
        }
    }
}

impl CatchupConfig {
    /// Short timeout and tiny batches for tests.
    pub fn for_testing() -> Self {
        Self {
            instance_count: 2,
            proof_timeout_secs: 5,
            max_batch_size: 4,
        }
    }

    pub fn proof_timeout(&self) -> Duration {
        Duration::from_secs(self.proof_timeout_secs)
    }

    /// Reject configurations the coordinator cannot operate with.
    pub fn validate(&self) -> CatchupResult<()> {
        let reason = if self.instance_count == 0 {
            "instance_count must be at least 1"
        } else if self.proof_timeout_secs == 0 {
            "proof_timeout_secs must be positive"
        } else if self.max_batch_size == 0 {
            "max_batch_size must be positive"
        } else {
            return Ok(());
        };
        Err(CatchupError::InvalidConfig {
            reason: reason.to_string(),
        })
    }
}
