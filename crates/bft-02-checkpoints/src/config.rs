//! Checkpoint Store configuration

use serde::{Deserialize, Serialize};

use crate::error::{CheckpointError, CheckpointResult};

/// Checkpoint Store configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CheckpointConfig {
    /// Number of consensus instances (master + backups)
    pub instance_count: usize,
    /// Checkpoint frequency `F`: windows end on multiples of this
    pub chk_freq: u64,
    /// Watermark window size `L`: `H = h + L`
    pub log_size: u64,
    /// Upper bound on votes held for windows beyond `H`, per instance
    pub max_stashed_votes: usize,
}

impl Default for CheckpointConfig {
    fn default() -> Self {
        Self {
            instance_count: 2,
            chk_freq: 100,
            log_size: 300,
            max_stashed_votes: 1000,
        }
    }
}

impl CheckpointConfig {
    /// Small windows for tests: `F = 5`, `L = 15`.
    pub fn for_testing() -> Self {
        Self {
            instance_count: 2,
            chk_freq: 5,
            log_size: 15,
            max_stashed_votes: 64,
        }
    }

    /// Reject configurations the store cannot operate with.
    pub fn validate(&self) -> CheckpointResult<()> {
        let reason = if self.instance_count == 0 {
            "instance_count must be at least 1"
        } else if self.chk_freq == 0 {
            "chk_freq must be positive"
        } else if self.log_size < self.chk_freq {
            "log_size must be at least chk_freq"
        } else {
            return Ok(());
        };
        Err(CheckpointError::InvalidConfig {
            reason: reason.to_string(),
        })
    }
}
