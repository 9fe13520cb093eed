//! Primary Selector configuration

use serde::{Deserialize, Serialize};

use crate::error::{SelectionError, SelectionResult};

/// How primaries are decided after a view change.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SelectionMode {
    /// Install the round-robin primary immediately on every view change.
    /// Buffered quorums for the new view still take precedence.
    #[default]
    RoundRobin,
    /// Wait for `2f+1` declarations; instances stay without a primary
    /// until a quorum arrives.
    QuorumConfirmed,
}

/// Primary Selector configuration
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SelectorConfig {
    /// Number of consensus instances (master + backups)
    pub instance_count: usize,
    /// Decision strategy
    pub mode: SelectionMode,
    /// How many views ahead declarations are buffered
    pub max_future_views: u64,
}

impl Default for SelectorConfig {
    fn default() -> Self {
        Self {
            instance_count: 2,
            mode: SelectionMode::RoundRobin,
            max_future_views: 2,
        }
    }
}

impl SelectorConfig {
    /// Quorum-confirmed selection, two instances.
    pub fn for_testing() -> Self {
        Self {
            mode: SelectionMode::QuorumConfirmed,
            ..Self::default()
        }
    }

    pub fn validate(&self) -> SelectionResult<()> {
        if self.instance_count == 0 {
            return Err(SelectionError::InvalidConfig {
                reason: "instance_count must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}
