//! # Replica Events
//!
//! Notifications emitted by the replica core subsystems. The ordering layer
//! subscribes to these to unblock ordering after a primary change or a
//! completed catch-up.

use serde::{Deserialize, Serialize};
use shared_types::{Hash, InstanceId, NodeName, SeqNo, ViewNo};

/// All events that can be published to the event bus.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReplicaEvent {
    // =========================================================================
    // PRIMARY SELECTION
    // =========================================================================
    /// A primary was installed for an instance.
    PrimaryChanged {
        /// Instance whose primary changed.
        instance_id: InstanceId,
        /// View in which the primary was installed.
        view_no: ViewNo,
        /// The new primary.
        primary: NodeName,
        /// Whether a quorum of declarations confirmed it (false for the
        /// round-robin fallback).
        quorum_confirmed: bool,
    },

    /// The node moved to a new view.
    ViewChanged {
        /// Previous view.
        from: ViewNo,
        /// New view.
        to: ViewNo,
    },

    // =========================================================================
    // CHECKPOINTS
    // =========================================================================
    /// A checkpoint window became stable and the low watermark moved.
    CheckpointStabilized {
        /// Instance the checkpoint belongs to.
        instance_id: InstanceId,
        /// First sequence number of the window.
        first_seq_no: SeqNo,
        /// Last sequence number of the window (the new low watermark).
        last_seq_no: SeqNo,
        /// Quorum-agreed digest.
        digest: Hash,
    },

    // =========================================================================
    // CATCH-UP
    // =========================================================================
    /// A catch-up session was opened.
    CatchupStarted {
        /// Instance being synchronized.
        instance_id: InstanceId,
        /// Local ledger size when the session opened.
        from_seq_no: SeqNo,
    },

    /// A catch-up session reached its target.
    CatchupCompleted {
        /// Instance that finished synchronizing.
        instance_id: InstanceId,
        /// Last sequence number now present locally.
        last_seq_no: SeqNo,
    },

    /// A catch-up session was abandoned; it may be retried.
    CatchupAborted {
        /// Instance whose session was abandoned.
        instance_id: InstanceId,
        /// Why it was abandoned.
        reason: String,
    },

    // =========================================================================
    // CRITICAL
    // =========================================================================
    /// Local state would have broken an invariant. The node decides whether
    /// to halt.
    InvariantViolation {
        /// Instance concerned.
        instance_id: InstanceId,
        /// Description of the violation.
        detail: String,
    },
}

impl ReplicaEvent {
    /// Topic of this event (for filtering).
    #[must_use]
    pub fn topic(&self) -> EventTopic {
        match self {
            Self::PrimaryChanged { .. } | Self::ViewChanged { .. } => EventTopic::PrimarySelection,
            Self::CheckpointStabilized { .. } => EventTopic::Checkpoints,
            Self::CatchupStarted { .. }
            | Self::CatchupCompleted { .. }
            | Self::CatchupAborted { .. } => EventTopic::Catchup,
            Self::InvariantViolation { .. } => EventTopic::Critical,
        }
    }

    /// Instance the event concerns; `None` for node-wide events.
    #[must_use]
    pub fn instance_id(&self) -> Option<InstanceId> {
        match self {
            Self::PrimaryChanged { instance_id, .. }
            | Self::CheckpointStabilized { instance_id, .. }
            | Self::CatchupStarted { instance_id, .. }
            | Self::CatchupCompleted { instance_id, .. }
            | Self::CatchupAborted { instance_id, .. }
            | Self::InvariantViolation { instance_id, .. } => Some(*instance_id),
            Self::ViewChanged { .. } => None,
        }
    }
}

/// Event topics for subscription filtering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum EventTopic {
    /// Primary and view events.
    PrimarySelection,
    /// Checkpoint stabilization.
    Checkpoints,
    /// Catch-up session lifecycle.
    Catchup,
    /// Invariant violations.
    Critical,
}

impl EventTopic {
    /// Stable label for logs and metrics.
    #[must_use]
    pub fn as_str(self) -> &'static str {
        match self {
            Self::PrimarySelection => "primary_selection",
            Self::Checkpoints => "checkpoints",
            Self::Catchup => "catchup",
            Self::Critical => "critical",
        }
    }
}

/// Filter for subscribing to specific events.
#[derive(Debug, Clone, Default)]
pub struct EventFilter {
    /// Topics to include. Empty means all topics.
    pub topics: Vec<EventTopic>,
    /// Instances to include. Empty means all instances; node-wide events
    /// always pass.
    pub instances: Vec<InstanceId>,
}

impl EventFilter {
    /// Accept every event.
    #[must_use]
    pub fn all() -> Self {
        Self::default()
    }

    /// Accept events of the given topics.
    #[must_use]
    pub fn topics(topics: Vec<EventTopic>) -> Self {
        Self {
            topics,
            instances: Vec::new(),
        }
    }

    /// Restrict to the given instances.
    #[must_use]
    pub fn for_instances(mut self, instances: Vec<InstanceId>) -> Self {
        self.instances = instances;
        self
    }

    /// Check if an event matches this filter.
    #[must_use]
    pub fn matches(&self, event: &ReplicaEvent) -> bool {
        let topic_match = self.topics.is_empty() || self.topics.contains(&event.topic());
        let instance_match = self.instances.is_empty()
            || event
                .instance_id()
                .map_or(true, |id| self.instances.contains(&id));
        topic_match && instance_match
    }
}
