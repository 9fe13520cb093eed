//! # Transport Port
//!
//! Outbound peer messaging. Encoding, signing and delivery belong to the
//! implementation; the node only names a destination.

use async_trait::async_trait;
use parking_lot::Mutex;
use shared_types::{NodeName, ReplicaMessage};
use tracing::trace;

/// Outbound messaging to peers.
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send to one peer.
    async fn send(&self, to: &NodeName, message: ReplicaMessage);

    /// Send to every peer.
    async fn broadcast(&self, message: ReplicaMessage);
}

/// Where an outbound message was addressed.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Destination {
    Peer(NodeName),
    AllPeers,
}

/// Transport that queues outbound messages for the caller to deliver.
///
/// Lets tests and simulations move messages between nodes in any order.
#[derive(Default)]
pub struct InMemoryTransport {
    outbox: Mutex<Vec<(Destination, ReplicaMessage)>>,
}

impl InMemoryTransport {
    pub fn new() -> Self {
        Self::default()
    }

    /// Remove and return everything queued so far.
    pub fn drain(&self) -> Vec<(Destination, ReplicaMessage)> {
        std::mem::take(&mut *self.outbox.lock())
    }

    pub fn pending(&self) -> usize {
        self.outbox.lock().len()
    }
}

#[async_trait]
impl Transport for InMemoryTransport {
    async fn send(&self, to: &NodeName, message: ReplicaMessage) {
        trace!(to = %to, message_type = message.type_name(), "Queued message");
        self.outbox
            .lock()
            .push((Destination::Peer(to.clone()), message));
    }

    async fn broadcast(&self, message: ReplicaMessage) {
        trace!(message_type = message.type_name(), "Queued broadcast");
        self.outbox.lock().push((Destination::AllPeers, message));
    }
}
