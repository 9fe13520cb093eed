//! # Node Runtime
//!
//! Wires primary selection, checkpoints and catch-up into one
//! [`ReplicaNode`].
//!
//! - `container/` - configuration and subsystem construction
//! - `adapters/` - outbound transport and the catch-up to checkpoint bridge
//! - `handlers/` - per-subsystem message handling on `ReplicaNode`
//!
//! ```text
//! peer ──ReplicaMessage──▶ handle_message ──▶ PrimarySelector
//!                                        ──▶ CheckpointStore ──LaggingBehind──┐
//!                                        ──▶ CatchupCoordinator ◀─────────────┘
//!                                                  │ completion
//!                                                  ▼
//!                                   CheckpointResetObserver ──▶ CheckpointStore
//! ```
//!
//! Every state change is published on the node's `InMemoryEventBus`.

#![allow(clippy::type_complexity)]

pub mod adapters;
pub mod container;
pub mod error;
mod handlers;
pub mod node;

pub use adapters::{CheckpointResetObserver, Destination, InMemoryTransport, Transport};
pub use container::{NodeConfig, SubsystemContainer};
pub use error::{NodeError, NodeResult};
pub use node::ReplicaNode;
