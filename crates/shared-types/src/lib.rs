//! # Shared Types Crate
//!
//! Identifiers, peer message payloads, quorum arithmetic and the error
//! taxonomy shared by the replica core subsystems.
//!
//! ## Design Principles
//!
//! - **Single Source of Truth**: all cross-subsystem types are defined here.
//! - **Fixed cardinality**: per-instance tables are indexed by `InstanceId`
//!   and bounds-checked through [`instance_slot`].
//! - **Sender outside payload**: message payloads never carry the sender;
//!   the transport supplies it alongside.

pub mod entities;
pub mod errors;
pub mod ipc;
pub mod quorums;
pub mod suspicions;

pub use entities::*;
pub use errors::*;
pub use ipc::*;
pub use quorums::{max_failures, Quorums};
pub use suspicions::{Suspicion, SuspicionCounters};
