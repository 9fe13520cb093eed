//! # Shared Bus - Event Bus for Replica Notifications
//!
//! Carries the notifications the replica core emits to the rest of the node
//! process (ordering layer, monitoring).
//!
//! ```text
//! ┌──────────────────┐                    ┌──────────────────┐
//! │ Primary Selector │                    │  Ordering layer  │
//! │ Checkpoint Store │    publish()       │                  │
//! │ Catch-up         │ ──────┐            │                  │
//! └──────────────────┘       │            └──────────────────┘
//!                            ▼                    ↑
//!                      ┌──────────────┐           │
//!                      │  Event Bus   │ ──────────┘
//!                      └──────────────┘  subscribe()
//! ```

#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]

pub mod events;
pub mod publisher;
pub mod subscriber;

pub use events::{EventFilter, EventTopic, ReplicaEvent};
pub use publisher::{EventPublisher, InMemoryEventBus};
pub use subscriber::{EventStream, Subscription, SubscriptionError};

/// Maximum events to buffer per subscriber before the oldest are dropped.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 1000;
