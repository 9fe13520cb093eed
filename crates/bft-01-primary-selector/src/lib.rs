//! # bft-01-primary-selector
//!
//! Primary Selector: decides which node leads each consensus instance in
//! each view.
//!
//! ## Strategies
//!
//! | Strategy | Source of truth | Type |
//! |----------|-----------------|------|
//! | Quorum-confirmed | `n - f` matching `ViewChangeDone` declarations | [`PrimarySelector`] |
//! | Round-robin | `(view_no + instance_id) mod n` | [`RoundRobinDecider`] |
//!
//! Both implement [`PrimaryDecider`], so the node can swap strategies
//! without touching its message routing.
//!
//! ## Rules
//!
//! - At most one primary per instance per view; the first quorum wins.
//! - One declaration per sender per instance per view. Repeats are
//!   rejected and counted as suspicious.
//! - The master instance never keeps the same primary across a view
//!   change, whether chosen by quorum or by rotation.
//! - Declarations for views up to `max_future_views` ahead are buffered
//!   and evaluated when the node reaches that view.

pub mod adapters;
pub mod config;
pub mod decider;
pub mod domain;
pub mod error;
pub mod events;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::StaticNodeRegistry;
pub use config::{SelectionMode, SelectorConfig};
pub use decider::RoundRobinDecider;
pub use domain::{compute_fallback_primary, PrimaryRecord, PrimarySource};
pub use error::{SelectionError, SelectionResult};
pub use events::PrimaryChanged;
pub use ports::{NodeRegistry, PrimaryDecider};
pub use service::{DeclarationOutcome, PrimarySelector};
