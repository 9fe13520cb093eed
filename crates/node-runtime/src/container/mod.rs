//! # Subsystem Container
//!
//! Configuration and construction of the replica subsystems.

pub mod config;
pub mod subsystems;

pub use config::NodeConfig;
pub use subsystems::SubsystemContainer;
