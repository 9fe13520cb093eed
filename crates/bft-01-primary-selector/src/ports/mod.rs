//! Ports (hexagonal architecture)

pub mod inbound;
pub mod outbound;

pub use inbound::PrimaryDecider;
pub use outbound::NodeRegistry;
