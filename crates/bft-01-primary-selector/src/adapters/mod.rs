//! Adapters for the selector's outbound ports.

pub mod static_registry;

pub use static_registry::StaticNodeRegistry;
