//! Adapters for the catch-up ports

pub mod memory_ledger;

pub use memory_ledger::InMemoryLedger;
