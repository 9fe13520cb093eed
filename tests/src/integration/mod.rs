//! Multi-node flows driven through [`crate::harness::Pool`].

pub mod catchup_flow;
pub mod checkpoint_flow;
pub mod selection_flow;
