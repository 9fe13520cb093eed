//! # BFT Replica Test Suite
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── harness.rs        # Four-node pool over in-memory transports
//! └── integration/      # Cross-node flows
//!     ├── selection_flow.rs
//!     ├── checkpoint_flow.rs
//!     └── catchup_flow.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! cargo test -p bft-tests
//! cargo test -p bft-tests integration::catchup_flow
//!
//! # Benchmarks
//! cargo bench -p bft-tests
//! ```

pub mod harness;
pub mod integration;
