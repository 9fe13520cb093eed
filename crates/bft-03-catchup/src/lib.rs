//! # bft-03-catchup
//!
//! Catch-up Coordinator: brings a lagging instance's ledger up to date out
//! of band, then hands control back to live ordering.
//!
//! ## Flow
//!
//! ```text
//! requester                                   peers
//!     │ start_catchup ──ConsistencyProofRequest──▶ │
//!     │ ◀──────────ConsistencyProof (f+1 equal)─── │  ProvingConsistency
//!     │ catchup_requests ──CatchupRequest────────▶ │
//!     │ ◀──────────CatchupReply (contiguous)────── │  CollectingReplies
//!     │ target reached → CatchupObserver           │  Completed
//! ```
//!
//! Every proof and batch is checked against RFC 6962 Merkle roots, so a
//! single honest peer in the `f + 1` agreement is enough to pin the target
//! and no faulty peer can slip in a forged entry. Batches are persisted as
//! they are accepted; an aborted session loses nothing and a retry starts
//! from the new ledger size.

pub mod adapters;
pub mod config;
pub mod domain;
pub mod error;
pub mod metrics;
pub mod ports;
pub mod service;

pub use adapters::InMemoryLedger;
pub use config::CatchupConfig;
pub use domain::{AbortReason, CatchupPhase, CatchupTarget, CompactMerkleTree, MerkleTree};
pub use error::{CatchupError, CatchupResult};
pub use ports::{
    CatchupAborted, CatchupApi, CatchupCompletion, CatchupObserver, LedgerGateway, ProofOutcome,
    ReplyOutcome,
};
pub use service::CatchupCoordinator;
