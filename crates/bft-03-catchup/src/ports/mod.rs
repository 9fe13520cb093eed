//! Ports: driving API and driven dependencies

pub mod inbound;
pub mod outbound;

pub use inbound::{CatchupAborted, CatchupApi, CatchupCompletion, ProofOutcome, ReplyOutcome};
pub use outbound::{CatchupObserver, LedgerGateway};
