//! Driven Ports (SPI - Outbound Dependencies)

use crate::domain::CompactMerkleTree;
use crate::error::CatchupResult;
use async_trait::async_trait;
use shared_types::{Hash, InstanceId, SeqNo};

/// Access to the node's per-instance ledgers.
///
/// Reads are synchronous snapshots. Appends are asynchronous because they
/// persist; the coordinator awaits them while holding the instance's
/// session lock so no second batch can interleave.
#[async_trait]
pub trait LedgerGateway: Send + Sync {
    /// Number of entries in the ledger.
    fn size(&self, instance_id: InstanceId) -> CatchupResult<SeqNo>;

    /// Merkle root of the first `size` entries.
    fn root_at(&self, instance_id: InstanceId, size: SeqNo) -> CatchupResult<Hash>;

    /// Frontier of the whole ledger, for extending it entry by entry.
    fn frontier(&self, instance_id: InstanceId) -> CatchupResult<CompactMerkleTree>;

    /// Entries `first ..= last`.
    fn entries(
        &self,
        instance_id: InstanceId,
        first: SeqNo,
        last: SeqNo,
    ) -> CatchupResult<Vec<Vec<u8>>>;

    /// Consistency path from the prefix of size `first` to that of size `second`.
    fn consistency_proof(
        &self,
        instance_id: InstanceId,
        first: SeqNo,
        second: SeqNo,
    ) -> CatchupResult<Vec<Hash>>;

    /// Append entries starting at `first_seq_no`. Returns the new size.
    async fn append_entries(
        &self,
        instance_id: InstanceId,
        first_seq_no: SeqNo,
        entries: Vec<Vec<u8>>,
    ) -> CatchupResult<SeqNo>;
}

/// Notified once per successful session.
pub trait CatchupObserver: Send + Sync {
    fn catchup_completed(&self, instance_id: InstanceId, last_seq_no: SeqNo);
}
