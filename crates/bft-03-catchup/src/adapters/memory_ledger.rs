//! In-memory ledger
//!
//! Implements `LedgerGateway` over per-instance vectors. Used by tests and
//! by nodes that do not persist their ledgers.

use crate::domain::{CompactMerkleTree, MerkleTree};
use crate::error::{CatchupError, CatchupResult};
use crate::ports::LedgerGateway;
use async_trait::async_trait;
use parking_lot::RwLock;
use shared_types::{instance_slot, Hash, InstanceId, SeqNo};

#[derive(Default)]
struct InstanceLedger {
    entries: Vec<Vec<u8>>,
    tree: MerkleTree,
}

impl InstanceLedger {
    fn push(&mut self, entry: Vec<u8>) {
        self.tree.append_entry(&entry);
        self.entries.push(entry);
    }
}

/// Per-instance append-only ledgers held in memory.
pub struct InMemoryLedger {
    ledgers: Vec<RwLock<InstanceLedger>>,
}

impl InMemoryLedger {
    pub fn new(instance_count: usize) -> Self {
        Self {
            ledgers: (0..instance_count)
                .map(|_| RwLock::new(InstanceLedger::default()))
                .collect(),
        }
    }

    /// Append one entry ordered locally. Returns its sequence number.
    pub fn append(&self, instance_id: InstanceId, entry: impl Into<Vec<u8>>) -> CatchupResult<SeqNo> {
        let mut ledger = instance_slot(&self.ledgers, instance_id)?.write();
        ledger.push(entry.into());
        Ok(ledger.tree.size())
    }

    fn slot(&self, instance_id: InstanceId) -> CatchupResult<&RwLock<InstanceLedger>> {
        Ok(instance_slot(&self.ledgers, instance_id)?)
    }
}

fn out_of_range(instance_id: InstanceId, what: &str, size: SeqNo) -> CatchupError {
    CatchupError::Ledger {
        reason: format!("instance {instance_id}: {what} outside ledger of size {size}"),
    }
}

#[async_trait]
impl LedgerGateway for InMemoryLedger {
    fn size(&self, instance_id: InstanceId) -> CatchupResult<SeqNo> {
        Ok(self.slot(instance_id)?.read().tree.size())
    }

    fn root_at(&self, instance_id: InstanceId, size: SeqNo) -> CatchupResult<Hash> {
        let ledger = self.slot(instance_id)?.read();
        ledger
            .tree
            .root_at(size)
            .ok_or_else(|| out_of_range(instance_id, "root", ledger.tree.size()))
    }

    fn frontier(&self, instance_id: InstanceId) -> CatchupResult<CompactMerkleTree> {
        Ok(self.slot(instance_id)?.read().tree.frontier())
    }

    fn entries(
        &self,
        instance_id: InstanceId,
        first: SeqNo,
        last: SeqNo,
    ) -> CatchupResult<Vec<Vec<u8>>> {
        let ledger = self.slot(instance_id)?.read();
        let size = ledger.tree.size();
        if first == 0 || first > last || last > size {
            return Err(out_of_range(instance_id, "entry range", size));
        }
        Ok(ledger.entries[(first - 1) as usize..last as usize].to_vec())
    }

    fn consistency_proof(
        &self,
        instance_id: InstanceId,
        first: SeqNo,
        second: SeqNo,
    ) -> CatchupResult<Vec<Hash>> {
        let ledger = self.slot(instance_id)?.read();
        ledger
            .tree
            .consistency_proof(first, second)
            .ok_or_else(|| out_of_range(instance_id, "proof bounds", ledger.tree.size()))
    }

    async fn append_entries(
        &self,
        instance_id: InstanceId,
        first_seq_no: SeqNo,
        entries: Vec<Vec<u8>>,
    ) -> CatchupResult<SeqNo> {
        let mut ledger = self.slot(instance_id)?.write();
        let expected = ledger.tree.size() + 1;
        if first_seq_no != expected {
            return Err(CatchupError::Ledger {
                reason: format!(
                    "instance {instance_id}: append at {first_seq_no}, next is {expected}"
                ),
            });
        }
        for entry in entries {
            ledger.push(entry);
        }
        Ok(ledger.tree.size())
    }
}
