//! # Merkle Ledger Trees
//!
//! Append-only Merkle trees over ledger entries, hashed the way RFC 6962
//! certificate transparency logs are:
//!
//! ```text
//! leaf  = SHA256(0x00 || entry)
//! node  = SHA256(0x01 || left || right)
//! empty = SHA256("")
//! ```
//!
//! The responder keeps a full [`MerkleTree`] and can prove that any prefix
//! of its ledger is consistent with the whole. The requester only needs a
//! [`CompactMerkleTree`] (the frontier of perfect subtrees) to check those
//! proofs and to extend its root as catch-up batches arrive.

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use shared_types::Hash;

const LEAF_PREFIX: u8 = 0x00;
const NODE_PREFIX: u8 = 0x01;

fn finalize(hasher: Sha256) -> Hash {
    let mut output = [0u8; 32];
    output.copy_from_slice(&hasher.finalize());
    output
}

/// Root of the empty tree.
pub fn empty_root() -> Hash {
    finalize(Sha256::new())
}

/// Hash of one ledger entry.
pub fn leaf_hash(entry: &[u8]) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([LEAF_PREFIX]);
    hasher.update(entry);
    finalize(hasher)
}

/// Hash of an interior node.
pub fn node_hash(left: &Hash, right: &Hash) -> Hash {
    let mut hasher = Sha256::new();
    hasher.update([NODE_PREFIX]);
    hasher.update(left);
    hasher.update(right);
    finalize(hasher)
}

/// Largest power of two strictly below `n` (`n >= 2`).
fn split_point(n: usize) -> usize {
    let mut k = 1;
    while k << 1 < n {
        k <<= 1;
    }
    k
}

fn subtree_root(leaves: &[Hash]) -> Hash {
    match leaves.len() {
        0 => empty_root(),
        1 => leaves[0],
        n => {
            let k = split_point(n);
            node_hash(&subtree_root(&leaves[..k]), &subtree_root(&leaves[k..]))
        }
    }
}

fn subproof(m: usize, leaves: &[Hash], complete: bool, out: &mut Vec<Hash>) {
    let n = leaves.len();
    if m == n {
        if !complete {
            out.push(subtree_root(leaves));
        }
        return;
    }
    let k = split_point(n);
    if m <= k {
        subproof(m, &leaves[..k], complete, out);
        out.push(subtree_root(&leaves[k..]));
    } else {
        subproof(m - k, &leaves[k..], false, out);
        out.push(subtree_root(&leaves[..k]));
    }
}

/// Check that the tree of size `first` with root `first_root` is a prefix of
/// the tree of size `second` with root `second_root`.
pub fn verify_consistency(
    first: u64,
    second: u64,
    first_root: &Hash,
    second_root: &Hash,
    proof: &[Hash],
) -> bool {
    if first > second {
        return false;
    }
    if first == second {
        return proof.is_empty() && first_root == second_root;
    }
    if first == 0 {
        return proof.is_empty() && *first_root == empty_root();
    }
    if proof.is_empty() {
        return false;
    }

    let mut path = Vec::with_capacity(proof.len() + 1);
    if first.is_power_of_two() {
        path.push(*first_root);
    }
    path.extend_from_slice(proof);

    let mut fn_ = first - 1;
    let mut sn = second - 1;
    while fn_ & 1 == 1 {
        fn_ >>= 1;
        sn >>= 1;
    }

    let mut fr = path[0];
    let mut sr = path[0];
    for c in &path[1..] {
        if sn == 0 {
            return false;
        }
        if fn_ & 1 == 1 || fn_ == sn {
            fr = node_hash(c, &fr);
            sr = node_hash(c, &sr);
            while fn_ & 1 == 0 && fn_ != 0 {
                fn_ >>= 1;
                sn >>= 1;
            }
        } else {
            sr = node_hash(&sr, c);
        }
        fn_ >>= 1;
        sn >>= 1;
    }
    sn == 0 && fr == *first_root && sr == *second_root
}

// =============================================================================
// FULL TREE (responder side)
// =============================================================================

/// Merkle tree keeping every leaf hash.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct MerkleTree {
    leaves: Vec<Hash>,
}

impl MerkleTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn append_entry(&mut self, entry: &[u8]) {
        self.leaves.push(leaf_hash(entry));
    }

    pub fn size(&self) -> u64 {
        self.leaves.len() as u64
    }

    pub fn root(&self) -> Hash {
        subtree_root(&self.leaves)
    }

    /// Root of the prefix holding the first `size` leaves.
    pub fn root_at(&self, size: u64) -> Option<Hash> {
        let size = usize::try_from(size).ok()?;
        self.leaves.get(..size).map(subtree_root)
    }

    /// Consistency path from the prefix of size `first` to the prefix of
    /// size `second`. Empty when either bound is trivial.
    pub fn consistency_proof(&self, first: u64, second: u64) -> Option<Vec<Hash>> {
        if first > second || second > self.size() {
            return None;
        }
        let mut proof = Vec::new();
        if first > 0 && first < second {
            let second = usize::try_from(second).ok()?;
            let first = usize::try_from(first).ok()?;
            subproof(first, &self.leaves[..second], true, &mut proof);
        }
        Some(proof)
    }

    /// Frontier of the whole tree.
    pub fn frontier(&self) -> CompactMerkleTree {
        let mut compact = CompactMerkleTree::new();
        for leaf in &self.leaves {
            compact.append_leaf_hash(*leaf);
        }
        compact
    }
}

// =============================================================================
// COMPACT TREE (requester side)
// =============================================================================

/// Append-only tree that keeps only the roots of its perfect subtrees,
/// largest first, one per set bit of `size`.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct CompactMerkleTree {
    size: u64,
    frontier: Vec<Hash>,
}

impl CompactMerkleTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn size(&self) -> u64 {
        self.size
    }

    pub fn append_entry(&mut self, entry: &[u8]) {
        self.append_leaf_hash(leaf_hash(entry));
    }

    pub fn append_leaf_hash(&mut self, leaf: Hash) {
        let mut node = leaf;
        let mut size = self.size;
        // Each trailing one bit is a perfect subtree the new leaf completes.
        while size & 1 == 1 {
            if let Some(left) = self.frontier.pop() {
                node = node_hash(&left, &node);
            }
            size >>= 1;
        }
        self.frontier.push(node);
        self.size += 1;
    }

    pub fn root(&self) -> Hash {
        let mut hashes = self.frontier.iter().rev();
        let Some(last) = hashes.next() else {
            return empty_root();
        };
        hashes.fold(*last, |acc, left| node_hash(left, &acc))
    }
}
