//! Candidate declarations and their per-view tally

use shared_types::{InstanceId, NodeName, ViewChangeDone, ViewNo};
use std::collections::{BTreeMap, HashMap};

/// One peer's announcement of whom it believes should be primary.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct CandidateDeclaration {
    pub instance_id: InstanceId,
    pub view_no: ViewNo,
    pub sender: NodeName,
    pub candidate: NodeName,
    pub proof: Option<Vec<u8>>,
}

impl CandidateDeclaration {
    /// Declaration carried by an inbound `ViewChangeDone`.
    pub fn from_message(msg: &ViewChangeDone, sender: NodeName) -> Self {
        Self {
            instance_id: msg.instance_id,
            view_no: msg.view_no,
            sender,
            candidate: msg.candidate_primary_name.clone(),
            proof: msg.proof.clone(),
        }
    }

    /// The announcement to replay to lagging nodes.
    pub fn to_message(&self) -> ViewChangeDone {
        ViewChangeDone {
            candidate_primary_name: self.candidate.clone(),
            instance_id: self.instance_id,
            view_no: self.view_no,
            proof: self.proof.clone(),
        }
    }
}

/// Declarations for one instance and view, at most one per sender.
#[derive(Clone, Debug, Default)]
pub struct DeclarationTally {
    by_sender: HashMap<NodeName, CandidateDeclaration>,
}

impl DeclarationTally {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn has_declared(&self, sender: &NodeName) -> bool {
        self.by_sender.contains_key(sender)
    }

    /// Store a declaration. Returns `false` when the sender already declared.
    pub fn insert(&mut self, declaration: CandidateDeclaration) -> bool {
        if self.has_declared(&declaration.sender) {
            return false;
        }
        self.by_sender.insert(declaration.sender.clone(), declaration);
        true
    }

    /// Remove every declaration naming `candidate`. Returns how many.
    pub fn discard_candidate(&mut self, candidate: &NodeName) -> usize {
        let before = self.by_sender.len();
        self.by_sender.retain(|_, d| &d.candidate != candidate);
        before - self.by_sender.len()
    }

    pub fn len(&self) -> usize {
        self.by_sender.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_sender.is_empty()
    }

    /// Most-declared candidate once at least `quorum` declarations exist.
    ///
    /// Ties go to the lexicographically smallest name so every node picks
    /// the same winner from the same set. Returns the winner together with
    /// one declaration that named it.
    pub fn winner(&self, quorum: usize) -> Option<(NodeName, CandidateDeclaration)> {
        if self.by_sender.len() < quorum {
            return None;
        }
        let mut votes: BTreeMap<&NodeName, usize> = BTreeMap::new();
        for declaration in self.by_sender.values() {
            *votes.entry(&declaration.candidate).or_insert(0) += 1;
        }

        let mut best: Option<(&NodeName, usize)> = None;
        for (candidate, count) in votes {
            if best.map_or(true, |(_, top)| count > top) {
                best = Some((candidate, count));
            }
        }
        let (winner, _) = best?;

        // Smallest sender keeps the returned declaration deterministic.
        let declaration = self
            .by_sender
            .values()
            .filter(|d| &d.candidate == winner)
            .min_by(|a, b| a.sender.cmp(&b.sender))?
            .clone();
        Some((winner.clone(), declaration))
    }
}
