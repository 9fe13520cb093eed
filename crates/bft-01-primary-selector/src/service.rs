//! Primary Selector - per-instance election state
//!
//! Lock order: the view lock is always taken before any instance lock.
//! View changes hold the view lock for writing across all instances, so a
//! declaration can never be tallied against a view that is being replaced.

use crate::config::{SelectionMode, SelectorConfig};
use crate::domain::{
    select_rank, CandidateDeclaration, DeclarationTally, PrimaryRecord, PrimarySource,
};
use crate::error::{SelectionError, SelectionResult};
use crate::events::PrimaryChanged;
use crate::metrics;
use crate::ports::{NodeRegistry, PrimaryDecider};
use parking_lot::{Mutex, RwLock};
use shared_types::{
    instance_slot, Classify, InstanceId, NodeName, Quorums, Suspicion, SuspicionCounters,
    ViewChangeDone, ViewNo,
};
use std::collections::BTreeMap;
use std::sync::Arc;
use tracing::{debug, info, warn};

/// Result of recording one declaration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum DeclarationOutcome {
    /// Stored for the current view; no quorum yet.
    Recorded { declarations: usize },
    /// Stored for a future view; evaluated when the node reaches it.
    Buffered { view_no: ViewNo },
    /// The declaration completed a quorum and a primary was installed.
    PrimaryInstalled(PrimaryChanged),
}

/// Node-global view state.
#[derive(Debug, Default)]
struct ViewState {
    view_no: ViewNo,
    /// Master primary of the view before `view_no`.
    previous_master_primary: Option<NodeName>,
}

/// Election state owned by one instance.
#[derive(Debug, Default)]
struct InstanceSelection {
    primary: Option<PrimaryRecord>,
    tallies: BTreeMap<ViewNo, DeclarationTally>,
    /// Declaration that named the quorum winner in the current view.
    last_confirmed: Option<CandidateDeclaration>,
}

/// Quorum-capable primary selector.
pub struct PrimarySelector {
    config: SelectorConfig,
    quorums: Quorums,
    registry: Arc<dyn NodeRegistry>,
    view: RwLock<ViewState>,
    instances: Vec<Mutex<InstanceSelection>>,
    suspicions: Arc<SuspicionCounters>,
}

impl PrimarySelector {
    /// Create a selector at view 0 with no primaries installed.
    pub fn new(
        config: SelectorConfig,
        registry: Arc<dyn NodeRegistry>,
        suspicions: Arc<SuspicionCounters>,
    ) -> SelectionResult<Self> {
        config.validate()?;
        let total_nodes = registry.total_nodes();
        if total_nodes == 0 {
            return Err(SelectionError::EmptyRegistry);
        }
        let instances = (0..config.instance_count)
            .map(|_| Mutex::new(InstanceSelection::default()))
            .collect();
        Ok(Self {
            config,
            quorums: Quorums::new(total_nodes),
            registry,
            view: RwLock::new(ViewState::default()),
            instances,
            suspicions,
        })
    }

    pub fn config(&self) -> &SelectorConfig {
        &self.config
    }

    pub fn quorums(&self) -> Quorums {
        self.quorums
    }

    pub fn view_no(&self) -> ViewNo {
        self.view.read().view_no
    }

    /// Master primary of the previous view, excluded from the current one.
    pub fn previous_master_primary(&self) -> Option<NodeName> {
        self.view.read().previous_master_primary.clone()
    }

    pub fn primary_of(&self, instance_id: InstanceId) -> SelectionResult<Option<PrimaryRecord>> {
        Ok(instance_slot(&self.instances, instance_id)?.lock().primary.clone())
    }

    /// Duplicate declarations seen from `sender` on `instance_id`.
    pub fn duplicate_count(&self, instance_id: InstanceId, sender: &NodeName) -> u64 {
        self.suspicions
            .count(instance_id, sender, Suspicion::DuplicatePrimaryDeclaration)
    }

    /// Record a peer's candidate declaration.
    pub fn record_declaration(
        &self,
        instance_id: InstanceId,
        view_no: ViewNo,
        sender: &NodeName,
        candidate: &NodeName,
    ) -> SelectionResult<DeclarationOutcome> {
        self.record(CandidateDeclaration {
            instance_id,
            view_no,
            sender: sender.clone(),
            candidate: candidate.clone(),
            proof: None,
        })
    }

    /// Record the declaration carried by an inbound `ViewChangeDone`.
    pub fn process_view_change_done(
        &self,
        msg: &ViewChangeDone,
        sender: &NodeName,
    ) -> SelectionResult<DeclarationOutcome> {
        debug!(
            instance_id = %msg.instance_id,
            view_no = %msg.view_no,
            sender = %sender,
            candidate = %msg.candidate_primary_name,
            "Processing ViewChangeDone"
        );
        self.record(CandidateDeclaration::from_message(msg, sender.clone()))
    }

    fn record(&self, declaration: CandidateDeclaration) -> SelectionResult<DeclarationOutcome> {
        self.try_record(declaration).map_err(|err| {
            metrics::record_declaration_rejected(err.label());
            err
        })
    }

    fn try_record(&self, declaration: CandidateDeclaration) -> SelectionResult<DeclarationOutcome> {
        let view = self.view.read();
        let instance_id = declaration.instance_id;
        let slot = instance_slot(&self.instances, instance_id)?;
        let current = view.view_no;

        if declaration.view_no < current {
            debug!(instance_id = %instance_id, view_no = %declaration.view_no, current = %current, "Discarding declaration for stale view");
            return Err(SelectionError::StaleView {
                instance_id,
                view_no: declaration.view_no,
                current,
            });
        }
        if declaration.view_no.0 > current.0.saturating_add(self.config.max_future_views) {
            return Err(SelectionError::ViewTooFarAhead {
                instance_id,
                view_no: declaration.view_no,
                current,
                max_ahead: self.config.max_future_views,
            });
        }
        if self.registry.rank_of(&declaration.candidate).is_none() {
            return Err(SelectionError::UnknownCandidate {
                candidate: declaration.candidate,
            });
        }
        if instance_id.is_master()
            && declaration.view_no == current
            && view.previous_master_primary.as_ref() == Some(&declaration.candidate)
        {
            warn!(
                sender = %declaration.sender,
                candidate = %declaration.candidate,
                view_no = %current,
                "Candidate was primary of master in previous view too"
            );
            return Err(SelectionError::AntiRepeat {
                candidate: declaration.candidate,
            });
        }

        let mut state = slot.lock();
        if declaration.view_no == current {
            if let Some(primary) = &state.primary {
                debug!(
                    instance_id = %instance_id,
                    primary = %primary.name,
                    sender = %declaration.sender,
                    "Primary already decided, ignoring declaration"
                );
                return Err(SelectionError::AlreadyDecided {
                    instance_id,
                    view_no: current,
                    primary: primary.name.clone(),
                });
            }
        }

        let view_no = declaration.view_no;
        let sender = declaration.sender.clone();
        let tally = state.tallies.entry(view_no).or_default();
        if !tally.insert(declaration) {
            let duplicates =
                self.suspicions
                    .record(instance_id, &sender, Suspicion::DuplicatePrimaryDeclaration);
            warn!(
                instance_id = %instance_id,
                sender = %sender.replica_name(instance_id),
                view_no = %view_no,
                duplicates,
                "Already got primary declaration from sender"
            );
            return Err(SelectionError::DuplicateDeclaration {
                instance_id,
                sender,
                view_no,
            });
        }
        let declarations = tally.len();

        if view_no > current {
            debug!(instance_id = %instance_id, view_no = %view_no, sender = %sender, "Buffered declaration for future view");
            return Ok(DeclarationOutcome::Buffered { view_no });
        }

        match self.try_install(&mut state, instance_id, current) {
            Some(changed) => Ok(DeclarationOutcome::PrimaryInstalled(changed)),
            None => {
                debug!(
                    instance_id = %instance_id,
                    declarations,
                    quorum = self.quorums.view_change_done(),
                    "No primary quorum yet"
                );
                Ok(DeclarationOutcome::Recorded { declarations })
            }
        }
    }

    /// Install the tally winner for `view_no` if the tally holds a quorum.
    fn try_install(
        &self,
        state: &mut InstanceSelection,
        instance_id: InstanceId,
        view_no: ViewNo,
    ) -> Option<PrimaryChanged> {
        let (winner, declaration) = state
            .tallies
            .get(&view_no)?
            .winner(self.quorums.view_change_done())?;
        state.tallies.remove(&view_no);
        state.primary = Some(PrimaryRecord {
            name: winner.clone(),
            epoch: view_no,
            source: PrimarySource::Quorum,
        });
        state.last_confirmed = Some(declaration);

        info!(
            instance_id = %instance_id,
            primary = %winner.replica_name(instance_id),
            view_no = %view_no,
            "Selected primary by quorum"
        );
        metrics::record_primary_installed(instance_id.0, true);
        Some(PrimaryChanged {
            instance_id,
            view_no,
            primary: winner,
            quorum_confirmed: true,
        })
    }

    /// Install the round-robin primary for every instance lacking one.
    pub fn start_selection(&self) -> SelectionResult<Vec<PrimaryChanged>> {
        let view = self.view.read();
        self.start_selection_at(&view)
    }

    fn start_selection_at(&self, view: &ViewState) -> SelectionResult<Vec<PrimaryChanged>> {
        debug!(view_no = %view.view_no, "Starting selection");
        let mut changes = Vec::new();
        for (index, slot) in self.instances.iter().enumerate() {
            let instance_id = InstanceId(index as u32);
            let mut state = slot.lock();
            if state.primary.is_some() {
                continue;
            }
            let exclude = if instance_id.is_master() {
                view.previous_master_primary.as_ref()
            } else {
                None
            };
            let primary = select_rank(instance_id, view.view_no, self.registry.as_ref(), exclude)
                .ok_or(SelectionError::EmptyRegistry)?;

            info!(
                instance_id = %instance_id,
                primary = %primary.replica_name(instance_id),
                view_no = %view.view_no,
                "Selected primary by round robin"
            );
            metrics::record_primary_installed(instance_id.0, false);
            state.primary = Some(PrimaryRecord {
                name: primary.clone(),
                epoch: view.view_no,
                source: PrimarySource::Fallback,
            });
            changes.push(PrimaryChanged {
                instance_id,
                view_no: view.view_no,
                primary,
                quorum_confirmed: false,
            });
        }
        Ok(changes)
    }

    /// Advance to `new_view_no` and re-elect.
    ///
    /// Drops every primary and every tally for older views. Buffered
    /// quorums for the new view are installed first; in round-robin mode
    /// the remaining instances get their fallback primary.
    pub fn on_view_changed(&self, new_view_no: ViewNo) -> SelectionResult<Vec<PrimaryChanged>> {
        let mut view = self.view.write();
        let current = view.view_no;
        if new_view_no <= current {
            warn!(
                requested = %new_view_no,
                current = %current,
                "Provided view no is not greater than the current view no"
            );
            return Err(SelectionError::StaleViewChange {
                requested: new_view_no,
                current,
            });
        }

        let master_primary = instance_slot(&self.instances, InstanceId::MASTER)?
            .lock()
            .primary
            .as_ref()
            .map(|p| p.name.clone());
        view.previous_master_primary = master_primary;
        view.view_no = new_view_no;
        metrics::set_view_no(new_view_no.0);

        let mut changes = Vec::new();
        for (index, slot) in self.instances.iter().enumerate() {
            let instance_id = InstanceId(index as u32);
            let mut state = slot.lock();
            state.primary = None;
            state.last_confirmed = None;
            state.tallies.retain(|v, _| *v >= new_view_no);

            let previous = view
                .previous_master_primary
                .as_ref()
                .filter(|_| instance_id.is_master());
            if let Some(previous) = previous {
                if let Some(tally) = state.tallies.get_mut(&new_view_no) {
                    let dropped = tally.discard_candidate(previous);
                    if dropped > 0 {
                        warn!(
                            candidate = %previous,
                            dropped,
                            "Discarded buffered declarations naming previous master primary"
                        );
                    }
                }
            }
            if let Some(changed) = self.try_install(&mut state, instance_id, new_view_no) {
                changes.push(changed);
            }
        }

        if self.config.mode == SelectionMode::RoundRobin {
            changes.extend(self.start_selection_at(&view)?);
        }

        info!(
            from = %current,
            to = %new_view_no,
            installed = changes.len(),
            "View changed"
        );
        Ok(changes)
    }

    /// Announcements for a lagging or newly joined node, one per instance
    /// with a primary.
    pub fn pending_sync_messages(&self) -> Vec<ViewChangeDone> {
        let view = self.view.read();
        self.instances
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| {
                let instance_id = InstanceId(index as u32);
                let state = slot.lock();
                match (&state.last_confirmed, &state.primary) {
                    (Some(declaration), _) => Some(declaration.to_message()),
                    (None, Some(primary)) => Some(ViewChangeDone {
                        candidate_primary_name: primary.name.clone(),
                        instance_id,
                        view_no: view.view_no,
                        proof: None,
                    }),
                    (None, None) => None,
                }
            })
            .collect()
    }
}

impl PrimaryDecider for PrimarySelector {
    fn handle_view_change(&self, view_no: ViewNo) -> SelectionResult<Vec<PrimaryChanged>> {
        self.on_view_changed(view_no)
    }

    fn decide_primaries(&self) -> SelectionResult<Vec<PrimaryChanged>> {
        self.start_selection()
    }

    fn sync_lagging_node(&self) -> Vec<ViewChangeDone> {
        self.pending_sync_messages()
    }

    fn view_no(&self) -> ViewNo {
        PrimarySelector::view_no(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::StaticNodeRegistry;
    use rand::seq::SliceRandom;

    const NODES: [&str; 4] = ["Alpha", "Beta", "Gamma", "Delta"];

    fn name(s: &str) -> NodeName {
        NodeName::from(s)
    }

    fn selector_with(mode: SelectionMode) -> (PrimarySelector, Arc<StaticNodeRegistry>) {
        let registry = Arc::new(StaticNodeRegistry::new(NODES));
        let config = SelectorConfig {
            mode,
            ..SelectorConfig::default()
        };
        let selector = PrimarySelector::new(
            config,
            registry.clone(),
            Arc::new(SuspicionCounters::new()),
        )
        .unwrap();
        (selector, registry)
    }

    fn quorum_selector() -> PrimarySelector {
        selector_with(SelectionMode::QuorumConfirmed).0
    }

    #[test]
    fn test_start_selection_installs_round_robin() {
        let (selector, _) = selector_with(SelectionMode::RoundRobin);
        let changes = selector.start_selection().unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].primary, name("Alpha"));
        assert_eq!(changes[1].primary, name("Beta"));
        assert!(!changes[0].quorum_confirmed);

        // Already installed instances are left alone.
        assert!(selector.start_selection().unwrap().is_empty());
    }

    #[test]
    fn test_view_change_rotates_primaries() {
        let (selector, _) = selector_with(SelectionMode::RoundRobin);
        selector.start_selection().unwrap();

        let changes = selector.on_view_changed(ViewNo(1)).unwrap();
        assert_eq!(changes.len(), 2);
        assert_eq!(changes[0].primary, name("Beta"));
        assert_eq!(changes[1].primary, name("Gamma"));
        assert_eq!(selector.previous_master_primary(), Some(name("Alpha")));
        assert_eq!(selector.view_no(), ViewNo(1));
    }

    #[test]
    fn test_stale_view_change_rejected() {
        let (selector, _) = selector_with(SelectionMode::RoundRobin);
        selector.start_selection().unwrap();
        selector.on_view_changed(ViewNo(2)).unwrap();
        let before = selector.primary_of(InstanceId::MASTER).unwrap();

        for stale in [ViewNo(2), ViewNo(1)] {
            let err = selector.on_view_changed(stale).unwrap_err();
            assert!(matches!(err, SelectionError::StaleViewChange { .. }));
        }
        assert_eq!(selector.view_no(), ViewNo(2));
        assert_eq!(selector.primary_of(InstanceId::MASTER).unwrap(), before);
    }

    #[test]
    fn test_master_fallback_never_repeats() {
        let (selector, registry) = selector_with(SelectionMode::RoundRobin);
        selector.start_selection().unwrap();
        for other in ["Beta", "Gamma", "Delta"] {
            registry.mark_unreachable(&name(other));
        }
        let changes = selector.on_view_changed(ViewNo(4)).unwrap();
        // Rank 0 is Alpha again, but Alpha led the master in view 0.
        assert_ne!(changes[0].primary, name("Alpha"));
    }

    #[test]
    fn test_quorum_installs_primary() {
        let selector = quorum_selector();
        let outcome = selector
            .record_declaration(InstanceId(1), ViewNo(0), &name("Alpha"), &name("Gamma"))
            .unwrap();
        assert_eq!(outcome, DeclarationOutcome::Recorded { declarations: 1 });
        selector
            .record_declaration(InstanceId(1), ViewNo(0), &name("Beta"), &name("Gamma"))
            .unwrap();
        let outcome = selector
            .record_declaration(InstanceId(1), ViewNo(0), &name("Gamma"), &name("Gamma"))
            .unwrap();

        match outcome {
            DeclarationOutcome::PrimaryInstalled(changed) => {
                assert_eq!(changed.primary, name("Gamma"));
                assert!(changed.quorum_confirmed);
            }
            other => panic!("expected installation, got {other:?}"),
        }
        let record = selector.primary_of(InstanceId(1)).unwrap().unwrap();
        assert_eq!(record.source, PrimarySource::Quorum);
        assert!(selector.primary_of(InstanceId::MASTER).unwrap().is_none());
    }

    #[test]
    fn test_already_decided_ignored() {
        let selector = quorum_selector();
        for sender in &NODES[..3] {
            selector
                .record_declaration(InstanceId(0), ViewNo(0), &name(sender), &name("Beta"))
                .unwrap();
        }
        let err = selector
            .record_declaration(InstanceId(0), ViewNo(0), &name("Delta"), &name("Delta"))
            .unwrap_err();
        assert!(matches!(err, SelectionError::AlreadyDecided { .. }));
        assert_eq!(
            selector.primary_of(InstanceId(0)).unwrap().unwrap().name,
            name("Beta")
        );
    }

    #[test]
    fn test_duplicate_declaration_counted_not_tallied() {
        let selector = quorum_selector();
        let alpha = name("Alpha");
        selector
            .record_declaration(InstanceId(0), ViewNo(0), &alpha, &name("Beta"))
            .unwrap();
        let err = selector
            .record_declaration(InstanceId(0), ViewNo(0), &alpha, &name("Beta"))
            .unwrap_err();
        assert!(matches!(err, SelectionError::DuplicateDeclaration { .. }));
        assert_eq!(selector.duplicate_count(InstanceId(0), &alpha), 1);

        let outcome = selector
            .record_declaration(InstanceId(0), ViewNo(0), &name("Gamma"), &name("Beta"))
            .unwrap();
        assert_eq!(outcome, DeclarationOutcome::Recorded { declarations: 2 });
    }

    #[test]
    fn test_anti_repeat_for_master() {
        let selector = quorum_selector();
        selector.start_selection().unwrap();
        selector.on_view_changed(ViewNo(1)).unwrap();
        assert_eq!(selector.previous_master_primary(), Some(name("Alpha")));

        let err = selector
            .record_declaration(InstanceId(0), ViewNo(1), &name("Beta"), &name("Alpha"))
            .unwrap_err();
        assert!(matches!(err, SelectionError::AntiRepeat { .. }));

        // Backups may keep the same node.
        assert!(selector
            .record_declaration(InstanceId(1), ViewNo(1), &name("Beta"), &name("Alpha"))
            .is_ok());
    }

    #[test]
    fn test_quorum_mode_leaves_instances_without_primary() {
        let selector = quorum_selector();
        selector.start_selection().unwrap();
        let changes = selector.on_view_changed(ViewNo(1)).unwrap();
        assert!(changes.is_empty());
        assert!(selector.primary_of(InstanceId(0)).unwrap().is_none());
        assert!(selector.pending_sync_messages().is_empty());
    }

    #[test]
    fn test_stale_and_far_future_views_rejected() {
        let selector = quorum_selector();
        selector.on_view_changed(ViewNo(3)).unwrap();
        assert!(matches!(
            selector.record_declaration(InstanceId(0), ViewNo(2), &name("Alpha"), &name("Beta")),
            Err(SelectionError::StaleView { .. })
        ));
        assert!(matches!(
            selector.record_declaration(InstanceId(0), ViewNo(6), &name("Alpha"), &name("Beta")),
            Err(SelectionError::ViewTooFarAhead { .. })
        ));
    }

    #[test]
    fn test_unknown_candidate_and_instance_rejected() {
        let selector = quorum_selector();
        assert!(matches!(
            selector.record_declaration(InstanceId(0), ViewNo(0), &name("Alpha"), &name("Mallory")),
            Err(SelectionError::UnknownCandidate { .. })
        ));
        assert!(matches!(
            selector.record_declaration(InstanceId(5), ViewNo(0), &name("Alpha"), &name("Beta")),
            Err(SelectionError::Instance(_))
        ));
    }

    #[test]
    fn test_buffered_quorum_installed_on_view_change() {
        let selector = quorum_selector();
        for sender in &NODES[..3] {
            let outcome = selector
                .record_declaration(InstanceId(1), ViewNo(1), &name(sender), &name("Delta"))
                .unwrap();
            assert_eq!(outcome, DeclarationOutcome::Buffered { view_no: ViewNo(1) });
        }
        assert!(selector.primary_of(InstanceId(1)).unwrap().is_none());

        let changes = selector.on_view_changed(ViewNo(1)).unwrap();
        assert_eq!(changes.len(), 1);
        assert_eq!(changes[0].instance_id, InstanceId(1));
        assert_eq!(changes[0].primary, name("Delta"));
    }

    #[test]
    fn test_buffered_quorum_beats_fallback_in_round_robin_mode() {
        let (selector, _) = selector_with(SelectionMode::RoundRobin);
        selector.start_selection().unwrap();
        for sender in &NODES[..3] {
            selector
                .record_declaration(InstanceId(0), ViewNo(1), &name(sender), &name("Delta"))
                .unwrap();
        }
        let changes = selector.on_view_changed(ViewNo(1)).unwrap();
        let master = changes.iter().find(|c| c.instance_id.is_master()).unwrap();
        assert_eq!(master.primary, name("Delta"));
        assert!(master.quorum_confirmed);
        // Instance 1 still gets its fallback.
        assert_eq!(changes.len(), 2);
    }

    #[test]
    fn test_view_change_drops_tallies() {
        let selector = quorum_selector();
        selector.on_view_changed(ViewNo(1)).unwrap();
        for sender in &NODES[..2] {
            selector
                .record_declaration(InstanceId(1), ViewNo(1), &name(sender), &name("Gamma"))
                .unwrap();
        }
        selector.on_view_changed(ViewNo(2)).unwrap();
        let outcome = selector
            .record_declaration(InstanceId(1), ViewNo(2), &name("Gamma"), &name("Gamma"))
            .unwrap();
        assert_eq!(outcome, DeclarationOutcome::Recorded { declarations: 1 });
    }

    #[test]
    fn test_pending_sync_messages() {
        let selector = quorum_selector();
        selector.start_selection().unwrap();
        selector.on_view_changed(ViewNo(1)).unwrap();
        for sender in &NODES[..3] {
            let msg = ViewChangeDone {
                candidate_primary_name: name("Gamma"),
                instance_id: InstanceId(0),
                view_no: ViewNo(1),
                proof: Some(vec![7]),
            };
            selector.process_view_change_done(&msg, &name(sender)).unwrap();
        }

        let messages = selector.pending_sync_messages();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].candidate_primary_name, name("Gamma"));
        assert_eq!(messages[0].proof, Some(vec![7]));

        // Round robin installs get a synthesized announcement.
        let (rr, _) = selector_with(SelectionMode::RoundRobin);
        rr.start_selection().unwrap();
        let messages = rr.pending_sync_messages();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[1].candidate_primary_name, name("Beta"));
        assert_eq!(messages[1].view_no, ViewNo(0));
        assert_eq!(messages[1].proof, None);
    }

    #[test]
    fn test_quorum_safety_under_shuffled_arrival() {
        let mut rng = rand::thread_rng();
        for _ in 0..50 {
            let selector = quorum_selector();
            let mut declarations: Vec<(&str, &str)> = vec![
                ("Alpha", "Gamma"),
                ("Beta", "Gamma"),
                ("Gamma", "Gamma"),
                ("Delta", "Beta"),
            ];
            declarations.shuffle(&mut rng);

            let mut installed = Vec::new();
            for (sender, candidate) in declarations {
                if let Ok(DeclarationOutcome::PrimaryInstalled(changed)) = selector
                    .record_declaration(InstanceId(1), ViewNo(0), &name(sender), &name(candidate))
                {
                    installed.push(changed.primary);
                }
            }
            assert_eq!(installed, vec![name("Gamma")]);
        }
    }

    #[test]
    fn test_decider_trait_dispatch() {
        let (selector, _) = selector_with(SelectionMode::RoundRobin);
        let decider: &dyn PrimaryDecider = &selector;
        assert_eq!(decider.decide_primaries().unwrap().len(), 2);
        assert_eq!(decider.handle_view_change(ViewNo(1)).unwrap().len(), 2);
        assert_eq!(decider.sync_lagging_node().len(), 2);
        assert_eq!(decider.view_no(), ViewNo(1));
    }

    #[test]
    fn test_empty_registry_rejected() {
        let registry = Arc::new(StaticNodeRegistry::new(Vec::<String>::new()));
        let result = PrimarySelector::new(
            SelectorConfig::default(),
            registry,
            Arc::new(SuspicionCounters::new()),
        );
        assert!(matches!(result, Err(SelectionError::EmptyRegistry)));
    }
}
