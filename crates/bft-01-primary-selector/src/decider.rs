//! Pure round-robin decider
//!
//! Computes primaries from the registry and view number alone. Holds no
//! tallies, so every node with the same pool derives the same answer
//! without exchanging messages.

use crate::domain::compute_fallback_primary;
use crate::error::{SelectionError, SelectionResult};
use crate::events::PrimaryChanged;
use crate::ports::{NodeRegistry, PrimaryDecider};
use parking_lot::RwLock;
use shared_types::{InstanceId, ViewChangeDone, ViewNo};
use std::sync::Arc;
use tracing::info;

pub struct RoundRobinDecider {
    registry: Arc<dyn NodeRegistry>,
    instance_count: usize,
    view_no: RwLock<ViewNo>,
}

impl RoundRobinDecider {
    pub fn new(registry: Arc<dyn NodeRegistry>, instance_count: usize) -> Self {
        Self {
            registry,
            instance_count,
            view_no: RwLock::new(ViewNo::default()),
        }
    }

    fn primaries_at(&self, view_no: ViewNo) -> SelectionResult<Vec<PrimaryChanged>> {
        (0..self.instance_count)
            .map(|index| {
                let instance_id = InstanceId(index as u32);
                let primary =
                    compute_fallback_primary(instance_id, view_no, self.registry.as_ref())
                        .ok_or(SelectionError::EmptyRegistry)?;
                Ok(PrimaryChanged {
                    instance_id,
                    view_no,
                    primary,
                    quorum_confirmed: false,
                })
            })
            .collect()
    }
}

impl PrimaryDecider for RoundRobinDecider {
    fn handle_view_change(&self, view_no: ViewNo) -> SelectionResult<Vec<PrimaryChanged>> {
        let mut current = self.view_no.write();
        if view_no <= *current {
            return Err(SelectionError::StaleViewChange {
                requested: view_no,
                current: *current,
            });
        }
        let primaries = self.primaries_at(view_no)?;
        info!(from = %*current, to = %view_no, "Round robin view change");
        *current = view_no;
        Ok(primaries)
    }

    fn decide_primaries(&self) -> SelectionResult<Vec<PrimaryChanged>> {
        self.primaries_at(*self.view_no.read())
    }

    fn sync_lagging_node(&self) -> Vec<ViewChangeDone> {
        self.decide_primaries()
            .unwrap_or_default()
            .into_iter()
            .map(|changed| ViewChangeDone {
                candidate_primary_name: changed.primary,
                instance_id: changed.instance_id,
                view_no: changed.view_no,
                proof: None,
            })
            .collect()
    }

    fn view_no(&self) -> ViewNo {
        *self.view_no.read()
    }
}
