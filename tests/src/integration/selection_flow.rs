//! # Primary Selection Flows
//!
//! Every replica of the pool must agree on one primary per instance and
//! view, whatever order the `ViewChangeDone` messages arrive in.

#[cfg(test)]
mod tests {
    use rand::rngs::StdRng;
    use rand::seq::SliceRandom;
    use rand::SeedableRng;

    use bft_01_primary_selector::SelectionMode;
    use shared_bus::{EventFilter, EventTopic, ReplicaEvent};
    use shared_types::{InstanceId, NodeName, ReplicaMessage, ViewChangeDone, ViewNo};

    use crate::harness::{Envelope, Pool, POOL};

    fn quorum_pool() -> Pool {
        Pool::with_config(|config| config.selector.mode = SelectionMode::QuorumConfirmed).unwrap()
    }

    /// Primary of `instance_id` on every node, in pool order.
    fn primaries(pool: &Pool, instance_id: InstanceId) -> Vec<Option<NodeName>> {
        pool.nodes()
            .map(|n| {
                n.node
                    .subsystems()
                    .selector
                    .primary_of(instance_id)
                    .unwrap()
                    .map(|record| record.name)
            })
            .collect()
    }

    fn agreed_primary(pool: &Pool, instance_id: InstanceId) -> NodeName {
        let all = primaries(pool, instance_id);
        let first = all[0].clone().expect("primary installed");
        assert!(
            all.iter().all(|p| p.as_ref() == Some(&first)),
            "nodes disagree on {instance_id}: {all:?}"
        );
        first
    }

    // =========================================================================
    // ROUND ROBIN
    // =========================================================================

    #[tokio::test]
    async fn test_round_robin_pool_agrees_across_views() {
        let pool = Pool::new().unwrap();
        pool.start_all().await.unwrap();
        let mut previous_master = agreed_primary(&pool, InstanceId::MASTER);
        assert_eq!(previous_master.as_str(), "Alpha");

        for view in 1..=6 {
            pool.view_change_all(ViewNo(view)).await.unwrap();
            let master = agreed_primary(&pool, InstanceId::MASTER);
            let backup = agreed_primary(&pool, InstanceId(1));
            assert_ne!(master, previous_master, "master repeated in view {view}");
            assert_ne!(master, backup);
            previous_master = master;
        }
        assert_eq!(pool.collect().len(), 0);
    }

    #[tokio::test]
    async fn test_unreachable_node_skipped_without_repeat() {
        let pool = Pool::new().unwrap();
        for n in pool.nodes() {
            n.node
                .subsystems()
                .registry
                .mark_unreachable(&NodeName::new("Beta"));
        }
        pool.start_all().await.unwrap();

        let mut masters = vec![agreed_primary(&pool, InstanceId::MASTER)];
        for view in 1..=3 {
            pool.view_change_all(ViewNo(view)).await.unwrap();
            masters.push(agreed_primary(&pool, InstanceId::MASTER));
        }
        let names: Vec<&str> = masters.iter().map(|m| m.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Gamma", "Delta", "Alpha"]);
    }

    // =========================================================================
    // QUORUM CONFIRMED
    // =========================================================================

    #[tokio::test]
    async fn test_quorum_safety_under_shuffled_arrival() {
        for seed in 0..16u64 {
            let pool = quorum_pool();
            pool.start_all().await.unwrap();
            let mut events = pool["Gamma"]
                .node
                .event_bus()
                .subscribe(EventFilter::topics(vec![EventTopic::PrimarySelection]));

            pool.view_change_all(ViewNo(1)).await.unwrap();

            // Delta also declares a conflicting master candidate.
            let mut envelopes = pool.collect();
            for to in POOL.iter().filter(|name| **name != "Delta") {
                envelopes.push(Envelope {
                    from: NodeName::new("Delta"),
                    to: NodeName::new(*to),
                    message: ReplicaMessage::ViewChangeDone(ViewChangeDone {
                        candidate_primary_name: NodeName::new("Gamma"),
                        instance_id: InstanceId::MASTER,
                        view_no: ViewNo(1),
                        proof: None,
                    }),
                });
            }
            let mut rng = StdRng::seed_from_u64(seed);
            envelopes.shuffle(&mut rng);
            pool.deliver(envelopes).await;
            pool.deliver_all_shuffled(&mut rng).await;

            let master = agreed_primary(&pool, InstanceId::MASTER);
            assert_eq!(master.as_str(), "Beta", "seed {seed}");
            assert_ne!(master.as_str(), "Alpha");
            agreed_primary(&pool, InstanceId(1));

            let mut installed: Vec<(InstanceId, ViewNo)> = events
                .drain()
                .into_iter()
                .filter_map(|event| match event {
                    ReplicaEvent::PrimaryChanged {
                        instance_id,
                        view_no,
                        quorum_confirmed: true,
                        ..
                    } => Some((instance_id, view_no)),
                    _ => None,
                })
                .collect();
            installed.sort_by_key(|(instance_id, _)| instance_id.0);
            assert_eq!(
                installed,
                vec![(InstanceId::MASTER, ViewNo(1)), (InstanceId(1), ViewNo(1))],
                "one install per instance, seed {seed}"
            );
        }
    }

    #[tokio::test]
    async fn test_lagging_node_synced_from_peers() {
        let mut pool = quorum_pool();
        pool.start_all().await.unwrap();
        pool.disconnect("Delta");
        pool.view_change_all(ViewNo(1)).await.unwrap();
        pool.deliver_all().await;

        assert!(primaries(&pool, InstanceId::MASTER)[3].is_none());
        let expected = primaries(&pool, InstanceId::MASTER)[0].clone();
        assert!(expected.is_some());

        pool.reconnect("Delta");
        let delta = NodeName::new("Delta");
        for name in ["Alpha", "Beta"] {
            assert_eq!(pool[name].node.sync_lagging_node(&delta).await, 2);
        }
        pool.deliver_all().await;

        for instance in [InstanceId::MASTER, InstanceId(1)] {
            agreed_primary(&pool, instance);
        }
        assert_eq!(primaries(&pool, InstanceId::MASTER)[3], expected);
    }

    #[tokio::test]
    async fn test_duplicate_declarations_counted() {
        let pool = quorum_pool();
        pool.start_all().await.unwrap();
        pool.view_change_all(ViewNo(1)).await.unwrap();
        // Deliver Beta's declarations to Alpha twice before anything else.
        let from_beta: Vec<Envelope> = pool
            .collect()
            .into_iter()
            .filter(|e| e.from.as_str() == "Beta" && e.to.as_str() == "Alpha")
            .collect();
        assert_eq!(from_beta.len(), 2);
        let first = pool.deliver(from_beta.clone()).await;
        let second = pool.deliver(from_beta).await;
        assert_eq!(first.rejected, 0);
        assert_eq!(second.rejected, 2);

        let alpha = &pool["Alpha"].node;
        assert_eq!(
            alpha
                .subsystems()
                .selector
                .duplicate_count(InstanceId::MASTER, &NodeName::new("Beta")),
            1
        );
    }
}
