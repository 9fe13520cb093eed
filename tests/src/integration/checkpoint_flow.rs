//! # Checkpoint Flows
//!
//! Windows of `chk_freq = 5` inside a watermark window of `log_size = 15`,
//! stabilized by digest votes exchanged between the four replicas.

#[cfg(test)]
mod tests {
    use bft_02_checkpoints::{CheckpointApi, CheckpointKey};
    use bft_03_catchup::LedgerGateway;
    use shared_bus::{EventFilter, EventTopic, ReplicaEvent};
    use shared_types::{DigestVote, InstanceId, NodeName, ReplicaMessage};

    use crate::harness::Pool;

    const MASTER: InstanceId = InstanceId::MASTER;

    fn watermarks(pool: &Pool, name: &str, instance_id: InstanceId) -> (u64, u64) {
        let window = pool[name]
            .node
            .subsystems()
            .checkpoints
            .watermarks(instance_id)
            .unwrap();
        (window.low(), window.high())
    }

    #[tokio::test]
    async fn test_catchup_then_checkpoint_stabilization() {
        let pool = Pool::new().unwrap();
        for peer in ["Beta", "Gamma", "Delta"] {
            pool.preload(peer, MASTER, 2).unwrap();
        }

        // Catch up to seq_no 2 with no checkpoints.
        pool["Alpha"].node.start_catchup(MASTER).await.unwrap();
        pool.deliver_all().await;
        let alpha = &pool["Alpha"].node;
        assert!(!alpha.is_catching_up(MASTER).await);
        assert_eq!(watermarks(&pool, "Alpha", MASTER), (2, 17));
        assert!(alpha.subsystems().checkpoints.checkpoints_for(MASTER).unwrap().is_empty());

        // Order 3..=9 locally.
        for _ in 3..=9 {
            pool.order_next("Alpha", MASTER).await.unwrap();
        }
        let checkpoints = alpha.subsystems().checkpoints.checkpoints_for(MASTER).unwrap();
        assert_eq!(checkpoints.len(), 2);
        assert_eq!(checkpoints[0].key, CheckpointKey::new(3, 5));
        assert_eq!(checkpoints[0].highest_seq_no_seen, 5);
        assert!(checkpoints[0].digest.is_none());
        assert!(!checkpoints[0].is_stable);
        assert_eq!(checkpoints[1].key, CheckpointKey::new(6, 10));
        assert_eq!(checkpoints[1].highest_seq_no_seen, 9);
        assert!(checkpoints[1].digest.is_none());
        assert!(!checkpoints[1].is_stable);
        assert_eq!(watermarks(&pool, "Alpha", MASTER), (2, 17));

        // seq_no 10 completes (6, 10); two peers agree on its digest.
        pool.order_next("Alpha", MASTER).await.unwrap();
        pool["Alpha"].transport.drain();
        for peer in ["Beta", "Gamma"] {
            pool.preload(peer, MASTER, 10).unwrap();
            let digest = pool[peer].ledger.root_at(MASTER, 10).unwrap();
            let vote = ReplicaMessage::DigestVote(DigestVote {
                instance_id: MASTER,
                first_seq_no: 6,
                last_seq_no: 10,
                digest,
            });
            alpha.handle_message(&NodeName::new(peer), vote).await.unwrap();
        }

        let checkpoints = alpha.subsystems().checkpoints.checkpoints_for(MASTER).unwrap();
        assert_eq!(checkpoints.len(), 1);
        assert_eq!(checkpoints[0].key, CheckpointKey::new(6, 10));
        assert!(checkpoints[0].digest.is_some());
        assert!(checkpoints[0].is_stable);
        assert_eq!(watermarks(&pool, "Alpha", MASTER), (10, 25));
    }

    #[tokio::test]
    async fn test_pool_stabilizes_and_prunes() {
        let pool = Pool::new().unwrap();
        let mut stabilized = pool["Delta"]
            .node
            .event_bus()
            .subscribe(EventFilter::topics(vec![EventTopic::Checkpoints]));

        let mut previous_low = 0;
        for last in 1..=12 {
            pool.order_all_until(MASTER, last).await.unwrap();
            for n in pool.nodes() {
                let (low, high) = watermarks(&pool, n.node.name().as_str(), MASTER);
                assert!(low >= previous_low);
                assert_eq!(high, low + 15);
            }
            previous_low = watermarks(&pool, "Alpha", MASTER).0;
        }

        for n in pool.nodes() {
            assert_eq!(watermarks(&pool, n.node.name().as_str(), MASTER), (10, 25));
            let remaining = n.node.subsystems().checkpoints.checkpoints_for(MASTER).unwrap();
            assert!(remaining.iter().all(|c| c.key.last_seq_no > 10));
            assert_eq!(remaining.len(), 1);
        }

        let windows: Vec<u64> = stabilized
            .drain()
            .into_iter()
            .filter_map(|event| match event {
                ReplicaEvent::CheckpointStabilized { last_seq_no, .. } => Some(last_seq_no),
                _ => None,
            })
            .collect();
        assert_eq!(windows, vec![5, 10]);
    }

    #[tokio::test]
    async fn test_instances_checkpoint_independently() {
        let pool = Pool::new().unwrap();
        pool.order_all_until(InstanceId(1), 5).await.unwrap();

        for n in pool.nodes() {
            let name = n.node.name().as_str();
            assert_eq!(watermarks(&pool, name, InstanceId(1)), (5, 20));
            assert_eq!(watermarks(&pool, name, MASTER), (0, 15));
        }
    }

    #[tokio::test]
    async fn test_conflicting_digest_does_not_stabilize() {
        let pool = Pool::new().unwrap();
        for _ in 1..=5 {
            pool.order_next("Alpha", MASTER).await.unwrap();
        }
        let alpha = &pool["Alpha"].node;
        for (peer, byte) in [("Beta", 1u8), ("Gamma", 2u8), ("Delta", 3u8)] {
            let vote = ReplicaMessage::DigestVote(DigestVote {
                instance_id: MASTER,
                first_seq_no: 1,
                last_seq_no: 5,
                digest: [byte; 32],
            });
            alpha.handle_message(&NodeName::new(peer), vote).await.unwrap();
        }
        assert_eq!(watermarks(&pool, "Alpha", MASTER), (0, 15));
    }
}
