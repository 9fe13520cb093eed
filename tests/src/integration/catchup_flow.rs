//! # Catch-up Flows
//!
//! A replica that fell behind detects it from digest votes beyond its high
//! watermark, fetches the missing entries from its peers and resumes
//! checkpointing from the caught-up position.

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use bft_02_checkpoints::CheckpointApi;
    use bft_03_catchup::{CatchupApi, CatchupPhase, LedgerGateway};
    use shared_bus::{EventFilter, EventTopic, ReplicaEvent};
    use shared_types::{InstanceId, NodeName, ReplicaMessage, Suspicion};
    use tokio::time::Instant;

    use crate::harness::{Envelope, Pool};

    const MASTER: InstanceId = InstanceId::MASTER;
    const PEERS: [&str; 3] = ["Beta", "Gamma", "Delta"];

    fn watermarks(pool: &Pool, name: &str) -> (u64, u64) {
        let window = pool[name]
            .node
            .subsystems()
            .checkpoints
            .watermarks(MASTER)
            .unwrap();
        (window.low(), window.high())
    }

    /// Run the proof exchange so Alpha agrees on a target and has its entry
    /// requests queued.
    async fn agree_target(pool: &Pool) {
        pool["Alpha"].node.start_catchup(MASTER).await.unwrap();
        // Proof requests out, proofs back.
        for _ in 0..2 {
            let envelopes = pool.collect();
            pool.deliver(envelopes).await;
        }
        assert_eq!(
            pool["Alpha"]
                .node
                .subsystems()
                .catchup
                .phase(MASTER)
                .await
                .unwrap(),
            CatchupPhase::CollectingReplies
        );
    }

    /// Deliver Alpha's entry requests and return the peers' replies.
    async fn serve_requests(pool: &Pool) -> Vec<Envelope> {
        let requests = pool.collect();
        assert!(requests
            .iter()
            .all(|e| matches!(e.message, ReplicaMessage::CatchupRequest(_))));
        pool.deliver(requests).await;
        pool.collect()
    }

    #[tokio::test]
    async fn test_lagging_node_detects_and_catches_up() {
        let mut pool = Pool::new().unwrap();
        pool.disconnect("Alpha");
        pool.order_until(&PEERS, MASTER, 20).await.unwrap();
        for peer in PEERS {
            assert_eq!(watermarks(&pool, peer), (20, 35));
        }
        assert_eq!(watermarks(&pool, "Alpha"), (0, 15));

        pool.reconnect("Alpha");
        let mut events = pool["Alpha"]
            .node
            .event_bus()
            .subscribe(EventFilter::topics(vec![EventTopic::Catchup]));
        // Votes for (21, 25) land beyond Alpha's H = 15.
        pool.order_until(&PEERS, MASTER, 25).await.unwrap();

        let alpha = &pool["Alpha"];
        assert!(!alpha.node.is_catching_up(MASTER).await);
        assert_eq!(alpha.ledger.size(MASTER).unwrap(), 25);
        assert_eq!(
            alpha.ledger.root_at(MASTER, 25).unwrap(),
            pool["Beta"].ledger.root_at(MASTER, 25).unwrap()
        );
        assert_eq!(watermarks(&pool, "Alpha"), (25, 40));

        let published = events.drain();
        assert!(matches!(
            published.first(),
            Some(ReplicaEvent::CatchupStarted { from_seq_no: 0, .. })
        ));
        assert!(matches!(
            published.last(),
            Some(ReplicaEvent::CatchupCompleted { last_seq_no: 25, .. })
        ));

        // Alpha now orders and votes with everyone else.
        pool.order_all_until(MASTER, 30).await.unwrap();
        for n in pool.nodes() {
            assert_eq!(watermarks(&pool, n.node.name().as_str()), (30, 45));
        }
    }

    #[tokio::test]
    async fn test_quorum_past_local_log_hands_off_to_catchup() {
        let pool = Pool::new().unwrap();
        pool.order_all_until(MASTER, 7).await.unwrap();
        let mut events = pool["Alpha"]
            .node
            .event_bus()
            .subscribe(EventFilter::topics(vec![EventTopic::Catchup]));

        // Peers finish (6, 10) while Alpha stays at 7.
        pool.order_until(&PEERS, MASTER, 10).await.unwrap();

        let alpha = &pool["Alpha"];
        assert!(!alpha.node.is_catching_up(MASTER).await);
        assert_eq!(alpha.ledger.size(MASTER).unwrap(), 10);
        assert_eq!(watermarks(&pool, "Alpha"), (10, 25));
        assert!(matches!(
            events.drain().last(),
            Some(ReplicaEvent::CatchupCompleted { last_seq_no: 10, .. })
        ));

        pool.order_all_until(MASTER, 15).await.unwrap();
        for n in pool.nodes() {
            assert_eq!(watermarks(&pool, n.node.name().as_str()), (15, 30));
        }
    }

    #[tokio::test]
    async fn test_catchup_resumes_after_timeout() {
        let pool = Pool::new().unwrap();
        for peer in PEERS {
            pool.preload(peer, MASTER, 8).unwrap();
        }
        let mut events = pool["Alpha"]
            .node
            .event_bus()
            .subscribe(EventFilter::topics(vec![EventTopic::Catchup]));

        agree_target(&pool).await;
        // Batches (1,3), (4,6), (7,8); only Beta answers in time.
        let replies: Vec<Envelope> = serve_requests(&pool)
            .await
            .into_iter()
            .filter(|e| e.from.as_str() == "Beta")
            .collect();
        assert_eq!(pool.deliver(replies).await.rejected, 0);

        let alpha = &pool["Alpha"];
        let aborted = alpha
            .node
            .tick(Instant::now() + Duration::from_secs(3600))
            .await;
        assert_eq!(aborted.len(), 1);
        assert_eq!(aborted[0].collected, 3);
        assert_eq!(alpha.ledger.size(MASTER).unwrap(), 3);

        let request = alpha.node.start_catchup(MASTER).await.unwrap();
        assert_eq!(request.start_seq_no, 3);
        pool.deliver_all().await;

        assert!(!alpha.node.is_catching_up(MASTER).await);
        assert_eq!(alpha.ledger.size(MASTER).unwrap(), 8);
        assert_eq!(watermarks(&pool, "Alpha"), (8, 23));

        let kinds: Vec<&str> = events
            .drain()
            .iter()
            .map(|event| match event {
                ReplicaEvent::CatchupStarted { .. } => "started",
                ReplicaEvent::CatchupAborted { .. } => "aborted",
                ReplicaEvent::CatchupCompleted { .. } => "completed",
                _ => "other",
            })
            .collect();
        assert_eq!(kinds, vec!["started", "aborted", "started", "completed"]);
    }

    #[tokio::test]
    async fn test_tampered_reply_rejected_and_counted() {
        let pool = Pool::new().unwrap();
        for peer in PEERS {
            pool.preload(peer, MASTER, 6).unwrap();
        }
        agree_target(&pool).await;
        let mut replies = serve_requests(&pool).await;
        assert_eq!(replies.len(), 3);

        let genuine = replies.remove(0);
        let mut tampered = genuine.clone();
        if let ReplicaMessage::CatchupReply(reply) = &mut tampered.message {
            reply.entries[0] = b"forged".to_vec();
        }
        let report = pool.deliver(vec![tampered]).await;
        assert_eq!(report.rejected, 1);

        let alpha = &pool["Alpha"].node;
        assert_eq!(
            alpha
                .subsystems()
                .suspicions
                .count(MASTER, &NodeName::new("Beta"), Suspicion::InvalidCatchupReply),
            1
        );
        assert!(alpha.is_catching_up(MASTER).await);

        let mut remaining = vec![genuine];
        remaining.extend(replies);
        assert_eq!(pool.deliver(remaining).await.rejected, 0);
        assert!(!alpha.is_catching_up(MASTER).await);
        assert_eq!(watermarks(&pool, "Alpha"), (6, 21));
    }

    #[tokio::test]
    async fn test_ordering_suppressed_while_catching_up() {
        let pool = Pool::new().unwrap();
        pool["Alpha"].node.start_catchup(MASTER).await.unwrap();

        assert_eq!(pool.order_next("Alpha", MASTER).await.unwrap(), None);
        let direct = pool["Alpha"]
            .node
            .on_ordered(MASTER, 1, [0u8; 32])
            .await
            .unwrap();
        assert!(direct.is_none());
        assert!(pool["Alpha"]
            .node
            .subsystems()
            .checkpoints
            .checkpoints_for(MASTER)
            .unwrap()
            .is_empty());

        // The backup instance keeps ordering.
        assert_eq!(pool.order_next("Alpha", InstanceId(1)).await.unwrap(), Some(1));
    }
}
