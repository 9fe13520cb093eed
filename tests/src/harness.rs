//! # Pool Harness
//!
//! Four replicas (`Alpha`, `Beta`, `Gamma`, `Delta`, so `f = 1`) wired
//! through [`InMemoryTransport`]s. Outbound messages stay queued until the
//! test delivers them, in order or shuffled, optionally cutting nodes off.

use std::collections::HashSet;
use std::ops::Index;
use std::sync::Arc;

use rand::seq::SliceRandom;
use rand::Rng;

use bft_03_catchup::{CatchupResult, InMemoryLedger, LedgerGateway};
use node_runtime::{Destination, InMemoryTransport, NodeConfig, NodeResult, ReplicaNode};
use shared_types::{InstanceId, NodeName, ReplicaMessage, SeqNo, ViewNo};

/// Node names in rank order.
pub const POOL: [&str; 4] = ["Alpha", "Beta", "Gamma", "Delta"];

/// Upper bound on delivery rounds before `deliver_all` gives up.
const MAX_ROUNDS: usize = 64;

/// Ledger entry `seq_no` of `instance_id`; identical on every node.
pub fn entry(instance_id: InstanceId, seq_no: SeqNo) -> Vec<u8> {
    format!("instance-{}-txn-{seq_no}", instance_id.0).into_bytes()
}

pub struct TestNode {
    pub node: ReplicaNode,
    pub transport: Arc<InMemoryTransport>,
    pub ledger: Arc<InMemoryLedger>,
}

/// One message in flight.
#[derive(Clone, Debug)]
pub struct Envelope {
    pub from: NodeName,
    pub to: NodeName,
    pub message: ReplicaMessage,
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct DeliveryReport {
    pub delivered: usize,
    pub rejected: usize,
}

impl DeliveryReport {
    fn absorb(&mut self, other: DeliveryReport) {
        self.delivered += other.delivered;
        self.rejected += other.rejected;
    }
}

pub struct Pool {
    nodes: Vec<TestNode>,
    disconnected: HashSet<NodeName>,
}

impl Pool {
    pub fn new() -> anyhow::Result<Self> {
        Self::with_config(|_| {})
    }

    /// Build the pool from `NodeConfig::for_testing`, adjusted by `configure`.
    pub fn with_config(configure: impl Fn(&mut NodeConfig)) -> anyhow::Result<Self> {
        let nodes = POOL
            .iter()
            .map(|name| {
                let mut config = NodeConfig::for_testing(name);
                configure(&mut config);
                let ledger = Arc::new(InMemoryLedger::new(config.instance_count));
                let transport = Arc::new(InMemoryTransport::new());
                let node = ReplicaNode::new(config, ledger.clone(), transport.clone())?;
                Ok(TestNode {
                    node,
                    transport,
                    ledger,
                })
            })
            .collect::<anyhow::Result<Vec<_>>>()?;
        Ok(Self {
            nodes,
            disconnected: HashSet::new(),
        })
    }

    pub fn nodes(&self) -> impl Iterator<Item = &TestNode> {
        self.nodes.iter()
    }

    pub fn connected(&self) -> impl Iterator<Item = &TestNode> {
        self.nodes
            .iter()
            .filter(|n| !self.disconnected.contains(n.node.name()))
    }

    pub async fn start_all(&self) -> NodeResult<()> {
        for n in &self.nodes {
            n.node.start().await?;
        }
        Ok(())
    }

    pub async fn view_change_all(&self, view_no: ViewNo) -> NodeResult<()> {
        for n in &self.nodes {
            n.node.on_view_change(view_no).await?;
        }
        Ok(())
    }

    /// Drop every message from or to `name` until reconnected.
    pub fn disconnect(&mut self, name: &str) {
        self.disconnected.insert(NodeName::new(name));
    }

    pub fn reconnect(&mut self, name: &str) {
        self.disconnected.remove(&NodeName::new(name));
    }

    /// Drain every outbox, expanding broadcasts into one envelope per peer.
    pub fn collect(&self) -> Vec<Envelope> {
        let mut envelopes = Vec::new();
        for n in &self.nodes {
            let from = n.node.name().clone();
            for (destination, message) in n.transport.drain() {
                let targets: Vec<NodeName> = match destination {
                    Destination::Peer(to) => vec![to],
                    Destination::AllPeers => n.node.peers(),
                };
                envelopes.extend(targets.into_iter().map(|to| Envelope {
                    from: from.clone(),
                    to,
                    message: message.clone(),
                }));
            }
        }
        envelopes.retain(|e| {
            !self.disconnected.contains(&e.from) && !self.disconnected.contains(&e.to)
        });
        envelopes
    }

    /// Hand each envelope to its recipient, in the given order.
    pub async fn deliver(&self, envelopes: Vec<Envelope>) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for envelope in envelopes {
            let recipient = &self[envelope.to.as_str()];
            report.delivered += 1;
            if recipient
                .node
                .handle_message(&envelope.from, envelope.message)
                .await
                .is_err()
            {
                report.rejected += 1;
            }
        }
        report
    }

    /// Deliver until no node has anything left to send.
    pub async fn deliver_all(&self) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for _ in 0..MAX_ROUNDS {
            let envelopes = self.collect();
            if envelopes.is_empty() {
                break;
            }
            report.absorb(self.deliver(envelopes).await);
        }
        report
    }

    /// Like [`Pool::deliver_all`] with every round shuffled.
    pub async fn deliver_all_shuffled<R: Rng>(&self, rng: &mut R) -> DeliveryReport {
        let mut report = DeliveryReport::default();
        for _ in 0..MAX_ROUNDS {
            let mut envelopes = self.collect();
            if envelopes.is_empty() {
                break;
            }
            envelopes.shuffle(rng);
            report.absorb(self.deliver(envelopes).await);
        }
        report
    }

    /// Append entries `1..=count` to `name`'s ledger without ordering them.
    pub fn preload(&self, name: &str, instance_id: InstanceId, count: SeqNo) -> CatchupResult<()> {
        let ledger = &self[name].ledger;
        for seq_no in ledger.size(instance_id)? + 1..=count {
            ledger.append(instance_id, entry(instance_id, seq_no))?;
        }
        Ok(())
    }

    /// Apply the next entry on `name` and report it ordered, using the
    /// ledger root as the state digest.
    ///
    /// Returns `None` without touching the ledger while `name` catches up.
    pub async fn order_next(&self, name: &str, instance_id: InstanceId) -> NodeResult<Option<SeqNo>> {
        let n = &self[name];
        if n.node.is_catching_up(instance_id).await {
            return Ok(None);
        }
        let seq_no = n.ledger.size(instance_id)? + 1;
        n.ledger.append(instance_id, entry(instance_id, seq_no))?;
        let digest = n.ledger.root_at(instance_id, seq_no)?;
        n.node.on_ordered(instance_id, seq_no, digest).await?;
        Ok(Some(seq_no))
    }

    /// Order entries up to `last` on every connected node, delivering after
    /// each one.
    pub async fn order_all_until(&self, instance_id: InstanceId, last: SeqNo) -> NodeResult<()> {
        let names: Vec<String> = self
            .connected()
            .map(|n| n.node.name().to_string())
            .collect();
        let names: Vec<&str> = names.iter().map(String::as_str).collect();
        self.order_until(&names, instance_id, last).await
    }

    /// Order entries up to `last` on `names` only, delivering after each
    /// round.
    pub async fn order_until(
        &self,
        names: &[&str],
        instance_id: InstanceId,
        last: SeqNo,
    ) -> NodeResult<()> {
        loop {
            let mut progressed = false;
            for &name in names {
                if self[name].ledger.size(instance_id)? < last
                    && self.order_next(name, instance_id).await?.is_some()
                {
                    progressed = true;
                }
            }
            self.deliver_all().await;
            if !progressed {
                return Ok(());
            }
        }
    }
}

impl Index<&str> for Pool {
    type Output = TestNode;

    fn index(&self, name: &str) -> &TestNode {
        self.nodes
            .iter()
            .find(|n| n.node.name().as_str() == name)
            .unwrap_or_else(|| panic!("no node named {name}"))
    }
}
