//! # Replica Core Benchmarks
//!
//! | Area | Operation |
//! |------|-----------|
//! | bft-01 Primary Selector | round-robin selection, quorum tally |
//! | bft-02 Checkpoints | ordering a full watermark window |
//! | bft-03 Catch-up | consistency proof generation and verification |

use std::sync::Arc;

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};

use bft_01_primary_selector::domain::select_rank;
use bft_01_primary_selector::{
    PrimarySelector, SelectionMode, SelectorConfig, StaticNodeRegistry,
};
use bft_02_checkpoints::{CheckpointApi, CheckpointConfig, CheckpointKey, CheckpointStore};
use bft_03_catchup::domain::merkle::verify_consistency;
use bft_03_catchup::MerkleTree;
use shared_types::{InstanceId, NodeName, Quorums, SuspicionCounters, ViewNo};

fn pool_names(n: usize) -> Vec<String> {
    (0..n).map(|i| format!("Node{i}")).collect()
}

// ============================================================================
// BFT-01: Primary Selector
// ============================================================================

fn bench_round_robin(c: &mut Criterion) {
    let mut group = c.benchmark_group("bft-01-round-robin");
    for n in [4usize, 25, 100] {
        let registry = StaticNodeRegistry::new(pool_names(n));
        let previous = NodeName::new("Node1");
        group.bench_with_input(BenchmarkId::new("select_rank", n), &n, |b, _| {
            b.iter(|| {
                select_rank(
                    black_box(InstanceId::MASTER),
                    black_box(ViewNo(1)),
                    &registry,
                    Some(&previous),
                )
            })
        });
    }
    group.finish();
}

fn bench_quorum_tally(c: &mut Criterion) {
    let mut group = c.benchmark_group("bft-01-quorum");
    for n in [4usize, 25, 100] {
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("declarations_to_install", n), &n, |b, &n| {
            let names = pool_names(n);
            b.iter(|| {
                let registry = Arc::new(StaticNodeRegistry::new(names.clone()));
                let config = SelectorConfig {
                    instance_count: 1,
                    mode: SelectionMode::QuorumConfirmed,
                    ..SelectorConfig::default()
                };
                let selector =
                    PrimarySelector::new(config, registry, Arc::new(SuspicionCounters::new()))
                        .unwrap();
                let candidate = NodeName::new("Node2");
                for sender in &names {
                    let _ = selector.record_declaration(
                        InstanceId::MASTER,
                        ViewNo(0),
                        &NodeName::new(sender.as_str()),
                        &candidate,
                    );
                }
                black_box(selector.primary_of(InstanceId::MASTER).unwrap())
            })
        });
    }
    group.finish();
}

// ============================================================================
// BFT-02: Checkpoints
// ============================================================================

fn bench_checkpoint_window(c: &mut Criterion) {
    let mut group = c.benchmark_group("bft-02-checkpoints");
    let config = CheckpointConfig {
        instance_count: 1,
        chk_freq: 100,
        log_size: 300,
        ..CheckpointConfig::default()
    };
    group.throughput(Throughput::Elements(config.log_size));
    group.bench_function("order_and_stabilize_window", |b| {
        b.iter(|| {
            let store = CheckpointStore::new(
                config.clone(),
                Quorums::new(4),
                Arc::new(SuspicionCounters::new()),
            )
            .unwrap();
            for seq_no in 1..=config.log_size {
                store.advance(InstanceId::MASTER, seq_no).unwrap();
            }
            let key = CheckpointKey::new(1, 100);
            for sender in ["A", "B", "C"] {
                let _ = store.receive_digest_vote(
                    InstanceId::MASTER,
                    key,
                    &NodeName::new(sender),
                    [9u8; 32],
                );
            }
            black_box(store.watermarks(InstanceId::MASTER).unwrap())
        })
    });
    group.finish();
}

// ============================================================================
// BFT-03: Catch-up
// ============================================================================

fn bench_consistency_proofs(c: &mut Criterion) {
    let mut group = c.benchmark_group("bft-03-merkle");
    for size in [64u64, 1024, 16_384] {
        let mut tree = MerkleTree::new();
        for i in 0..size {
            tree.append_entry(format!("txn-{i}").as_bytes());
        }
        let first = size / 3;
        let proof = tree.consistency_proof(first, size).unwrap();
        let first_root = tree.root_at(first).unwrap();
        let second_root = tree.root();

        group.bench_with_input(BenchmarkId::new("generate", size), &size, |b, _| {
            b.iter(|| tree.consistency_proof(black_box(first), black_box(size)))
        });
        group.bench_with_input(BenchmarkId::new("verify", size), &size, |b, _| {
            b.iter(|| {
                verify_consistency(
                    black_box(first),
                    black_box(size),
                    &first_root,
                    &second_root,
                    &proof,
                )
            })
        });
    }
    group.finish();
}

criterion_group!(
    benches,
    bench_round_robin,
    bench_quorum_tally,
    bench_checkpoint_window,
    bench_consistency_proofs
);
criterion_main!(benches);
