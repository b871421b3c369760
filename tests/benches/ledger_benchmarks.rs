//! # Plasma Child-Chain Benchmarks
//!
//! | Component | Operation | Note |
//! |-----------|-----------|------|
//! | pc-01 Codec | encode / decode / sign / recover | per transaction |
//! | pc-02 Merkle | build, prove, verify at depth 16 | sparse storage |
//! | pc-03 Ledger | apply_transaction, submit_block | single writer |
//! | pc-04 Validator | validate_exit | cold and cached trees |

use criterion::{
    black_box, criterion_group, criterion_main, BatchSize, BenchmarkId, Criterion, Throughput,
};
use pc_01_transaction_codec::{keccak256, Slot, Transaction};
use pc_02_fixed_merkle::FixedMerkleTree;
use pc_03_utxo_ledger::{ChildChainApi, LedgerReader};
use pc_04_exit_validator::{ExitClaim, ExitValidator, ValidatorConfig};
use pc_tests::fixtures::{signed_transfer, Account, TestChain};
use shared_types::{Hash, UtxoPosition, U256};
use std::sync::Arc;
use std::time::Duration;

// ============================================================================
// PC-01: Transaction Codec
// ============================================================================

fn bench_codec(c: &mut Criterion) {
    let mut group = c.benchmark_group("pc-01-transaction-codec");

    let alice = Account::random();
    let input = UtxoPosition::new(1000, 3, 1).unwrap();
    let tx = signed_transfer(input, [7u8; 20], 100, &alice.key);
    let wire = tx.encode();

    group.bench_function("encode_unsigned", |b| {
        b.iter(|| black_box(tx.encode_unsigned()))
    });
    group.bench_function("decode_signed", |b| {
        b.iter(|| black_box(Transaction::decode(&wire).unwrap()))
    });
    group.bench_function("sign", |b| {
        b.iter_batched(
            || Transaction::transfer(input, [7u8; 20], 100u64),
            |mut tx| {
                tx.sign(Slot::First, &alice.key).unwrap();
                tx
            },
            BatchSize::SmallInput,
        )
    });
    group.bench_function("recover_sender", |b| {
        b.iter(|| black_box(tx.sender(Slot::First).unwrap()))
    });

    group.finish();
}

// ============================================================================
// PC-02: Fixed-Depth Merkle Tree
// ============================================================================

fn leaves(count: usize) -> Vec<Hash> {
    (0..count as u64)
        .map(|i| keccak256(&i.to_be_bytes()))
        .collect()
}

fn bench_merkle(c: &mut Criterion) {
    let mut group = c.benchmark_group("pc-02-fixed-merkle");

    for count in [1usize, 100, 1_000, 10_000] {
        let data = leaves(count);
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(BenchmarkId::new("build_depth_16", count), &data, |b, data| {
            b.iter(|| black_box(FixedMerkleTree::new(16, data.clone()).unwrap().root()))
        });
    }

    let data = leaves(1_000);
    let tree = FixedMerkleTree::new(16, data.clone()).unwrap();
    let root = tree.root();
    let proof = tree.proof_at(500).unwrap();

    group.bench_function("proof_at", |b| {
        b.iter(|| black_box(tree.proof_at(500).unwrap()))
    });
    group.bench_function("verify", |b| {
        b.iter(|| black_box(proof.verify(&data[500], &root)))
    });

    group.finish();
}

// ============================================================================
// PC-03: UTXO Ledger
// ============================================================================

struct Loaded {
    net: TestChain,
    txs: Vec<Transaction>,
}

fn loaded_chain(count: usize) -> Loaded {
    let net = TestChain::new();
    let alice = Account::random();
    let txs = (0..count)
        .map(|_| {
            let deposit = net.deposit(alice.address, 10);
            signed_transfer(deposit, alice.address, 10, &alice.key)
        })
        .collect();
    Loaded { net, txs }
}

fn bench_ledger(c: &mut Criterion) {
    let mut group = c.benchmark_group("pc-03-utxo-ledger");
    group.measurement_time(Duration::from_secs(10));

    for count in [10usize, 100, 500] {
        group.throughput(Throughput::Elements(count as u64));
        group.bench_with_input(
            BenchmarkId::new("apply_transaction", count),
            &count,
            |b, &count| {
                b.iter_batched(
                    || loaded_chain(count),
                    |loaded| {
                        for tx in loaded.txs {
                            loaded.net.chain.apply_transaction(tx).unwrap();
                        }
                    },
                    BatchSize::LargeInput,
                )
            },
        );

        group.bench_with_input(BenchmarkId::new("submit_block", count), &count, |b, &count| {
            b.iter_batched(
                || {
                    let loaded = loaded_chain(count);
                    for tx in loaded.txs.iter().cloned() {
                        loaded.net.chain.apply_transaction(tx).unwrap();
                    }
                    loaded.net
                },
                |net| black_box(net.submit()),
                BatchSize::LargeInput,
            )
        });
    }

    group.finish();
}

// ============================================================================
// PC-04: Exit Validator
// ============================================================================

fn bench_validator(c: &mut Criterion) {
    let mut group = c.benchmark_group("pc-04-exit-validator");

    let loaded = loaded_chain(200);
    let mut positions = Vec::new();
    for tx in loaded.txs.iter().cloned() {
        positions.push(loaded.net.chain.apply_transaction(tx).unwrap());
    }
    loaded.net.submit();
    let owner = loaded.net.chain.utxo(&positions[0]).unwrap().owner;
    let claim = ExitClaim {
        utxo_pos: positions[100],
        owner,
        amount: U256::from(10u64),
    };

    group.bench_function("validate_exit_cold", |b| {
        b.iter_batched(
            || ExitValidator::new(Arc::clone(&loaded.net.chain), ValidatorConfig::default()),
            |validator| black_box(validator.validate_exit(&claim).unwrap()),
            BatchSize::SmallInput,
        )
    });

    let warm = ExitValidator::new(Arc::clone(&loaded.net.chain), ValidatorConfig::default());
    warm.validate_exit(&claim).unwrap();
    group.bench_function("validate_exit_cached", |b| {
        b.iter(|| black_box(warm.validate_exit(&claim).unwrap()))
    });

    group.finish();
}

criterion_group!(
    benches,
    bench_codec,
    bench_merkle,
    bench_ledger,
    bench_validator
);
criterion_main!(benches);
