mod common;

use std::hint::black_box;

use criterion::{BenchmarkId, Criterion, Throughput, criterion_group, criterion_main};

use sheclust_core::{GroupingParams, IndexKind, identify_all_groups_with, partition_into_batches};

use common::{BenchTier, catalog};

const SEED: u64 = 0x5eed;

fn bench_grouping(c: &mut Criterion) {
    let tier = BenchTier::from_env();
    let mut group = c.benchmark_group("identify_all_groups");
    for &n in tier.sizes() {
        // Keep density fixed so the mean group size does not change with n.
        let width = (n as f64).sqrt() * 10.0;
        let (x, y) = catalog(SEED, n, width);
        group.throughput(Throughput::Elements(n as u64));
        for kind in [IndexKind::Cells, IndexKind::Packed, IndexKind::Dynamic] {
            let params = GroupingParams::new(3.0).with_index(kind);
            group.bench_with_input(BenchmarkId::new(format!("{kind:?}"), n), &n, |b, _| {
                b.iter(|| identify_all_groups_with(black_box(&x), black_box(&y), &params))
            });
        }
    }
    group.finish();
}

fn bench_batching(c: &mut Criterion) {
    let tier = BenchTier::from_env();
    let mut group = c.benchmark_group("partition_into_batches");
    for &n in tier.sizes() {
        let (x, y) = catalog(SEED, n, 1.0);
        group.throughput(Throughput::Elements(n as u64));
        group.bench_with_input(BenchmarkId::new("batchsize_20", n), &n, |b, _| {
            b.iter(|| partition_into_batches(black_box(&x), black_box(&y), None, Some(20)))
        });
    }
    group.finish();
}

criterion_group!(benches, bench_grouping, bench_batching);
criterion_main!(benches);
