//! Benchmarks for candidate selection and text preparation
//!
//! These benchmarks measure:
//! - Selection strategies over growing candidate pools
//! - Max-sum with exhaustive and greedy subset search
//! - Chunking and sentence splitting of long documents
//!
//! Run with: cargo bench --package kpx-core --bench selection_bench

use criterion::{black_box, criterion_group, criterion_main, BenchmarkId, Criterion, Throughput};
use kpx_core::{chunk, select, ScoreMetric, SelectionStrategy, SentenceSplitter};

const DIMENSION: usize = 384;

/// Deterministic pseudo-random vectors
fn vectors(count: usize, seed: u32) -> Vec<Vec<f32>> {
    (0..count)
        .map(|i| {
            (0..DIMENSION)
                .map(|d| {
                    let x = (i as u32 + 1)
                        .wrapping_mul(2_654_435_761)
                        .wrapping_add((d as u32).wrapping_mul(40_503))
                        .wrapping_add(seed);
                    ((x % 1000) as f32 / 1000.0) - 0.5
                })
                .collect()
        })
        .collect()
}

fn labels(count: usize) -> Vec<String> {
    (0..count).map(|i| format!("候補{}", i)).collect()
}

fn bench_strategies(c: &mut Criterion) {
    let mut group = c.benchmark_group("selection_strategies");
    let anchor = vectors(1, 7).remove(0);

    for size in [10, 50, 200] {
        let candidates = vectors(size, 0);
        let labels = labels(size);
        group.throughput(Throughput::Elements(size as u64));

        for (name, strategy) in [
            ("similarity", SelectionStrategy::Similarity),
            (
                "mmr",
                SelectionStrategy::Mmr {
                    diversity: 0.7,
                    floor: None,
                },
            ),
        ] {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |b, _| {
                b.iter(|| {
                    select(
                        black_box(&anchor),
                        black_box(&candidates),
                        &labels,
                        10,
                        strategy,
                        ScoreMetric::CosineSimilarity,
                    )
                    .unwrap()
                });
            });
        }
    }

    group.finish();
}

fn bench_max_sum(c: &mut Criterion) {
    let mut group = c.benchmark_group("max_sum");
    let anchor = vectors(1, 7).remove(0);
    let candidates = vectors(100, 0);
    let labels = labels(100);

    // 20 choose 5 is searched exhaustively, 40 choose 10 greedily
    for (nr_candidates, top_n) in [(20, 5), (40, 10)] {
        let strategy = SelectionStrategy::MaxSum {
            nr_candidates,
            floor: None,
        };
        group.bench_with_input(
            BenchmarkId::from_parameter(format!("{}_of_{}", top_n, nr_candidates)),
            &top_n,
            |b, &top_n| {
                b.iter(|| {
                    select(
                        black_box(&anchor),
                        black_box(&candidates),
                        &labels,
                        top_n,
                        strategy,
                        ScoreMetric::CosineSimilarity,
                    )
                    .unwrap()
                });
            },
        );
    }

    group.finish();
}

fn bench_text_preparation(c: &mut Criterion) {
    let mut group = c.benchmark_group("text_preparation");
    let paragraph = "東京は日本の首都である。経済の中心でもある。多くの企業が本社を置いている。\n";
    let document = paragraph.repeat(200);
    group.throughput(Throughput::Bytes(document.len() as u64));

    group.bench_function("chunk", |b| {
        b.iter(|| chunk(black_box(&document), 400));
    });

    let splitter = SentenceSplitter::new(10);
    group.bench_function("split", |b| {
        b.iter(|| splitter.split(black_box(&document)));
    });

    group.finish();
}

criterion_group!(benches, bench_strategies, bench_max_sum, bench_text_preparation);
criterion_main!(benches);
