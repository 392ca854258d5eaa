//! Benchmark for PersistentVector vs standard Vec.
//!
//! Compares the relaxed radix balanced vector against Rust's standard Vec for
//! appends, random access, interior inserts, slicing and iteration.

use criterion::{BenchmarkId, Criterion, criterion_group, criterion_main};
use rrb_vector::persistent::PersistentVector;
use std::hint::black_box;

// =============================================================================
// push_back Benchmark
// =============================================================================

fn benchmark_push_back(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("push_back");

    for size in [100, 1000, 10000] {
        group.bench_with_input(
            BenchmarkId::new("PersistentVector", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut vector = PersistentVector::new();
                    for index in 0..size {
                        vector = vector.push_back(black_box(index));
                    }
                    black_box(vector)
                });
            },
        );

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut vector = Vec::new();
                for index in 0..size {
                    vector.push(black_box(index));
                }
                black_box(vector)
            });
        });
    }

    group.finish();
}

// =============================================================================
// get Benchmark (Random Access)
// =============================================================================

fn benchmark_get(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("get");

    for size in [100, 1000, 10000] {
        let strict: PersistentVector<i32> = (0..size).collect();
        // Interior inserts turn most of the path into relaxed nodes
        let relaxed = (0..size).fold(PersistentVector::new(), |vector, element| {
            let index = (element as usize * 7) % (vector.len() + 1);
            vector.insert(index, element).unwrap()
        });
        let standard_vector: Vec<i32> = (0..size).collect();

        for (name, vector) in [("Strict", &strict), ("Relaxed", &relaxed)] {
            group.bench_with_input(BenchmarkId::new(name, size), &size, |bencher, &size| {
                bencher.iter(|| {
                    let mut sum = 0_i64;
                    for index in 0..size as usize {
                        if let Some(&value) = vector.get(black_box(index)) {
                            sum += i64::from(value);
                        }
                    }
                    black_box(sum)
                });
            });
        }

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, &size| {
            bencher.iter(|| {
                let mut sum = 0_i64;
                for index in 0..size as usize {
                    if let Some(&value) = standard_vector.get(black_box(index)) {
                        sum += i64::from(value);
                    }
                }
                black_box(sum)
            });
        });
    }

    group.finish();
}

// =============================================================================
// insert Benchmark
// =============================================================================

fn benchmark_insert_middle(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert_middle");

    for size in [1000, 10000, 100_000] {
        let persistent_vector: PersistentVector<i32> = (0..size).collect();
        let standard_vector: Vec<i32> = (0..size).collect();
        let middle = size as usize / 2;

        group.bench_with_input(
            BenchmarkId::new("PersistentVector", size),
            &middle,
            |bencher, &middle| {
                bencher.iter(|| black_box(persistent_vector.insert(black_box(middle), -1).unwrap()));
            },
        );

        group.bench_with_input(BenchmarkId::new("Vec", size), &middle, |bencher, &middle| {
            bencher.iter(|| {
                let mut copy = standard_vector.clone();
                copy.insert(black_box(middle), -1);
                black_box(copy)
            });
        });
    }

    group.finish();
}

fn benchmark_insert_run(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("insert_run");

    // Consecutive inserts at one position are absorbed by the focus window
    for run in [8, 32, 256] {
        let base: PersistentVector<i32> = (0..10000).collect();
        group.bench_with_input(BenchmarkId::new("PersistentVector", run), &run, |bencher, &run| {
            bencher.iter(|| {
                let mut vector = base.clone();
                for offset in 0..run {
                    vector = vector
                        .insert(black_box(5000 + offset), offset as i32)
                        .unwrap();
                }
                black_box(vector)
            });
        });
    }

    group.finish();
}

// =============================================================================
// update Benchmark
// =============================================================================

fn benchmark_update(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("update");

    for size in [100, 1000, 10000] {
        let persistent_vector: PersistentVector<i32> = (0..size).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentVector", size),
            &size,
            |bencher, &size| {
                bencher.iter(|| {
                    let mut vector = persistent_vector.clone();
                    for index in (0..size as usize).step_by(7) {
                        vector = vector.update(black_box(index), -1).unwrap();
                    }
                    black_box(vector)
                });
            },
        );
    }

    group.finish();
}

// =============================================================================
// Slicing Benchmark
// =============================================================================

fn benchmark_split_at(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("split_at");

    for size in [1000, 10000, 100_000] {
        let persistent_vector: PersistentVector<i32> = (0..size).collect();
        let cut = size as usize / 3;

        group.bench_with_input(
            BenchmarkId::new("PersistentVector", size),
            &cut,
            |bencher, &cut| {
                bencher.iter(|| black_box(persistent_vector.split_at(black_box(cut))));
            },
        );
    }

    group.finish();
}

// =============================================================================
// Iteration Benchmark
// =============================================================================

fn benchmark_iteration(criterion: &mut Criterion) {
    let mut group = criterion.benchmark_group("iteration");

    for size in [1000, 10000, 100_000] {
        let persistent_vector: PersistentVector<i64> = (0..size).collect();
        let standard_vector: Vec<i64> = (0..size).collect();

        group.bench_with_input(
            BenchmarkId::new("PersistentVector", size),
            &size,
            |bencher, _| {
                bencher.iter(|| black_box(persistent_vector.iter().sum::<i64>()));
            },
        );

        group.bench_with_input(BenchmarkId::new("Vec", size), &size, |bencher, _| {
            bencher.iter(|| black_box(standard_vector.iter().sum::<i64>()));
        });
    }

    group.finish();
}

// =============================================================================
// Criterion Group and Main
// =============================================================================

criterion_group!(
    benches,
    benchmark_push_back,
    benchmark_get,
    benchmark_insert_middle,
    benchmark_insert_run,
    benchmark_update,
    benchmark_split_at,
    benchmark_iteration
);

criterion_main!(benches);
