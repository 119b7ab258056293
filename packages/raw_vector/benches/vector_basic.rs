//! Basic benchmarks for the `raw_vector` crate.
#![allow(
    missing_docs,
    reason = "No need for API documentation in benchmark code"
)]

use std::hint::black_box;
use std::iter;
use std::time::Instant;

use alloc_tracker::Allocator;
use criterion::{Criterion, criterion_group, criterion_main};
use raw_vector::Vector;

criterion_group!(benches, entrypoint);
criterion_main!(benches);

#[global_allocator]
static ALLOCATOR: Allocator<std::alloc::System> = Allocator::system();

type TestItem = usize;
const TEST_VALUE: TestItem = 1024;

fn entrypoint(c: &mut Criterion) {
    let allocs = alloc_tracker::Session::new();

    let mut group = c.benchmark_group("vector_basic");

    let allocs_op = allocs.operation("build_empty");
    group.bench_function("build_empty", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(Vector::<TestItem>::new()));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("push_back_first");
    group.bench_function("push_back_first", |b| {
        b.iter_custom(|iters| {
            let mut vectors = iter::repeat_with(Vector::<TestItem>::new)
                .take(usize::try_from(iters).unwrap())
                .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for vector in &mut vectors {
                vector.push_back(black_box(TEST_VALUE));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("push_back_10k");
    group.bench_function("push_back_10k", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let mut vector = Vector::<TestItem>::new();

                for _ in 0..10_000 {
                    vector.push_back(black_box(TEST_VALUE));
                }

                drop(black_box(vector));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("push_back_10k_reserved");
    group.bench_function("push_back_10k_reserved", |b| {
        b.iter_custom(|iters| {
            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                let mut vector = Vector::<TestItem>::with_capacity(10_000);

                for _ in 0..10_000 {
                    vector.push_back(black_box(TEST_VALUE));
                }

                drop(black_box(vector));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("insert_front");
    group.bench_function("insert_front", |b| {
        b.iter_custom(|iters| {
            let mut vectors = iter::repeat_with(|| {
                let mut vector = Vector::<TestItem>::with_capacity(1_001);
                vector.extend(iter::repeat_n(TEST_VALUE, 1_000));
                vector
            })
            .take(usize::try_from(iters).unwrap())
            .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for vector in &mut vectors {
                _ = black_box(vector.insert(0, black_box(TEST_VALUE)));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("erase_front");
    group.bench_function("erase_front", |b| {
        b.iter_custom(|iters| {
            let mut vectors = iter::repeat_with(|| {
                iter::repeat_n(TEST_VALUE, 1_000).collect::<Vector<TestItem>>()
            })
            .take(usize::try_from(iters).unwrap())
            .collect::<Vec<_>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for vector in &mut vectors {
                _ = black_box(vector.erase(0));
            }

            start.elapsed()
        });
    });

    let allocs_op = allocs.operation("clone_1k");
    group.bench_function("clone_1k", |b| {
        b.iter_custom(|iters| {
            let vector = iter::repeat_n(TEST_VALUE, 1_000).collect::<Vector<TestItem>>();

            let _span = allocs_op.measure_thread().iterations(iters);

            let start = Instant::now();

            for _ in 0..iters {
                drop(black_box(vector.clone()));
            }

            start.elapsed()
        });
    });

    group.finish();

    allocs.print_to_stdout();
}
