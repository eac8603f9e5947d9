use cadence_jobs::{AsyncJobQueue, WorkerThreadPool};
use criterion::{criterion_group, criterion_main, Criterion};
use std::hint::black_box;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

const JOBS: usize = 1_000;

fn bench_dispatch(c: &mut Criterion) {
    let workers = std::thread::available_parallelism()
        .map(|n| n.get())
        .unwrap_or(4);
    let pool = WorkerThreadPool::new(workers).unwrap();
    let queue = AsyncJobQueue::new(workers).unwrap();
    let counter = Arc::new(AtomicUsize::new(0));

    let mut group = c.benchmark_group("Job Dispatch");

    group.bench_function("WorkerThreadPool push + wait_all", |b| {
        b.iter(|| {
            for _ in 0..JOBS {
                let counter = counter.clone();
                pool.push_job(move || {
                    black_box(counter.fetch_add(1, Ordering::Relaxed));
                });
            }
            assert!(pool.wait_all(Duration::from_secs(30)));
        });
    });

    group.bench_function("AsyncJobQueue push + wait_all", |b| {
        b.iter(|| {
            for _ in 0..JOBS {
                let counter = counter.clone();
                queue.push_job(move || {
                    black_box(counter.fetch_add(1, Ordering::Relaxed));
                });
            }
            assert!(queue.wait_all(Duration::from_secs(30)));
        });
    });

    group.finish();
}

criterion_group!(benches, bench_dispatch);
criterion_main!(benches);
