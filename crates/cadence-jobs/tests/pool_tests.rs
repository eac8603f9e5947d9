// Copyright 2025 eraflo
//
// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License at
//
//     http://www.apache.org/licenses/LICENSE-2.0
//
// Unless required by applicable law or agreed to in writing, software
// distributed under the License is distributed on an "AS IS" BASIS,
// WITHOUT WARRANTIES OR CONDITIONS OF ANY KIND, either express or implied.
// See the License for the specific language governing permissions and
// limitations under the License.

use cadence_jobs::{JobSystemConfig, WorkerThreadPool};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Barrier, Mutex};
use std::thread;
use std::time::{Duration, Instant};

const LONG_WAIT: Duration = Duration::from_secs(30);

#[test]
fn test_five_long_jobs_report_outstanding_until_done() {
    // --- ARRANGE ---
    let pool = WorkerThreadPool::new(5).unwrap();
    let finished = Arc::new(AtomicUsize::new(0));

    // --- ACT ---
    for _ in 0..5 {
        let finished = finished.clone();
        pool.push_job(move || {
            thread::sleep(Duration::from_millis(100));
            finished.fetch_add(1, Ordering::SeqCst);
        });
    }

    // --- ASSERT ---
    assert!(!pool.is_empty(), "pool should report outstanding jobs");
    assert!(!pool.wait_all(Duration::from_millis(1)));

    assert!(pool.wait_all(LONG_WAIT));
    assert_eq!(finished.load(Ordering::SeqCst), 5);
    // Once drained the counter stays at zero until the next submission.
    assert!(pool.is_empty());
    assert_eq!(pool.idle_workers(), 5);
}

#[test]
fn test_more_jobs_than_workers_all_complete() {
    let pool = WorkerThreadPool::new(3).unwrap();
    let executed = Arc::new(AtomicUsize::new(0));

    for _ in 0..30 {
        let executed = executed.clone();
        pool.push_job(move || {
            thread::sleep(Duration::from_millis(2));
            executed.fetch_add(1, Ordering::SeqCst);
        });
    }

    assert!(pool.wait_all(LONG_WAIT));
    assert_eq!(executed.load(Ordering::SeqCst), 30);
}

#[test]
fn test_extra_push_waits_for_a_vacated_worker() {
    let pool = WorkerThreadPool::new(2).unwrap();
    let gate = Arc::new(Barrier::new(3));

    for _ in 0..2 {
        let gate = gate.clone();
        pool.push_job(move || {
            gate.wait();
            thread::sleep(Duration::from_millis(60));
        });
    }
    gate.wait(); // both workers are now busy
    assert_eq!(pool.idle_workers(), 0);

    let start = Instant::now();
    pool.push_job(|| {});
    let blocked_for = start.elapsed();

    assert!(
        blocked_for >= Duration::from_millis(40),
        "push should block until a worker frees, blocked for {blocked_for:?}"
    );
    assert!(pool.wait_all(LONG_WAIT));
}

#[test]
fn test_wait_all_observes_jobs_pushed_during_the_wait() {
    // --- ARRANGE ---
    let pool = Arc::new(WorkerThreadPool::new(2).unwrap());
    let executed = Arc::new(AtomicUsize::new(0));
    let release = Arc::new(Barrier::new(2));

    // Holds the pool non-empty until the producer is done.
    {
        let release = release.clone();
        let executed = executed.clone();
        pool.push_job(move || {
            release.wait();
            executed.fetch_add(1, Ordering::SeqCst);
        });
    }

    let waiter = {
        let pool = pool.clone();
        let executed = executed.clone();
        thread::spawn(move || {
            let drained = pool.wait_all(LONG_WAIT);
            (drained, executed.load(Ordering::SeqCst))
        })
    };
    thread::sleep(Duration::from_millis(20));

    // --- ACT ---
    let producer = {
        let pool = pool.clone();
        let executed = executed.clone();
        thread::spawn(move || {
            for _ in 0..20 {
                let executed = executed.clone();
                pool.push_job(move || {
                    thread::sleep(Duration::from_millis(1));
                    executed.fetch_add(1, Ordering::SeqCst);
                });
            }
        })
    };
    producer.join().unwrap();
    assert!(
        !waiter.is_finished(),
        "wait_all returned while a job was outstanding"
    );
    release.wait();

    // --- ASSERT ---
    let (drained, seen) = waiter.join().unwrap();
    assert!(drained, "wait_all should drain once every job finished");
    assert_eq!(seen, 21, "jobs pushed during the wait must be waited for");
    assert!(pool.is_empty());
}

#[test]
fn test_pool_dropped_from_its_own_job_lets_the_job_finish() {
    // --- ARRANGE ---
    let holder = Arc::new(Mutex::new(Some(WorkerThreadPool::new(2).unwrap())));
    let (done_tx, done_rx) = crossbeam_channel::bounded(1);

    // --- ACT ---
    let job_holder = holder.clone();
    holder
        .lock()
        .unwrap()
        .as_ref()
        .unwrap()
        .push_job(move || {
            thread::sleep(Duration::from_millis(50));
            let last = job_holder.lock().unwrap().take();
            drop(last);
            done_tx.send(()).unwrap();
        });

    // --- ASSERT ---
    assert!(
        done_rx.recv_timeout(LONG_WAIT).is_ok(),
        "the job should complete after releasing the last pool handle"
    );
    assert!(holder.lock().unwrap().is_none());
}

#[test]
fn test_concurrent_producers_lose_no_updates() {
    const PRODUCERS: usize = 4;
    const JOBS_PER_PRODUCER: usize = 50;
    const INCREMENTS: usize = 100;

    let pool = Arc::new(WorkerThreadPool::new(4).unwrap());
    let counter = Arc::new(AtomicUsize::new(0));

    let producers: Vec<_> = (0..PRODUCERS)
        .map(|_| {
            let pool = pool.clone();
            let counter = counter.clone();
            thread::spawn(move || {
                for _ in 0..JOBS_PER_PRODUCER {
                    let counter = counter.clone();
                    pool.push_job(move || {
                        for _ in 0..INCREMENTS {
                            counter.fetch_add(1, Ordering::SeqCst);
                        }
                    });
                }
            })
        })
        .collect();

    for producer in producers {
        producer.join().unwrap();
    }

    assert!(pool.wait_all(LONG_WAIT));
    assert_eq!(
        counter.load(Ordering::SeqCst),
        PRODUCERS * JOBS_PER_PRODUCER * INCREMENTS
    );
}

#[test]
fn test_repeated_panics_keep_full_capacity() {
    let pool = WorkerThreadPool::with_config(&JobSystemConfig {
        worker_count: 2,
        thread_name: "panic-test".to_string(),
    })
    .unwrap();

    for i in 0..6 {
        pool.push_job(move || panic!("job {i} failed"));
    }
    assert!(pool.wait_all(LONG_WAIT));
    assert_eq!(pool.failed_jobs(), 6);
    assert_eq!(pool.idle_workers(), 2);

    // Both workers must still be alive: two jobs meeting at a barrier need two threads.
    let gate = Arc::new(Barrier::new(2));
    for _ in 0..2 {
        let gate = gate.clone();
        pool.push_job(move || {
            gate.wait();
        });
    }
    assert!(pool.wait_all(LONG_WAIT), "both workers should survive panics");
}
