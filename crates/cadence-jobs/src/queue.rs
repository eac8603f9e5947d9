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

//! A non-blocking job queue feeding a [`WorkerThreadPool`].

use crate::config::JobSystemConfig;
use crate::error::PoolError;
use crate::pool::WorkerThreadPool;
use cadence_core::Job;
use crossbeam_channel::{Receiver, Sender};
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

/// Interval at which [`AsyncJobQueue::wait_all`] re-checks the pending list.
const DISPATCH_POLL_INTERVAL: Duration = Duration::from_millis(1);

#[derive(Default)]
struct QueueShared {
    stop: AtomicBool,
    /// Jobs pushed to the queue and not yet accepted by the pool.
    undispatched: AtomicUsize,
}

/// An unbounded FIFO of jobs drained into a [`WorkerThreadPool`] by a single
/// dispatcher thread.
///
/// [`push_job`](Self::push_job) never blocks. The dispatcher forwards jobs in
/// submission order and absorbs the pool's back-pressure. Completion order is
/// not guaranteed once several workers run jobs concurrently.
///
/// Dropping the queue stops the dispatcher. Jobs still pending at that point
/// are dropped without running; jobs already in the pool finish. The queue may
/// be dropped from one of its own jobs.
pub struct AsyncJobQueue {
    sender: Option<Sender<Job>>,
    shared: Arc<QueueShared>,
    pool: Arc<WorkerThreadPool>,
    dispatcher: Option<JoinHandle<()>>,
}

impl AsyncJobQueue {
    /// Creates a queue backed by a pool of `worker_count` workers.
    pub fn new(worker_count: usize) -> Result<Self, PoolError> {
        Self::with_config(&JobSystemConfig::with_workers(worker_count))
    }

    /// Creates a queue and its pool from a configuration.
    pub fn with_config(config: &JobSystemConfig) -> Result<Self, PoolError> {
        let pool = Arc::new(WorkerThreadPool::with_config(config)?);
        let shared = Arc::new(QueueShared::default());
        let (sender, receiver) = crossbeam_channel::unbounded();

        let name = format!("{}-dispatch", config.thread_name);
        let dispatcher = {
            let pool = Arc::clone(&pool);
            let shared = Arc::clone(&shared);
            thread::Builder::new()
                .name(name.clone())
                .spawn(move || dispatch_loop(&receiver, &shared, &pool))
                .map_err(|source| PoolError::Spawn { name, source })?
        };

        Ok(Self {
            sender: Some(sender),
            shared,
            pool,
            dispatcher: Some(dispatcher),
        })
    }

    /// Appends a job to the pending list. Never blocks.
    pub fn push_job<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.push_boxed(Box::new(work));
    }

    /// Same as [`push_job`](Self::push_job) for an already boxed [`Job`].
    pub fn push_boxed(&self, job: Job) {
        let Some(sender) = &self.sender else {
            return;
        };

        self.shared.undispatched.fetch_add(1, Ordering::AcqRel);
        if sender.send(job).is_err() {
            self.shared.undispatched.fetch_sub(1, Ordering::AcqRel);
            log::warn!("Job dispatcher is gone; dropping submitted job.");
        }
    }

    /// Returns the number of jobs waiting to be handed to the pool.
    pub fn pending_jobs(&self) -> usize {
        self.shared.undispatched.load(Ordering::Acquire)
    }

    /// Returns true if nothing is pending and the pool has no outstanding job.
    pub fn is_idle(&self) -> bool {
        self.pending_jobs() == 0 && self.pool.is_empty()
    }

    /// Blocks until every submitted job has run or `timeout` elapses.
    ///
    /// ## Returns
    /// `true` if the queue and its pool drained in time.
    pub fn wait_all(&self, timeout: Duration) -> bool {
        let deadline = Instant::now().checked_add(timeout);
        let remaining =
            || deadline.map_or(timeout, |deadline| deadline.saturating_duration_since(Instant::now()));

        loop {
            while self.pending_jobs() > 0 {
                let left = remaining();
                if left.is_zero() {
                    return false;
                }
                thread::sleep(left.min(DISPATCH_POLL_INTERVAL));
            }

            // Every job accepted by the pool is already counted as outstanding there.
            if !self.pool.wait_all(remaining()) {
                return false;
            }
            // A job may have queued more work before it finished.
            if self.pending_jobs() == 0 {
                return true;
            }
        }
    }

    /// Returns the pool this queue dispatches into.
    pub fn pool(&self) -> &WorkerThreadPool {
        &self.pool
    }
}

impl Drop for AsyncJobQueue {
    fn drop(&mut self) {
        self.shared.stop.store(true, Ordering::Release);
        // Disconnecting the channel wakes a dispatcher blocked on an empty list.
        drop(self.sender.take());

        if let Some(handle) = self.dispatcher.take() {
            // From inside a job the dispatcher may be waiting on this very worker.
            // Detached, it drops the pool once its last push completes.
            if self.pool.is_worker_thread() {
                log::debug!("Job queue dropped from a worker thread, dispatcher detached.");
                return;
            }
            if handle.join().is_err() {
                log::error!("Job dispatcher thread panicked.");
            }
        }
    }
}

fn dispatch_loop(receiver: &Receiver<Job>, shared: &QueueShared, pool: &WorkerThreadPool) {
    log::info!("Job dispatcher thread started.");

    let mut dropped = 0;
    while let Ok(job) = receiver.recv() {
        if shared.stop.load(Ordering::Acquire) {
            dropped = 1 + receiver.len();
            break;
        }
        // Blocks here, not in the producers, while every worker is busy.
        pool.push_boxed(job);
        shared.undispatched.fetch_sub(1, Ordering::AcqRel);
        log::trace!("Dispatched job to worker pool.");
    }

    if dropped > 0 {
        log::debug!("Dropping {dropped} pending job(s) at shutdown.");
    }
    log::info!("Job dispatcher thread stopped.");
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::{Barrier, Mutex};

    const WAIT: Duration = Duration::from_secs(10);

    #[test]
    fn test_queue_runs_all_jobs() {
        let queue = AsyncJobQueue::new(4).unwrap();
        let counter = Arc::new(AtomicUsize::new(0));

        for _ in 0..100 {
            let counter = counter.clone();
            queue.push_job(move || {
                counter.fetch_add(1, Ordering::SeqCst);
            });
        }

        assert!(queue.wait_all(WAIT));
        assert_eq!(counter.load(Ordering::SeqCst), 100);
        assert!(queue.is_idle());
    }

    #[test]
    fn test_single_worker_preserves_submission_order() {
        let queue = AsyncJobQueue::new(1).unwrap();
        let order = Arc::new(Mutex::new(Vec::new()));

        for i in 0..50 {
            let order = order.clone();
            queue.push_job(move || order.lock().unwrap().push(i));
        }

        assert!(queue.wait_all(WAIT));
        assert_eq!(*order.lock().unwrap(), (0..50).collect::<Vec<_>>());
    }

    #[test]
    fn test_push_never_blocks_when_pool_is_saturated() {
        let queue = AsyncJobQueue::new(1).unwrap();
        let gate = Arc::new(Barrier::new(2));

        let worker_gate = gate.clone();
        queue.push_job(move || {
            worker_gate.wait();
        });

        let start = Instant::now();
        for _ in 0..10 {
            queue.push_job(|| {});
        }
        assert!(
            start.elapsed() < Duration::from_millis(100),
            "pushing onto a saturated queue should not block"
        );
        assert!(queue.pending_jobs() > 0);
        assert!(!queue.wait_all(Duration::from_millis(10)));

        gate.wait(); // release the worker
        assert!(queue.wait_all(WAIT));
    }
}
