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

//! The fixed-size worker pool.

use crate::config::JobSystemConfig;
use crate::error::PoolError;
use crate::worker::Worker;
use cadence_core::Job;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

struct PoolState {
    /// Jobs handed to the pool and not yet finished.
    outstanding: usize,
}

/// State shared between the pool handle and its worker threads.
pub(crate) struct PoolShared {
    state: Mutex<PoolState>,
    worker_idle: Condvar,
    drained: Condvar,
    failed_jobs: AtomicUsize,
}

impl PoolShared {
    fn new() -> Self {
        Self {
            state: Mutex::new(PoolState { outstanding: 0 }),
            worker_idle: Condvar::new(),
            drained: Condvar::new(),
            failed_jobs: AtomicUsize::new(0),
        }
    }

    fn lock(&self) -> MutexGuard<'_, PoolState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Called by a worker after it has marked itself idle.
    pub(crate) fn job_finished(&self) {
        let mut state = self.lock();
        debug_assert!(state.outstanding > 0, "job finished with no job outstanding");
        state.outstanding = state.outstanding.saturating_sub(1);
        self.worker_idle.notify_one();
        if state.outstanding == 0 {
            self.drained.notify_all();
        }
    }

    pub(crate) fn record_failure(&self) {
        self.failed_jobs.fetch_add(1, Ordering::Relaxed);
    }
}

/// A fixed collection of worker threads, each running one job at a time.
///
/// This is not a queue: [`push_job`](Self::push_job) blocks the caller until a
/// worker is idle. Put an [`AsyncJobQueue`](crate::AsyncJobQueue) in front of the
/// pool when producers must never block.
///
/// A job that panics is caught and logged; its worker stays in service, so the
/// capacity never shrinks.
///
/// Dropping the pool stops and joins every worker. Jobs already handed to a
/// worker finish first.
pub struct WorkerThreadPool {
    workers: Vec<Worker>,
    shared: Arc<PoolShared>,
}

impl WorkerThreadPool {
    /// Creates a pool with `worker_count` workers and default thread naming.
    ///
    /// # Example
    ///
    /// ```
    /// use cadence_jobs::WorkerThreadPool;
    /// use std::time::Duration;
    ///
    /// let pool = WorkerThreadPool::new(4).unwrap();
    /// pool.push_job(|| println!("Hello from a worker!"));
    /// assert!(pool.wait_all(Duration::from_secs(5)));
    /// ```
    pub fn new(worker_count: usize) -> Result<Self, PoolError> {
        Self::with_config(&JobSystemConfig::with_workers(worker_count))
    }

    /// Creates a pool from a configuration.
    pub fn with_config(config: &JobSystemConfig) -> Result<Self, PoolError> {
        if config.worker_count == 0 {
            return Err(PoolError::NoWorkers);
        }

        let shared = Arc::new(PoolShared::new());
        let mut workers = Vec::with_capacity(config.worker_count);
        for id in 0..config.worker_count {
            let name = format!("{}-{id}", config.thread_name);
            // Workers spawned so far are stopped and joined by their Drop on error.
            workers.push(Worker::spawn(id, name, Arc::clone(&shared))?);
        }

        log::info!("Worker pool started with {} threads.", workers.len());
        Ok(Self { workers, shared })
    }

    /// Hands a job to the first idle worker, blocking until one is idle.
    pub fn push_job<F>(&self, work: F)
    where
        F: FnOnce() + Send + 'static,
    {
        self.push_boxed(Box::new(work));
    }

    /// Same as [`push_job`](Self::push_job) for an already boxed [`Job`].
    pub fn push_boxed(&self, job: Job) {
        let mut state = self.shared.lock();
        state.outstanding += 1;

        let mut job = job;
        loop {
            for worker in &self.workers {
                match worker.try_assign(job) {
                    Ok(()) => return,
                    Err(rejected) => job = rejected,
                }
            }
            // A finishing worker marks itself idle before taking this lock to notify.
            state = self
                .shared
                .worker_idle
                .wait(state)
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    /// Returns true if no job is outstanding.
    pub fn is_empty(&self) -> bool {
        self.shared.lock().outstanding == 0
    }

    /// Blocks until every outstanding job has finished or `timeout` elapses.
    ///
    /// ## Returns
    /// `true` if the pool drained, `false` on timeout. A timeout is not an error.
    pub fn wait_all(&self, timeout: Duration) -> bool {
        let state = self.shared.lock();
        let (state, _) = self
            .shared
            .drained
            .wait_timeout_while(state, timeout, |state| state.outstanding > 0)
            .unwrap_or_else(PoisonError::into_inner);
        state.outstanding == 0
    }

    /// Returns the number of worker threads.
    pub fn worker_count(&self) -> usize {
        self.workers.len()
    }

    /// Returns the number of workers not currently holding a job.
    pub fn idle_workers(&self) -> usize {
        self.workers.iter().filter(|worker| !worker.is_busy()).count()
    }

    /// Returns the number of jobs handed to the pool and not yet finished.
    pub fn outstanding_jobs(&self) -> usize {
        self.shared.lock().outstanding
    }

    /// Returns true when called from one of this pool's worker threads.
    pub(crate) fn is_worker_thread(&self) -> bool {
        let current = thread::current().id();
        self.workers
            .iter()
            .any(|worker| worker.thread_id() == Some(current))
    }

    /// Returns how many jobs have panicked since the pool started.
    pub fn failed_jobs(&self) -> usize {
        self.shared.failed_jobs.load(Ordering::Relaxed)
    }
}

impl Drop for WorkerThreadPool {
    fn drop(&mut self) {
        // Signal everyone first so the workers wind down in parallel.
        for worker in &self.workers {
            worker.request_stop();
        }
        self.workers.clear();
        log::info!("Worker pool shut down.");
    }
}
