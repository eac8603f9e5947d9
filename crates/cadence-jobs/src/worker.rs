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

//! Worker threads of the pool.
//!
//! Each worker owns a one-job slot guarded by its own mutex and condvar. The
//! pool fills the slot of an idle worker; the worker wakes, runs the job, then
//! reports back to the pool so blocked submitters and waiters can proceed.

use crate::error::PoolError;
use crate::pool::PoolShared;
use cadence_core::utils::panic::panic_message;
use cadence_core::Job;
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle, ThreadId};

#[derive(Default)]
struct SlotState {
    job: Option<Job>,
    busy: bool,
    stop: bool,
}

#[derive(Default)]
struct WorkerSlot {
    state: Mutex<SlotState>,
    wake: Condvar,
}

impl WorkerSlot {
    fn lock(&self) -> MutexGuard<'_, SlotState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

/// A worker thread executing at most one job at a time.
pub(crate) struct Worker {
    id: usize,
    slot: Arc<WorkerSlot>,
    handle: Option<JoinHandle<()>>,
}

impl Worker {
    /// Spawns a named worker thread reporting completions to `pool`.
    pub(crate) fn spawn(id: usize, name: String, pool: Arc<PoolShared>) -> Result<Self, PoolError> {
        let slot = Arc::new(WorkerSlot::default());
        let thread_slot = Arc::clone(&slot);

        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || Worker::run_loop(id, &thread_slot, &pool))
            .map_err(|source| PoolError::Spawn { name, source })?;

        Ok(Self {
            id,
            slot,
            handle: Some(handle),
        })
    }

    /// Hands `job` to this worker if it is idle.
    ///
    /// Gives the job back when the worker is busy or stopping.
    pub(crate) fn try_assign(&self, job: Job) -> Result<(), Job> {
        let mut state = self.slot.lock();
        if state.busy || state.stop {
            return Err(job);
        }
        state.busy = true;
        state.job = Some(job);
        self.slot.wake.notify_one();
        Ok(())
    }

    pub(crate) fn thread_id(&self) -> Option<ThreadId> {
        self.handle.as_ref().map(|handle| handle.thread().id())
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.slot.lock().busy
    }

    /// Asks the worker to exit once its slot is empty.
    pub(crate) fn request_stop(&self) {
        self.slot.lock().stop = true;
        self.slot.wake.notify_one();
    }

    fn run_loop(id: usize, slot: &WorkerSlot, pool: &PoolShared) {
        log::trace!("Worker {id} started.");

        loop {
            let job = {
                let mut state = slot.lock();
                loop {
                    // An assigned job always runs, even if a stop was requested after it.
                    if let Some(job) = state.job.take() {
                        break job;
                    }
                    if state.stop {
                        log::trace!("Worker {id} stopped.");
                        return;
                    }
                    state = slot.wake.wait(state).unwrap_or_else(PoisonError::into_inner);
                }
            };

            if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(job)) {
                pool.record_failure();
                log::error!(
                    "Job panicked on worker {id}: {}. The worker keeps serving.",
                    panic_message(payload.as_ref())
                );
            }

            // Idle before the counter drops, so an empty pool never has a busy worker.
            slot.lock().busy = false;
            pool.job_finished();
        }
    }
}

impl Drop for Worker {
    fn drop(&mut self) {
        self.request_stop();
        if let Some(handle) = self.handle.take() {
            // Dropped from its own job: the thread exits on `stop` once the job returns.
            if handle.thread().id() == thread::current().id() {
                log::debug!("Worker {} released from its own thread, not joined.", self.id);
                return;
            }
            if handle.join().is_err() {
                log::error!("Worker {} thread panicked during shutdown.", self.id);
            }
        }
    }
}
