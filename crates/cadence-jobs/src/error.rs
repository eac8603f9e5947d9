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

//! Errors raised while building the worker pool.

use thiserror::Error;

/// An error raised while constructing a [`WorkerThreadPool`](crate::WorkerThreadPool)
/// or an [`AsyncJobQueue`](crate::AsyncJobQueue).
#[derive(Debug, Error)]
pub enum PoolError {
    /// A pool without workers could never run a job; submitting would block forever.
    #[error("a worker pool needs at least one worker thread")]
    NoWorkers,
    /// The operating system refused to spawn a thread.
    #[error("failed to spawn thread '{name}': {source}")]
    Spawn {
        /// Name of the thread that failed to start.
        name: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
