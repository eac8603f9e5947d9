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

//! Configuration for the worker pool and the job queue.

use serde::{Deserialize, Serialize};
use std::thread;

/// Configuration shared by [`WorkerThreadPool`](crate::WorkerThreadPool) and
/// [`AsyncJobQueue`](crate::AsyncJobQueue).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JobSystemConfig {
    /// Number of worker threads. Fixed for the lifetime of the pool.
    pub worker_count: usize,
    /// Name prefix for the spawned threads. Workers are suffixed with their index.
    pub thread_name: String,
}

impl JobSystemConfig {
    /// Creates a configuration with the given worker count and default naming.
    pub fn with_workers(worker_count: usize) -> Self {
        Self {
            worker_count,
            ..Default::default()
        }
    }
}

impl Default for JobSystemConfig {
    fn default() -> Self {
        Self {
            worker_count: thread::available_parallelism()
                .map(|n| n.get())
                .unwrap_or(4),
            thread_name: "cadence-worker".to_string(),
        }
    }
}
