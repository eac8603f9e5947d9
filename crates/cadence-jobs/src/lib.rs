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

//! # Cadence Jobs
//!
//! A fixed-size worker thread pool and an asynchronous job queue in front of it.
//!
//! - [`WorkerThreadPool`] hands each job to an idle worker and applies
//!   back-pressure: submitting blocks while every worker is busy.
//! - [`AsyncJobQueue`] owns a pool and a single dispatcher thread, turning the
//!   blocking submission into a non-blocking, unboundedly queued one while
//!   preserving FIFO dispatch order.

#![warn(missing_docs)]

pub mod config;
pub mod error;
pub mod pool;
pub mod queue;
mod worker;

pub use cadence_core::Job;
pub use config::JobSystemConfig;
pub use error::PoolError;
pub use pool::WorkerThreadPool;
pub use queue::AsyncJobQueue;
