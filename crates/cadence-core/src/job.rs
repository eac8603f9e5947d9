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

//! The unit of work accepted by the worker pool and the job queue.

/// A unit of callable work with no input and no output beyond its side effects.
///
/// Failures are the job's own responsibility: there is no channel back to the
/// submitter. A panic escaping a job is caught and reported by the executor.
pub type Job = Box<dyn FnOnce() + Send + 'static>;

