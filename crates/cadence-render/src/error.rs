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

//! Errors reported by the render loop's control API.

use crate::state::LoopState;
use thiserror::Error;

/// An error reported to a controller of the render loop.
#[derive(Debug, Error)]
pub enum RenderLoopError {
    /// The operation is not valid in the current state. The state is left untouched.
    #[error("cannot {operation} while the render loop is {state}")]
    InvalidOperation {
        /// The rejected operation.
        operation: &'static str,
        /// The state the loop was in.
        state: LoopState,
    },
    /// The loop thread has stopped and cannot render again.
    #[error("the render loop has terminated")]
    Terminated,
    /// A synchronous frame failed. The loop terminates afterwards.
    #[error("frame failed: {0}")]
    FrameFailed(String),
    /// The operating system refused to spawn the render thread.
    #[error("failed to spawn render thread '{name}': {source}")]
    Spawn {
        /// Name of the thread that failed to start.
        name: String,
        /// The underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}
