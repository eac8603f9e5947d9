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

//! Lifecycle states of the render loop.

use std::fmt;

/// The lifecycle state of an [`AsyncRenderLoop`](crate::AsyncRenderLoop).
///
/// ```text
/// Idle --begin--> Rendering --pause--> Paused
///   ^               |  ^                 |
///   +------end------+  +-----resume------+
///   ^                                    |
///   +----------------end-----------------+
///
/// any --interrupt / failed frame--> Terminated
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LoopState {
    /// The loop thread is alive but not producing frames.
    Idle,
    /// Frames are produced continuously at the target cadence.
    Rendering,
    /// Rendering is suspended; no frame runs on the loop thread.
    Paused,
    /// The loop thread has stopped for good, after an interrupt or a failed frame.
    Terminated,
}

impl LoopState {
    /// Returns true while a rendering session is open, paused or not.
    pub fn in_session(self) -> bool {
        matches!(self, LoopState::Rendering | LoopState::Paused)
    }
}

impl fmt::Display for LoopState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            LoopState::Idle => "idle",
            LoopState::Rendering => "rendering",
            LoopState::Paused => "paused",
            LoopState::Terminated => "terminated",
        };
        f.write_str(name)
    }
}
