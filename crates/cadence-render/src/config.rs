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

//! Configuration for the render loop.

use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Configuration for an [`AsyncRenderLoop`](crate::AsyncRenderLoop).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RenderLoopConfig {
    /// Frame rate cap applied while vsync is off. `0` means uncapped.
    pub target_fps: u32,
    /// Whether vsync starts enabled. While enabled the loop does not cap the
    /// frame rate itself; presentation is expected to pace it.
    pub vsync: bool,
    /// Upper bound, in milliseconds, on how long the idle loop thread sleeps
    /// between checks of its state.
    pub poll_interval_ms: u64,
    /// Name of the render thread.
    pub thread_name: String,
}

impl RenderLoopConfig {
    /// Returns the frame duration matching `target_fps` (zero when uncapped).
    pub fn target_frame_time(&self) -> Duration {
        if self.target_fps == 0 {
            Duration::ZERO
        } else {
            Duration::from_nanos(1_000_000_000 / u64::from(self.target_fps))
        }
    }

    /// Returns the poll interval, never shorter than one millisecond.
    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms.max(1))
    }
}

impl Default for RenderLoopConfig {
    fn default() -> Self {
        Self {
            target_fps: 60,
            vsync: false,
            poll_interval_ms: 5,
            thread_name: "cadence-render".to_string(),
        }
    }
}
