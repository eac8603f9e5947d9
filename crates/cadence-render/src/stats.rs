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

//! Frame statistics collected by the render loop.

use std::time::Duration;

/// A snapshot of frame timing since the loop started.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct FrameStats {
    /// Successful frames, including synchronous ones.
    pub frames_rendered: u64,
    /// Wall time spent in the most recent frame callback.
    pub last_frame_time: Duration,
    /// Mean wall time spent in the frame callback.
    pub average_frame_time: Duration,
}

impl FrameStats {
    pub(crate) fn record(&mut self, frame_time: Duration) {
        let previous = self.frames_rendered;
        self.frames_rendered += 1;
        self.last_frame_time = frame_time;

        // Incremental mean over nanoseconds.
        let mean = self.average_frame_time.as_nanos();
        let sample = frame_time.as_nanos();
        let updated = (mean * u128::from(previous) + sample) / u128::from(self.frames_rendered);
        self.average_frame_time = Duration::from_nanos(u64::try_from(updated).unwrap_or(u64::MAX));
    }
}
