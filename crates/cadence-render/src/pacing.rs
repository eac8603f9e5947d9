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

//! Target frame time with a vsync swap slot.

use std::sync::atomic::{AtomicBool, AtomicU64, Ordering};
use std::sync::{Mutex, PoisonError};
use std::time::Duration;

fn to_nanos(duration: Duration) -> u64 {
    u64::try_from(duration.as_nanos()).unwrap_or(u64::MAX)
}

/// Holds the frame time the loop thread paces against.
///
/// The active value is read with a single atomic load. Toggling vsync swaps
/// the active value with a saved one: with vsync on the active value is zero
/// (uncapped) and the software cap waits in the saved slot.
pub(crate) struct FramePacer {
    active_nanos: AtomicU64,
    saved_nanos: AtomicU64,
    vsync: AtomicBool,
    writer: Mutex<()>,
}

impl FramePacer {
    pub(crate) fn new(cap: Duration, vsync: bool) -> Self {
        let (active, saved) = if vsync {
            (Duration::ZERO, cap)
        } else {
            (cap, Duration::ZERO)
        };
        Self {
            active_nanos: AtomicU64::new(to_nanos(active)),
            saved_nanos: AtomicU64::new(to_nanos(saved)),
            vsync: AtomicBool::new(vsync),
            writer: Mutex::new(()),
        }
    }

    /// The duration a frame should take; zero means uncapped.
    pub(crate) fn active(&self) -> Duration {
        Duration::from_nanos(self.active_nanos.load(Ordering::Acquire))
    }

    pub(crate) fn vsync_enabled(&self) -> bool {
        self.vsync.load(Ordering::Acquire)
    }

    /// Enables or disables vsync, swapping the frame time slots on change.
    ///
    /// ## Returns
    /// `true` if the setting changed.
    pub(crate) fn set_vsync(&self, enabled: bool) -> bool {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        if self.vsync.load(Ordering::Acquire) == enabled {
            return false;
        }
        let active = self.active_nanos.load(Ordering::Acquire);
        let saved = self.saved_nanos.load(Ordering::Acquire);
        self.active_nanos.store(saved, Ordering::Release);
        self.saved_nanos.store(active, Ordering::Release);
        self.vsync.store(enabled, Ordering::Release);
        true
    }

    /// Replaces the software frame cap, wherever it currently sits.
    pub(crate) fn set_cap(&self, cap: Duration) {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = if self.vsync.load(Ordering::Acquire) {
            &self.saved_nanos
        } else {
            &self.active_nanos
        };
        slot.store(to_nanos(cap), Ordering::Release);
    }

    /// Returns the software frame cap, regardless of vsync.
    pub(crate) fn cap(&self) -> Duration {
        let _writer = self.writer.lock().unwrap_or_else(PoisonError::into_inner);
        let slot = if self.vsync.load(Ordering::Acquire) {
            &self.saved_nanos
        } else {
            &self.active_nanos
        };
        Duration::from_nanos(slot.load(Ordering::Acquire))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const CAP: Duration = Duration::from_millis(16);

    #[test]
    fn vsync_toggle_swaps_active_frame_time() {
        let pacer = FramePacer::new(CAP, false);
        assert_eq!(pacer.active(), CAP);

        assert!(pacer.set_vsync(true));
        assert_eq!(pacer.active(), Duration::ZERO);
        assert_eq!(pacer.cap(), CAP);

        assert!(pacer.set_vsync(false));
        assert_eq!(pacer.active(), CAP);
    }

    #[test]
    fn repeated_toggle_does_not_swap_twice() {
        let pacer = FramePacer::new(CAP, true);
        assert_eq!(pacer.active(), Duration::ZERO);

        assert!(!pacer.set_vsync(true));
        assert_eq!(pacer.active(), Duration::ZERO);
        assert_eq!(pacer.cap(), CAP);
    }

    #[test]
    fn set_cap_updates_the_saved_slot_under_vsync() {
        let pacer = FramePacer::new(CAP, true);
        pacer.set_cap(Duration::from_millis(8));

        assert_eq!(pacer.active(), Duration::ZERO);
        assert!(pacer.set_vsync(false));
        assert_eq!(pacer.active(), Duration::from_millis(8));
    }
}
