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

use std::time::{Duration, Instant};

/// A monotonic stopwatch used to measure frame and job durations.
#[derive(Debug, Clone)]
pub struct Stopwatch {
    start_time: Instant,
}

impl Stopwatch {
    /// Creates a new Stopwatch instance, started immediately.
    /// ## Returns
    /// A new instance of the Stopwatch struct.
    #[inline]
    pub fn new() -> Self {
        Self {
            start_time: Instant::now(),
        }
    }

    /// Returns the elapsed time since the stopwatch was started.
    #[inline]
    pub fn elapsed(&self) -> Duration {
        self.start_time.elapsed()
    }

    /// Returns the elapsed time and restarts the stopwatch from now.
    /// ## Returns
    /// The time between the previous start and this call.
    #[inline]
    pub fn lap(&mut self) -> Duration {
        let now = Instant::now();
        let elapsed = now.duration_since(self.start_time);
        self.start_time = now;
        elapsed
    }

    /// Restarts the stopwatch from now.
    #[inline]
    pub fn reset(&mut self) {
        self.start_time = Instant::now();
    }
}

impl Default for Stopwatch {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::thread;

    const SMALL_DURATION_MS: u64 = 15;
    const SLEEP_DURATION_MS: u64 = 50;
    const SLEEP_MARGIN_MS: u64 = 200;

    #[test]
    fn stopwatch_elapsed_time_near_zero_initially() {
        let watch = Stopwatch::new();

        let elapsed = watch.elapsed();
        assert!(
            elapsed < Duration::from_millis(SMALL_DURATION_MS),
            "Initial elapsed duration ({elapsed:?}) should be very small"
        );
    }

    /// Verifies that the elapsed time is at least the sleep duration and below
    /// the sleep duration plus a margin.
    #[test]
    fn stopwatch_elapsed_time_after_delay() {
        let watch = Stopwatch::new();
        let sleep_duration = Duration::from_millis(SLEEP_DURATION_MS);
        let max_expected = sleep_duration + Duration::from_millis(SLEEP_MARGIN_MS);

        thread::sleep(sleep_duration);

        let elapsed = watch.elapsed();
        assert!(
            elapsed >= sleep_duration,
            "Elapsed duration ({elapsed:?}) should be >= sleep duration ({sleep_duration:?})"
        );
        assert!(
            elapsed < max_expected,
            "Elapsed duration ({elapsed:?}) should be < sleep duration + margin ({max_expected:?})"
        );
    }

    #[test]
    fn stopwatch_lap_restarts_measurement() {
        let mut watch = Stopwatch::new();
        thread::sleep(Duration::from_millis(SLEEP_DURATION_MS));

        let first = watch.lap();
        assert!(first >= Duration::from_millis(SLEEP_DURATION_MS));

        let after_lap = watch.elapsed();
        assert!(
            after_lap < Duration::from_millis(SMALL_DURATION_MS),
            "Lap should restart the stopwatch, got {after_lap:?}"
        );
    }

    #[test]
    fn stopwatch_reset_restarts_measurement() {
        let mut watch = Stopwatch::new();
        thread::sleep(Duration::from_millis(SMALL_DURATION_MS * 2));
        watch.reset();
        assert!(watch.elapsed() < Duration::from_millis(SMALL_DURATION_MS));
    }
}
