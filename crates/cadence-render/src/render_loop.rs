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

//! The asynchronous render loop.

use crate::config::RenderLoopConfig;
use crate::error::RenderLoopError;
use crate::pacing::FramePacer;
use crate::state::LoopState;
use crate::stats::FrameStats;
use cadence_core::utils::panic::panic_message;
use cadence_core::{FrameRenderer, Stopwatch};
use std::panic::{self, AssertUnwindSafe};
use std::sync::{Arc, Condvar, Mutex, MutexGuard, PoisonError};
use std::thread::{self, JoinHandle};
use std::time::Duration;

/// Lifecycle data guarded by a single mutex, so state and in-flight marker
/// are always observed together.
struct Control {
    state: LoopState,
    frame_in_flight: bool,
    interrupted: bool,
    /// Bumped by `begin_rendering` and `resume`; the next frame reports zero elapsed time.
    run_epoch: u64,
    stats: FrameStats,
}

struct LoopShared {
    control: Mutex<Control>,
    changed: Condvar,
    renderer: Mutex<Box<dyn FrameRenderer>>,
    pacer: FramePacer,
    poll_interval: Duration,
}

impl LoopShared {
    fn lock(&self) -> MutexGuard<'_, Control> {
        self.control.lock().unwrap_or_else(PoisonError::into_inner)
    }

    fn wait<'a>(&self, control: MutexGuard<'a, Control>) -> MutexGuard<'a, Control> {
        self.changed
            .wait(control)
            .unwrap_or_else(PoisonError::into_inner)
    }

    /// Runs one frame on the calling thread. Panics count as failures.
    fn render_frame(&self, elapsed: Duration) -> Result<Duration, String> {
        let mut renderer = self.renderer.lock().unwrap_or_else(PoisonError::into_inner);
        let watch = Stopwatch::new();
        match panic::catch_unwind(AssertUnwindSafe(|| renderer.render_frame(elapsed))) {
            Ok(Ok(())) => Ok(watch.elapsed()),
            Ok(Err(error)) => Err(format!("{error:#}")),
            Err(payload) => Err(format!("panicked: {}", panic_message(payload.as_ref()))),
        }
    }
}

/// Drives a [`FrameRenderer`] on a dedicated thread.
///
/// The thread is spawned by [`new`](Self::new) in the [`Idle`](LoopState::Idle)
/// state and lives until the loop is dropped. Controller threads steer it
/// through `&self` methods, so the loop can be shared behind an `Arc`.
///
/// At most one frame callback runs at any instant. Once [`pause`](Self::pause)
/// or [`end_rendering`](Self::end_rendering) returns, no frame is in flight.
///
/// A frame that returns an error or panics is fatal: the loop logs it, moves to
/// [`Terminated`](LoopState::Terminated), runs `cleanup()` and exits.
///
/// Dropping the loop interrupts it, waits for the in-flight frame, runs
/// `cleanup()` exactly once on the loop thread and joins it.
pub struct AsyncRenderLoop {
    shared: Arc<LoopShared>,
    handle: Option<JoinHandle<()>>,
}

impl AsyncRenderLoop {
    /// Spawns the render thread for `renderer`.
    pub fn new<R>(renderer: R, config: &RenderLoopConfig) -> Result<Self, RenderLoopError>
    where
        R: FrameRenderer + 'static,
    {
        let shared = Arc::new(LoopShared {
            control: Mutex::new(Control {
                state: LoopState::Idle,
                frame_in_flight: false,
                interrupted: false,
                run_epoch: 0,
                stats: FrameStats::default(),
            }),
            changed: Condvar::new(),
            renderer: Mutex::new(Box::new(renderer)),
            pacer: FramePacer::new(config.target_frame_time(), config.vsync),
            poll_interval: config.poll_interval(),
        });

        let thread_shared = Arc::clone(&shared);
        let name = config.thread_name.clone();
        let handle = thread::Builder::new()
            .name(name.clone())
            .spawn(move || run_loop(&thread_shared))
            .map_err(|source| RenderLoopError::Spawn { name, source })?;

        Ok(Self {
            shared,
            handle: Some(handle),
        })
    }

    /// Opens a rendering session.
    ///
    /// A no-op while a session is already open.
    ///
    /// ## Returns
    /// [`RenderLoopError::Terminated`] once the loop thread has stopped.
    pub fn begin_rendering(&self) -> Result<(), RenderLoopError> {
        let mut control = self.shared.lock();
        match control.state {
            LoopState::Terminated => Err(RenderLoopError::Terminated),
            LoopState::Idle => {
                control.state = LoopState::Rendering;
                control.run_epoch += 1;
                self.shared.changed.notify_all();
                log::debug!("Render loop: rendering begins.");
                Ok(())
            }
            LoopState::Rendering | LoopState::Paused => Ok(()),
        }
    }

    /// Closes the rendering session and blocks until no frame is in flight.
    ///
    /// The frame callback is not invoked again until the next
    /// [`begin_rendering`](Self::begin_rendering). A no-op when idle or terminated.
    pub fn end_rendering(&self) {
        let mut control = self.shared.lock();
        if control.state.in_session() {
            control.state = LoopState::Idle;
            self.shared.changed.notify_all();
            log::debug!("Render loop: rendering ends.");
        }
        while control.frame_in_flight {
            control = self.shared.wait(control);
        }
    }

    /// Suspends rendering and blocks until the in-flight frame completes.
    ///
    /// ## Returns
    /// [`RenderLoopError::InvalidOperation`] unless the loop is rendering,
    /// in particular when it is already paused.
    pub fn pause(&self) -> Result<(), RenderLoopError> {
        let mut control = self.shared.lock();
        if control.state != LoopState::Rendering {
            return Err(RenderLoopError::InvalidOperation {
                operation: "pause",
                state: control.state,
            });
        }
        control.state = LoopState::Paused;
        self.shared.changed.notify_all();
        log::debug!("Render loop: paused.");

        while control.frame_in_flight {
            control = self.shared.wait(control);
        }
        Ok(())
    }

    /// Resumes a paused loop. Does not block.
    ///
    /// ## Returns
    /// [`RenderLoopError::InvalidOperation`] unless the loop is paused.
    pub fn resume(&self) -> Result<(), RenderLoopError> {
        let mut control = self.shared.lock();
        if control.state != LoopState::Paused {
            return Err(RenderLoopError::InvalidOperation {
                operation: "resume",
                state: control.state,
            });
        }
        control.state = LoopState::Rendering;
        control.run_epoch += 1;
        self.shared.changed.notify_all();
        log::debug!("Render loop: resumed.");
        Ok(())
    }

    /// Runs one frame on the calling thread while the loop is paused.
    ///
    /// ## Arguments
    /// * `elapsed` - The elapsed time handed to the frame callback.
    ///
    /// ## Returns
    /// [`RenderLoopError::InvalidOperation`] unless the loop is paused, or
    /// [`RenderLoopError::FrameFailed`] if the frame failed, which also
    /// terminates the loop.
    pub fn render_sync_frame(&self, elapsed: Duration) -> Result<(), RenderLoopError> {
        {
            let mut control = self.shared.lock();
            loop {
                if control.state != LoopState::Paused {
                    return Err(RenderLoopError::InvalidOperation {
                        operation: "render a synchronous frame",
                        state: control.state,
                    });
                }
                // Another controller may be stepping too.
                if !control.frame_in_flight {
                    break;
                }
                control = self.shared.wait(control);
            }
            control.frame_in_flight = true;
        }

        log::trace!("Render loop: synchronous frame.");
        let outcome = self.shared.render_frame(elapsed);

        let mut control = self.shared.lock();
        control.frame_in_flight = false;
        let result = match outcome {
            Ok(frame_time) => {
                control.stats.record(frame_time);
                Ok(())
            }
            Err(reason) => {
                log::error!("Synchronous frame failed: {reason}. Render loop terminating.");
                control.state = LoopState::Terminated;
                Err(RenderLoopError::FrameFailed(reason))
            }
        };
        self.shared.changed.notify_all();
        result
    }

    /// Enables or disables vsync.
    ///
    /// On change, the active target frame time is swapped with the saved one:
    /// with vsync on the loop runs uncapped and relies on presentation to pace it.
    pub fn enable_vsync(&self, enabled: bool) {
        if self.shared.pacer.set_vsync(enabled) {
            log::debug!(
                "Render loop: vsync {}, target frame time {:?}.",
                if enabled { "on" } else { "off" },
                self.shared.pacer.active()
            );
        }
    }

    /// Returns whether vsync is enabled.
    pub fn is_vsync_enabled(&self) -> bool {
        self.shared.pacer.vsync_enabled()
    }

    /// Sets the software frame cap used while vsync is off. Zero means uncapped.
    pub fn set_target_frame_time(&self, frame_time: Duration) {
        self.shared.pacer.set_cap(frame_time);
    }

    /// Returns the software frame cap used while vsync is off.
    pub fn target_frame_time(&self) -> Duration {
        self.shared.pacer.cap()
    }

    /// Returns the frame time the loop currently paces against.
    pub fn active_frame_time(&self) -> Duration {
        self.shared.pacer.active()
    }

    /// Returns the current lifecycle state.
    pub fn state(&self) -> LoopState {
        self.shared.lock().state
    }

    /// Returns true while a rendering session is open, paused or not.
    pub fn is_rendering(&self) -> bool {
        self.state().in_session()
    }

    /// Returns true while paused.
    pub fn is_paused(&self) -> bool {
        self.state() == LoopState::Paused
    }

    /// Returns true once the loop thread has stopped for good.
    pub fn is_terminated(&self) -> bool {
        self.state() == LoopState::Terminated
    }

    /// Returns a snapshot of the frame statistics.
    pub fn frame_stats(&self) -> FrameStats {
        self.shared.lock().stats
    }
}

impl Drop for AsyncRenderLoop {
    fn drop(&mut self) {
        {
            let mut control = self.shared.lock();
            control.interrupted = true;
            self.shared.changed.notify_all();
        }
        if let Some(handle) = self.handle.take() {
            if handle.join().is_err() {
                log::error!("Render loop thread panicked.");
            }
        }
    }
}

fn run_loop(shared: &LoopShared) {
    log::info!("Render loop thread started.");

    let mut frame_clock = Stopwatch::new();
    let mut seen_epoch = 0;

    loop {
        // Wait until a frame may start; the in-flight marker is set under the same lock.
        let elapsed = {
            let mut control = shared.lock();
            loop {
                if control.interrupted || control.state == LoopState::Terminated {
                    break;
                }
                if control.state == LoopState::Rendering && !control.frame_in_flight {
                    break;
                }
                control = shared
                    .changed
                    .wait_timeout(control, shared.poll_interval)
                    .unwrap_or_else(PoisonError::into_inner)
                    .0;
            }
            if control.interrupted || control.state == LoopState::Terminated {
                break;
            }
            control.frame_in_flight = true;

            if control.run_epoch != seen_epoch {
                seen_epoch = control.run_epoch;
                frame_clock.reset();
                Duration::ZERO
            } else {
                frame_clock.lap()
            }
        };

        log::trace!("Render loop: frame, {elapsed:?} since the previous one.");
        let outcome = shared.render_frame(elapsed);

        let mut control = shared.lock();
        control.frame_in_flight = false;
        shared.changed.notify_all();

        let frame_time = match outcome {
            Ok(frame_time) => frame_time,
            Err(reason) => {
                log::error!("Frame failed: {reason}. Render loop terminating.");
                control.state = LoopState::Terminated;
                break;
            }
        };
        control.stats.record(frame_time);

        // Pace against the target; any state change cuts the sleep short.
        let target = shared.pacer.active();
        if let Some(remaining) = target.checked_sub(frame_time).filter(|d| !d.is_zero()) {
            let _ = shared
                .changed
                .wait_timeout_while(control, remaining, |control| {
                    !control.interrupted && control.state == LoopState::Rendering
                })
                .unwrap_or_else(PoisonError::into_inner);
        }
    }

    {
        let mut renderer = shared.renderer.lock().unwrap_or_else(PoisonError::into_inner);
        if let Err(payload) = panic::catch_unwind(AssertUnwindSafe(|| renderer.cleanup())) {
            log::error!(
                "Renderer cleanup panicked: {}",
                panic_message(payload.as_ref())
            );
        }
    }

    let mut control = shared.lock();
    control.state = LoopState::Terminated;
    control.frame_in_flight = false;
    shared.changed.notify_all();
    drop(control);

    log::info!("Render loop thread stopped.");
}
