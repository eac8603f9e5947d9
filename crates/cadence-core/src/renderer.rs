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

//! The contract between the render loop and the subsystem that draws frames.

use std::time::Duration;

/// The engine-supplied frame producer driven by the render loop.
///
/// The loop calls [`render_frame`](FrameRenderer::render_frame) repeatedly from
/// its dedicated thread (or from a controller thread for single-stepped frames
/// while paused), never concurrently. Implementations may submit background work
/// to a job queue but must not call back into the loop's control API.
pub trait FrameRenderer: Send {
    /// Produces one frame synchronously.
    ///
    /// ## Arguments
    /// * `elapsed` - Wall time since the previous frame started.
    ///
    /// ## Returns
    /// An error if the frame failed. A failed frame is fatal to the loop.
    fn render_frame(&mut self, elapsed: Duration) -> anyhow::Result<()>;

    /// Releases resources tied to the render thread.
    ///
    /// Called exactly once, after the loop has stopped producing frames.
    fn cleanup(&mut self);
}

/// Adapts a pair of closures into a [`FrameRenderer`].
pub struct CallbackRenderer<F, C>
where
    F: FnMut(Duration) -> anyhow::Result<()> + Send,
    C: FnMut() + Send,
{
    frame: F,
    cleanup: C,
}

impl<F, C> CallbackRenderer<F, C>
where
    F: FnMut(Duration) -> anyhow::Result<()> + Send,
    C: FnMut() + Send,
{
    /// Creates a renderer from a frame closure and a cleanup closure.
    pub fn new(frame: F, cleanup: C) -> Self {
        Self { frame, cleanup }
    }
}

impl<F, C> FrameRenderer for CallbackRenderer<F, C>
where
    F: FnMut(Duration) -> anyhow::Result<()> + Send,
    C: FnMut() + Send,
{
    fn render_frame(&mut self, elapsed: Duration) -> anyhow::Result<()> {
        (self.frame)(elapsed)
    }

    fn cleanup(&mut self) {
        (self.cleanup)()
    }
}
