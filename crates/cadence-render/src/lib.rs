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

//! # Cadence Render
//!
//! The asynchronous render loop: one dedicated thread repeatedly runs a
//! [`FrameRenderer`](cadence_core::FrameRenderer) at a target cadence, while
//! controller threads begin and end rendering, pause and resume it, or step
//! single frames synchronously while it is paused.

#![warn(missing_docs)]

pub mod config;
pub mod error;
mod pacing;
pub mod render_loop;
pub mod state;
pub mod stats;

pub use config::RenderLoopConfig;
pub use error::RenderLoopError;
pub use render_loop::AsyncRenderLoop;
pub use state::LoopState;
pub use stats::FrameStats;
