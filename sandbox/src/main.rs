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

// Cadence Sandbox
// Runs a render loop whose frames submit background uploads to a job queue.

mod config;

use anyhow::{Context, Result};
use cadence_core::FrameRenderer;
use cadence_jobs::AsyncJobQueue;
use cadence_render::AsyncRenderLoop;
use config::SandboxConfig;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread;
use std::time::Duration;

/// Simulated per-frame upload work.
const UPLOAD_COST: Duration = Duration::from_micros(500);

struct SandboxRenderer {
    queue: Arc<AsyncJobQueue>,
    uploads: Arc<AtomicUsize>,
    frame: u64,
}

impl FrameRenderer for SandboxRenderer {
    fn render_frame(&mut self, elapsed: Duration) -> Result<()> {
        self.frame += 1;

        let uploads = Arc::clone(&self.uploads);
        self.queue.push_job(move || {
            thread::sleep(UPLOAD_COST);
            uploads.fetch_add(1, Ordering::Relaxed);
        });

        if self.frame % 60 == 0 {
            log::info!("Frame {} ({:.2} ms since previous).", self.frame, elapsed.as_secs_f64() * 1000.0);
        }
        Ok(())
    }

    fn cleanup(&mut self) {
        log::info!("Releasing render resources after {} frames.", self.frame);
    }
}

fn main() -> Result<()> {
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info")).init();

    let mut args = std::env::args().skip(1);
    let config = match args.next().as_deref() {
        Some("--print-config") => {
            println!("{}", serde_json::to_string_pretty(&SandboxConfig::default())?);
            return Ok(());
        }
        Some(path) => SandboxConfig::from_file(path)
            .with_context(|| format!("failed to load sandbox config from '{path}'"))?,
        None => SandboxConfig::default(),
    };
    log::info!("Cadence sandbox starting with {config:?}");

    let queue = Arc::new(AsyncJobQueue::with_config(&config.jobs)?);
    let uploads = Arc::new(AtomicUsize::new(0));
    let renderer = SandboxRenderer {
        queue: Arc::clone(&queue),
        uploads: Arc::clone(&uploads),
        frame: 0,
    };

    let render_loop = AsyncRenderLoop::new(renderer, &config.render)?;
    let half_run = config.phase_duration();

    render_loop.begin_rendering()?;
    thread::sleep(half_run);

    // Single-step a few frames while the loop is suspended.
    render_loop.pause()?;
    for _ in 0..3 {
        render_loop.render_sync_frame(Duration::from_millis(16))?;
    }
    render_loop.resume()?;

    render_loop.enable_vsync(!render_loop.is_vsync_enabled());
    thread::sleep(half_run);
    render_loop.end_rendering();

    let stats = render_loop.frame_stats();
    log::info!(
        "Rendered {} frames, average {:.3} ms, last {:.3} ms.",
        stats.frames_rendered,
        stats.average_frame_time.as_secs_f64() * 1000.0,
        stats.last_frame_time.as_secs_f64() * 1000.0
    );

    drop(render_loop);

    if !queue.wait_all(Duration::from_secs(5)) {
        log::warn!("{} upload job(s) still pending at exit.", queue.pending_jobs());
    }
    log::info!(
        "Completed {} uploads ({} failed).",
        uploads.load(Ordering::Relaxed),
        queue.pool().failed_jobs()
    );

    Ok(())
}
