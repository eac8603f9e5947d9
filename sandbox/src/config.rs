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

use cadence_jobs::JobSystemConfig;
use cadence_render::RenderLoopConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Complete sandbox configuration, loaded from JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SandboxConfig {
    /// Worker pool settings for background uploads.
    pub jobs: JobSystemConfig,
    /// Render loop settings.
    pub render: RenderLoopConfig,
    /// How long the sandbox renders before shutting down.
    pub run_seconds: u64,
}

impl SandboxConfig {
    /// Load the configuration from a JSON string.
    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Length of each half of the run, before and after the pause.
    pub fn phase_duration(&self) -> Duration {
        Duration::from_secs(self.run_seconds) / 2
    }

    /// Load the configuration from a JSON file.
    pub fn from_file(path: &str) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        Ok(Self::from_json(&content)?)
    }
}

impl Default for SandboxConfig {
    fn default() -> Self {
        Self {
            jobs: JobSystemConfig::default(),
            render: RenderLoopConfig::default(),
            run_seconds: 2,
        }
    }
}
