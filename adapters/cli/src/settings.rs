use std::{fs, path::Path, time::Duration};

use anyhow::{ensure, Context, Result};
use serde::Deserialize;
use theseus_core::CastConfig;

/// Runtime options loaded from an optional TOML file.
#[derive(Clone, Debug, PartialEq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct Settings {
    /// Zero-based index of the level opened on start.
    pub starting_level: u32,
    /// Simulated frame length in milliseconds.
    pub frame_ms: u64,
    /// Raises the default log filter to `debug`.
    pub debug_log: bool,
    /// Movement tuning for both characters.
    pub cast: CastConfig,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            starting_level: 0,
            frame_ms: 16,
            debug_log: false,
            cast: CastConfig::default(),
        }
    }
}

impl Settings {
    /// Loads settings from `path`, or the defaults when no path is given.
    pub(crate) fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };
        let contents = fs::read_to_string(path)
            .with_context(|| format!("failed to read settings at {}", path.display()))?;
        Self::parse(&contents)
            .with_context(|| format!("invalid settings in {}", path.display()))
    }

    pub(crate) fn parse(contents: &str) -> Result<Self> {
        let settings: Self =
            toml::from_str(contents).context("failed to parse settings toml contents")?;
        ensure!(settings.frame_ms > 0, "frame_ms must be positive");
        Ok(settings)
    }

    /// Simulated time advanced by every tick.
    pub(crate) fn frame(&self) -> Duration {
        Duration::from_millis(self.frame_ms)
    }
}
