use std::{fs, path::Path, time::Duration};

use anyhow::{Context, Result};
use karel_system_program::DEFAULT_FUEL;
use serde::Deserialize;

/// Milliseconds to wait after each rendered frame unless configured.
const DEFAULT_STEP_DELAY_MS: u64 = 1000;

/// Session settings read from an optional TOML file.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub(crate) struct SessionConfig {
    /// Delay applied after each rendered frame, in milliseconds.
    pub(crate) step_delay_ms: u64,
    /// Suppresses frames and reports only error shutoffs.
    pub(crate) summary: bool,
    /// Statement budget for the program run.
    pub(crate) fuel: u64,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            step_delay_ms: DEFAULT_STEP_DELAY_MS,
            summary: false,
            fuel: DEFAULT_FUEL,
        }
    }
}

impl SessionConfig {
    /// Parses a configuration document.
    pub(crate) fn from_toml(source: &str) -> Result<Self> {
        toml::from_str(source).context("failed to parse session configuration")
    }

    /// Reads and parses the configuration file at `path`.
    pub(crate) fn load(path: &Path) -> Result<Self> {
        let source = fs::read_to_string(path)
            .with_context(|| format!("failed to read configuration {}", path.display()))?;
        Self::from_toml(&source).with_context(|| format!("invalid configuration {}", path.display()))
    }

    /// Applies command-line overrides on top of the file values.
    #[must_use]
    pub(crate) fn with_overrides(
        mut self,
        summary: bool,
        step_delay_ms: Option<u64>,
        fuel: Option<u64>,
    ) -> Self {
        self.summary |= summary;
        if let Some(step_delay_ms) = step_delay_ms {
            self.step_delay_ms = step_delay_ms;
        }
        if let Some(fuel) = fuel {
            self.fuel = fuel;
        }
        self
    }

    /// Delay applied after each rendered frame.
    #[must_use]
    pub(crate) const fn step_delay(&self) -> Duration {
        Duration::from_millis(self.step_delay_ms)
    }
}
