use anyhow::{bail, Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use std::time::Duration;

use vmdeck_session::SessionConfig;

/// Default period of the runner's real-time drive
pub const DEFAULT_TICK_MS: u64 = 100;

/// Settings of the `vmdeck` binary
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct AppConfig {
    pub session: SessionConfig,
    /// How often the runner maps elapsed wall time onto the session
    pub tick_ms: u64,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            session: SessionConfig::default(),
            tick_ms: DEFAULT_TICK_MS,
        }
    }
}

impl AppConfig {
    /// Load from `path`, or fall back to defaults when no file is given
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let Some(path) = path else {
            return Ok(Self::default());
        };

        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        Self::from_toml_str(&contents)
            .with_context(|| format!("Invalid config file {}", path.display()))
    }

    pub fn from_toml_str(input: &str) -> Result<Self> {
        let config: AppConfig = toml::from_str(input).context("Failed to parse TOML")?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        if self.tick_ms == 0 {
            bail!("tick_ms must be greater than zero");
        }
        self.session.validate()?;
        Ok(())
    }

    pub fn tick(&self) -> Duration {
        Duration::from_millis(self.tick_ms)
    }
}
