use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

use vmdeck_terminal::TerminalTiming;
use vmdeck_types::{
    DEFAULT_ACTIVITY_INTERVAL, DEFAULT_BOOT_LINE_INTERVAL, DEFAULT_FOLLOW_UP_DELAY,
    DEFAULT_FOLLOW_UP_PROBABILITY, DEFAULT_LOG_CAPACITY, DEFAULT_METRICS_INTERVAL,
};

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("invalid value for '{field}': {reason}")]
    InvalidValue { field: &'static str, reason: String },

    #[error("failed to parse session config: {0}")]
    Parse(#[from] toml::de::Error),
}

/// Tunables of one session. Every field has a default, so an empty TOML
/// table is a valid config.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct SessionConfig {
    pub log_capacity: usize,
    pub boot_line_interval_ms: u64,
    pub metrics_interval_ms: u64,
    pub activity_interval_ms: u64,
    pub follow_up_delay_ms: u64,
    pub follow_up_probability: f64,
    /// Fixed RNG seed; drawn from entropy when absent
    pub seed: Option<u64>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            log_capacity: DEFAULT_LOG_CAPACITY,
            boot_line_interval_ms: DEFAULT_BOOT_LINE_INTERVAL.as_millis() as u64,
            metrics_interval_ms: DEFAULT_METRICS_INTERVAL.as_millis() as u64,
            activity_interval_ms: DEFAULT_ACTIVITY_INTERVAL.as_millis() as u64,
            follow_up_delay_ms: DEFAULT_FOLLOW_UP_DELAY.as_millis() as u64,
            follow_up_probability: DEFAULT_FOLLOW_UP_PROBABILITY,
            seed: None,
        }
    }
}

impl SessionConfig {
    pub fn from_toml_str(input: &str) -> Result<Self, ConfigError> {
        let config: SessionConfig = toml::from_str(input)?;
        config.validate()?;
        Ok(config)
    }

    pub fn with_seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.log_capacity == 0 {
            return Err(ConfigError::InvalidValue {
                field: "log_capacity",
                reason: "must be at least 1".to_string(),
            });
        }

        let intervals = [
            ("boot_line_interval_ms", self.boot_line_interval_ms),
            ("metrics_interval_ms", self.metrics_interval_ms),
            ("activity_interval_ms", self.activity_interval_ms),
            ("follow_up_delay_ms", self.follow_up_delay_ms),
        ];
        for (field, value) in intervals {
            if value == 0 {
                return Err(ConfigError::InvalidValue {
                    field,
                    reason: "must be greater than zero".to_string(),
                });
            }
        }

        if !(0.0..=1.0).contains(&self.follow_up_probability) {
            return Err(ConfigError::InvalidValue {
                field: "follow_up_probability",
                reason: format!("{} is outside [0, 1]", self.follow_up_probability),
            });
        }

        Ok(())
    }

    pub fn metrics_interval(&self) -> Duration {
        Duration::from_millis(self.metrics_interval_ms)
    }

    pub fn terminal_timing(&self) -> TerminalTiming {
        TerminalTiming {
            boot_line_interval: Duration::from_millis(self.boot_line_interval_ms),
            activity_interval: Duration::from_millis(self.activity_interval_ms),
            follow_up_delay: Duration::from_millis(self.follow_up_delay_ms),
            follow_up_probability: self.follow_up_probability,
        }
    }
}
