//! Core types and structures for vmdeck
//!
//! This crate provides the data model shared by the scheduler, the generators,
//! the log aggregator and the session state machine.

use serde::{Deserialize, Serialize};
use std::time::Duration;

pub mod clock;
pub mod guest;

pub use clock::{format_hms, WallClock};
pub use guest::{CatalogError, GuestProfile, GUEST_CATALOG};

// ============================================================================
// Constants
// ============================================================================

/// Default number of entries the debug log keeps before evicting the oldest
pub const DEFAULT_LOG_CAPACITY: usize = 50;

/// Default delay between two boot transcript lines
pub const DEFAULT_BOOT_LINE_INTERVAL: Duration = Duration::from_millis(800);

/// Default metrics sampling period
pub const DEFAULT_METRICS_INTERVAL: Duration = Duration::from_millis(1000);

/// Default period of the system-activity generator
pub const DEFAULT_ACTIVITY_INTERVAL: Duration = Duration::from_millis(3000);

/// Default delay between an activity line and its synthetic command
pub const DEFAULT_FOLLOW_UP_DELAY: Duration = Duration::from_millis(1000);

/// Default chance that an activity tick is followed by a synthetic command
pub const DEFAULT_FOLLOW_UP_PROBABILITY: f64 = 0.3;

// ============================================================================
// Session State
// ============================================================================

/// Lifecycle state of the simulated machine
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionState {
    #[default]
    Idle,
    Selected,
    Running,
    Paused,
    Stopped,
}

impl SessionState {
    /// Whether generators are allowed to emit in this state
    pub fn is_running(&self) -> bool {
        matches!(self, SessionState::Running)
    }

    /// Whether the session has live or suspended generators to tear down
    pub fn is_active(&self) -> bool {
        matches!(self, SessionState::Running | SessionState::Paused)
    }
}

impl std::fmt::Display for SessionState {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionState::Idle => write!(f, "idle"),
            SessionState::Selected => write!(f, "selected"),
            SessionState::Running => write!(f, "running"),
            SessionState::Paused => write!(f, "paused"),
            SessionState::Stopped => write!(f, "stopped"),
        }
    }
}

// ============================================================================
// Log Types
// ============================================================================

/// Severity tag carried by log entries and terminal lines
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    Debug,
    Info,
    Success,
    System,
    Warn,
    Error,
}

impl LogLevel {
    /// Rank used when filtering by minimum severity
    pub fn rank(&self) -> u8 {
        match self {
            LogLevel::Debug => 0,
            LogLevel::Info => 1,
            LogLevel::Success => 2,
            LogLevel::System => 3,
            LogLevel::Warn => 4,
            LogLevel::Error => 5,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Success => "success",
            LogLevel::System => "system",
            LogLevel::Warn => "warn",
            LogLevel::Error => "error",
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for LogLevel {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_lowercase().as_str() {
            "debug" => Ok(LogLevel::Debug),
            "info" => Ok(LogLevel::Info),
            "success" => Ok(LogLevel::Success),
            "system" => Ok(LogLevel::System),
            "warn" | "warning" => Ok(LogLevel::Warn),
            "error" => Ok(LogLevel::Error),
            _ => Err(format!(
                "Invalid log level: '{}'. Valid options: debug, info, success, system, warn, error",
                s
            )),
        }
    }
}

/// One structured entry in the aggregated debug log
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    /// Wall-clock time of emission, `HH:MM:SS`
    pub timestamp: String,
    pub level: LogLevel,
    /// Name of the emitting component
    pub source: String,
    pub message: String,
}

impl LogEntry {
    pub fn new(
        timestamp: impl Into<String>,
        level: LogLevel,
        source: impl Into<String>,
        message: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: timestamp.into(),
            level,
            source: source.into(),
            message: message.into(),
        }
    }
}

/// One line of the simulated guest console
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TerminalLine {
    pub timestamp: String,
    pub level: LogLevel,
    pub message: String,
}

impl TerminalLine {
    /// Mirror this line into the debug log under the given source
    pub fn to_log_entry(&self, source: &str) -> LogEntry {
        LogEntry::new(self.timestamp.clone(), self.level, source, self.message.clone())
    }
}

// ============================================================================
// Metrics
// ============================================================================

/// Latest synthetic resource reading
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MetricsSample {
    /// CPU usage percentage
    pub cpu: f64,
    /// Memory usage percentage
    pub memory: f64,
    /// Disk usage percentage
    pub disk: f64,
    /// CPU temperature in degrees Celsius
    pub temperature: f64,
    pub network_speed: String,
    pub processes: u32,
    pub uptime: String,
}

impl MetricsSample {
    /// Reading shown whenever the machine is not running
    pub fn baseline() -> Self {
        Self {
            cpu: 0.0,
            memory: 0.0,
            disk: 0.0,
            temperature: 35.0,
            network_speed: "0 KB/s".to_string(),
            processes: 0,
            uptime: "00:00:00".to_string(),
        }
    }

    pub fn is_baseline(&self) -> bool {
        *self == Self::baseline()
    }
}

impl Default for MetricsSample {
    fn default() -> Self {
        Self::baseline()
    }
}
