use serde::Serialize;

use vmdeck_types::{GuestProfile, LogEntry, MetricsSample, SessionState, TerminalLine};

/// Owned, read-only copy of everything a front end shows
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SessionSnapshot {
    pub revision: u64,
    pub state: SessionState,
    pub guest: Option<GuestProfile>,
    pub metrics: MetricsSample,
    /// Bumped on every metrics tick and reset
    pub metrics_revision: u64,
    pub terminal: Vec<TerminalLine>,
    pub logs: Vec<LogEntry>,
    /// Entries dropped from the front of the bounded log so far
    pub logs_evicted: u64,
    /// `HH:MM:SS` since the current run started, zero when not running
    pub uptime: String,
}
