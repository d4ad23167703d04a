use vmdeck_types::{LogEntry, LogLevel};

use super::LogBuffer;

/// Narrow write-only view of the debug log handed to collaborators
pub trait LogSink {
    fn emit(&mut self, level: LogLevel, source: &str, message: &str);

    fn info(&mut self, source: &str, message: &str) {
        self.emit(LogLevel::Info, source, message);
    }

    fn error(&mut self, source: &str, message: &str) {
        self.emit(LogLevel::Error, source, message);
    }
}

/// Writes into a [`LogBuffer`] with a fixed timestamp
pub struct StampedSink<'a> {
    buffer: &'a mut LogBuffer,
    timestamp: String,
}

impl<'a> StampedSink<'a> {
    pub fn new(buffer: &'a mut LogBuffer, timestamp: impl Into<String>) -> Self {
        Self {
            buffer,
            timestamp: timestamp.into(),
        }
    }
}

impl LogSink for StampedSink<'_> {
    fn emit(&mut self, level: LogLevel, source: &str, message: &str) {
        self.buffer
            .append(LogEntry::new(self.timestamp.clone(), level, source, message));
    }
}

impl LogSink for LogBuffer {
    /// Entries written without a clock carry an empty timestamp
    fn emit(&mut self, level: LogLevel, source: &str, message: &str) {
        self.append(LogEntry::new(String::new(), level, source, message));
    }
}
