use std::collections::VecDeque;

use vmdeck_types::{LogEntry, LogLevel, DEFAULT_LOG_CAPACITY};

/// Ordered debug log with a fixed capacity.
///
/// Appending past capacity evicts the oldest entries; survivors keep their
/// insertion order. Appending never fails.
#[derive(Debug, Clone)]
pub struct LogBuffer {
    entries: VecDeque<LogEntry>,
    capacity: usize,
    evicted: u64,
}

impl LogBuffer {
    /// Create a buffer holding at most `capacity` entries (at least one)
    pub fn new(capacity: usize) -> Self {
        let capacity = capacity.max(1);
        Self {
            entries: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
        }
    }

    pub fn append(&mut self, entry: LogEntry) {
        self.entries.push_back(entry);
        while self.entries.len() > self.capacity {
            self.entries.pop_front();
            self.evicted += 1;
        }
    }

    /// Drop every entry. Eviction accounting is kept.
    pub fn clear(&mut self) {
        let dropped = self.entries.len();
        self.entries.clear();
        tracing::debug!(dropped, "debug log cleared");
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Entries lost to overflow since construction
    pub fn evicted(&self) -> u64 {
        self.evicted
    }

    pub fn iter(&self) -> impl DoubleEndedIterator<Item = &LogEntry> + ExactSizeIterator {
        self.entries.iter()
    }

    pub fn latest(&self) -> Option<&LogEntry> {
        self.entries.back()
    }

    /// Owned copy in insertion order
    pub fn snapshot(&self) -> Vec<LogEntry> {
        self.entries.iter().cloned().collect()
    }

    /// The newest `n` entries, oldest first
    pub fn tail(&self, n: usize) -> Vec<LogEntry> {
        let skip = self.entries.len().saturating_sub(n);
        self.entries.iter().skip(skip).cloned().collect()
    }

    /// Entries at or above `min` severity
    pub fn filter_level(&self, min: LogLevel) -> Vec<LogEntry> {
        self.entries
            .iter()
            .filter(|entry| entry.level.rank() >= min.rank())
            .cloned()
            .collect()
    }
}

impl Default for LogBuffer {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAPACITY)
    }
}
