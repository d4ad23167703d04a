//! Bounded debug log shared by every emitting component.
//!
//! [`LogBuffer`] keeps at most `capacity` entries in insertion order. When
//! full, an append drops the oldest entry first and counts it as evicted;
//! `clear` empties the buffer without touching that count. Collaborators
//! write through a [`LogSink`] and never see the read side.
pub mod buffer;
pub mod sink;

pub use buffer::LogBuffer;
pub use sink::{LogSink, StampedSink};

/// Safely truncate a string to a maximum number of characters
pub fn safe_truncate(s: &str, max_chars: usize) -> String {
    if s.chars().count() <= max_chars {
        s.to_string()
    } else {
        // Reserve space for "..." suffix
        let trunc_chars = max_chars.saturating_sub(3);
        format!("{}...", s.chars().take(trunc_chars).collect::<String>())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_truncate() {
        assert_eq!(safe_truncate("short", 10), "short");
        assert_eq!(safe_truncate("Mounting file systems", 10), "Mountin...");
        assert_eq!(safe_truncate("héllo wörld", 8), "héllo...");
        assert_eq!(safe_truncate("abcdef", 2), "...");
    }
}
