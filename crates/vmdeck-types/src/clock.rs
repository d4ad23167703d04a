use chrono::{DateTime, Local};
use std::time::Duration;

/// Format a duration as `HH:MM:SS`; hours keep growing past 99
pub fn format_hms(elapsed: Duration) -> String {
    let total = elapsed.as_secs();
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let seconds = total % 60;
    format!("{:02}:{:02}:{:02}", hours, minutes, seconds)
}

/// Maps virtual elapsed time onto local wall-clock timestamps.
///
/// The origin is captured once; every timestamp is `origin + elapsed`, so a
/// session driven by a virtual clock produces timestamps that agree with it.
#[derive(Debug, Clone, Copy)]
pub struct WallClock {
    origin: DateTime<Local>,
}

impl WallClock {
    pub fn new() -> Self {
        Self::at(Local::now())
    }

    pub fn at(origin: DateTime<Local>) -> Self {
        Self { origin }
    }

    pub fn origin(&self) -> DateTime<Local> {
        self.origin
    }

    /// Local time of day for the given virtual offset, `HH:MM:SS`
    pub fn timestamp(&self, elapsed: Duration) -> String {
        let offset = chrono::Duration::from_std(elapsed).unwrap_or_else(|_| chrono::Duration::zero());
        (self.origin + offset).format("%H:%M:%S").to_string()
    }
}

impl Default for WallClock {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_format_hms() {
        assert_eq!(format_hms(Duration::ZERO), "00:00:00");
        assert_eq!(format_hms(Duration::from_millis(59_999)), "00:00:59");
        assert_eq!(format_hms(Duration::from_secs(3_723)), "01:02:03");
        assert_eq!(format_hms(Duration::from_secs(100 * 3600)), "100:00:00");
    }

    #[test]
    fn test_wall_clock_offsets_origin() {
        let origin = Local.with_ymd_and_hms(2024, 5, 1, 23, 59, 58).unwrap();
        let clock = WallClock::at(origin);
        assert_eq!(clock.timestamp(Duration::ZERO), "23:59:58");
        assert_eq!(clock.timestamp(Duration::from_millis(2_500)), "00:00:00");
    }
}
