use colored::{ColoredString, Colorize};

use vmdeck_logging::safe_truncate;
use vmdeck_session::{GuestProfile, LogEntry, LogLevel, MetricsSample, SessionSnapshot, TerminalLine};
use vmdeck_telemetry::{Gauge, Health};

/// Longest log message printed before truncation
const MAX_MESSAGE_CHARS: usize = 160;

pub fn paint(level: LogLevel, text: &str) -> ColoredString {
    match level {
        LogLevel::Debug => text.bright_black(),
        LogLevel::Info => text.normal(),
        LogLevel::Success => text.green(),
        LogLevel::System => text.cyan(),
        LogLevel::Warn => text.yellow(),
        LogLevel::Error => text.red().bold(),
    }
}

pub fn terminal_line(line: &TerminalLine) -> String {
    format!("{} {}", format!("[{}]", line.timestamp).bright_black(), paint(line.level, &line.message))
}

pub fn log_entry(entry: &LogEntry) -> String {
    let tag = format!("{:<7}", entry.level.as_str().to_uppercase());
    format!(
        "{} {} {} {}",
        format!("[{}]", entry.timestamp).bright_black(),
        paint(entry.level, &tag),
        format!("{}:", entry.source).bold(),
        safe_truncate(&entry.message, MAX_MESSAGE_CHARS)
    )
}

fn gauge(gauge: Gauge, sample: &MetricsSample) -> String {
    let value = gauge.read(sample);
    let text = format!("{:>6.1}{}", value, gauge.unit());
    let painted = match gauge.health(sample) {
        Health::Normal => text.green(),
        Health::Warn => text.yellow(),
        Health::Danger => text.red().bold(),
    };
    format!("{:<16} {}", gauge.label(), painted)
}

pub fn metrics(sample: &MetricsSample) -> Vec<String> {
    let mut lines: Vec<String> = Gauge::ALL.iter().map(|g| gauge(*g, sample)).collect();
    lines.push(format!("{:<16} {}", "Network", sample.network_speed));
    lines.push(format!("{:<16} {}", "Processes", sample.processes));
    lines.push(format!("{:<16} {}", "Uptime", sample.uptime));
    lines
}

pub fn status(snapshot: &SessionSnapshot) -> String {
    let guest = snapshot
        .guest
        .as_ref()
        .map(|g| g.display_name.clone())
        .unwrap_or_else(|| "none".to_string());
    let state = match snapshot.state {
        s if s.is_running() => s.to_string().green().bold(),
        s if s.is_active() => s.to_string().yellow().bold(),
        s => s.to_string().bright_black().bold(),
    };
    let mut line = format!(
        "State: {}  Guest: {}  Uptime: {}  Terminal lines: {}  Log entries: {}",
        state,
        guest.bright_white(),
        snapshot.uptime,
        snapshot.terminal.len(),
        snapshot.logs.len()
    );
    if snapshot.logs_evicted > 0 {
        line.push_str(&format!(" ({} dropped)", snapshot.logs_evicted));
    }
    line
}

pub fn guest(profile: &GuestProfile) -> String {
    format!("  {:<12} {:<12} {}", profile.id.bright_cyan(), profile.display_name, profile.description.bright_black())
}
