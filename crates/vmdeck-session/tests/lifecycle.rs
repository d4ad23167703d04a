use pretty_assertions::assert_eq;
use proptest::prelude::*;
use std::time::Duration;

use vmdeck_session::{
    transition, Action, GuestProfile, LogLevel, MetricsSample, NullBinding, Session,
    SessionConfig, SessionError, SessionState,
};
use vmdeck_telemetry::{CPU_RANGE, DISK_RANGE, MEMORY_RANGE, TEMPERATURE_RANGE};
use vmdeck_terminal::{ACTIVITY_POOL, BOOT_LINE_COUNT};

fn session_with(config: SessionConfig) -> Session {
    Session::new(config).unwrap().with_binding(Box::new(NullBinding))
}

fn seeded() -> Session {
    session_with(SessionConfig::default().with_seed(2024))
}

fn guest(id: &str) -> GuestProfile {
    GuestProfile::from_catalog(id).unwrap()
}

fn ms(value: u64) -> Duration {
    Duration::from_millis(value)
}

#[derive(Debug, Clone)]
enum Step {
    Select(usize),
    Start,
    Pause,
    Reset,
    Stop,
    Advance(u64),
}

fn step() -> impl Strategy<Value = Step> {
    prop_oneof![
        (0usize..3).prop_map(Step::Select),
        Just(Step::Start),
        Just(Step::Pause),
        Just(Step::Reset),
        Just(Step::Stop),
        (0u64..5_000).prop_map(Step::Advance),
    ]
}

proptest! {
    #[test]
    fn replay_matches_transition_table(steps in prop::collection::vec(step(), 0..40)) {
        let catalog = GuestProfile::catalog();
        let mut session = seeded();
        let mut model = SessionState::Idle;
        let mut has_guest = false;

        for step in steps {
            let (action, result) = match step {
                Step::Select(i) => (Action::Select, session.select_guest(catalog[i].clone())),
                Step::Start => (Action::Start, session.start()),
                Step::Pause => (Action::Pause, session.pause()),
                Step::Reset => (Action::Reset, session.reset()),
                Step::Stop => (Action::Stop, session.stop()),
                Step::Advance(delta) => {
                    session.advance_by(ms(delta));
                    prop_assert_eq!(session.state(), model);
                    continue;
                }
            };

            match transition(model, action, has_guest) {
                Ok(next) => {
                    prop_assert!(result.is_ok());
                    model = next;
                    has_guest |= action == Action::Select;
                }
                Err(expected) => prop_assert_eq!(result, Err(expected)),
            }
            prop_assert_eq!(session.state(), model);
            if !model.is_running() {
                prop_assert_eq!(session.metrics(), &MetricsSample::baseline());
            }
        }
    }

    #[test]
    fn metrics_stay_within_bounds(seed in any::<u64>(), seconds in 1u64..600) {
        let mut session = session_with(SessionConfig::default().with_seed(seed));
        session.select_guest(guest("ubuntu")).unwrap();
        session.start().unwrap();

        for _ in 0..seconds {
            session.advance_by(ms(1_000));
            let m = session.metrics();
            prop_assert!(m.cpu >= CPU_RANGE.0 && m.cpu <= CPU_RANGE.1);
            prop_assert!(m.memory >= MEMORY_RANGE.0 && m.memory <= MEMORY_RANGE.1);
            prop_assert!(m.disk >= DISK_RANGE.0 && m.disk <= DISK_RANGE.1);
            prop_assert!(m.temperature >= TEMPERATURE_RANGE.0 && m.temperature <= TEMPERATURE_RANGE.1);
            prop_assert!((120..170).contains(&m.processes));
            let speed: u32 = m.network_speed.trim_end_matches(" KB/s").parse().unwrap();
            prop_assert!(speed < 1000);
        }
    }
}

#[test]
fn start_without_guest_is_rejected() {
    let mut session = seeded();
    let err = session.start().unwrap_err();
    assert!(matches!(
        err,
        SessionError::InvalidTransition { action: Action::Start, state: SessionState::Idle, .. }
    ));
    assert_eq!(session.state(), SessionState::Idle);
    assert_eq!(session.pending_timers(), 0);
}

#[test]
fn log_buffer_keeps_last_entries() {
    let config = SessionConfig {
        log_capacity: 5,
        ..SessionConfig::default().with_seed(1)
    };
    let mut session = session_with(config);
    for i in 0..12 {
        session.log("Test", LogLevel::Debug, format!("entry {}", i));
    }

    let messages: Vec<String> = session.logs().iter().map(|e| e.message.clone()).collect();
    assert_eq!(messages, vec!["entry 7", "entry 8", "entry 9", "entry 10", "entry 11"]);
    assert_eq!(session.snapshot().logs_evicted, 7);

    session.clear_logs();
    assert_eq!(session.logs().len(), 0);
    assert_eq!(session.snapshot().logs_evicted, 7);
    session.clear_logs();
    assert_eq!(session.logs().len(), 0);
}

#[test]
fn running_entry_starts_from_baseline() {
    let mut session = seeded();
    session.select_guest(guest("ubuntu")).unwrap();
    session.start().unwrap();
    session.advance_by(ms(5_000));
    assert!(!session.metrics().is_baseline());

    session.pause().unwrap();
    session.start().unwrap();
    assert_eq!(session.metrics(), &MetricsSample::baseline());
    assert_eq!(session.metrics_ticks(), 0);

    session.advance_by(ms(999));
    assert_eq!(session.metrics(), &MetricsSample::baseline());
    session.advance_by(ms(1));
    assert_eq!(session.metrics_ticks(), 1);
    assert_eq!(session.metrics().uptime, "00:00:01");
}

#[test]
fn ubuntu_boot_is_nine_lines_in_at_7200ms() {
    let mut session = seeded();
    session.select_guest(guest("ubuntu")).unwrap();
    session.start().unwrap();
    session.advance_by(ms(7_200));

    assert_eq!(session.boot_lines_emitted(), 9);
    let lines = session.terminal_lines();
    assert_eq!(lines[0].message, "=== Starting Ubuntu Emulation ===");
    assert_eq!(lines[0].level, LogLevel::System);
    assert!(lines[1..].iter().all(|l| l.level == LogLevel::Info));
    assert!(!lines.iter().any(|l| l.level == LogLevel::Success));

    session.advance_by(ms(800));
    assert_eq!(session.boot_lines_emitted(), BOOT_LINE_COUNT);
    assert_eq!(session.terminal_lines().len(), BOOT_LINE_COUNT + 1);
    assert_eq!(session.terminal_lines()[BOOT_LINE_COUNT].level, LogLevel::Success);
    assert!(session.boot_complete());
}

#[test]
fn early_pause_freezes_everything() {
    let mut session = seeded();
    session.select_guest(guest("ubuntu")).unwrap();
    session.start().unwrap();
    session.advance_by(ms(500));
    session.pause().unwrap();

    assert_eq!(session.boot_lines_emitted(), 0);
    assert_eq!(session.terminal_lines().len(), 1);
    assert_eq!(session.metrics_ticks(), 0);
    assert_eq!(session.pending_timers(), 0);

    session.advance_by(ms(10_000));
    assert_eq!(session.boot_lines_emitted(), 0);
    assert_eq!(session.terminal_lines().len(), 1);
    assert_eq!(session.metrics_ticks(), 0);
    assert!(session.metrics().is_baseline());
}

#[test]
fn stop_after_boot_silences_activity() {
    let mut session = seeded();
    session.select_guest(guest("linux-mint")).unwrap();
    session.start().unwrap();
    session.advance_by(ms(8_000 + 3_000 * 3));
    assert!(session.terminal_lines().len() > BOOT_LINE_COUNT + 1);
    assert!(session.terminal_lines()[BOOT_LINE_COUNT + 1..]
        .iter()
        .filter(|l| l.level == LogLevel::System)
        .all(|l| ACTIVITY_POOL.contains(&l.message.as_str())));

    session.stop().unwrap();
    let transcript = session.terminal_lines().to_vec();
    let log_len = session.logs().len();

    session.advance_by(ms(3_000 * 10));
    assert_eq!(session.terminal_lines(), transcript.as_slice());
    assert_eq!(session.logs().len(), log_len);
    assert_eq!(session.state(), SessionState::Stopped);
}

#[test]
fn terminal_lines_are_mirrored_into_the_log() {
    let mut session = seeded();
    session.select_guest(guest("windows-10")).unwrap();
    session.start().unwrap();
    session.advance_by(ms(8_000));

    let mirrored: Vec<String> = session
        .logs()
        .iter()
        .filter(|e| e.source == "Terminal")
        .map(|e| e.message.clone())
        .collect();
    assert_eq!(mirrored.len(), BOOT_LINE_COUNT + 1);
    assert_eq!(mirrored[0], "=== Starting Windows 10 Emulation ===");
    assert_eq!(mirrored[2], "Loading NT kernel...");
    assert_eq!(mirrored.last().map(String::as_str), Some("C:\\Users\\guest> "));
}

#[test]
fn announcement_opens_the_transcript() {
    let mut session = seeded();
    session.select_guest(guest("ubuntu")).unwrap();
    session.start().unwrap();

    let lines = session.terminal_lines();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].level, LogLevel::System);
    assert_eq!(lines[0].message, "=== Starting Ubuntu Emulation ===");

    session.advance_by(ms(800));
    let transcript: Vec<&str> = session.terminal_lines().iter().map(|l| l.message.as_str()).collect();
    assert_eq!(transcript, vec!["=== Starting Ubuntu Emulation ===", "GRUB loading..."]);

    let mirrored = session
        .logs()
        .iter()
        .filter(|e| e.source == "Terminal" && e.message == "=== Starting Ubuntu Emulation ===")
        .count();
    assert_eq!(mirrored, 1);
}

#[test]
fn fixed_seed_is_deterministic() {
    let run = || {
        let mut session = seeded();
        session.select_guest(guest("ubuntu")).unwrap();
        session.start().unwrap();
        session.advance_by(ms(60_000));
        (session.metrics().clone(), session.terminal_lines().to_vec())
    };
    assert_eq!(run(), run());
}

#[test]
fn snapshot_serializes_for_front_ends() {
    let mut session = seeded();
    session.select_guest(guest("ubuntu")).unwrap();
    session.start().unwrap();
    session.advance_by(ms(1_600));

    let value = serde_json::to_value(session.snapshot()).unwrap();
    assert_eq!(value["state"], "running");
    assert_eq!(value["guest"]["displayName"], "Ubuntu");
    assert_eq!(value["uptime"], "00:00:01");
    assert_eq!(value["terminal"].as_array().map(Vec::len), Some(3));
    assert_eq!(value["terminal"][0]["level"], "system");
    assert_eq!(value["terminal"][1]["level"], "info");
    assert_eq!(value["logs_evicted"], 0);
    assert!(value["metrics"]["networkSpeed"].as_str().unwrap().ends_with(" KB/s"));
}
