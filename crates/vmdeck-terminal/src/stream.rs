use rand::seq::SliceRandom;
use rand::Rng;
use std::time::Duration;

use vmdeck_scheduler::{Scheduler, TimerHandle, TimerSet};
use vmdeck_types::{
    GuestProfile, LogLevel, TerminalLine, WallClock, DEFAULT_ACTIVITY_INTERVAL,
    DEFAULT_BOOT_LINE_INTERVAL, DEFAULT_FOLLOW_UP_DELAY, DEFAULT_FOLLOW_UP_PROBABILITY,
};

use super::pools::{ACTIVITY_POOL, COMMAND_POOL};
use super::transcript::{announcement, boot_transcript, shell_prompt};

/// Timer payloads the stream arms on the session scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminalEvent {
    /// Emit boot line `n` (zero-based)
    BootLine(usize),
    /// One period of the system-activity generator
    ActivityTick,
    /// Emit the synthetic command at this index of the command pool
    FollowUp(usize),
}

/// Cadence of the stream
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TerminalTiming {
    pub boot_line_interval: Duration,
    pub activity_interval: Duration,
    pub follow_up_delay: Duration,
    pub follow_up_probability: f64,
}

impl Default for TerminalTiming {
    fn default() -> Self {
        Self {
            boot_line_interval: DEFAULT_BOOT_LINE_INTERVAL,
            activity_interval: DEFAULT_ACTIVITY_INTERVAL,
            follow_up_delay: DEFAULT_FOLLOW_UP_DELAY,
            follow_up_probability: DEFAULT_FOLLOW_UP_PROBABILITY,
        }
    }
}

/// Simulated guest console.
///
/// Owns the visible transcript and every timer it arms. The transcript is
/// cleared on [`start`](Self::start) and kept (frozen) after
/// [`stop`](Self::stop) so the operator can still read it.
#[derive(Debug)]
pub struct TerminalStream {
    timing: TerminalTiming,
    lines: Vec<TerminalLine>,
    script: Vec<String>,
    prompt: String,
    boot_emitted: usize,
    timers: TimerSet,
    activity: Option<TimerHandle>,
    active: bool,
}

impl TerminalStream {
    pub fn new(timing: TerminalTiming) -> Self {
        Self {
            timing,
            lines: Vec::new(),
            script: Vec::new(),
            prompt: String::new(),
            boot_emitted: 0,
            timers: TimerSet::new(),
            activity: None,
            active: false,
        }
    }

    /// Begin a fresh run for `guest`.
    ///
    /// Clears the transcript, opens it with the session announcement and
    /// arms boot line `k` (one-based) at `k * boot_line_interval` from now.
    /// Returns the announcement so the caller can mirror it.
    pub fn start<E, S>(&mut self, guest: &GuestProfile, scheduler: &mut S, clock: &WallClock) -> TerminalLine
    where
        E: From<TerminalEvent>,
        S: Scheduler<E> + ?Sized,
    {
        self.stop(scheduler);
        self.lines.clear();
        self.script = boot_transcript(guest);
        self.prompt = shell_prompt(guest);
        self.boot_emitted = 0;
        self.active = true;

        for index in 0..self.script.len() {
            let delay = self.timing.boot_line_interval * (index as u32 + 1);
            self.timers
                .track(scheduler.after(delay, TerminalEvent::BootLine(index).into()));
        }
        tracing::debug!(guest = %guest.id, lines = self.script.len(), "boot transcript scheduled");

        let line = TerminalLine {
            timestamp: clock.timestamp(scheduler.now()),
            level: LogLevel::System,
            message: announcement(guest),
        };
        self.lines.push(line.clone());
        line
    }

    /// Cancel pending boot lines, the activity generator and follow-ups
    pub fn stop<E, S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler<E> + ?Sized,
    {
        self.timers.cancel_all(scheduler);
        self.activity = None;
        self.active = false;
    }

    /// Handle one fired timer. Returns the line it produced, already
    /// appended to the transcript.
    pub fn handle<E, S, R>(
        &mut self,
        event: TerminalEvent,
        scheduler: &mut S,
        rng: &mut R,
        clock: &WallClock,
    ) -> Option<TerminalLine>
    where
        E: From<TerminalEvent>,
        S: Scheduler<E> + ?Sized,
        R: Rng,
    {
        if !self.active {
            tracing::debug!(?event, "dropping terminal event for inactive stream");
            return None;
        }

        let (level, message) = match event {
            TerminalEvent::BootLine(index) => {
                let message = self.script.get(index)?.clone();
                self.boot_emitted += 1;
                let last = index + 1 == self.script.len();
                if last {
                    self.begin_activity(scheduler);
                }
                (if last { LogLevel::Success } else { LogLevel::Info }, message)
            }
            TerminalEvent::ActivityTick => {
                self.timers.prune(scheduler);
                let message = ACTIVITY_POOL.choose(rng)?.to_string();
                if rng.gen_bool(self.timing.follow_up_probability) {
                    let command = rng.gen_range(0..COMMAND_POOL.len());
                    self.timers.track(scheduler.after(
                        self.timing.follow_up_delay,
                        TerminalEvent::FollowUp(command).into(),
                    ));
                }
                (LogLevel::System, message)
            }
            TerminalEvent::FollowUp(command) => {
                let command = COMMAND_POOL.get(command)?;
                (LogLevel::Info, format!("{} {}", self.prompt, command))
            }
        };

        let line = TerminalLine {
            timestamp: clock.timestamp(scheduler.now()),
            level,
            message,
        };
        self.lines.push(line.clone());
        Some(line)
    }

    fn begin_activity<E, S>(&mut self, scheduler: &mut S)
    where
        E: From<TerminalEvent>,
        S: Scheduler<E> + ?Sized,
    {
        let handle = scheduler.every(self.timing.activity_interval, TerminalEvent::ActivityTick.into());
        self.activity = Some(self.timers.track(handle));
        tracing::debug!("boot transcript complete, activity generator armed");
    }

    pub fn lines(&self) -> &[TerminalLine] {
        &self.lines
    }

    /// Boot lines emitted since the last start
    pub fn boot_lines_emitted(&self) -> usize {
        self.boot_emitted
    }

    pub fn boot_complete(&self) -> bool {
        !self.script.is_empty() && self.boot_emitted == self.script.len()
    }

    /// Whether the periodic activity generator is armed
    #[cfg(test)]
    fn activity_running(&self) -> bool {
        self.activity.is_some()
    }
}

impl Default for TerminalStream {
    fn default() -> Self {
        Self::new(TerminalTiming::default())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::BOOT_LINE_COUNT;
    use pretty_assertions::assert_eq;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use vmdeck_scheduler::VirtualScheduler;

    struct Harness {
        sched: VirtualScheduler<TerminalEvent>,
        stream: TerminalStream,
        rng: StdRng,
        clock: WallClock,
    }

    impl Harness {
        fn new(timing: TerminalTiming) -> Self {
            Self {
                sched: VirtualScheduler::new(),
                stream: TerminalStream::new(timing),
                rng: StdRng::seed_from_u64(42),
                clock: WallClock::new(),
            }
        }

        fn start(&mut self, id: &str) -> TerminalLine {
            let guest = GuestProfile::from_catalog(id).unwrap();
            self.stream.start(&guest, &mut self.sched, &self.clock)
        }

        fn advance_to(&mut self, ms: u64) {
            let Self { sched, stream, rng, clock } = self;
            sched.advance_to(Duration::from_millis(ms), |sched, fired| {
                stream.handle(fired.event, sched, rng, clock);
            });
        }
    }

    #[test]
    fn test_boot_lines_arrive_one_per_interval() {
        let mut h = Harness::new(TerminalTiming::default());
        let announcement = h.start("ubuntu");
        assert_eq!(announcement.level, LogLevel::System);
        assert_eq!(announcement.message, "=== Starting Ubuntu Emulation ===");
        assert_eq!(h.stream.lines(), &[announcement]);

        h.advance_to(799);
        assert_eq!(h.stream.boot_lines_emitted(), 0);
        h.advance_to(800);
        assert_eq!(h.stream.boot_lines_emitted(), 1);
        assert_eq!(h.stream.lines()[1].message, "GRUB loading...");
        h.advance_to(7_200);
        assert_eq!(h.stream.boot_lines_emitted(), 9);
        assert_eq!(h.stream.lines().len(), 10);
        assert!(h.stream.lines()[1..].iter().all(|l| l.level == LogLevel::Info));
        assert!(!h.stream.boot_complete());

        h.advance_to(8_000);
        assert_eq!(h.stream.boot_lines_emitted(), BOOT_LINE_COUNT);
        assert_eq!(h.stream.lines().last().unwrap().level, LogLevel::Success);
        assert!(h.stream.activity_running());
    }

    #[test]
    fn test_activity_follows_boot() {
        let timing = TerminalTiming {
            follow_up_probability: 0.0,
            ..TerminalTiming::default()
        };
        let mut h = Harness::new(timing);
        h.start("linux-mint");

        h.advance_to(8_000 + 3_000 * 4);
        // announcement plus the boot transcript come first
        let activity: Vec<&TerminalLine> = h.stream.lines()[BOOT_LINE_COUNT + 1..].iter().collect();
        assert_eq!(activity.len(), 4);
        for line in activity {
            assert_eq!(line.level, LogLevel::System);
            assert!(ACTIVITY_POOL.contains(&line.message.as_str()));
        }
    }

    #[test]
    fn test_follow_up_command_lands_after_delay() {
        let timing = TerminalTiming {
            follow_up_probability: 1.0,
            ..TerminalTiming::default()
        };
        let mut h = Harness::new(timing);
        h.start("ubuntu");

        h.advance_to(11_000);
        assert_eq!(h.stream.lines().len(), BOOT_LINE_COUNT + 2);
        h.advance_to(12_000);
        let command = h.stream.lines().last().unwrap();
        assert_eq!(command.level, LogLevel::Info);
        assert!(command.message.starts_with("guest@ubuntu:~$ "));
        let typed = command.message.trim_start_matches("guest@ubuntu:~$ ");
        assert!(COMMAND_POOL.contains(&typed));
    }

    #[test]
    fn test_stop_cancels_everything() {
        let timing = TerminalTiming {
            follow_up_probability: 1.0,
            ..TerminalTiming::default()
        };
        let mut h = Harness::new(timing);
        h.start("ubuntu");
        // activity tick at 11s armed a follow-up for 12s
        h.advance_to(11_500);
        let before = h.stream.lines().len();

        h.stream.stop(&mut h.sched);
        assert_eq!(h.sched.pending(), 0);
        h.advance_to(60_000);
        assert_eq!(h.stream.lines().len(), before);
        assert!(!h.stream.activity_running());
    }

    #[test]
    fn test_restart_clears_transcript() {
        let mut h = Harness::new(TerminalTiming::default());
        h.start("ubuntu");
        h.advance_to(4_000);
        assert_eq!(h.stream.lines().len(), 6);

        h.start("ubuntu");
        assert_eq!(h.stream.lines().len(), 1);
        assert_eq!(h.stream.lines()[0].level, LogLevel::System);
        assert_eq!(h.stream.boot_lines_emitted(), 0);
        h.advance_to(4_800);
        assert_eq!(h.stream.lines().len(), 2);
        assert_eq!(h.stream.lines()[1].message, "GRUB loading...");
        assert_eq!(h.sched.pending(), BOOT_LINE_COUNT - 1);
    }
}
