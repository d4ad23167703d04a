use rand::rngs::StdRng;
use rand::SeedableRng;
use std::time::Duration;

use vmdeck_logging::{LogBuffer, StampedSink};
use vmdeck_scheduler::{Scheduler, VirtualScheduler};
use vmdeck_telemetry::TelemetryGenerator;
use vmdeck_terminal::{TerminalEvent, TerminalStream, TERMINAL_SOURCE};
use vmdeck_types::{
    format_hms, GuestProfile, LogEntry, LogLevel, MetricsSample, SessionState, TerminalLine,
    WallClock,
};

use crate::binding::{EmulatorBinding, SimulatedDisplay};
use crate::config::{ConfigError, SessionConfig};
use crate::error::SessionError;
use crate::snapshot::SessionSnapshot;
use crate::transition::{transition, Action};
use crate::{CONTROLS_SOURCE, SELECTOR_SOURCE};

/// Everything the session arms on its scheduler
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionEvent {
    Terminal(TerminalEvent),
    MetricsTick,
}

impl From<TerminalEvent> for SessionEvent {
    fn from(event: TerminalEvent) -> Self {
        SessionEvent::Terminal(event)
    }
}

/// One simulated machine.
///
/// Owns the lifecycle state, the selected guest, the virtual timeline, both
/// generators and the debug log. Nothing runs on its own: time moves only
/// through [`advance_to`](Self::advance_to) / [`advance_by`](Self::advance_by).
pub struct Session {
    config: SessionConfig,
    state: SessionState,
    guest: Option<GuestProfile>,
    scheduler: VirtualScheduler<SessionEvent>,
    telemetry: TelemetryGenerator,
    terminal: TerminalStream,
    logs: LogBuffer,
    binding: Box<dyn EmulatorBinding>,
    rng: StdRng,
    clock: WallClock,
    revision: u64,
    metrics_revision: u64,
}

impl Session {
    pub fn new(config: SessionConfig) -> Result<Self, ConfigError> {
        config.validate()?;

        let rng = match config.seed {
            Some(seed) => StdRng::seed_from_u64(seed),
            None => StdRng::from_entropy(),
        };

        Ok(Self {
            state: SessionState::Idle,
            guest: None,
            scheduler: VirtualScheduler::new(),
            telemetry: TelemetryGenerator::new(config.metrics_interval()),
            terminal: TerminalStream::new(config.terminal_timing()),
            logs: LogBuffer::new(config.log_capacity),
            binding: Box::new(SimulatedDisplay::new()),
            rng,
            clock: WallClock::new(),
            revision: 0,
            metrics_revision: 0,
            config,
        })
    }

    pub fn with_binding(mut self, binding: Box<dyn EmulatorBinding>) -> Self {
        self.binding = binding;
        self
    }

    /// Anchor timestamps to a fixed wall-clock origin
    pub fn with_clock(mut self, clock: WallClock) -> Self {
        self.clock = clock;
        self
    }

    // ------------------------------------------------------------------------
    // Operator actions
    // ------------------------------------------------------------------------

    /// Choose the guest. Allowed from any state; a running or paused machine
    /// is torn down first.
    pub fn select_guest(&mut self, guest: GuestProfile) -> Result<(), SessionError> {
        let next = self.check(Action::Select)?;
        if self.state.is_active() {
            tracing::info!(from = %self.state, "re-selection tears down the current run");
            self.teardown();
        }

        self.record(
            LogLevel::Info,
            SELECTOR_SOURCE,
            format!("Operating system selected: {}", guest.display_name),
        );
        tracing::info!(guest = %guest.id, "guest selected");
        self.guest = Some(guest);
        self.state = next;
        Ok(())
    }

    pub fn start(&mut self) -> Result<(), SessionError> {
        self.check(Action::Start)?;
        if let Some(guest) = &self.guest {
            let message = format!("Starting emulator for {}", guest.id);
            self.record(LogLevel::Info, CONTROLS_SOURCE, message);
        }
        self.enter_running();
        Ok(())
    }

    pub fn pause(&mut self) -> Result<(), SessionError> {
        let next = self.check(Action::Pause)?;
        self.teardown();
        self.state = next;
        self.record(LogLevel::Info, CONTROLS_SOURCE, "Emulator paused");
        tracing::info!("session paused");
        Ok(())
    }

    /// Restart the run from the first boot line. Works from any state once a
    /// guest is selected.
    pub fn reset(&mut self) -> Result<(), SessionError> {
        self.check(Action::Reset)?;
        self.record(LogLevel::Info, CONTROLS_SOURCE, "Emulator reset requested");
        if self.state.is_active() {
            self.teardown();
        }
        self.enter_running();
        Ok(())
    }

    pub fn stop(&mut self) -> Result<(), SessionError> {
        let next = self.check(Action::Stop)?;
        self.teardown();
        self.state = next;
        self.record(LogLevel::System, CONTROLS_SOURCE, "Emulator stopped");
        tracing::info!("session stopped");
        Ok(())
    }

    /// Empty the debug log. Metrics and transcript are untouched.
    pub fn clear_logs(&mut self) {
        self.logs.clear();
        self.revision += 1;
    }

    /// Append an entry on behalf of an external collaborator
    pub fn log(&mut self, source: &str, level: LogLevel, message: impl Into<String>) {
        self.record(level, source, message);
    }

    // ------------------------------------------------------------------------
    // Timeline
    // ------------------------------------------------------------------------

    /// Fire every timer due at or before `deadline`, one at a time. Returns
    /// the number of events delivered.
    pub fn advance_to(&mut self, deadline: Duration) -> usize {
        let mut delivered = 0;
        while let Some(fired) = self.scheduler.pop_due(deadline) {
            self.dispatch(fired.event);
            delivered += 1;
        }
        self.scheduler.settle(deadline);
        delivered
    }

    pub fn advance_by(&mut self, delta: Duration) -> usize {
        let deadline = self.now() + delta;
        self.advance_to(deadline)
    }

    /// Position on the virtual timeline
    pub fn now(&self) -> Duration {
        self.scheduler.now()
    }

    /// Deadline of the next armed timer
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.scheduler.next_deadline()
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    // ------------------------------------------------------------------------
    // Read side
    // ------------------------------------------------------------------------

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn guest(&self) -> Option<&GuestProfile> {
        self.guest.as_ref()
    }

    pub fn metrics(&self) -> &MetricsSample {
        self.telemetry.sample()
    }

    /// Samples produced since the current run started
    pub fn metrics_ticks(&self) -> u64 {
        self.telemetry.ticks()
    }

    pub fn terminal_lines(&self) -> &[TerminalLine] {
        self.terminal.lines()
    }

    /// Boot lines out since the current run started
    pub fn boot_lines_emitted(&self) -> usize {
        self.terminal.boot_lines_emitted()
    }

    pub fn boot_complete(&self) -> bool {
        self.terminal.boot_complete()
    }

    pub fn logs(&self) -> &LogBuffer {
        &self.logs
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn binding_name(&self) -> &str {
        self.binding.name()
    }

    /// Bumped on every change a front end could render
    pub fn revision(&self) -> u64 {
        self.revision
    }

    pub fn metrics_revision(&self) -> u64 {
        self.metrics_revision
    }

    /// Time since the current run started, zero when not running
    pub fn uptime(&self) -> Duration {
        match self.telemetry.started_at() {
            Some(started_at) => self.now().saturating_sub(started_at),
            None => Duration::ZERO,
        }
    }

    pub fn snapshot(&self) -> SessionSnapshot {
        SessionSnapshot {
            revision: self.revision,
            state: self.state,
            guest: self.guest.clone(),
            metrics: self.telemetry.sample().clone(),
            metrics_revision: self.metrics_revision,
            terminal: self.terminal.lines().to_vec(),
            logs: self.logs.snapshot(),
            logs_evicted: self.logs.evicted(),
            uptime: format_hms(self.uptime()),
        }
    }

    // ------------------------------------------------------------------------
    // Internals
    // ------------------------------------------------------------------------

    /// Run the transition table; a rejection is logged and leaves the state
    /// untouched.
    fn check(&mut self, action: Action) -> Result<SessionState, SessionError> {
        transition(self.state, action, self.guest.is_some()).inspect_err(|err| {
            tracing::warn!(%action, state = %self.state, "{}", err);
            if err.is_missing_guest() {
                self.record(LogLevel::Error, CONTROLS_SOURCE, "No operating system selected");
            } else {
                self.record(LogLevel::Warn, CONTROLS_SOURCE, err.to_string());
            }
        })
    }

    fn enter_running(&mut self) {
        let Some(guest) = self.guest.clone() else {
            return;
        };

        // state first, so no callback can observe the old one
        self.state = SessionState::Running;
        self.telemetry
            .start(&mut self.scheduler, SessionEvent::MetricsTick);
        self.metrics_revision += 1;

        // opens the transcript; mirrored like every other terminal line
        let announcement = self
            .terminal
            .start::<SessionEvent, _>(&guest, &mut self.scheduler, &self.clock);
        self.logs.append(announcement.to_log_entry(TERMINAL_SOURCE));

        let timestamp = self.timestamp();
        self.binding
            .on_start(&guest, &mut StampedSink::new(&mut self.logs, timestamp));

        self.revision += 1;
        tracing::info!(guest = %guest.id, "session running");
    }

    /// Cancel every timer of the current run. The binding is told only if
    /// the machine was actually running.
    fn teardown(&mut self) {
        let was_running = self.state.is_running();
        self.telemetry.stop::<SessionEvent, _>(&mut self.scheduler);
        self.terminal.stop::<SessionEvent, _>(&mut self.scheduler);
        self.metrics_revision += 1;

        if was_running {
            let timestamp = self.timestamp();
            self.binding
                .on_stop(&mut StampedSink::new(&mut self.logs, timestamp));
        }
        self.revision += 1;
    }

    fn dispatch(&mut self, event: SessionEvent) {
        if !self.state.is_running() {
            tracing::debug!(?event, state = %self.state, "dropping event outside running state");
            return;
        }

        match event {
            SessionEvent::MetricsTick => {
                let now = self.now();
                if self.telemetry.on_tick(now, &mut self.rng).is_some() {
                    self.metrics_revision += 1;
                    self.revision += 1;
                }
            }
            SessionEvent::Terminal(event) => {
                let line = self.terminal.handle::<SessionEvent, _, _>(
                    event,
                    &mut self.scheduler,
                    &mut self.rng,
                    &self.clock,
                );
                if let Some(line) = line {
                    self.logs.append(line.to_log_entry(TERMINAL_SOURCE));
                    self.revision += 1;
                }
            }
        }
    }

    fn record(&mut self, level: LogLevel, source: &str, message: impl Into<String>) {
        let entry = LogEntry::new(self.timestamp(), level, source, message);
        self.logs.append(entry);
        self.revision += 1;
    }

    fn timestamp(&self) -> String {
        self.clock.timestamp(self.now())
    }
}

impl std::fmt::Debug for Session {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("state", &self.state)
            .field("guest", &self.guest)
            .field("now", &self.now())
            .field("binding", &self.binding.name())
            .field("revision", &self.revision)
            .finish_non_exhaustive()
    }
}
