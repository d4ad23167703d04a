//! Synthetic resource telemetry.
//!
//! While the session runs, [`TelemetryGenerator`] produces one
//! [`MetricsSample`] per interval by taking a bounded random walk from the
//! previous sample. Only the latest sample is kept.

mod health;

pub use health::{Gauge, Health};

use rand::Rng;
use std::time::Duration;

use vmdeck_scheduler::{Scheduler, TimerSet};
use vmdeck_types::{format_hms, MetricsSample};

pub const CPU_RANGE: (f64, f64) = (5.0, 95.0);
pub const MEMORY_RANGE: (f64, f64) = (20.0, 80.0);
pub const DISK_RANGE: (f64, f64) = (10.0, 60.0);
pub const TEMPERATURE_RANGE: (f64, f64) = (35.0, 65.0);

/// Compute the sample that follows `prev`.
///
/// Gauges move by a uniform step and are clamped to their range; network
/// speed and process count are drawn fresh; uptime is formatted from the
/// elapsed time since the session started.
pub fn next_sample<R: Rng>(prev: &MetricsSample, uptime: Duration, rng: &mut R) -> MetricsSample {
    MetricsSample {
        cpu: walk(rng, prev.cpu, 5.0, CPU_RANGE),
        memory: walk(rng, prev.memory, 2.5, MEMORY_RANGE),
        disk: walk(rng, prev.disk, 1.5, DISK_RANGE),
        temperature: walk(rng, prev.temperature, 1.0, TEMPERATURE_RANGE),
        network_speed: format!("{} KB/s", rng.gen_range(0..1000u32)),
        processes: 120 + rng.gen_range(0..50u32),
        uptime: format_hms(uptime),
    }
}

fn walk<R: Rng>(rng: &mut R, value: f64, step: f64, (lo, hi): (f64, f64)) -> f64 {
    (value + rng.gen_range(-step..=step)).clamp(lo, hi)
}

/// Periodic metrics source gated by the session lifecycle
#[derive(Debug)]
pub struct TelemetryGenerator {
    interval: Duration,
    sample: MetricsSample,
    started_at: Option<Duration>,
    timers: TimerSet,
    ticks: u64,
}

impl TelemetryGenerator {
    pub fn new(interval: Duration) -> Self {
        Self {
            interval,
            sample: MetricsSample::baseline(),
            started_at: None,
            timers: TimerSet::new(),
            ticks: 0,
        }
    }

    /// Reset to baseline, remember the start time and arm the periodic tick.
    /// `tick` is the event the scheduler delivers back on every period.
    pub fn start<E, S>(&mut self, scheduler: &mut S, tick: E)
    where
        S: Scheduler<E> + ?Sized,
    {
        self.timers.cancel_all(scheduler);
        self.sample = MetricsSample::baseline();
        self.ticks = 0;
        self.started_at = Some(scheduler.now());
        self.timers.track(scheduler.every(self.interval, tick));
        tracing::debug!(interval_ms = self.interval.as_millis() as u64, "telemetry started");
    }

    /// Cancel the periodic tick and drop back to baseline
    pub fn stop<E, S>(&mut self, scheduler: &mut S)
    where
        S: Scheduler<E> + ?Sized,
    {
        self.timers.cancel_all(scheduler);
        self.sample = MetricsSample::baseline();
        self.started_at = None;
        tracing::debug!(ticks = self.ticks, "telemetry stopped");
    }

    /// Advance the random walk. Ticks arriving while stopped are ignored.
    pub fn on_tick<R: Rng>(&mut self, now: Duration, rng: &mut R) -> Option<&MetricsSample> {
        let started_at = self.started_at?;
        let uptime = now.saturating_sub(started_at);
        self.sample = next_sample(&self.sample, uptime, rng);
        self.ticks += 1;
        Some(&self.sample)
    }

    pub fn sample(&self) -> &MetricsSample {
        &self.sample
    }

    /// Samples produced since the last start
    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn started_at(&self) -> Option<Duration> {
        self.started_at
    }
}
