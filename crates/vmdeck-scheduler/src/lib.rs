//! Timer scheduling on a virtual timeline.
//!
//! Every component that needs to wait does so through a [`Scheduler`]. A
//! timer carries a typed event instead of a closure; whoever drives the
//! timeline pops due events one at a time and dispatches them, so a handler
//! can cancel other timers and the cancellation is honoured before the next
//! pop.
//!
//! # Ordering
//!
//! Timers fire in deadline order. Timers sharing a deadline fire in the
//! order they were armed. A timer whose deadline equals the advance target
//! fires during that advance.

mod timer_set;
mod virtual_clock;

pub use timer_set::TimerSet;
pub use virtual_clock::{Fired, VirtualScheduler};

use std::time::Duration;

/// Smallest period accepted by [`Scheduler::every`]
pub const MIN_PERIOD: Duration = Duration::from_millis(1);

/// Identifies one armed timer; used to cancel it
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub(crate) fn new(raw: u64) -> Self {
        Self(raw)
    }
}

impl std::fmt::Display for TimerHandle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "timer#{}", self.0)
    }
}

/// Delayed and periodic event delivery
pub trait Scheduler<E> {
    /// Current position on the timeline
    fn now(&self) -> Duration;

    /// Deliver `event` once, `delay` from now
    fn after(&mut self, delay: Duration, event: E) -> TimerHandle;

    /// Deliver `event` every `period`, first delivery one period from now.
    /// Periods shorter than [`MIN_PERIOD`] are raised to it.
    fn every(&mut self, period: Duration, event: E) -> TimerHandle;

    /// Disarm a timer. Returns `false` if it already fired (one-shot) or was
    /// cancelled before.
    fn cancel(&mut self, handle: TimerHandle) -> bool;

    /// Whether the timer can still fire
    fn is_pending(&self, handle: TimerHandle) -> bool;
}
