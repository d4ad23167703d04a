use std::cmp::Reverse;
use std::collections::{BinaryHeap, HashMap};
use std::time::Duration;

use super::{Scheduler, TimerHandle, MIN_PERIOD};

/// A timer that came due during an advance
#[derive(Debug, Clone, PartialEq)]
pub struct Fired<E> {
    pub handle: TimerHandle,
    /// Deadline the timer was armed for; the clock reads this while the
    /// event is being handled
    pub due: Duration,
    pub event: E,
}

#[derive(Debug)]
struct Timer<E> {
    event: E,
    period: Option<Duration>,
}

/// Deterministic scheduler whose clock only moves when told to.
///
/// Used directly by tests, and by the real-time runner which advances it to
/// the elapsed wall time on every tick.
#[derive(Debug)]
pub struct VirtualScheduler<E> {
    now: Duration,
    next_id: u64,
    next_seq: u64,
    // (deadline, arm sequence, handle); cancelled timers are dropped lazily
    queue: BinaryHeap<Reverse<(Duration, u64, TimerHandle)>>,
    timers: HashMap<TimerHandle, Timer<E>>,
}

impl<E> VirtualScheduler<E> {
    pub fn new() -> Self {
        Self {
            now: Duration::ZERO,
            next_id: 1,
            next_seq: 0,
            queue: BinaryHeap::new(),
            timers: HashMap::new(),
        }
    }

    /// Number of armed timers
    pub fn pending(&self) -> usize {
        self.timers.len()
    }

    /// Deadline of the earliest armed timer
    pub fn next_deadline(&mut self) -> Option<Duration> {
        self.purge_cancelled();
        self.queue.peek().map(|Reverse((due, _, _))| *due)
    }

    /// Move the clock forward without firing anything past `deadline`.
    ///
    /// Call after draining [`pop_due`](Self::pop_due) for the same deadline.
    /// The clock never moves backwards.
    pub fn settle(&mut self, deadline: Duration) {
        if deadline > self.now {
            self.now = deadline;
        }
    }

    fn arm(&mut self, due: Duration, event: E, period: Option<Duration>) -> TimerHandle {
        let handle = TimerHandle::new(self.next_id);
        self.next_id += 1;
        self.timers.insert(handle, Timer { event, period });
        self.push(due, handle);
        handle
    }

    fn push(&mut self, due: Duration, handle: TimerHandle) {
        let seq = self.next_seq;
        self.next_seq += 1;
        self.queue.push(Reverse((due, seq, handle)));
    }

    fn purge_cancelled(&mut self) {
        while let Some(Reverse((_, _, handle))) = self.queue.peek() {
            if self.timers.contains_key(handle) {
                break;
            }
            self.queue.pop();
        }
    }
}

impl<E: Clone> VirtualScheduler<E> {
    /// Pop the earliest timer due at or before `deadline`.
    ///
    /// The clock moves to the timer's deadline. Periodic timers are re-armed
    /// one period after the deadline they fired for, so a late drive does not
    /// drift the cadence.
    pub fn pop_due(&mut self, deadline: Duration) -> Option<Fired<E>> {
        self.purge_cancelled();

        let Reverse((due, _, handle)) = *self.queue.peek()?;
        if due > deadline {
            return None;
        }
        self.queue.pop();
        self.settle(due);

        let period = self.timers.get(&handle)?.period;
        let event = match period {
            Some(period) => {
                let event = self.timers.get(&handle)?.event.clone();
                self.push(due + period, handle);
                event
            }
            None => self.timers.remove(&handle)?.event,
        };

        tracing::trace!(%handle, due_ms = due.as_millis() as u64, "timer fired");
        Some(Fired { handle, due, event })
    }

    /// Fire everything due up to `deadline`, handing each event to `handler`
    /// together with the scheduler so the handler can arm or cancel timers.
    /// Returns the number of events delivered.
    pub fn advance_to<F>(&mut self, deadline: Duration, mut handler: F) -> usize
    where
        F: FnMut(&mut Self, Fired<E>),
    {
        let mut delivered = 0;
        while let Some(fired) = self.pop_due(deadline) {
            handler(self, fired);
            delivered += 1;
        }
        self.settle(deadline);
        delivered
    }

    /// Relative form of [`advance_to`](Self::advance_to)
    pub fn advance_by<F>(&mut self, delta: Duration, handler: F) -> usize
    where
        F: FnMut(&mut Self, Fired<E>),
    {
        let deadline = self.now + delta;
        self.advance_to(deadline, handler)
    }
}

impl<E> Default for VirtualScheduler<E> {
    fn default() -> Self {
        Self::new()
    }
}

impl<E> Scheduler<E> for VirtualScheduler<E> {
    fn now(&self) -> Duration {
        self.now
    }

    fn after(&mut self, delay: Duration, event: E) -> TimerHandle {
        let due = self.now + delay;
        self.arm(due, event, None)
    }

    fn every(&mut self, period: Duration, event: E) -> TimerHandle {
        let period = period.max(MIN_PERIOD);
        let due = self.now + period;
        self.arm(due, event, Some(period))
    }

    fn cancel(&mut self, handle: TimerHandle) -> bool {
        self.timers.remove(&handle).is_some()
    }

    fn is_pending(&self, handle: TimerHandle) -> bool {
        self.timers.contains_key(&handle)
    }
}
