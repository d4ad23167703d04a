use super::{Scheduler, TimerHandle};

/// Handles armed by one owner, cancelled together on teardown
#[derive(Debug, Default, Clone)]
pub struct TimerSet {
    handles: Vec<TimerHandle>,
}

impl TimerSet {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn track(&mut self, handle: TimerHandle) -> TimerHandle {
        self.handles.push(handle);
        handle
    }

    /// Forget a handle that fired and will not fire again
    pub fn release(&mut self, handle: TimerHandle) {
        self.handles.retain(|h| *h != handle);
    }

    /// Drop handles whose timers can no longer fire
    pub fn prune<E, S>(&mut self, scheduler: &S)
    where
        S: Scheduler<E> + ?Sized,
    {
        self.handles.retain(|handle| scheduler.is_pending(*handle));
    }

    pub fn len(&self) -> usize {
        self.handles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.handles.is_empty()
    }

    /// Cancel every tracked timer. Returns how many were still armed.
    pub fn cancel_all<E, S>(&mut self, scheduler: &mut S) -> usize
    where
        S: Scheduler<E> + ?Sized,
    {
        let cancelled = self
            .handles
            .drain(..)
            .filter(|handle| scheduler.cancel(*handle))
            .count();
        if cancelled > 0 {
            tracing::debug!(cancelled, "cancelled pending timers");
        }
        cancelled
    }
}
