//! Deferred one-shot timers for the cooperative loop.
//!
//! A timer carries a payload event instead of a callback; `tick` hands due
//! events back to the owner in the order they were scheduled. Dropping the
//! `Timers` (for instance when a scene is torn down) cancels everything still
//! pending.

#[derive(Debug)]
struct Pending<E> {
    remaining_us: u64,
    event: E,
}

#[derive(Debug)]
pub struct Timers<E> {
    pending: Vec<Pending<E>>,
}

impl<E> Timers<E> {
    pub fn new() -> Self {
        Self {
            pending: Vec::new(),
        }
    }

    pub fn schedule(&mut self, delay_us: u64, event: E) {
        self.pending.push(Pending {
            remaining_us: delay_us,
            event,
        });
    }

    pub fn pending_count(&self) -> usize {
        self.pending.len()
    }

    pub fn tick(&mut self, dt_us: u64) -> Vec<E> {
        let mut due = Vec::new();
        let mut still_pending = Vec::with_capacity(self.pending.len());
        for mut timer in self.pending.drain(..) {
            timer.remaining_us = timer.remaining_us.saturating_sub(dt_us);
            if timer.remaining_us == 0 {
                due.push(timer.event);
            } else {
                still_pending.push(timer);
            }
        }
        self.pending = still_pending;
        due
    }
}

impl<E> Default for Timers<E> {
    fn default() -> Self {
        Self::new()
    }
}
