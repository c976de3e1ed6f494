//! Tick scheduling - the cancellable periodic timer owned by the engine
//!
//! The engine never sleeps or spawns anything itself. It asks a [`TickScheduler`]
//! for a repeating tick at the configured interval in `start()`, keeps the returned
//! [`TickHandle`], and cancels it on game over, stop, or restart. Whatever drives
//! `GameState::tick` (a test loop, a tokio task) reads the schedule from the
//! scheduler implementation.
//!
//! [`ManualScheduler`] is the default: it schedules nothing, it only counts, so the
//! caller drives ticks by hand.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

/// Live periodic tick. Cancelling twice is a no-op.
pub trait TickHandle: Send {
    fn cancel(&mut self);
}

/// Source of periodic ticks
pub trait TickScheduler: Send {
    fn schedule(&mut self, interval: Duration) -> Box<dyn TickHandle>;
}

#[derive(Debug, Default)]
struct Counters {
    scheduled: AtomicUsize,
    cancelled: AtomicUsize,
}

/// Scheduler for hand-driven ticks that records schedule/cancel calls.
///
/// Clones share counters, so a test can keep one clone and hand the other to the
/// engine.
#[derive(Debug, Clone, Default)]
pub struct ManualScheduler {
    counters: Arc<Counters>,
    last_interval: Arc<Mutex<Option<Duration>>>,
}

impl ManualScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of tick streams ever scheduled
    pub fn scheduled(&self) -> usize {
        self.counters.scheduled.load(Ordering::SeqCst)
    }

    /// Number of handles cancelled
    pub fn cancelled(&self) -> usize {
        self.counters.cancelled.load(Ordering::SeqCst)
    }

    /// Tick streams scheduled and not yet cancelled
    pub fn active(&self) -> usize {
        self.scheduled().saturating_sub(self.cancelled())
    }

    /// Interval requested by the most recent `schedule` call
    pub fn last_interval(&self) -> Option<Duration> {
        self.last_interval.lock().ok().and_then(|guard| *guard)
    }
}

impl TickScheduler for ManualScheduler {
    fn schedule(&mut self, interval: Duration) -> Box<dyn TickHandle> {
        self.counters.scheduled.fetch_add(1, Ordering::SeqCst);
        if let Ok(mut last) = self.last_interval.lock() {
            *last = Some(interval);
        }
        Box::new(ManualHandle {
            counters: Arc::clone(&self.counters),
            cancelled: false,
        })
    }
}

struct ManualHandle {
    counters: Arc<Counters>,
    cancelled: bool,
}

impl TickHandle for ManualHandle {
    fn cancel(&mut self) {
        if self.cancelled {
            return;
        }
        self.cancelled = true;
        self.counters.cancelled.fetch_add(1, Ordering::SeqCst);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_schedules_and_cancels() {
        let probe = ManualScheduler::new();
        let mut scheduler = probe.clone();

        let mut first = scheduler.schedule(Duration::from_millis(10));
        let _second = scheduler.schedule(Duration::from_millis(20));
        assert_eq!(probe.scheduled(), 2);
        assert_eq!(probe.active(), 2);
        assert_eq!(probe.last_interval(), Some(Duration::from_millis(20)));

        first.cancel();
        first.cancel();
        assert_eq!(probe.cancelled(), 1);
        assert_eq!(probe.active(), 1);
    }
}
