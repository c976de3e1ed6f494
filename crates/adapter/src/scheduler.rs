//! Tokio-backed tick scheduling.
//!
//! Each `schedule` call spawns one `interval` task that sends stamped
//! [`TickSignal`]s into a channel shared by every schedule of the same
//! [`IntervalScheduler`]. Only the most recent live generation is delivered by
//! [`TickReceiver::recv`]: after a cancel or a restart, ticks already sitting in
//! the channel from an older task are dropped, so two tick streams never drive
//! the same engine.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use tokio::runtime::Handle;
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, warn};

use crate::core::{TickHandle, TickScheduler};

// Generation 0 never belongs to a live stream.
const RETIRED: u64 = 0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TickSignal {
    pub generation: u64,
    pub at: Instant,
}

/// Spawns one interval task per schedule
pub struct IntervalScheduler {
    tx: mpsc::UnboundedSender<TickSignal>,
    live: Arc<AtomicU64>,
    next_generation: u64,
}

/// Receiving side: yields ticks from the live generation only
pub struct TickReceiver {
    rx: mpsc::UnboundedReceiver<TickSignal>,
    live: Arc<AtomicU64>,
}

impl IntervalScheduler {
    pub fn new() -> (Self, TickReceiver) {
        let (tx, rx) = mpsc::unbounded_channel();
        let live = Arc::new(AtomicU64::new(RETIRED));
        (
            Self {
                tx,
                live: Arc::clone(&live),
                next_generation: RETIRED,
            },
            TickReceiver { rx, live },
        )
    }
}

impl TickScheduler for IntervalScheduler {
    fn schedule(&mut self, interval: Duration) -> Box<dyn TickHandle> {
        self.next_generation += 1;
        let generation = self.next_generation;
        self.live.store(generation, Ordering::SeqCst);

        let Ok(handle) = Handle::try_current() else {
            warn!("no tokio runtime; tick stream {generation} will never fire");
            return Box::new(IntervalHandle {
                task: None,
                live: Arc::clone(&self.live),
                generation,
            });
        };

        let tx = self.tx.clone();
        let task = handle.spawn(async move {
            let mut ticker = time::interval_at(Instant::now() + interval, interval);
            ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
            loop {
                let at = ticker.tick().await;
                if tx.send(TickSignal { generation, at }).is_err() {
                    break;
                }
            }
        });
        debug!(generation, interval_ms = interval.as_millis() as u64, "tick stream scheduled");

        Box::new(IntervalHandle {
            task: Some(task),
            live: Arc::clone(&self.live),
            generation,
        })
    }
}

struct IntervalHandle {
    task: Option<JoinHandle<()>>,
    live: Arc<AtomicU64>,
    generation: u64,
}

impl TickHandle for IntervalHandle {
    fn cancel(&mut self) {
        let Some(task) = self.task.take() else {
            self.retire();
            return;
        };
        task.abort();
        self.retire();
        debug!(generation = self.generation, "tick stream cancelled");
    }
}

impl IntervalHandle {
    fn retire(&self) {
        // A newer schedule may already own the live slot.
        let _ = self.live.compare_exchange(
            self.generation,
            RETIRED,
            Ordering::SeqCst,
            Ordering::SeqCst,
        );
    }
}

impl Drop for IntervalHandle {
    fn drop(&mut self) {
        self.cancel();
    }
}

impl TickReceiver {
    /// Next tick of the live stream. Cancel safe.
    ///
    /// Returns `None` once the scheduler is dropped.
    pub async fn recv(&mut self) -> Option<TickSignal> {
        loop {
            let signal = self.rx.recv().await?;
            if signal.generation == self.live.load(Ordering::SeqCst) {
                return Some(signal);
            }
        }
    }

    /// Generation whose ticks are currently delivered, if any
    pub fn live_generation(&self) -> Option<u64> {
        match self.live.load(Ordering::SeqCst) {
            RETIRED => None,
            generation => Some(generation),
        }
    }
}
