//! Timer service backed by Tokio tasks.
//!
//! Each scheduled callback gets its own task that sleeps and then fires.
//! Cancelling aborts the task. The fire instant is recorded up front so
//! `remaining` never has to look inside the sleep future.

use std::collections::HashMap;
use std::sync::Arc;

use chrono::{DateTime, Duration, Utc};
use tokio::runtime::Handle;
use tokio::task::JoinHandle;
use tracing::debug;

use super::service::{FireCallback, TimerHandle, TimerService};
use crate::clock::Clock;

struct Scheduled {
    fire_at: DateTime<Utc>,
    task: JoinHandle<()>,
}

pub struct TokioTimerService {
    clock: Arc<dyn Clock>,
    runtime: Handle,
    next_id: u64,
    timers: HashMap<TimerHandle, Scheduled>,
}

impl TokioTimerService {
    /// Timers are spawned onto `runtime`.
    pub fn new(clock: Arc<dyn Clock>, runtime: Handle) -> Self {
        Self {
            clock,
            runtime,
            next_id: 0,
            timers: HashMap::new(),
        }
    }

    /// Number of timers that have neither fired nor been cancelled.
    pub fn pending(&self) -> usize {
        self.timers
            .values()
            .filter(|t| !t.task.is_finished())
            .count()
    }
}

impl TimerService for TokioTimerService {
    fn schedule(&mut self, duration: Duration, on_fire: FireCallback) -> TimerHandle {
        self.timers.retain(|_, t| !t.task.is_finished());

        self.next_id += 1;
        let handle = TimerHandle::new(self.next_id);
        let fire_at = self.clock.now() + duration;
        let delay = duration.to_std().unwrap_or_default();

        let task = self.runtime.spawn(async move {
            tokio::time::sleep(delay).await;
            on_fire(handle);
        });

        debug!(timer = handle.id(), ?delay, "scheduled timer");
        self.timers.insert(handle, Scheduled { fire_at, task });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        if let Some(scheduled) = self.timers.remove(&handle) {
            scheduled.task.abort();
            debug!(timer = handle.id(), "cancelled timer");
        }
    }

    fn remaining(&self, handle: TimerHandle) -> Duration {
        match self.timers.get(&handle) {
            Some(t) if !t.task.is_finished() => {
                (t.fire_at - self.clock.now()).max(Duration::zero())
            }
            _ => Duration::zero(),
        }
    }
}

impl Drop for TokioTimerService {
    fn drop(&mut self) {
        for (_, scheduled) in self.timers.drain() {
            scheduled.task.abort();
        }
    }
}
