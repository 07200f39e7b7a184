//! Deterministic timer service for tests and simulations.

use std::sync::{Arc, Mutex, PoisonError};

use chrono::{DateTime, Duration, Utc};

use super::service::{FireCallback, TimerHandle, TimerService};
use crate::clock::{Clock, ManualClock};

struct Pending {
    handle: TimerHandle,
    fire_at: DateTime<Utc>,
    on_fire: FireCallback,
}

#[derive(Default)]
struct Inner {
    next_id: u64,
    pending: Vec<Pending>,
}

/// Timer service driven by a [`ManualClock`].
///
/// Nothing fires on its own: call [`fire_due`](Self::fire_due) (or
/// [`advance`](Self::advance)) to run every callback whose fire instant has
/// passed. Clones share the same pending set.
#[derive(Clone)]
pub struct ManualTimerService {
    clock: ManualClock,
    inner: Arc<Mutex<Inner>>,
}

impl ManualTimerService {
    pub fn new(clock: ManualClock) -> Self {
        Self {
            clock,
            inner: Arc::new(Mutex::new(Inner::default())),
        }
    }

    fn lock(&self) -> std::sync::MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Run callbacks that are due, earliest first. Returns how many fired.
    pub fn fire_due(&self) -> usize {
        let now = self.clock.now();
        let mut due = {
            let mut inner = self.lock();
            let (due, rest): (Vec<_>, Vec<_>) =
                inner.pending.drain(..).partition(|p| p.fire_at <= now);
            inner.pending = rest;
            due
        };
        due.sort_by_key(|p| p.fire_at);

        let count = due.len();
        for pending in due {
            (pending.on_fire)(pending.handle);
        }
        count
    }

    /// Step the clock forward, then fire whatever became due.
    pub fn advance(&self, by: Duration) -> usize {
        self.clock.advance(by);
        self.fire_due()
    }

    pub fn pending(&self) -> usize {
        self.lock().pending.len()
    }
}

impl TimerService for ManualTimerService {
    fn schedule(&mut self, duration: Duration, on_fire: FireCallback) -> TimerHandle {
        let fire_at = self.clock.now() + duration;
        let mut inner = self.lock();
        inner.next_id += 1;
        let handle = TimerHandle::new(inner.next_id);
        inner.pending.push(Pending {
            handle,
            fire_at,
            on_fire,
        });
        handle
    }

    fn cancel(&mut self, handle: TimerHandle) {
        self.lock().pending.retain(|p| p.handle != handle);
    }

    fn remaining(&self, handle: TimerHandle) -> Duration {
        let now = self.clock.now();
        self.lock()
            .pending
            .iter()
            .find(|p| p.handle == handle)
            .map(|p| (p.fire_at - now).max(Duration::zero()))
            .unwrap_or_else(Duration::zero)
    }
}
