use chrono::Duration;
use serde::{Deserialize, Serialize};

/// Identifies one scheduled callback.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct TimerHandle(u64);

impl TimerHandle {
    pub fn new(id: u64) -> Self {
        Self(id)
    }

    pub fn id(self) -> u64 {
        self.0
    }
}

/// Callback run once when a timer fires naturally. Receives the handle
/// that fired.
pub type FireCallback = Box<dyn FnOnce(TimerHandle) + Send + 'static>;

/// Schedules one-shot deferred callbacks.
pub trait TimerService: Send {
    /// Run `on_fire` once after `duration`, unless cancelled first.
    fn schedule(&mut self, duration: Duration, on_fire: FireCallback) -> TimerHandle;

    /// Prevent a pending callback from running. No-op for handles that
    /// already fired, were already cancelled, or were never issued.
    fn cancel(&mut self, handle: TimerHandle);

    /// Time left until `handle` fires, clamped to zero for due, fired,
    /// cancelled and unknown handles.
    fn remaining(&self, handle: TimerHandle) -> Duration;
}
