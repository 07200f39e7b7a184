use chrono::Duration;
use tracing::{debug, warn};

use super::service::{FireCallback, TimerHandle, TimerService};

/// The session's single countdown.
///
/// Holds at most one live handle. Arming while a handle is live is a
/// programming error.
pub struct CountdownTimer {
    service: Box<dyn TimerService>,
    handle: Option<TimerHandle>,
}

impl CountdownTimer {
    pub fn new(service: Box<dyn TimerService>) -> Self {
        Self {
            service,
            handle: None,
        }
    }

    pub fn arm(&mut self, duration: Duration, on_fire: FireCallback) -> TimerHandle {
        debug_assert!(
            self.handle.is_none(),
            "countdown armed while {:?} is still live",
            self.handle
        );
        if let Some(stale) = self.handle.take() {
            warn!(timer = stale.id(), "countdown re-armed while live; cancelling");
            self.service.cancel(stale);
        }

        let handle = self.service.schedule(duration, on_fire);
        debug!(timer = handle.id(), seconds = duration.num_seconds(), "countdown armed");
        self.handle = Some(handle);
        handle
    }

    /// Cancel the live handle, if any. Safe to call at any time.
    pub fn cancel(&mut self) {
        if let Some(handle) = self.handle.take() {
            self.service.cancel(handle);
            debug!(timer = handle.id(), "countdown cancelled");
        }
    }

    /// Forget the live handle after it fired naturally. Returns false when
    /// `handle` is not the live one, i.e. a stale expiry.
    pub fn release(&mut self, handle: TimerHandle) -> bool {
        if self.handle == Some(handle) {
            self.handle = None;
            true
        } else {
            false
        }
    }

    pub fn handle(&self) -> Option<TimerHandle> {
        self.handle
    }

    pub fn is_armed(&self) -> bool {
        self.handle.is_some()
    }

    /// Time left on the live handle; zero when nothing is armed.
    pub fn remaining(&self) -> Duration {
        self.handle
            .map(|h| self.service.remaining(h))
            .unwrap_or_else(Duration::zero)
    }
}
