//! Countdown timers.
//!
//! [`TimerService`] is the scheduling seam: it runs a one-shot callback after
//! a delay and reports how long is left. [`CountdownTimer`] wraps a service
//! and holds at most one live handle for the session.

mod countdown;
mod manual;
mod service;
mod tokio_service;

pub use countdown::CountdownTimer;
pub use manual::ManualTimerService;
pub use service::{FireCallback, TimerHandle, TimerService};
pub use tokio_service::TokioTimerService;
