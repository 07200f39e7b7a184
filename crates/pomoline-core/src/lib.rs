//! # pomoline core library
//!
//! A work/break interval timer for status lines. One session at a time
//! moves through Idle, Working, Overtime and Break; the library keeps the
//! countdown, the counters, and the short indicator string a host paints in
//! its status bar (`<W 24> `, `<B 4> `, `<O +3:12> `).
//!
//! ## Architecture
//!
//! - **Session**: the state machine. Plain owned value, or run inside a
//!   Tokio task through [`SessionHandle`].
//! - **Timers**: the [`TimerService`] seam, with a Tokio-backed service for
//!   real use and a manual one for tests.
//! - **Hooks**: observers subscribe to named events
//!   (`session-started`, `break-ended`, ...).
//! - **Storage**: TOML configuration under `~/.config/pomoline/`.

pub mod clock;
pub mod error;
pub mod events;
pub mod format;
pub mod notify;
pub mod session;
pub mod storage;
pub mod timer;

pub use clock::{Clock, ManualClock, SystemClock};
pub use error::{ConfigError, CoreError, Result};
pub use events::{Event, EventKind};
pub use notify::{Hooks, NotificationDispatcher, SubscriptionId};
pub use session::{
    Counters, Operation, Session, SessionConfig, SessionHandle, SessionSnapshot, SessionState,
    StatusSink, StatusStringBuilder, TaskChoice, TaskPrompt,
};
pub use storage::Config;
pub use timer::{CountdownTimer, ManualTimerService, TimerHandle, TimerService, TokioTimerService};
