//! The work/break session.
//!
//! [`Session`] is the state machine. It is a plain owned value with
//! `&mut self` operations; [`SessionHandle`] moves it into a Tokio task when
//! the host needs to drive it from several places at once.

mod actor;
mod config;
mod host;
mod machine;
mod state;
mod status;

pub use actor::SessionHandle;
pub use config::SessionConfig;
pub use host::{FixedPrompt, NoPrompt, NullSink, SharedSink, StatusSink, TaskPrompt};
pub use machine::{Operation, Session, TaskChoice};
pub use state::{Counters, SessionSnapshot, SessionState};
pub use status::StatusStringBuilder;
