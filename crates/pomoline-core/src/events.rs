use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// The named notifications observers can subscribe to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EventKind {
    SessionStarted,
    SessionInterrupted,
    SessionCompleted,
    BreakStarted,
    BreakEnded,
}

impl EventKind {
    pub const ALL: [EventKind; 5] = [
        EventKind::SessionStarted,
        EventKind::SessionInterrupted,
        EventKind::SessionCompleted,
        EventKind::BreakStarted,
        EventKind::BreakEnded,
    ];

    pub fn name(self) -> &'static str {
        match self {
            EventKind::SessionStarted => "session-started",
            EventKind::SessionInterrupted => "session-interrupted",
            EventKind::SessionCompleted => "session-completed",
            EventKind::BreakStarted => "break-started",
            EventKind::BreakEnded => "break-ended",
        }
    }
}

impl fmt::Display for EventKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for EventKind {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        EventKind::ALL
            .into_iter()
            .find(|kind| kind.name() == s)
            .ok_or_else(|| format!("unknown event: {s}"))
    }
}

/// Every state transition produces an Event.
/// Hooks receive it; the CLI also prints it as JSON.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "kebab-case")]
pub enum Event {
    SessionStarted {
        task: Option<String>,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    SessionInterrupted {
        task: Option<String>,
        interrupted: u64,
        at: DateTime<Utc>,
    },
    SessionCompleted {
        task: Option<String>,
        completed: u64,
        at: DateTime<Utc>,
    },
    BreakStarted {
        long: bool,
        duration_secs: u64,
        at: DateTime<Utc>,
    },
    /// Sent both when a break runs out and when it is cut short.
    BreakEnded {
        early: bool,
        at: DateTime<Utc>,
    },
}

impl Event {
    pub fn kind(&self) -> EventKind {
        match self {
            Event::SessionStarted { .. } => EventKind::SessionStarted,
            Event::SessionInterrupted { .. } => EventKind::SessionInterrupted,
            Event::SessionCompleted { .. } => EventKind::SessionCompleted,
            Event::BreakStarted { .. } => EventKind::BreakStarted,
            Event::BreakEnded { .. } => EventKind::BreakEnded,
        }
    }

    pub fn at(&self) -> DateTime<Utc> {
        match self {
            Event::SessionStarted { at, .. }
            | Event::SessionInterrupted { at, .. }
            | Event::SessionCompleted { at, .. }
            | Event::BreakStarted { at, .. }
            | Event::BreakEnded { at, .. } => *at,
        }
    }

    /// Task description carried by work-session events.
    pub fn task(&self) -> Option<&str> {
        match self {
            Event::SessionStarted { task, .. }
            | Event::SessionInterrupted { task, .. }
            | Event::SessionCompleted { task, .. } => task.as_deref(),
            Event::BreakStarted { .. } | Event::BreakEnded { .. } => None,
        }
    }
}
