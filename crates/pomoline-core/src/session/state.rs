use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::error::CoreError;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionState {
    #[default]
    Idle,
    Working,
    /// The work timer ran out but no break has started yet.
    Overtime,
    Break,
}

impl SessionState {
    pub const ALL: [SessionState; 4] = [
        SessionState::Idle,
        SessionState::Working,
        SessionState::Overtime,
        SessionState::Break,
    ];

    pub fn name(self) -> &'static str {
        match self {
            SessionState::Idle => "idle",
            SessionState::Working => "working",
            SessionState::Overtime => "overtime",
            SessionState::Break => "break",
        }
    }

    /// Working and Break are the only states that own a countdown.
    pub fn has_countdown(self) -> bool {
        matches!(self, SessionState::Working | SessionState::Break)
    }
}

impl fmt::Display for SessionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for SessionState {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SessionState::ALL
            .into_iter()
            .find(|state| state.name() == s)
            .ok_or_else(|| CoreError::InvalidState(s.to_string()))
    }
}

/// Process-wide session counters. Never decremented.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Counters {
    pub completed: u64,
    pub interrupted: u64,
}

/// Point-in-time view of a session, for hosts that print or ship state.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SessionSnapshot {
    pub state: SessionState,
    pub task: Option<String>,
    /// Seconds left on the countdown (Working and Break only).
    pub remaining_secs: Option<u64>,
    /// Seconds since the work timer ran out (Overtime only).
    pub overtime_secs: Option<u64>,
    pub last_completion: Option<DateTime<Utc>>,
    pub counters: Counters,
    pub display: String,
    pub at: DateTime<Utc>,
}
