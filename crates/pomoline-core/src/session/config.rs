use chrono::Duration;

/// Durations and flags a session reads when it starts a countdown.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SessionConfig {
    pub work_duration: Duration,
    pub break_duration: Duration,
    pub long_break_duration: Duration,
    pub show_seconds: bool,
    pub prompt_for_task: bool,
}

impl SessionConfig {
    pub fn from_minutes(work: u32, short_break: u32, long_break: u32) -> Self {
        Self {
            work_duration: Duration::minutes(i64::from(work)),
            break_duration: Duration::minutes(i64::from(short_break)),
            long_break_duration: Duration::minutes(i64::from(long_break)),
            ..Self::default()
        }
    }

    pub fn break_duration(&self, long: bool) -> Duration {
        if long {
            self.long_break_duration
        } else {
            self.break_duration
        }
    }
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            work_duration: Duration::minutes(25),
            break_duration: Duration::minutes(5),
            long_break_duration: Duration::minutes(30),
            show_seconds: false,
            prompt_for_task: true,
        }
    }
}
