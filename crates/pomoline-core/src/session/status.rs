//! Builds the indicator string hosts show in their status line.
//!
//! ```text
//! Idle      ""
//! Working   "<W 24> "     (or "<W 24:59> " with seconds)
//! Break     "<B 4> "
//! Overtime  "<O +3:12> "  (seconds always shown)
//! ```

use chrono::{DateTime, Duration, Utc};
use tracing::error;

use super::state::SessionState;
use crate::clock::Clock;
use crate::error::Result;
use crate::format::{format, format_duration, round_seconds, to_minute_second};

/// Pure: everything it needs is passed in, nothing is cached here.
#[derive(Debug, Clone, Copy)]
pub struct StatusStringBuilder {
    show_seconds: bool,
}

impl StatusStringBuilder {
    pub fn new(show_seconds: bool) -> Self {
        Self { show_seconds }
    }

    pub fn build(
        &self,
        state: SessionState,
        remaining: Duration,
        last_completion: Option<DateTime<Utc>>,
        clock: &dyn Clock,
    ) -> String {
        match state {
            SessionState::Idle => String::new(),
            SessionState::Working => format!("<W {}> ", self.countdown(remaining)),
            SessionState::Break => format!("<B {}> ", self.countdown(remaining)),
            SessionState::Overtime => {
                let elapsed = match last_completion {
                    Some(completed_at) => {
                        format_duration(clock.difference(clock.now(), completed_at), true)
                    }
                    None => "0".to_string(),
                };
                format!("<O +{elapsed}> ")
            }
        }
    }

    /// Same as [`build`](Self::build) for hosts that hold the state as its
    /// name. Unknown names are an invariant violation.
    pub fn build_named(
        &self,
        state: &str,
        remaining: Duration,
        last_completion: Option<DateTime<Utc>>,
        clock: &dyn Clock,
    ) -> Result<String> {
        let state = state.parse::<SessionState>().inspect_err(|e| {
            error!(error = %e, "status requested for unknown session state");
        })?;
        Ok(self.build(state, remaining, last_completion, clock))
    }

    fn countdown(&self, remaining: Duration) -> String {
        let (minutes, seconds) = to_minute_second(round_seconds(remaining));
        format(minutes, seconds, self.show_seconds)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::clock::ManualClock;
    use crate::error::CoreError;
    use chrono::TimeZone;

    fn clock() -> ManualClock {
        ManualClock::new(Utc.with_ymd_and_hms(2024, 3, 1, 9, 0, 0).unwrap())
    }

    #[test]
    fn idle_is_empty() {
        let b = StatusStringBuilder::new(true);
        assert_eq!(b.build(SessionState::Idle, Duration::zero(), None, &clock()), "");
    }

    #[test]
    fn working_respects_show_seconds() {
        let remaining = Duration::seconds(24 * 60 + 7);
        assert_eq!(
            StatusStringBuilder::new(false).build(SessionState::Working, remaining, None, &clock()),
            "<W 24> "
        );
        assert_eq!(
            StatusStringBuilder::new(true).build(SessionState::Working, remaining, None, &clock()),
            "<W 24:7> "
        );
    }

    #[test]
    fn fresh_countdown_rounds_up_to_full_minutes() {
        let remaining = Duration::minutes(25) - Duration::microseconds(40);
        assert_eq!(
            StatusStringBuilder::new(false).build(SessionState::Working, remaining, None, &clock()),
            "<W 25> "
        );
    }

    #[test]
    fn break_uses_b_prefix() {
        assert_eq!(
            StatusStringBuilder::new(false).build(
                SessionState::Break,
                Duration::minutes(5),
                None,
                &clock()
            ),
            "<B 5> "
        );
    }

    #[test]
    fn overtime_always_shows_seconds() {
        let clock = clock();
        let completed = clock.now() - Duration::seconds(192);
        let b = StatusStringBuilder::new(false);
        assert_eq!(
            b.build(SessionState::Overtime, Duration::zero(), Some(completed), &clock),
            "<O +3:12> "
        );
        assert_eq!(
            b.build(SessionState::Overtime, Duration::zero(), Some(clock.now()), &clock),
            "<O +0:0> "
        );
    }

    #[test]
    fn overtime_elapsed_uses_clock_difference() {
        /// Reports every difference as exactly one minute.
        struct FixedGap(ManualClock);
        impl Clock for FixedGap {
            fn now(&self) -> DateTime<Utc> {
                self.0.now()
            }
            fn difference(&self, _a: DateTime<Utc>, _b: DateTime<Utc>) -> Duration {
                Duration::minutes(1)
            }
        }

        let clock = FixedGap(clock());
        let completed = clock.now() - Duration::seconds(5);
        assert_eq!(
            StatusStringBuilder::new(false).build(
                SessionState::Overtime,
                Duration::zero(),
                Some(completed),
                &clock
            ),
            "<O +1:0> "
        );
    }

    #[test]
    fn overtime_without_completion_reads_zero() {
        let b = StatusStringBuilder::new(true);
        assert_eq!(
            b.build(SessionState::Overtime, Duration::zero(), None, &clock()),
            "<O +0> "
        );
    }

    #[test]
    fn unknown_state_name_is_invalid_state() {
        let b = StatusStringBuilder::new(false);
        let err = b
            .build_named("paused", Duration::zero(), None, &clock())
            .unwrap_err();
        assert!(matches!(err, CoreError::InvalidState(_)));
        assert_eq!(
            b.build_named("break", Duration::minutes(5), None, &clock()).unwrap(),
            "<B 5> "
        );
    }
}
