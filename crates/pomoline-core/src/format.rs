//! Minute/second rendering for the status line.
//!
//! No zero padding: two minutes five seconds renders as `2:5`.

use chrono::Duration;

/// Split a second count into whole minutes and leftover seconds.
pub fn to_minute_second(total_seconds: u64) -> (u64, u64) {
    (total_seconds / 60, total_seconds % 60)
}

/// `"<minutes>"`, or `"<minutes>:<seconds>"` when `include_seconds` is set.
pub fn format(minutes: u64, seconds: u64, include_seconds: bool) -> String {
    if include_seconds {
        format!("{minutes}:{seconds}")
    } else {
        minutes.to_string()
    }
}

/// Render a duration, flooring to whole seconds. Negative durations render
/// as zero.
pub fn format_duration(duration: Duration, include_seconds: bool) -> String {
    let total = u64::try_from(duration.num_seconds()).unwrap_or(0);
    let (minutes, seconds) = to_minute_second(total);
    format(minutes, seconds, include_seconds)
}

/// Round a duration to the nearest whole second, clamped at zero.
pub fn round_seconds(duration: Duration) -> u64 {
    let millis = duration.num_milliseconds().max(0);
    u64::try_from((millis + 500) / 1000).unwrap_or(0)
}
