//! Countdown formatting for the widget's second text line.

use chrono::{DateTime, Duration, TimeZone};

/// Shown when there is no target instant to count down to.
pub const PLACEHOLDER: &str = "--:--:--";

/// Time left until `target`, never negative.
pub fn remaining<A: TimeZone, B: TimeZone>(now: &DateTime<A>, target: &DateTime<B>) -> Duration {
    Duration::milliseconds(remaining_millis(
        now.timestamp_millis(),
        target.timestamp_millis(),
    ))
}

/// Milliseconds left between two epoch-millisecond instants, clamped at zero.
pub fn remaining_millis(now_ms: i64, target_ms: i64) -> i64 {
    target_ms.saturating_sub(now_ms).max(0)
}

/// Render the time left until `target` as `HH:MM:SS`.
///
/// Partial seconds are truncated. Hours are not capped, so a target four days
/// away renders as `"96:00:00"`.
///
/// # Example
/// ```
/// use chrono::{TimeZone, Utc};
/// use salat_widget_lib::countdown::format_countdown;
///
/// let now = Utc.with_ymd_and_hms(2025, 10, 16, 12, 0, 0).unwrap();
/// let target = Utc.with_ymd_and_hms(2025, 10, 16, 12, 15, 0).unwrap();
/// assert_eq!(format_countdown(&now, &target), "00:15:00");
/// assert_eq!(format_countdown(&target, &now), "00:00:00");
/// ```
pub fn format_countdown<A: TimeZone, B: TimeZone>(now: &DateTime<A>, target: &DateTime<B>) -> String {
    format_millis(remaining(now, target).num_milliseconds())
}

/// Render a millisecond duration as `HH:MM:SS`; negative input renders as zero.
pub fn format_millis(millis: i64) -> String {
    let secs = millis.max(0) / 1000;
    format!(
        "{:02}:{:02}:{:02}",
        secs / 3600,
        (secs / 60) % 60,
        secs % 60
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn noon() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 10, 16, 12, 0, 0).unwrap()
    }

    #[test]
    fn test_zero_difference() {
        assert_eq!(format_countdown(&noon(), &noon()), "00:00:00");
    }

    #[test]
    fn test_past_target_clamps_to_zero() {
        let earlier = noon() - Duration::minutes(5);
        assert_eq!(format_countdown(&noon(), &earlier), "00:00:00");
        assert_eq!(remaining(&noon(), &earlier), Duration::zero());
    }

    #[test]
    fn test_partial_seconds_truncate() {
        let target = noon() + Duration::milliseconds(61_999);
        assert_eq!(format_countdown(&noon(), &target), "00:01:01");
    }

    #[test]
    fn test_hours_are_unbounded() {
        let target = noon() + Duration::hours(123) + Duration::minutes(4) + Duration::seconds(5);
        assert_eq!(format_countdown(&noon(), &target), "123:04:05");
    }

    #[test]
    fn test_mixed_timezones_compare_instants() {
        let tz = chrono::FixedOffset::east_opt(3 * 3600).unwrap();
        // 15:30 at +03:00 is 12:30 UTC
        let target = tz.with_ymd_and_hms(2025, 10, 16, 15, 30, 0).unwrap();
        assert_eq!(format_countdown(&noon(), &target), "00:30:00");
    }

    #[test]
    fn test_remaining_millis_saturates() {
        assert_eq!(remaining_millis(i64::MIN, i64::MAX), i64::MAX);
        assert_eq!(remaining_millis(i64::MAX, i64::MIN), 0);
        assert_eq!(format_millis(-5_000), "00:00:00");
    }
}
