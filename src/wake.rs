//! Wall-clock change detection for the wake loop.
//!
//! The loop wakes on a monotonic interval. If the wall clock moves by a
//! different amount than the monotonic clock between two wake-ups (manual
//! time change, NTP step, suspend/resume) or the UTC offset changes (timezone
//! change), the stored target may no longer match what the user expects and
//! the widget should refresh right away.

use chrono::{DateTime, Offset, TimeZone};
use std::time::{Duration, Instant};

/// Wall/monotonic drift tolerated before a clock change is assumed.
pub const DEFAULT_TOLERANCE: Duration = Duration::from_secs(90);

#[derive(Clone, Copy, Debug)]
struct Observation {
    wall_ms: i64,
    utc_offset_secs: i32,
    mono: Instant,
}

/// Remembers the previous wake-up and reports clock jumps.
#[derive(Clone, Debug)]
pub struct ClockWatch {
    last: Option<Observation>,
    tolerance: Duration,
}

impl Default for ClockWatch {
    fn default() -> Self {
        Self::new(DEFAULT_TOLERANCE)
    }
}

impl ClockWatch {
    /// Treat drift beyond `tolerance` as a clock change.
    pub fn new(tolerance: Duration) -> Self {
        ClockWatch {
            last: None,
            tolerance,
        }
    }

    /// Record a wake-up; true if the clock or timezone changed since the last one.
    pub fn observe<Tz: TimeZone>(&mut self, wall: &DateTime<Tz>, mono: Instant) -> bool {
        let current = Observation {
            wall_ms: wall.timestamp_millis(),
            utc_offset_secs: wall.offset().fix().local_minus_utc(),
            mono,
        };
        let Some(previous) = self.last.replace(current) else {
            return false;
        };

        let mono_ms = i64::try_from(mono.saturating_duration_since(previous.mono).as_millis())
            .unwrap_or(i64::MAX);
        let wall_ms = current.wall_ms.saturating_sub(previous.wall_ms);
        let drift_ms = wall_ms.saturating_sub(mono_ms).unsigned_abs();

        let jumped = drift_ms > self.tolerance.as_millis() as u64;
        let rezoned = current.utc_offset_secs != previous.utc_offset_secs;
        if jumped || rezoned {
            tracing::info!(drift_ms, rezoned, "wall clock changed");
        }
        jumped || rezoned
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{Duration as ChronoDuration, FixedOffset};

    fn wall(offset_hours: i32) -> DateTime<FixedOffset> {
        FixedOffset::east_opt(offset_hours * 3600)
            .unwrap()
            .with_ymd_and_hms(2025, 10, 16, 12, 0, 0)
            .unwrap()
    }

    #[test]
    fn test_first_observation_is_quiet() {
        let mut watch = ClockWatch::default();
        assert!(!watch.observe(&wall(3), Instant::now()));
    }

    #[test]
    fn test_steady_ticks_are_quiet() {
        let mut watch = ClockWatch::default();
        let start = Instant::now();
        assert!(!watch.observe(&wall(3), start));
        assert!(!watch.observe(
            &(wall(3) + ChronoDuration::seconds(60)),
            start + Duration::from_secs(60)
        ));
        // A few seconds of scheduling jitter is fine
        assert!(!watch.observe(
            &(wall(3) + ChronoDuration::seconds(125)),
            start + Duration::from_secs(120)
        ));
    }

    #[test]
    fn test_forward_jump_detected() {
        let mut watch = ClockWatch::default();
        let start = Instant::now();
        watch.observe(&wall(3), start);
        assert!(watch.observe(
            &(wall(3) + ChronoDuration::hours(2)),
            start + Duration::from_secs(60)
        ));
    }

    #[test]
    fn test_backward_jump_detected() {
        let mut watch = ClockWatch::default();
        let start = Instant::now();
        watch.observe(&wall(3), start);
        assert!(watch.observe(
            &(wall(3) - ChronoDuration::minutes(30)),
            start + Duration::from_secs(60)
        ));
    }

    #[test]
    fn test_tolerance_is_configurable() {
        let start = Instant::now();
        let late = wall(3) + ChronoDuration::seconds(100);

        let mut strict = ClockWatch::new(Duration::from_secs(10));
        strict.observe(&wall(3), start);
        assert!(strict.observe(&late, start + Duration::from_secs(60)));

        let mut relaxed = ClockWatch::new(Duration::from_secs(120));
        relaxed.observe(&wall(3), start);
        assert!(!relaxed.observe(&late, start + Duration::from_secs(60)));
    }

    #[test]
    fn test_timezone_change_detected() {
        let mut watch = ClockWatch::default();
        let start = Instant::now();
        watch.observe(&wall(3), start);

        // Same instant, different zone
        let moved = wall(3).with_timezone(&FixedOffset::east_opt(3600).unwrap());
        assert!(watch.observe(&moved, start));
        assert!(!watch.observe(&moved, start));
    }
}
