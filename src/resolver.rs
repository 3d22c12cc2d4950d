//! # Next Prayer Resolution
//!
//! Given today's five raw clock-times, per-prayer minute offsets and the
//! current instant, pick the prayer that comes next and the absolute instant
//! at which it occurs.
//!
//! ## Algorithm
//!
//! 1. Take the local calendar date of `now` (in `now`'s own timezone)
//! 2. Scan `Fajr → Dhuhr → Asr → Maghrib → Isha`; for each parseable time,
//!    build the local instant on that date, add the prayer's offset, and
//!    select it if it is strictly later than `now + 30s`
//! 3. If nothing qualifies, the answer is tomorrow's Fajr (same offset)
//! 4. If Fajr is missing or garbled too, there is no answer
//!
//! Out-of-range fields carry over instead of being rejected: minutes of 60 or
//! more roll into the hour (`"12:75"` is 13:15), and a time past 24:00
//! (`"24:15"`, `"25:05"`) lands on the following day. Anything after the
//! minutes field, such as a `" (CEST)"` suffix, is ignored.
//!
//! ## Local Time Edge Cases
//! - Ambiguous wall-clock times (DST fall-back) resolve to the earlier instant
//! - Non-existent wall-clock times (DST spring-forward gap) make that prayer
//!   unusable for the day; it is skipped like any other unparseable entry

use crate::{AdjustedTimes, Offsets, Prayer, RawTimes};
use chrono::{DateTime, Duration, NaiveDate, TimeZone};

/// Margin that keeps a prayer from being selected as "next" right as it passes.
pub const BUFFER_SECS: i64 = 30;

const MINUTES_PER_DAY: i64 = 24 * 60;

/// A parsed clock-time.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ClockTime {
    /// Hour of day, always `< 24`
    pub hour: u32,
    /// Minute of hour, always `< 60`
    pub minute: u32,
    /// True when the source used 24+ hour notation for a post-midnight time
    pub next_day: bool,
}

impl ClockTime {
    /// Minutes since the start of the day this time falls on.
    fn minutes_of_day(self) -> i64 {
        i64::from(self.hour) * 60 + i64::from(self.minute)
    }
}

/// The prayer that comes next and when it occurs, offset included.
#[derive(Clone, Debug)]
pub struct ResolvedNext<Tz: TimeZone> {
    pub prayer: Prayer,
    pub at: DateTime<Tz>,
}

impl<Tz: TimeZone> ResolvedNext<Tz> {
    /// The target instant as epoch milliseconds.
    pub fn epoch_millis(&self) -> i64 {
        self.at.timestamp_millis()
    }
}

/// Parse a raw clock-time such as `"05:07"`, `"05:07 (EET)"` or `"25:10"`.
///
/// Returns `None` for anything that doesn't yield a numeric hour and minute.
/// Minutes past 59 roll into the hour; a total past 24:00 sets `next_day`.
///
/// # Example
/// ```
/// use salat_widget_lib::resolver::{parse_clock, ClockTime};
///
/// assert_eq!(
///     parse_clock("05:07 (EET)"),
///     Some(ClockTime { hour: 5, minute: 7, next_day: false })
/// );
/// assert_eq!(
///     parse_clock("24:30"),
///     Some(ClockTime { hour: 0, minute: 30, next_day: true })
/// );
/// assert_eq!(
///     parse_clock("12:75"),
///     Some(ClockTime { hour: 13, minute: 15, next_day: false })
/// );
/// assert_eq!(parse_clock("noon"), None);
/// ```
pub fn parse_clock(raw: &str) -> Option<ClockTime> {
    // "(TZ)" suffixes may themselves contain colons, e.g. "(+03:00)"
    let time = raw.split('(').next().unwrap_or_default();
    let mut fields = time.split(':');
    let hour = digits(fields.next()?)?;
    let minute = digits(fields.next()?)?;

    let total = i64::from(hour)
        .checked_mul(60)?
        .checked_add(i64::from(minute))?;
    let of_day = total % MINUTES_PER_DAY;
    Some(ClockTime {
        hour: u32::try_from(of_day / 60).ok()?,
        minute: u32::try_from(of_day % 60).ok()?,
        next_day: total >= MINUTES_PER_DAY,
    })
}

fn digits(field: &str) -> Option<u32> {
    let digits: String = field.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

/// Resolve the next prayer after `now`.
///
/// Pure: the result depends only on the arguments. `None` means there was not
/// enough usable data for the rest of today nor for tomorrow's Fajr.
///
/// # Example
/// ```
/// use chrono::{FixedOffset, TimeZone};
/// use salat_widget_lib::{resolver::resolve_next, Offsets, Prayer, RawTimes};
///
/// let tz = FixedOffset::east_opt(3 * 3600).unwrap();
/// let now = tz.with_ymd_and_hms(2025, 10, 16, 12, 0, 0).unwrap();
///
/// let mut raw = RawTimes::new();
/// raw.insert(Prayer::Fajr, "05:00".into());
/// raw.insert(Prayer::Dhuhr, "12:15".into());
///
/// let next = resolve_next(&now, &raw, &Offsets::new()).unwrap();
/// assert_eq!(next.prayer, Prayer::Dhuhr);
/// assert_eq!(next.at, tz.with_ymd_and_hms(2025, 10, 16, 12, 15, 0).unwrap());
/// ```
pub fn resolve_next<Tz: TimeZone>(
    now: &DateTime<Tz>,
    raw: &RawTimes,
    offsets: &Offsets,
) -> Option<ResolvedNext<Tz>> {
    let tz = now.timezone();
    let today = now.date_naive();
    let threshold = now.clone() + Duration::seconds(BUFFER_SECS);

    let later_today = Prayer::ALL.into_iter().find_map(|prayer| {
        let at = occurrence(&tz, today, prayer, raw, offsets)?;
        (at > threshold).then_some(ResolvedNext { prayer, at })
    });

    later_today.or_else(|| {
        let tomorrow = today.succ_opt()?;
        let at = occurrence(&tz, tomorrow, Prayer::Fajr, raw, offsets)?;
        Some(ResolvedNext {
            prayer: Prayer::Fajr,
            at,
        })
    })
}

/// Offset-adjusted instant of `prayer` on local date `date`, if usable.
fn occurrence<Tz: TimeZone>(
    tz: &Tz,
    date: NaiveDate,
    prayer: Prayer,
    raw: &RawTimes,
    offsets: &Offsets,
) -> Option<DateTime<Tz>> {
    let text = raw.get(&prayer)?;
    let Some(clock) = parse_clock(text) else {
        tracing::trace!(%prayer, raw = %text, "skipping unparseable prayer time");
        return None;
    };

    let day = if clock.next_day { date.succ_opt()? } else { date };
    let local = day.and_hms_opt(clock.hour, clock.minute, 0)?;
    let Some(at) = tz.from_local_datetime(&local).earliest() else {
        tracing::trace!(%prayer, %local, "skipping non-existent local time");
        return None;
    };

    let offset = offsets.get(&prayer).copied().unwrap_or(0);
    at.checked_add_signed(Duration::try_minutes(offset)?)
}

/// Apply offsets to the parseable raw times, yielding `"HH:MM"` per prayer.
///
/// Adjusted times wrap around midnight; garbled entries are left out.
pub fn adjusted_times(raw: &RawTimes, offsets: &Offsets) -> AdjustedTimes {
    raw.iter()
        .filter_map(|(&prayer, text)| {
            let clock = parse_clock(text)?;
            let offset = offsets.get(&prayer).copied().unwrap_or(0);
            let minutes = clock
                .minutes_of_day()
                .checked_add(offset)?
                .rem_euclid(MINUTES_PER_DAY);
            Some((prayer, format!("{:02}:{:02}", minutes / 60, minutes % 60)))
        })
        .collect()
}
