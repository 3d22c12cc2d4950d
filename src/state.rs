//! # Persisted Display State
//!
//! The widget keeps what it last showed in a small JSON file so that every
//! wake-up can redraw without touching the network. The file is a
//! last-writer-wins key/value store: whoever saves last decides what the next
//! tick reads. There are no transactions and no locking.
//!
//! ## Schema
//!
//! ```json
//! {
//!   "next_prayer_name": "Dhuhr",
//!   "next_prayer_countdown": "00:15:00",
//!   "next_prayer_epoch": "1760606100000",
//!   "adjusted_times": { "Fajr": "05:00", "Dhuhr": "12:15" },
//!   "raw_times": { "Fajr": "05:00 (EEST)", "Dhuhr": "12:15 (EEST)" },
//!   "fetched_for": "2025-10-16"
//! }
//! ```
//!
//! The epoch is stored as a string of epoch milliseconds. A value that doesn't
//! parse is treated as absent, which makes the next tick schedule a refresh.
//!
//! ## Failure Behaviour
//! - **Missing file**: first run, start from an empty state
//! - **Corrupt file**: logged and ignored, start from an empty state
//! - **Write failure**: reported to the caller; the previous file is untouched
//!   because writes go to a sibling temp file that is renamed into place

use crate::countdown::format_countdown;
use crate::resolver::{adjusted_times, ResolvedNext};
use crate::{AdjustedTimes, Offsets, RawTimes};
use chrono::{DateTime, NaiveDate, TimeZone};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Errors raised while saving display state.
#[derive(Error, Debug)]
pub enum StateError {
    #[error("state IO: {0}")]
    Io(#[from] io::Error),

    #[error("state serialization: {0}")]
    Serialize(#[from] serde_json::Error),
}

/// Everything the widget needs to redraw itself between refreshes.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct DisplayState {
    /// Label of the next prayer
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_prayer_name: Option<String>,
    /// Countdown as of the last refresh, `HH:MM:SS`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_prayer_countdown: Option<String>,
    /// Target instant, string-encoded epoch milliseconds
    #[serde(skip_serializing_if = "Option::is_none")]
    pub next_prayer_epoch: Option<String>,
    /// Today's offset-adjusted times
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub adjusted_times: AdjustedTimes,
    /// Raw times as fetched, kept so the same day can be re-resolved offline
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub raw_times: RawTimes,
    /// Local date the raw times belong to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fetched_for: Option<NaiveDate>,
}

impl DisplayState {
    /// Build the state to persist after a successful resolution.
    pub fn record<Tz: TimeZone>(
        next: &ResolvedNext<Tz>,
        now: &DateTime<Tz>,
        raw_times: RawTimes,
        offsets: &Offsets,
        fetched_for: NaiveDate,
    ) -> Self {
        DisplayState {
            next_prayer_name: Some(next.prayer.to_string()),
            next_prayer_countdown: Some(format_countdown(now, &next.at)),
            next_prayer_epoch: Some(next.epoch_millis().to_string()),
            adjusted_times: adjusted_times(&raw_times, offsets),
            raw_times,
            fetched_for: Some(fetched_for),
        }
    }

    /// The stored target instant, if present and numeric.
    pub fn target_epoch_millis(&self) -> Option<i64> {
        self.next_prayer_epoch.as_deref()?.trim().parse().ok()
    }
}

/// File-backed store for [`DisplayState`].
#[derive(Clone, Debug)]
pub struct DisplayStateStore {
    path: PathBuf,
}

impl DisplayStateStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        DisplayStateStore { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the persisted state, or an empty state if there is none usable.
    pub fn load(&self) -> DisplayState {
        let data = match fs::read(&self.path) {
            Ok(data) => data,
            Err(e) if e.kind() == io::ErrorKind::NotFound => {
                tracing::debug!(path = %self.path.display(), "no display state yet");
                return DisplayState::default();
            }
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "cannot read display state");
                return DisplayState::default();
            }
        };

        match serde_json::from_slice(&data) {
            Ok(state) => state,
            Err(e) => {
                tracing::warn!(path = %self.path.display(), error = %e, "ignoring corrupt display state");
                DisplayState::default()
            }
        }
    }

    /// Replace the persisted state.
    pub fn save(&self, state: &DisplayState) -> Result<(), StateError> {
        let data = serde_json::to_vec_pretty(state)?;

        if let Some(dir) = self.path.parent().filter(|d| !d.as_os_str().is_empty()) {
            fs::create_dir_all(dir)?;
        }

        let mut tmp = self.path.clone().into_os_string();
        tmp.push(".tmp");
        let tmp = PathBuf::from(tmp);

        fs::write(&tmp, data)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Prayer;
    use chrono::FixedOffset;
    use tempfile::tempdir;

    fn sample_state() -> DisplayState {
        DisplayState {
            next_prayer_name: Some("Dhuhr".to_string()),
            next_prayer_countdown: Some("00:15:00".to_string()),
            next_prayer_epoch: Some("1760606100000".to_string()),
            adjusted_times: AdjustedTimes::from([(Prayer::Dhuhr, "12:15".to_string())]),
            raw_times: RawTimes::from([(Prayer::Dhuhr, "12:15 (EEST)".to_string())]),
            fetched_for: NaiveDate::from_ymd_opt(2025, 10, 16),
        }
    }

    #[test]
    fn test_save_then_load() {
        let dir = tempdir().unwrap();
        let store = DisplayStateStore::new(dir.path().join("state.json"));

        store.save(&sample_state()).unwrap();
        assert_eq!(store.load(), sample_state());

        // Last writer wins
        let mut newer = sample_state();
        newer.next_prayer_name = Some("Asr".to_string());
        store.save(&newer).unwrap();
        assert_eq!(store.load(), newer);
    }

    #[test]
    fn test_save_creates_parent_directory() {
        let dir = tempdir().unwrap();
        let store = DisplayStateStore::new(dir.path().join("nested/widget/state.json"));
        store.save(&sample_state()).unwrap();
        assert!(store.path().exists());
    }

    #[test]
    fn test_missing_file_loads_empty_state() {
        let dir = tempdir().unwrap();
        let store = DisplayStateStore::new(dir.path().join("absent.json"));
        assert_eq!(store.load(), DisplayState::default());
    }

    #[test]
    fn test_corrupt_file_loads_empty_state() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("state.json");
        fs::write(&path, b"{ not json").unwrap();
        assert_eq!(DisplayStateStore::new(&path).load(), DisplayState::default());
    }

    #[test]
    fn test_wire_field_names() {
        let json = serde_json::to_value(sample_state()).unwrap();
        assert_eq!(json["next_prayer_name"], "Dhuhr");
        assert_eq!(json["next_prayer_countdown"], "00:15:00");
        assert_eq!(json["next_prayer_epoch"], "1760606100000");
        assert_eq!(json["adjusted_times"]["Dhuhr"], "12:15");
        assert_eq!(json["fetched_for"], "2025-10-16");

        let empty = serde_json::to_string(&DisplayState::default()).unwrap();
        assert_eq!(empty, "{}");
    }

    #[test]
    fn test_target_epoch_parsing() {
        let mut state = sample_state();
        assert_eq!(state.target_epoch_millis(), Some(1_760_606_100_000));

        state.next_prayer_epoch = Some("soon".to_string());
        assert_eq!(state.target_epoch_millis(), None);

        state.next_prayer_epoch = None;
        assert_eq!(state.target_epoch_millis(), None);
    }

    #[test]
    fn test_record_captures_resolution() {
        let tz = FixedOffset::east_opt(3 * 3600).unwrap();
        let now = tz.with_ymd_and_hms(2025, 10, 16, 18, 35, 0).unwrap();
        let next = ResolvedNext {
            prayer: Prayer::Maghrib,
            at: tz.with_ymd_and_hms(2025, 10, 16, 18, 40, 0).unwrap(),
        };
        let raw = RawTimes::from([(Prayer::Maghrib, "18:30".to_string())]);
        let offsets = Offsets::from([(Prayer::Maghrib, 10)]);

        let state = DisplayState::record(&next, &now, raw.clone(), &offsets, now.date_naive());

        assert_eq!(state.next_prayer_name.as_deref(), Some("Maghrib"));
        assert_eq!(state.next_prayer_countdown.as_deref(), Some("00:05:00"));
        assert_eq!(state.target_epoch_millis(), Some(next.at.timestamp_millis()));
        assert_eq!(
            state.adjusted_times.get(&Prayer::Maghrib).map(String::as_str),
            Some("18:40")
        );
        assert_eq!(state.raw_times, raw);
        assert_eq!(state.fetched_for, NaiveDate::from_ymd_opt(2025, 10, 16));
    }
}
