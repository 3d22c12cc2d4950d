//! # Salat Widget Core Library
//!
//! This library provides the data model and building blocks for a next-prayer
//! countdown widget. The widget shows two things: the name of the next of the
//! five daily prayers and a live `HH:MM:SS` countdown to it.
//!
//! ## Design Philosophy
//!
//! ### Pure core, thin edges
//! - **Stateless resolution**: [`resolver::resolve_next`] is a pure function of
//!   the current instant, today's raw clock-times and per-prayer offsets
//! - **One write per refresh**: the [`widget`] orchestrator persists the result
//!   once, after resolution, never from inside the algorithm
//! - **Tolerant input**: garbled or missing times for one prayer never prevent
//!   the others from resolving
//!
//! ### Data Flow
//! 1. **Tick**: read persisted display state → recompute countdown → render
//! 2. **Refresh** (state missing, expired, or from another day): cached raw
//!    times or the remote timings API → resolve → persist → render
//! 3. **Failure**: abandon the refresh and keep showing the previous state
//!
//! ## Core Types
//!
//! - [`Prayer`]: one of the five fixed daily prayers, in daily order
//! - [`RawTimes`]: prayer → raw clock-time string as delivered by the API
//! - [`Offsets`]: prayer → minute adjustment (may be negative)

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

// Module declarations
pub mod config;
pub mod countdown;
pub mod renderer;
pub mod resolver;
pub mod state;
pub mod timings_api;
pub mod wake;
pub mod widget;

/// One of the five daily prayers.
///
/// The derived ordering is the fixed daily order
/// `Fajr < Dhuhr < Asr < Maghrib < Isha`, which is also the scan order used
/// when resolving the next prayer.
///
/// # Example
/// ```
/// use salat_widget_lib::Prayer;
///
/// let asr: Prayer = "asr".parse().unwrap();
/// assert_eq!(asr, Prayer::Asr);
/// assert!(Prayer::Fajr < Prayer::Isha);
/// assert_eq!(asr.to_string(), "Asr");
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum Prayer {
    Fajr,
    Dhuhr,
    Asr,
    Maghrib,
    Isha,
}

impl Prayer {
    /// All five prayers in daily order.
    pub const ALL: [Prayer; 5] = [
        Prayer::Fajr,
        Prayer::Dhuhr,
        Prayer::Asr,
        Prayer::Maghrib,
        Prayer::Isha,
    ];

    /// English label, as used by the timings API and shown on the widget.
    pub fn name(self) -> &'static str {
        match self {
            Prayer::Fajr => "Fajr",
            Prayer::Dhuhr => "Dhuhr",
            Prayer::Asr => "Asr",
            Prayer::Maghrib => "Maghrib",
            Prayer::Isha => "Isha",
        }
    }
}

impl fmt::Display for Prayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// A label that is not one of the five prayers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown prayer label: {0:?}")]
pub struct UnknownPrayer(pub String);

impl FromStr for Prayer {
    type Err = UnknownPrayer;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let label = s.trim();
        Prayer::ALL
            .into_iter()
            .find(|p| p.name().eq_ignore_ascii_case(label))
            .ok_or_else(|| UnknownPrayer(s.to_string()))
    }
}

/// Raw clock-time strings per prayer, e.g. `"05:00"` or `"05:00 (CEST)"`.
///
/// Entries may be missing or malformed; consumers skip what they can't parse.
pub type RawTimes = BTreeMap<Prayer, String>;

/// Per-prayer minute offsets. Absent prayers have an offset of zero.
pub type Offsets = BTreeMap<Prayer, i64>;

/// Offset-adjusted `"HH:MM"` clock-times per prayer, kept for display.
pub type AdjustedTimes = BTreeMap<Prayer, String>;
