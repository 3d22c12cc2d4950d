//! # Widget Orchestration
//!
//! Glue between the persisted display state, the resolver and the timings
//! API. Two entry points:
//!
//! - [`Widget::tick`]: cheap and synchronous, reads state and recomputes the
//!   countdown; called on every wake-up
//! - [`Widget::refresh`]: resolves the next prayer again, from today's cached
//!   raw times when possible and from the API otherwise, and persists the
//!   result once
//!
//! A refresh that cannot complete (no coordinates, network down, API error,
//! no usable times) leaves the stored state untouched so the previous
//! countdown keeps showing.

use crate::config::Config;
use crate::countdown::{format_millis, remaining_millis, PLACEHOLDER};
use crate::resolver::resolve_next;
use crate::state::{DisplayState, DisplayStateStore, StateError};
use crate::timings_api::{TimingsClient, TimingsError};
use crate::RawTimes;
use chrono::{DateTime, NaiveDate, TimeZone};

/// Shown instead of a prayer name when nothing has been resolved yet.
pub const NAME_PLACEHOLDER: &str = "-";

/// The two text views of the widget.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct WidgetView {
    pub prayer_name: String,
    pub countdown: String,
}

impl WidgetView {
    pub fn placeholder() -> Self {
        WidgetView {
            prayer_name: NAME_PLACEHOLDER.to_string(),
            countdown: PLACEHOLDER.to_string(),
        }
    }
}

/// What to draw now, and whether the data behind it needs refreshing.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Presentation {
    pub view: WidgetView,
    pub needs_refresh: bool,
}

/// Work out what the widget shows at `now` from persisted state.
///
/// A refresh is needed when there is no usable target instant, when the
/// countdown has run out, or when the cached times belong to another day.
pub fn present<Tz: TimeZone>(state: &DisplayState, now: &DateTime<Tz>) -> Presentation {
    let prayer_name = state
        .next_prayer_name
        .clone()
        .unwrap_or_else(|| NAME_PLACEHOLDER.to_string());

    let (countdown, expired) = match state.target_epoch_millis() {
        Some(target) => {
            let left = remaining_millis(now.timestamp_millis(), target);
            (format_millis(left), left == 0)
        }
        None => (
            state
                .next_prayer_countdown
                .clone()
                .unwrap_or_else(|| PLACEHOLDER.to_string()),
            true,
        ),
    };

    let other_day = state
        .fetched_for
        .is_some_and(|day| day != now.date_naive());

    Presentation {
        view: WidgetView {
            prayer_name,
            countdown,
        },
        needs_refresh: expired || other_day,
    }
}

/// The widget: configuration, persisted state and the timings client.
#[derive(Clone, Debug)]
pub struct Widget {
    config: Config,
    store: DisplayStateStore,
    client: TimingsClient,
}

impl Widget {
    pub fn new(config: Config) -> Result<Self, TimingsError> {
        let client = TimingsClient::new(&config.api)?;
        let store = DisplayStateStore::new(config.widget.state_path.clone());
        Ok(Widget {
            config,
            store,
            client,
        })
    }

    pub fn config(&self) -> &Config {
        &self.config
    }

    pub fn store(&self) -> &DisplayStateStore {
        &self.store
    }

    /// Redraw from persisted state.
    pub fn tick<Tz: TimeZone>(&self, now: &DateTime<Tz>) -> Presentation {
        present(&self.store.load(), now)
    }

    /// Resolve the next prayer again and persist it.
    ///
    /// Returns the new view, or `None` when the refresh was abandoned and the
    /// previous state is still in place. Only a failure to write the new
    /// state is an error.
    pub async fn refresh<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
    ) -> Result<Option<WidgetView>, StateError> {
        let today = now.date_naive();
        let state = self.store.load();

        if state.fetched_for == Some(today) && !state.raw_times.is_empty() {
            if let Some(view) = self.commit(now, state.raw_times, today)? {
                tracing::debug!("re-resolved from cached timings");
                return Ok(Some(view));
            }
        }

        let Some(location) = self.config.location.as_ref() else {
            tracing::info!("no coordinates configured, skipping refresh");
            return Ok(None);
        };

        let raw = match self
            .client
            .fetch_day(today, location, self.config.calculation.method)
            .await
        {
            Ok(raw) => raw,
            Err(e) => {
                tracing::warn!(error = %e, "timings refresh abandoned, keeping previous state");
                return Ok(None);
            }
        };

        let view = self.commit(now, raw, today)?;
        if view.is_none() {
            tracing::warn!(%today, "timings response had no usable prayer times");
        }
        Ok(view)
    }

    /// Resolve from `raw` and, if that yields a prayer, persist it.
    fn commit<Tz: TimeZone>(
        &self,
        now: &DateTime<Tz>,
        raw: RawTimes,
        day: NaiveDate,
    ) -> Result<Option<WidgetView>, StateError> {
        let offsets = self.config.offsets();
        let Some(next) = resolve_next(now, &raw, &offsets) else {
            return Ok(None);
        };

        let state = DisplayState::record(&next, now, raw, &offsets, day);
        self.store.save(&state)?;

        tracing::info!(
            prayer = %next.prayer,
            at = %next.at.naive_local(),
            epoch_ms = next.epoch_millis(),
            "next prayer resolved"
        );

        Ok(Some(present(&state, now).view))
    }
}
