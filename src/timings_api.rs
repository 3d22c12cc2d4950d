//! # Remote Prayer Timings
//!
//! This module fetches a single day's raw prayer times from an Aladhan
//! compatible timings API. It only fetches and decodes; choosing the next
//! prayer is left to [`crate::resolver`].
//!
//! ## Request
//!
//! ```text
//! GET {base_url}/v1/timings/2025-10-16?latitude=21.422500&longitude=39.826200&method=2
//! ```
//!
//! ## Response
//!
//! ```json
//! {
//!   "code": 200,
//!   "status": "OK",
//!   "data": { "timings": { "Fajr": "05:00 (EEST)", "Sunrise": "06:20", "Dhuhr": "12:15", ... } }
//! }
//! ```
//!
//! Only the five prayer labels are kept. Values are stored as delivered,
//! timezone suffix included; the resolver's parser strips it.
//!
//! ## Error Handling
//!
//! - **Network failures and timeouts**: `TimingsError::Http`
//! - **Non-success HTTP status**: `TimingsError::Status`
//! - **API-level failure** (`code` other than 200): `TimingsError::Api`
//! - **Malformed body**: `TimingsError::Decode` / `TimingsError::MissingTimings`
//!
//! Callers abandon the refresh on any of these and keep their previous state.

use crate::config::{ApiConfig, Location};
use crate::{Prayer, RawTimes};
use chrono::NaiveDate;
use serde::Deserialize;
use std::time::Duration;
use thiserror::Error;

/// Sent with every request so the API operator can identify the client.
const USER_AGENT: &str = concat!("SalatWidget/", env!("CARGO_PKG_VERSION"));

/// Errors that can occur while fetching a day's timings.
#[derive(Error, Debug)]
pub enum TimingsError {
    /// Transport failure, including timeouts
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Server answered with a non-success HTTP status
    #[error("timings API returned HTTP {0}")]
    Status(u16),

    /// Server answered but reported a failure in the body
    #[error("timings API reported code {code}: {status}")]
    Api { code: i64, status: String },

    /// Body was not the expected JSON
    #[error("malformed timings response: {0}")]
    Decode(#[from] serde_json::Error),

    /// Body had no `data.timings` object
    #[error("timings response has no timings object")]
    MissingTimings,
}

#[derive(Deserialize)]
struct Envelope {
    #[serde(default)]
    code: i64,
    #[serde(default)]
    status: Option<String>,
    #[serde(default)]
    data: serde_json::Value,
}

/// Client for the remote timings API.
#[derive(Clone, Debug)]
pub struct TimingsClient {
    http: reqwest::Client,
    base_url: String,
}

impl TimingsClient {
    /// Build a client with the configured base URL and timeout.
    pub fn new(api: &ApiConfig) -> Result<Self, TimingsError> {
        let timeout = Duration::from_secs(api.timeout_secs);
        let http = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .connect_timeout(timeout)
            .timeout(timeout)
            .build()?;

        Ok(TimingsClient {
            http,
            base_url: api.base_url.trim_end_matches('/').to_string(),
        })
    }

    /// Fetch the raw prayer times for `date` at `location`.
    pub async fn fetch_day(
        &self,
        date: NaiveDate,
        location: &Location,
        method: u8,
    ) -> Result<RawTimes, TimingsError> {
        let url = format!("{}/v1/timings/{}", self.base_url, date.format("%Y-%m-%d"));
        tracing::debug!(%url, latitude = location.latitude, longitude = location.longitude, method, "fetching prayer timings");

        let response = self
            .http
            .get(&url)
            .header("Accept", "application/json")
            .query(&[
                ("latitude", format!("{:.6}", location.latitude)),
                ("longitude", format!("{:.6}", location.longitude)),
                ("method", method.to_string()),
            ])
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(TimingsError::Status(status.as_u16()));
        }

        let body = response.text().await?;
        let raw = decode_timings(&body)?;

        tracing::info!(%date, prayers = raw.len(), "fetched prayer timings");
        Ok(raw)
    }
}

/// Decode a timings API response body into raw times for the five prayers.
///
/// Labels other than the five prayers are ignored, as are non-string values.
pub fn decode_timings(body: &str) -> Result<RawTimes, TimingsError> {
    let envelope: Envelope = serde_json::from_str(body)?;
    if envelope.code != 200 {
        return Err(TimingsError::Api {
            code: envelope.code,
            status: envelope.status.unwrap_or_default(),
        });
    }

    let timings = envelope
        .data
        .get("timings")
        .and_then(serde_json::Value::as_object)
        .ok_or(TimingsError::MissingTimings)?;

    Ok(Prayer::ALL
        .into_iter()
        .filter_map(|prayer| {
            let value = timings.get(prayer.name())?.as_str()?;
            Some((prayer, value.to_string()))
        })
        .collect())
}
