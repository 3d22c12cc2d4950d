//! # Configuration Management
//!
//! This module handles loading and parsing configuration from the
//! salat-widget.toml file. It provides a centralized way to configure the
//! location, the calculation method, per-prayer offsets, the timings API and
//! the widget's own state and refresh cadence.

use crate::wake::DEFAULT_TOLERANCE;
use crate::{Offsets, Prayer};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Default configuration file, looked up in the working directory.
pub const CONFIG_FILE: &str = "salat-widget.toml";

/// Errors raised while reading or writing the configuration file.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("config IO: {0}")]
    Io(#[from] io::Error),

    #[error("invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("config serialization: {0}")]
    Serialize(#[from] toml::ser::Error),
}

/// Application configuration loaded from salat-widget.toml
#[derive(Clone, Debug, Default, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct Config {
    /// Coordinates for the timings API; without them no refresh is attempted
    #[serde(skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
    /// Calculation method and per-prayer adjustments
    pub calculation: CalculationConfig,
    /// Remote timings API settings
    pub api: ApiConfig,
    /// Widget state and wake cadence
    pub widget: WidgetConfig,
}

/// Geographic coordinates in decimal degrees
#[derive(Clone, Copy, Debug, PartialEq, Deserialize, Serialize)]
pub struct Location {
    pub latitude: f64,
    pub longitude: f64,
}

/// Prayer time calculation settings
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct CalculationConfig {
    /// Numeric calculation-method identifier understood by the timings API
    /// (2 = Islamic Society of North America)
    pub method: u8,
    /// Minute adjustments keyed by prayer label, e.g. `Maghrib = 3`
    pub offsets: BTreeMap<String, OffsetValue>,
}

impl Default for CalculationConfig {
    fn default() -> Self {
        CalculationConfig {
            method: 2,
            offsets: BTreeMap::new(),
        }
    }
}

/// An offset written either as a number or as a numeric string.
#[derive(Clone, Debug, PartialEq, Eq, Deserialize, Serialize)]
#[serde(untagged)]
pub enum OffsetValue {
    Minutes(i64),
    Text(String),
}

impl OffsetValue {
    /// The offset in minutes, if it is a number.
    pub fn minutes(&self) -> Option<i64> {
        match self {
            OffsetValue::Minutes(m) => Some(*m),
            OffsetValue::Text(s) => s.trim().parse().ok(),
        }
    }
}

/// Remote timings API configuration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Scheme and host of the API, without a trailing path
    pub base_url: String,
    /// Whole-request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for ApiConfig {
    fn default() -> Self {
        ApiConfig {
            base_url: "https://api.aladhan.com".to_string(),
            timeout_secs: 8,
        }
    }
}

/// Widget state and refresh configuration
#[derive(Clone, Debug, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct WidgetConfig {
    /// Persisted display state file
    pub state_path: PathBuf,
    /// Seconds between wake-ups
    pub tick_seconds: u64,
    /// Wall-clock drift between two wake-ups that counts as a clock change
    pub clock_jump_tolerance_secs: u64,
}

impl Default for WidgetConfig {
    fn default() -> Self {
        WidgetConfig {
            state_path: PathBuf::from("/tmp/salat_widget_state.json"),
            tick_seconds: 60,
            clock_jump_tolerance_secs: DEFAULT_TOLERANCE.as_secs(),
        }
    }
}

impl Config {
    /// Load configuration from salat-widget.toml
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load() -> Self {
        Self::load_from_path(CONFIG_FILE)
    }

    /// Load configuration from specified path
    /// Falls back to default configuration if file doesn't exist or is invalid
    pub fn load_from_path<P: AsRef<Path>>(path: P) -> Self {
        match Self::try_load_from_path(&path) {
            Ok(config) => {
                tracing::info!(path = %path.as_ref().display(), "loaded configuration");
                config
            }
            Err(ConfigError::Io(e)) if e.kind() == io::ErrorKind::NotFound => {
                tracing::info!(
                    path = %path.as_ref().display(),
                    "no config file found, using defaults"
                );
                Self::default()
            }
            Err(e) => {
                tracing::warn!(error = %e, "unusable config file, using defaults");
                Self::default()
            }
        }
    }

    /// Load configuration from specified path, reporting why it failed
    pub fn try_load_from_path<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let contents = fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Save current configuration to the specified path
    pub fn save_to_path<P: AsRef<Path>>(&self, path: P) -> Result<(), ConfigError> {
        let contents = toml::to_string_pretty(self)?;
        fs::write(path, contents)?;
        Ok(())
    }

    /// Per-prayer offsets, keyed by [`Prayer`].
    ///
    /// Unknown labels and non-numeric values are skipped.
    pub fn offsets(&self) -> Offsets {
        self.calculation
            .offsets
            .iter()
            .filter_map(|(label, value)| {
                let prayer = label.parse::<Prayer>().ok();
                let minutes = value.minutes();
                if prayer.is_none() || minutes.is_none() {
                    tracing::warn!(%label, ?value, "ignoring unusable prayer offset");
                }
                Some((prayer?, minutes?))
            })
            .collect()
    }
}
