//! Race settings
//!
//! Data-driven tuning loaded from JSON. Every field falls back to the stock
//! value when missing.

use std::fmt;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::consts::{DECK_SIZE, MAX_FRAME_MS, RACE_DURATION_MS, TELEMETRY_SEGMENTS};

/// Race settings
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RaceSettings {
    /// Race length in milliseconds
    pub duration_ms: f64,
    /// Largest delta the driver feeds into one step
    pub max_frame_ms: f64,
    /// Smoothness segments on the run panel
    pub telemetry_segments: usize,
    /// Cards drawn per deck
    pub deck_size: usize,
}

impl Default for RaceSettings {
    fn default() -> Self {
        Self {
            duration_ms: RACE_DURATION_MS,
            max_frame_ms: MAX_FRAME_MS,
            telemetry_segments: TELEMETRY_SEGMENTS,
            deck_size: DECK_SIZE,
        }
    }
}

#[derive(Debug)]
pub enum SettingsError {
    Io(std::io::Error),
    Parse(serde_json::Error),
    Invalid(&'static str),
}

impl fmt::Display for SettingsError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "settings io error: {err}"),
            Self::Parse(err) => write!(f, "settings parse error: {err}"),
            Self::Invalid(reason) => write!(f, "invalid settings: {reason}"),
        }
    }
}

impl std::error::Error for SettingsError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

impl From<std::io::Error> for SettingsError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<serde_json::Error> for SettingsError {
    fn from(value: serde_json::Error) -> Self {
        Self::Parse(value)
    }
}

impl RaceSettings {
    /// Parse and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        let settings: Self = serde_json::from_str(json)?;
        settings.validate()?;
        Ok(settings)
    }

    pub fn load(path: impl AsRef<Path>) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    pub fn validate(&self) -> Result<(), SettingsError> {
        if !(self.duration_ms.is_finite() && self.duration_ms > 0.0) {
            return Err(SettingsError::Invalid("durationMs must be a positive number"));
        }
        if !(self.max_frame_ms.is_finite() && self.max_frame_ms > 0.0) {
            return Err(SettingsError::Invalid("maxFrameMs must be a positive number"));
        }
        if self.telemetry_segments == 0 {
            return Err(SettingsError::Invalid("telemetrySegments must be at least 1"));
        }
        if self.deck_size == 0 {
            return Err(SettingsError::Invalid("deckSize must be at least 1"));
        }
        Ok(())
    }
}
