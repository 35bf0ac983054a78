//! Netrace - a card-driven network race
//!
//! Core modules:
//! - `sim`: Deterministic race engine (PRNG, modifiers, events, integration, commentary)
//! - `cards`: Card model and deck aggregation
//! - `telemetry`: Smoothness segments and "now/trend" text for the run panel
//! - `catalog`: The stock card pool and seeded draws
//! - `analysis`: End-of-race narrative
//! - `driver`: Frame-loop driver that clamps deltas and produces the final outcome
//! - `settings`: Data-driven race configuration

pub mod analysis;
pub mod cards;
pub mod catalog;
pub mod driver;
pub mod settings;
pub mod sim;
pub mod telemetry;

pub use cards::{Card, CardCategory, CardProfile, CardRarity, CardStats};
pub use driver::{RaceDriver, RaceOutcome, RacePhase, RaceResult, Winner};
pub use settings::RaceSettings;

/// Race tuning constants
pub mod consts {
    /// Stock race length (30 seconds)
    pub const RACE_DURATION_MS: f64 = 30_000.0;
    /// Largest delta a driver feeds into one step (frame hitch guard)
    pub const MAX_FRAME_MS: f64 = 50.0;
    /// Nominal frame delta (~60 Hz)
    pub const FRAME_MS: f64 = 16.0;

    /// Event log capacity (oldest entries evicted first)
    pub const MAX_EVENTS: usize = 30;
    /// Rolling commentary buffer length
    pub const COMMENTARY_LEN: usize = 3;

    /// Lead cap relative to time-implied progress
    pub const LEAD_CAP: f64 = 1.04;
    /// Lag floor relative to time-implied progress
    pub const LAG_CAP: f64 = 0.78;

    /// Base speed for a participant holding no cards
    pub const EMPTY_DECK_SPEED: f64 = 0.3;
    /// Longest staggered start
    pub const MAX_START_DELAY_MS: f64 = 1200.0;

    /// Position gap under which a finish is called close
    pub const CLOSE_FINISH_GAP: f64 = 2.0;

    /// Cards drawn per deck
    pub const DECK_SIZE: usize = 3;
    /// Smoothness segments on the run panel
    pub const TELEMETRY_SEGMENTS: usize = 12;
}

/// Clamp `value` into `[min, max]`.
///
/// NaN collapses to `min`, so downstream values always stay in range.
#[inline]
pub fn clamp(value: f64, min: f64, max: f64) -> f64 {
    value.max(min).min(max)
}

/// Uniform sample in `[min, max)` from a unit draw
#[inline]
pub fn lerp_range(unit: f64, min: f64, max: f64) -> f64 {
    min + (max - min) * unit
}
