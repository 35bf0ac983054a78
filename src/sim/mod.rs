//! Deterministic race simulation module
//!
//! All race logic lives here. This module must be pure and deterministic:
//! - Variable deltas, no dependence on tick rate
//! - Seeded LCG only, carried inside the state
//! - Stable iteration order (participants in order, maps keyed by id)
//! - No rendering or platform dependencies

pub mod commentary;
pub mod events;
pub mod integrate;
pub mod model;
pub mod modifiers;
pub mod rng;
pub mod state;
pub mod step;

pub use commentary::commentary_line;
pub use events::{base_event_rates, min_event_gap_ms, rate_scale, trigger_probability};
pub use integrate::StepFrame;
pub use model::{CardModel, RaceModel};
pub use modifiers::{ModifierSet, network_quality};
pub use rng::{Lcg, seed_from_cards};
pub use state::{
    ActiveEffect, EventClock, EventKind, EventTable, Participant, RaceEvent, RaceState,
};
pub use step::{advance, step, step_with};
