//! Pluggable rate model
//!
//! The step asks a `RaceModel` for each participant's modifiers and event
//! rates. `CardModel` is the stock card-driven model; tests swap in models
//! with forced rates.

use super::events::base_event_rates;
use super::modifiers::ModifierSet;
use super::state::EventTable;
use crate::cards::{Card, CardProfile};

pub trait RaceModel {
    /// Modifiers for a deck
    fn modifiers(&self, cards: &[Card]) -> ModifierSet {
        ModifierSet::from_cards(cards)
    }

    /// Per-second event rates before the [0, 0.6] trigger clamp
    fn event_rates(
        &self,
        profile: &CardProfile,
        modifiers: &ModifierSet,
        rate_scale: f64,
    ) -> EventTable<f64> {
        base_event_rates(profile, modifiers, rate_scale)
    }
}

/// Stock model: modifiers and rates straight from the cards
#[derive(Debug, Clone, Copy, Default)]
pub struct CardModel;

impl RaceModel for CardModel {}
