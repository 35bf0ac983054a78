//! Race state and core simulation types
//!
//! Everything a step reads or writes lives in `RaceState`, so a state value
//! plus a delta fully determines the next state.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::rng::{Lcg, seed_from_cards};
use crate::cards::{Card, CardProfile};
use crate::consts::RACE_DURATION_MS;

/// Kinds of rhythm events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EventKind {
    Jitter,
    Stall,
    Drop,
    Surge,
}

impl EventKind {
    /// Evaluation order for the event generator (first match wins)
    pub const PRIORITY: [EventKind; 4] = [
        EventKind::Jitter,
        EventKind::Stall,
        EventKind::Drop,
        EventKind::Surge,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            EventKind::Jitter => "jitter",
            EventKind::Stall => "stall",
            EventKind::Drop => "drop",
            EventKind::Surge => "surge",
        }
    }

    /// Surges help; everything else is a hiccup
    pub fn is_disruptive(&self) -> bool {
        !matches!(self, EventKind::Surge)
    }
}

/// One value per event kind
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct EventTable<T> {
    pub jitter: T,
    pub stall: T,
    pub drop: T,
    pub surge: T,
}

impl<T: Copy> EventTable<T> {
    pub fn splat(value: T) -> Self {
        Self {
            jitter: value,
            stall: value,
            drop: value,
            surge: value,
        }
    }

    pub fn get(&self, kind: EventKind) -> T {
        match kind {
            EventKind::Jitter => self.jitter,
            EventKind::Stall => self.stall,
            EventKind::Drop => self.drop,
            EventKind::Surge => self.surge,
        }
    }

    pub fn set(&mut self, kind: EventKind, value: T) {
        match kind {
            EventKind::Jitter => self.jitter = value,
            EventKind::Stall => self.stall = value,
            EventKind::Drop => self.drop = value,
            EventKind::Surge => self.surge = value,
        }
    }
}

/// A timed modifier currently applied to a participant
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ActiveEffect {
    pub kind: EventKind,
    /// Removed once this reaches zero
    pub remaining_ms: f64,
    /// 0-1 magnitude
    pub strength: f64,
}

/// Append-only log record of a fired event
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceEvent {
    pub id: String,
    pub time_ms: f64,
    pub participant_id: String,
    pub kind: EventKind,
    pub message: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub duration_ms: Option<f64>,
}

/// A racing network
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Participant {
    pub id: String,
    pub name: String,
    /// 0-100, percentage of track
    pub position: f64,
    /// 0.1-1.0, last computed pace factor
    pub speed: f64,
    pub cards: Vec<Card>,
    #[serde(default)]
    pub start_delay_ms: Option<f64>,
}

impl Participant {
    /// Create a participant at the start line; the staggered start comes from the deck
    pub fn new(id: impl Into<String>, name: impl Into<String>, cards: Vec<Card>) -> Self {
        let start_delay = CardProfile::from_cards(&cards).start_delay_ms();
        Self {
            id: id.into(),
            name: name.into(),
            position: 0.0,
            speed: 0.5,
            cards,
            start_delay_ms: Some(start_delay),
        }
    }

    pub fn start_delay(&self) -> f64 {
        self.start_delay_ms.unwrap_or(0.0)
    }
}

/// Last fire times per participant; 0 until something fires
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EventClock {
    pub last_any_ms: f64,
    pub last_ms: EventTable<f64>,
}

impl EventClock {
    pub fn record(&mut self, kind: EventKind, time_ms: f64) {
        self.last_any_ms = time_ms;
        self.last_ms.set(kind, time_ms);
    }
}

/// Complete race state (deterministic, serializable)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RaceState {
    /// Milliseconds simulated so far, never past `duration`
    pub elapsed_time: f64,
    pub duration: f64,
    /// Ordered participants; the first is commented on against the second
    pub participants: Vec<Participant>,
    /// Capped event log, oldest first
    pub events: Vec<RaceEvent>,
    /// Active effects by participant id
    pub effects: BTreeMap<String, Vec<ActiveEffect>>,
    /// Fire clocks by participant id (survive log eviction)
    #[serde(default)]
    pub clocks: BTreeMap<String, EventClock>,
    /// Race PRNG
    pub rng: Lcg,
    /// Display seed for the run panel
    pub run_id: u64,
    /// Rolling commentary, newest last
    pub commentary: Vec<String>,
}

impl RaceState {
    /// Start a race; the seed is hashed from every participant's cards and the run id
    pub fn new(participants: Vec<Participant>, duration: f64, run_id: u64) -> Self {
        let seed = seed_from_cards(participants.iter().flat_map(|p| p.cards.iter()), run_id);
        Self::with_seed(participants, duration, run_id, seed)
    }

    /// Start a race from an explicit seed
    pub fn with_seed(participants: Vec<Participant>, duration: f64, run_id: u64, seed: u32) -> Self {
        let effects = participants
            .iter()
            .map(|p| (p.id.clone(), Vec::new()))
            .collect();
        let clocks = participants
            .iter()
            .map(|p| (p.id.clone(), EventClock::default()))
            .collect();
        Self {
            elapsed_time: 0.0,
            duration: duration.max(0.0),
            participants,
            events: Vec::new(),
            effects,
            clocks,
            rng: Lcg::new(seed),
            run_id,
            commentary: Vec::new(),
        }
    }

    /// Stock two-network race: "user" against "opponent"
    pub fn head_to_head(user_cards: Vec<Card>, opponent_cards: Vec<Card>, run_id: u64) -> Self {
        Self::new(
            vec![
                Participant::new("user", "Your Network", user_cards),
                Participant::new("opponent", "Opponent Network", opponent_cards),
            ],
            RACE_DURATION_MS,
            run_id,
        )
    }

    pub fn is_finished(&self) -> bool {
        self.elapsed_time >= self.duration
    }

    /// Fraction of the race elapsed, in [0, 1]
    pub fn progress(&self) -> f64 {
        crate::clamp(self.elapsed_time / self.duration.max(1.0), 0.0, 1.0)
    }

    pub fn participant(&self, id: &str) -> Option<&Participant> {
        self.participants.iter().find(|p| p.id == id)
    }

    pub fn effects_for(&self, id: &str) -> &[ActiveEffect] {
        self.effects.get(id).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Logged events for one participant, oldest first
    pub fn events_for<'a>(&'a self, id: &'a str) -> impl Iterator<Item = &'a RaceEvent> + 'a {
        self.events.iter().filter(move |e| e.participant_id == id)
    }
}
