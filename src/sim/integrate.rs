//! Position integration
//!
//! Advances one participant along the track: base pace from the deck, active
//! effect multipliers, bounded random drift, then the lead/lag clamp around
//! the time-implied target progress.

use super::modifiers::ModifierSet;
use super::rng::Lcg;
use super::state::{ActiveEffect, EventKind, Participant};
use crate::cards::CardProfile;
use crate::clamp;
use crate::consts::{LAG_CAP, LEAD_CAP};

/// Per-step timing shared by every participant
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct StepFrame {
    /// Elapsed race time after this step
    pub elapsed_ms: f64,
    /// Time advanced by this step
    pub dt_ms: f64,
    /// Where a perfectly on-pace participant would be (0-100)
    pub target_progress: f64,
    /// Nominal advance this step with no modifiers (percentage points)
    pub base_delta: f64,
}

impl StepFrame {
    pub fn new(elapsed_ms: f64, dt_ms: f64, duration: f64) -> Self {
        let duration = duration.max(1.0);
        Self {
            elapsed_ms,
            dt_ms,
            target_progress: (elapsed_ms / duration).min(1.0) * 100.0,
            base_delta: dt_ms / duration * 100.0,
        }
    }

    pub fn max_lead(&self) -> f64 {
        (self.target_progress * LEAD_CAP).min(100.0)
    }

    pub fn min_trail(&self, delayed_start: bool) -> f64 {
        if delayed_start {
            0.0
        } else {
            (self.target_progress * LAG_CAP).max(0.0)
        }
    }
}

/// Deck-driven pace before effects, including the random drift term
pub fn pace_factor(profile: &CardProfile, modifiers: &ModifierSet, rng: &mut Lcg) -> f64 {
    let bandwidth_boost = profile.bandwidth as f64 * 0.03;
    let burst_boost = (profile.burst - 50.0) / 300.0;
    let delay_penalty = 1.0 - (profile.delay / 250.0).min(0.25);

    let variance = (1.0 - profile.predictability / 100.0) * 0.18 * modifiers.jitter_offset_mul;
    let drift = (rng.next_f64() - 0.5) * variance;

    let mut speed = clamp(
        0.9 + profile.base_speed() * 0.2 + burst_boost + bandwidth_boost,
        0.82,
        1.2,
    );
    speed *= delay_penalty;
    speed += drift;
    speed * modifiers.speed_bias
}

/// Combined multiplier and positional offset from active effects
pub fn effect_response(effects: &[ActiveEffect], rng: &mut Lcg) -> (f64, f64) {
    let mut speed_multiplier = 1.0;
    let mut offset = 0.0;
    for effect in effects {
        match effect.kind {
            EventKind::Jitter => {
                speed_multiplier *= 0.9 + effect.strength * 0.1;
                offset += (rng.next_f64() - 0.5) * (1.4 * effect.strength);
            }
            // Strength is the fraction of pace retained
            EventKind::Stall => speed_multiplier *= effect.strength,
            EventKind::Drop => {
                speed_multiplier *= effect.strength;
                offset -= effect.strength * 0.8;
            }
            EventKind::Surge => speed_multiplier *= 1.0 + effect.strength,
        }
    }
    (speed_multiplier, offset)
}

/// Move one participant for this step
pub fn integrate(
    participant: &mut Participant,
    effects: &[ActiveEffect],
    profile: &CardProfile,
    modifiers: &ModifierSet,
    frame: &StepFrame,
    rng: &mut Lcg,
) {
    let speed_factor = pace_factor(profile, modifiers, rng);
    let (speed_multiplier, offset) = effect_response(effects, rng);

    let delayed_start = frame.elapsed_ms < participant.start_delay();
    let (move_multiplier, offset) = if delayed_start {
        (0.0, 0.0)
    } else {
        (speed_factor * speed_multiplier, offset)
    };

    let moved = participant.position + frame.base_delta * move_multiplier + offset;
    let bounded = moved.max(frame.min_trail(delayed_start)).min(frame.max_lead());

    participant.position = clamp(bounded, 0.0, 100.0);
    participant.speed = clamp(speed_factor, 0.1, 1.0);
}
