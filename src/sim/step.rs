//! Variable-delta race step
//!
//! Advances the race by a driver-supplied delta. Given the same state and
//! delta the result is always identical: the only randomness is the LCG word
//! carried inside the state.

use super::commentary::commentary_line;
use super::events::{EventContext, min_event_gap_ms, push_event, rate_scale, roll_event, spawn_event};
use super::integrate::{StepFrame, integrate};
use super::model::{CardModel, RaceModel};
use super::modifiers::ModifierSet;
use super::state::RaceState;
use crate::cards::CardProfile;
use crate::consts::COMMENTARY_LEN;

/// Advance a race with the stock card model
pub fn step(state: RaceState, delta_ms: f64) -> RaceState {
    step_with(&CardModel, state, delta_ms)
}

/// Advance a race with a custom rate model
pub fn step_with<M: RaceModel + ?Sized>(model: &M, mut state: RaceState, delta_ms: f64) -> RaceState {
    advance(model, &mut state, delta_ms);
    state
}

/// In-place step. Negative or NaN deltas count as zero; the delta is cut to
/// the time remaining, and a finished race is left untouched.
pub fn advance<M: RaceModel + ?Sized>(model: &M, state: &mut RaceState, delta_ms: f64) {
    if state.is_finished() {
        return;
    }

    let remaining = state.duration - state.elapsed_time;
    let dt = delta_ms.max(0.0).min(remaining);
    state.elapsed_time = (state.elapsed_time + dt).min(state.duration);
    let now = state.elapsed_time;
    let frame = StepFrame::new(now, dt, state.duration);

    // Age effects; anything that runs out this step no longer applies
    for effects in state.effects.values_mut() {
        for effect in effects.iter_mut() {
            effect.remaining_ms -= dt;
        }
        effects.retain(|e| e.remaining_ms > 0.0);
    }

    let decks: Vec<(CardProfile, ModifierSet)> = state
        .participants
        .iter()
        .map(|p| (CardProfile::from_cards(&p.cards), model.modifiers(&p.cards)))
        .collect();

    for (participant, (profile, modifiers)) in state.participants.iter_mut().zip(&decks) {
        let effects = state
            .effects
            .get(&participant.id)
            .map(Vec::as_slice)
            .unwrap_or(&[]);
        integrate(participant, effects, profile, modifiers, &frame, &mut state.rng);
    }

    let scale = rate_scale(state.duration);
    let min_gap_ms = min_event_gap_ms(state.duration);
    for (participant, (profile, modifiers)) in state.participants.iter().zip(&decks) {
        let rates = model.event_rates(profile, modifiers, scale);
        let clock = state.clocks.entry(participant.id.clone()).or_default();
        let active = state.effects.entry(participant.id.clone()).or_default();

        let ctx = EventContext {
            now_ms: now,
            dt_ms: dt,
            min_gap_ms,
            active: active.as_slice(),
            clock: &*clock,
            rates: &rates,
            modifiers,
        };
        let Some(kind) = roll_event(&ctx, &mut state.rng) else {
            continue;
        };

        let (event, effect) = spawn_event(&mut state.rng, participant, kind, now, modifiers);
        log::debug!("[{:>6.0}ms] {}", now, event.message);
        active.push(effect);
        clock.record(kind, now);
        push_event(&mut state.events, event);
    }

    let line = match state.participants.as_slice() {
        [first, second, ..] => Some(commentary_line(first, second, now)),
        _ => None,
    };
    if let Some(line) = line {
        if state.commentary.is_empty() {
            state.commentary.push(line);
        } else if state.rng.next_f64() > 0.7 {
            state.commentary.push(line);
            let excess = state.commentary.len().saturating_sub(COMMENTARY_LEN);
            state.commentary.drain(..excess);
        }
    }

    if state.is_finished() {
        log::info!(
            "Race finished after {}ms with {} logged events",
            state.elapsed_time,
            state.events.len()
        );
    }
}
