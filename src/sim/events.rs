//! Stochastic event generation
//!
//! Each step a participant may start at most one rhythm event. Kinds are tried
//! in priority order and the first one that is inactive, off cooldown and wins
//! its Bernoulli trial fires.

use super::modifiers::ModifierSet;
use super::rng::Lcg;
use super::state::{ActiveEffect, EventClock, EventKind, EventTable, Participant, RaceEvent};
use crate::cards::CardProfile;
use crate::clamp;
use crate::consts::MAX_EVENTS;

/// Highest per-second rate fed into a trial
pub const MAX_RATE_PER_SECOND: f64 = 0.6;

/// Sampling ranges and final strength bounds for one kind
#[derive(Debug, Clone, Copy)]
struct EffectShape {
    duration_ms: (f64, f64),
    strength: (f64, f64),
    strength_bounds: (f64, f64),
}

impl EventKind {
    fn shape(&self) -> EffectShape {
        match self {
            EventKind::Jitter => EffectShape {
                duration_ms: (550.0, 1100.0),
                strength: (0.4, 0.75),
                strength_bounds: (0.2, 1.0),
            },
            EventKind::Stall => EffectShape {
                duration_ms: (450.0, 900.0),
                strength: (0.25, 0.5),
                strength_bounds: (0.15, 0.9),
            },
            EventKind::Drop => EffectShape {
                duration_ms: (420.0, 850.0),
                strength: (0.18, 0.4),
                strength_bounds: (0.1, 0.8),
            },
            EventKind::Surge => EffectShape {
                duration_ms: (500.0, 900.0),
                strength: (0.12, 0.22),
                strength_bounds: (0.1, 0.6),
            },
        }
    }

    fn message(&self, name: &str, duration_ms: f64) -> String {
        let ms = duration_ms as i64;
        match self {
            EventKind::Jitter => format!("{name}: rhythm jitters (shake {ms}ms)"),
            EventKind::Stall => format!("{name}: delayed response (pause {ms}ms)"),
            EventKind::Drop => format!("{name}: packet detour (slow {ms}ms)"),
            EventKind::Surge => format!("{name}: sudden boost (surge {ms}ms)"),
        }
    }
}

/// Shorter races get proportionally busier event rates
pub fn rate_scale(duration: f64) -> f64 {
    clamp(12_000.0 / duration.max(1.0), 0.35, 1.0)
}

/// Global anti-spam gap between any two events of one participant
pub fn min_event_gap_ms(duration: f64) -> f64 {
    clamp(duration.max(1.0) / 18.0, 900.0, 1800.0)
}

/// Per-second rates for each kind, before the trigger clamp
pub fn base_event_rates(
    profile: &CardProfile,
    modifiers: &ModifierSet,
    rate_scale: f64,
) -> EventTable<f64> {
    let rate = &modifiers.rate_mul;
    EventTable {
        jitter: (0.06 + (100.0 - profile.predictability) / 500.0) * rate_scale * rate.jitter,
        stall: (0.035 + profile.delay / 700.0) * rate_scale * rate.stall,
        drop: (0.03 + ((60.0 - profile.stability) / 400.0).max(0.0)) * rate_scale * rate.drop,
        surge: (0.05 + rate.surge * 0.02) * rate_scale,
    }
}

/// Probability that a per-second rate fires at least once within `dt_ms`
pub fn trigger_probability(rate_per_second: f64, dt_ms: f64) -> f64 {
    let rate = clamp(rate_per_second, 0.0, MAX_RATE_PER_SECOND);
    1.0 - (1.0 - rate).powf(dt_ms / 1000.0)
}

/// Everything the generator needs to decide for one participant
#[derive(Debug, Clone, Copy)]
pub struct EventContext<'a> {
    pub now_ms: f64,
    pub dt_ms: f64,
    pub min_gap_ms: f64,
    pub active: &'a [ActiveEffect],
    pub clock: &'a EventClock,
    pub rates: &'a EventTable<f64>,
    pub modifiers: &'a ModifierSet,
}

/// Pick the kind that fires this step, if any.
///
/// Draws are only consumed for kinds that pass the active and cooldown checks.
pub fn roll_event(ctx: &EventContext<'_>, rng: &mut Lcg) -> Option<EventKind> {
    if ctx.now_ms - ctx.clock.last_any_ms < ctx.min_gap_ms {
        return None;
    }

    EventKind::PRIORITY.into_iter().find(|&kind| {
        !ctx.active.iter().any(|e| e.kind == kind)
            && ctx.now_ms - ctx.clock.last_ms.get(kind) >= ctx.modifiers.cooldown_ms.get(kind)
            && rng.next_f64() < trigger_probability(ctx.rates.get(kind), ctx.dt_ms)
    })
}

/// Instantiate a fired event: log entry plus the effect it applies
pub fn spawn_event(
    rng: &mut Lcg,
    participant: &Participant,
    kind: EventKind,
    time_ms: f64,
    modifiers: &ModifierSet,
) -> (RaceEvent, ActiveEffect) {
    let shape = kind.shape();
    let duration_ms = (rng.range(shape.duration_ms.0, shape.duration_ms.1)
        * modifiers.duration_mul.get(kind))
    .round()
    .max(1.0);
    let strength = clamp(
        rng.range(shape.strength.0, shape.strength.1) * modifiers.strength_mul.get(kind),
        shape.strength_bounds.0,
        shape.strength_bounds.1,
    );

    let event = RaceEvent {
        id: format!("{}-{}-{}", participant.id, kind.as_str(), time_ms.round() as i64),
        time_ms,
        participant_id: participant.id.clone(),
        kind,
        message: kind.message(&participant.name, duration_ms),
        duration_ms: Some(duration_ms),
    };
    let effect = ActiveEffect {
        kind,
        remaining_ms: duration_ms,
        strength,
    };
    (event, effect)
}

/// Append to the capped log, evicting the oldest entries
pub fn push_event(log: &mut Vec<RaceEvent>, event: RaceEvent) {
    log.push(event);
    if log.len() > MAX_EVENTS {
        let excess = log.len() - MAX_EVENTS;
        log.drain(..excess);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ctx<'a>(
        now_ms: f64,
        active: &'a [ActiveEffect],
        clock: &'a EventClock,
        rates: &'a EventTable<f64>,
        modifiers: &'a ModifierSet,
    ) -> EventContext<'a> {
        EventContext {
            now_ms,
            dt_ms: 1000.0,
            min_gap_ms: 900.0,
            active,
            clock,
            rates,
            modifiers,
        }
    }

    #[test]
    fn test_trigger_probability() {
        assert_eq!(trigger_probability(0.0, 16.0), 0.0);
        assert!((trigger_probability(0.5, 1000.0) - 0.5).abs() < 1e-12);
        // clamped to 0.6 per second
        assert!((trigger_probability(5.0, 1000.0) - 0.6).abs() < 1e-12);
        assert_eq!(trigger_probability(0.3, 0.0), 0.0);
    }

    #[test]
    fn test_scales() {
        assert!((rate_scale(30_000.0) - 0.4).abs() < 1e-12);
        assert_eq!(rate_scale(5_000.0), 1.0);
        assert_eq!(rate_scale(100_000.0), 0.35);
        assert!((min_event_gap_ms(30_000.0) - 30_000.0 / 18.0).abs() < 1e-9);
        assert_eq!(min_event_gap_ms(1_000.0), 900.0);
        assert_eq!(min_event_gap_ms(60_000.0), 1800.0);
    }

    #[test]
    fn test_global_gap_blocks_everything() {
        let modifiers = ModifierSet::from_cards(&[]);
        let rates = EventTable::splat(10.0);
        let clock = EventClock::default();
        let mut rng = Lcg::new(1);
        // before the first gap has elapsed nothing may fire, and no draw is consumed
        assert_eq!(roll_event(&ctx(500.0, &[], &clock, &rates, &modifiers), &mut rng), None);
        assert_eq!(rng.state(), 1);
    }

    #[test]
    fn test_first_match_wins() {
        let mut modifiers = ModifierSet::from_cards(&[]);
        modifiers.cooldown_ms = EventTable::splat(0.0);
        let rates = EventTable::splat(10.0);
        let clock = EventClock::default();
        let mut fired = Vec::new();
        for seed in 0..50 {
            let mut rng = Lcg::new(seed);
            if let Some(kind) = roll_event(&ctx(5_000.0, &[], &clock, &rates, &modifiers), &mut rng) {
                fired.push(kind);
            }
        }
        // jitter is tried first and fires ~60% of the time; later kinds only fill the gaps
        assert!(fired.iter().filter(|&&k| k == EventKind::Jitter).count() > fired.len() / 3);
    }

    #[test]
    fn test_active_and_cooldown_skip() {
        let mut modifiers = ModifierSet::from_cards(&[]);
        modifiers.cooldown_ms = EventTable::splat(1000.0);
        let mut rates = EventTable::splat(0.0);
        rates.jitter = 10.0;
        rates.surge = 10.0;

        let active = [ActiveEffect {
            kind: EventKind::Jitter,
            remaining_ms: 100.0,
            strength: 0.5,
        }];
        let mut clock = EventClock::default();
        clock.record(EventKind::Surge, 4_500.0);
        clock.last_any_ms = 0.0;

        // jitter is active and surge is cooling down: nothing can fire
        for seed in 0..20 {
            let mut rng = Lcg::new(seed);
            assert_eq!(roll_event(&ctx(5_000.0, &active, &clock, &rates, &modifiers), &mut rng), None);
        }
    }

    #[test]
    fn test_spawn_event_bounds() {
        let participant = Participant::new("user", "Your Network", Vec::new());
        let modifiers = ModifierSet::from_cards(&[]);
        let mut rng = Lcg::new(2024);
        for kind in EventKind::PRIORITY {
            for _ in 0..200 {
                let (event, effect) = spawn_event(&mut rng, &participant, kind, 3_000.0, &modifiers);
                let shape = kind.shape();
                assert!(effect.remaining_ms > 0.0);
                assert!(effect.strength >= shape.strength_bounds.0);
                assert!(effect.strength <= shape.strength_bounds.1);
                assert_eq!(event.duration_ms, Some(effect.remaining_ms));
                assert_eq!(event.participant_id, "user");
                assert!(event.message.starts_with("Your Network: "));
                assert_eq!(event.id, format!("user-{}-3000", kind.as_str()));
            }
        }
    }

    #[test]
    fn test_push_event_caps_log() {
        let participant = Participant::new("user", "Your Network", Vec::new());
        let modifiers = ModifierSet::from_cards(&[]);
        let mut rng = Lcg::new(9);
        let mut log = Vec::new();
        for i in 0..(MAX_EVENTS + 5) {
            let (event, _) = spawn_event(&mut rng, &participant, EventKind::Surge, i as f64, &modifiers);
            push_event(&mut log, event);
        }
        assert_eq!(log.len(), MAX_EVENTS);
        assert_eq!(log[0].time_ms, 5.0);
        assert_eq!(log.last().map(|e| e.time_ms), Some((MAX_EVENTS + 4) as f64));
    }
}
