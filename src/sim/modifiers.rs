//! Card-to-modifier translation
//!
//! Reduces a deck to the per-event multipliers and cooldowns the event
//! generator and position integrator consume. Pure function of the cards.

use serde::{Deserialize, Serialize};

use super::state::EventTable;
use crate::cards::{Card, CardCategory, CardProfile, CardRarity, has_rarity};
use crate::clamp;

/// Cooldown floor per kind before the quality term
const COOLDOWN_BASE_MS: EventTable<f64> = EventTable {
    jitter: 900.0,
    stall: 1800.0,
    drop: 2200.0,
    surge: 1200.0,
};

/// Quality-scaled cooldown addition per kind (surge scales with `1 - quality`)
const COOLDOWN_QUALITY_MS: EventTable<f64> = EventTable {
    jitter: 700.0,
    stall: 900.0,
    drop: 1100.0,
    surge: 600.0,
};

/// Derived per-participant modifiers
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModifierSet {
    pub rate_mul: EventTable<f64>,
    pub strength_mul: EventTable<f64>,
    pub duration_mul: EventTable<f64>,
    pub cooldown_ms: EventTable<f64>,
    pub speed_bias: f64,
    pub jitter_offset_mul: f64,
}

impl ModifierSet {
    pub fn from_cards(cards: &[Card]) -> Self {
        let profile = CardProfile::from_cards(cards);
        let stability = profile.stability / 100.0;
        let predictability = profile.predictability / 100.0;
        let burst = profile.burst / 100.0;

        let delay_quality = network_delay_quality(profile.delay);
        let quality = network_quality(&profile);

        let bandwidth = profile.bandwidth as f64;
        let jitter_cards = profile.jitter as f64;
        let loss_cards = profile.packet_loss as f64;
        let special = profile.special as f64;

        let mut rate = EventTable {
            jitter: clamp(1.0 - predictability * 0.7, 0.35, 1.4),
            stall: clamp(1.0 - delay_quality * 0.7, 0.4, 1.5),
            drop: clamp(1.0 - stability * 0.8, 0.3, 1.5),
            surge: clamp(0.7 + burst * 0.8, 0.5, 1.6),
        };

        // Specialization helps when the mitigating stat is already good, hurts when it isn't
        if profile.jitter > 0 {
            rate.jitter *= if predictability >= 0.6 {
                1.0 - jitter_cards * 0.1
            } else {
                1.0 + jitter_cards * 0.08
            };
        }
        if profile.packet_loss > 0 {
            rate.drop *= if stability >= 0.6 {
                1.0 - loss_cards * 0.08
            } else {
                1.0 + loss_cards * 0.1
            };
        }

        rate.jitter *= 1.0 - bandwidth * 0.06;
        rate.drop *= 1.0 - bandwidth * 0.06;
        rate.surge *= 1.0 + bandwidth * 0.08;
        rate.surge *= 1.0 + special * 0.12;

        let mut strength = EventTable {
            jitter: clamp(1.0 - predictability * 0.6, 0.4, 1.3),
            stall: clamp(1.0 - delay_quality * 0.6, 0.5, 1.4),
            drop: clamp(1.0 - stability * 0.7, 0.4, 1.4),
            surge: clamp(0.8 + burst * 0.6, 0.7, 1.5),
        };

        let mut duration = EventTable {
            jitter: clamp(1.0 - predictability * 0.4, 0.5, 1.3),
            stall: clamp(1.0 - delay_quality * 0.4, 0.6, 1.4),
            drop: clamp(1.0 - stability * 0.5, 0.5, 1.3),
            surge: clamp(0.9 + burst * 0.3, 0.8, 1.3),
        };

        if has_rarity(cards, CardCategory::PacketLoss, CardRarity::Ssr) {
            rate.drop *= 0.35;
            strength.drop *= 0.6;
            duration.drop *= 0.75;
        }
        if has_rarity(cards, CardCategory::Jitter, CardRarity::Ssr) {
            rate.jitter *= 0.5;
            strength.jitter *= 0.7;
            duration.jitter *= 0.8;
        }
        if has_rarity(cards, CardCategory::Bandwidth, CardRarity::Ssr) {
            rate.jitter *= 0.85;
            rate.drop *= 0.85;
        }

        let cooldown_ms = EventTable {
            jitter: (COOLDOWN_BASE_MS.jitter + quality * COOLDOWN_QUALITY_MS.jitter).round(),
            stall: (COOLDOWN_BASE_MS.stall + quality * COOLDOWN_QUALITY_MS.stall).round(),
            drop: (COOLDOWN_BASE_MS.drop + quality * COOLDOWN_QUALITY_MS.drop).round(),
            surge: (COOLDOWN_BASE_MS.surge + (1.0 - quality) * COOLDOWN_QUALITY_MS.surge).round(),
        };

        let speed_bias = clamp(
            0.92 + quality * 0.16 + bandwidth * 0.02 + burst * 0.06,
            0.9,
            1.15,
        );
        let jitter_offset_mul = clamp(1.0 - predictability * 0.6, 0.3, 1.0);

        Self {
            rate_mul: EventTable {
                jitter: clamp(rate.jitter, 0.2, 1.6),
                stall: clamp(rate.stall, 0.25, 1.8),
                drop: clamp(rate.drop, 0.2, 1.8),
                surge: clamp(rate.surge, 0.4, 2.0),
            },
            strength_mul: EventTable {
                jitter: clamp(strength.jitter, 0.4, 1.4),
                stall: clamp(strength.stall, 0.5, 1.5),
                drop: clamp(strength.drop, 0.4, 1.5),
                surge: clamp(strength.surge, 0.6, 1.6),
            },
            duration_mul: EventTable {
                jitter: clamp(duration.jitter, 0.5, 1.4),
                stall: clamp(duration.stall, 0.6, 1.5),
                drop: clamp(duration.drop, 0.5, 1.4),
                surge: clamp(duration.surge, 0.6, 1.4),
            },
            cooldown_ms,
            speed_bias,
            jitter_offset_mul,
        }
    }
}

/// 1 at zero delay, 0 at 120ms and beyond
pub fn network_delay_quality(avg_delay: f64) -> f64 {
    clamp(1.0 - avg_delay / 120.0, 0.0, 1.0)
}

/// Single 0-1 "overall network quality" scalar
pub fn network_quality(profile: &CardProfile) -> f64 {
    let delay_quality = network_delay_quality(profile.delay);
    clamp(
        (profile.stability / 100.0 + profile.predictability / 100.0 + delay_quality) / 3.0,
        0.0,
        1.0,
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::tests::card;
    use crate::sim::state::EventKind;

    fn approx(a: f64, b: f64) -> bool {
        (a - b).abs() < 1e-9
    }

    #[test]
    fn test_empty_deck() {
        let m = ModifierSet::from_cards(&[]);
        // delay quality is 1 with no delay, so quality = 1/3
        assert!(approx(m.rate_mul.jitter, 1.0));
        assert!(approx(m.rate_mul.stall, 0.4));
        assert!(approx(m.rate_mul.drop, 1.0));
        assert!(approx(m.rate_mul.surge, 0.7));
        assert_eq!(m.cooldown_ms.jitter, 1133.0);
        assert_eq!(m.cooldown_ms.stall, 2100.0);
        assert_eq!(m.cooldown_ms.drop, 2567.0);
        assert_eq!(m.cooldown_ms.surge, 1600.0);
        assert!(approx(m.speed_bias, 0.92 + 0.16 / 3.0));
        assert!(approx(m.jitter_offset_mul, 1.0));
    }

    #[test]
    fn test_ssr_packet_loss_dampens_drops() {
        let base = vec![card("pl-sr-1", CardCategory::PacketLoss, CardRarity::Sr, (65.0, 55.0, 25.0, 65.0))];
        let mut ssr = base.clone();
        ssr[0].rarity = CardRarity::Ssr;

        let plain = ModifierSet::from_cards(&base);
        let damped = ModifierSet::from_cards(&ssr);
        assert!(approx(damped.rate_mul.drop, clamp(plain.rate_mul.drop * 0.35, 0.2, 1.8)));
        assert!(damped.strength_mul.drop < plain.strength_mul.drop);
        assert!(damped.duration_mul.drop < plain.duration_mul.drop);
        assert_eq!(damped.rate_mul.jitter, plain.rate_mul.jitter);
    }

    #[test]
    fn test_specialization_direction() {
        // High predictability: jitter cards help
        let good = vec![card("jit-sr-1", CardCategory::Jitter, CardRarity::Sr, (70.0, 60.0, 20.0, 70.0))];
        let good_other = vec![card("lat-sr-1", CardCategory::Latency, CardRarity::Sr, (70.0, 60.0, 20.0, 70.0))];
        assert!(ModifierSet::from_cards(&good).rate_mul.jitter < ModifierSet::from_cards(&good_other).rate_mul.jitter);

        // Low predictability: jitter cards hurt
        let bad = vec![card("jit-r-1", CardCategory::Jitter, CardRarity::R, (40.0, 50.0, 50.0, 40.0))];
        let bad_other = vec![card("lat-r-1", CardCategory::Latency, CardRarity::R, (40.0, 50.0, 50.0, 40.0))];
        assert!(ModifierSet::from_cards(&bad).rate_mul.jitter > ModifierSet::from_cards(&bad_other).rate_mul.jitter);
    }

    #[test]
    fn test_bandwidth_and_special_amplify_surge() {
        let stats = (50.0, 50.0, 30.0, 50.0);
        let plain = vec![card("lat", CardCategory::Latency, CardRarity::R, stats)];
        let bw = vec![card("bw", CardCategory::Bandwidth, CardRarity::R, stats)];
        let special = vec![card("sp", CardCategory::Special, CardRarity::R, stats)];
        let plain = ModifierSet::from_cards(&plain);
        assert!(ModifierSet::from_cards(&bw).rate_mul.surge > plain.rate_mul.surge);
        assert!(ModifierSet::from_cards(&bw).rate_mul.jitter < plain.rate_mul.jitter);
        assert!(ModifierSet::from_cards(&special).rate_mul.surge > plain.rate_mul.surge);
    }

    #[test]
    fn test_extreme_stats_stay_in_bounds() {
        for stats in [(0.0, 0.0, 0.0, 0.0), (100.0, 100.0, 0.0, 100.0), (0.0, 0.0, 500.0, 0.0)] {
            let deck: Vec<_> = [
                CardCategory::Bandwidth,
                CardCategory::Jitter,
                CardCategory::PacketLoss,
                CardCategory::Special,
            ]
            .iter()
            .map(|&c| card("x", c, CardRarity::Ssr, stats))
            .collect();
            let m = ModifierSet::from_cards(&deck);
            for kind in EventKind::PRIORITY {
                assert!(m.rate_mul.get(kind) >= 0.2 && m.rate_mul.get(kind) <= 2.0);
                assert!(m.strength_mul.get(kind) >= 0.4 && m.strength_mul.get(kind) <= 1.6);
                assert!(m.duration_mul.get(kind) >= 0.5 && m.duration_mul.get(kind) <= 1.5);
                assert!(m.cooldown_ms.get(kind) >= 900.0);
            }
            assert!(m.speed_bias >= 0.9 && m.speed_bias <= 1.15);
            assert!(m.jitter_offset_mul >= 0.3 && m.jitter_offset_mul <= 1.0);
        }
    }

    #[test]
    fn test_quality_scalar() {
        let perfect = CardProfile {
            stability: 100.0,
            predictability: 100.0,
            delay: 0.0,
            card_count: 1,
            ..Default::default()
        };
        assert!(approx(network_quality(&perfect), 1.0));
        assert_eq!(network_delay_quality(240.0), 0.0);
    }
}
