//! Stock card pool
//!
//! Fifteen cards: one of each rarity per category.

use rand::Rng;
use rand::seq::SliceRandom;

use crate::cards::{Card, CardCategory, CardRarity, CardStats};

struct Entry {
    id: &'static str,
    category: CardCategory,
    rarity: CardRarity,
    name: &'static str,
    description: &'static str,
    flavor_text: &'static str,
    /// stability, burst, delay, predictability
    stats: [f64; 4],
}

const POOL: [Entry; 15] = [
    Entry {
        id: "bw-ssr-1",
        category: CardCategory::Bandwidth,
        rarity: CardRarity::Ssr,
        name: "Fiber High-Speed Channel",
        description: "A rock-solid ultra-fast link.",
        flavor_text: "Like a city express lane, always flowing and never stalling.",
        stats: [95.0, 85.0, 5.0, 90.0],
    },
    Entry {
        id: "bw-sr-1",
        category: CardCategory::Bandwidth,
        rarity: CardRarity::Sr,
        name: "Stable Broadband",
        description: "Reliable everyday speed.",
        flavor_text: "Like a quiet country road: not the fastest, but it gets you there.",
        stats: [75.0, 60.0, 15.0, 80.0],
    },
    Entry {
        id: "bw-r-1",
        category: CardCategory::Bandwidth,
        rarity: CardRarity::R,
        name: "Shared Network",
        description: "Sometimes fast, sometimes slow.",
        flavor_text: "Like rush-hour metro: smooth when empty, crowded when full.",
        stats: [50.0, 40.0, 30.0, 50.0],
    },
    Entry {
        id: "lat-ssr-1",
        category: CardCategory::Latency,
        rarity: CardRarity::Ssr,
        name: "Zero-Latency Feel",
        description: "Near-instant response.",
        flavor_text: "Like talking face to face, the reply lands immediately.",
        stats: [90.0, 80.0, 2.0, 95.0],
    },
    Entry {
        id: "lat-sr-1",
        category: CardCategory::Latency,
        rarity: CardRarity::Sr,
        name: "Low-Latency Link",
        description: "Quick responses with light delay.",
        flavor_text: "Like a phone call: slight delay but easy to follow.",
        stats: [70.0, 65.0, 25.0, 75.0],
    },
    Entry {
        id: "lat-r-1",
        category: CardCategory::Latency,
        rarity: CardRarity::R,
        name: "Latency Swings",
        description: "Response time is unstable.",
        flavor_text: "Like shouting across a canyon: sometimes clear, sometimes late.",
        stats: [45.0, 35.0, 80.0, 45.0],
    },
    Entry {
        id: "jit-ssr-1",
        category: CardCategory::Jitter,
        rarity: CardRarity::Ssr,
        name: "Perfect Timing",
        description: "Consistent rhythm throughout.",
        flavor_text: "Like a metronome, every beat hits on time.",
        stats: [98.0, 75.0, 3.0, 98.0],
    },
    Entry {
        id: "jit-sr-1",
        category: CardCategory::Jitter,
        rarity: CardRarity::Sr,
        name: "Light Fluctuation",
        description: "Minor rhythm shifts.",
        flavor_text: "Like a steady walk with a few uneven steps.",
        stats: [70.0, 60.0, 20.0, 70.0],
    },
    Entry {
        id: "jit-r-1",
        category: CardCategory::Jitter,
        rarity: CardRarity::R,
        name: "Chaotic Tempo",
        description: "Speed changes are sharp.",
        flavor_text: "Like an untrained drummer: fast, slow, and unpredictable.",
        stats: [40.0, 50.0, 50.0, 40.0],
    },
    Entry {
        id: "pl-ssr-1",
        category: CardCategory::PacketLoss,
        rarity: CardRarity::Ssr,
        name: "Perfect Delivery",
        description: "Zero packet loss.",
        flavor_text: "Like flawless courier service: every parcel arrives intact.",
        stats: [99.0, 90.0, 2.0, 99.0],
    },
    Entry {
        id: "pl-sr-1",
        category: CardCategory::PacketLoss,
        rarity: CardRarity::Sr,
        name: "Occasional Drop",
        description: "Most data arrives safely.",
        flavor_text: "Like postal service: a rare miss, but most items arrive.",
        stats: [65.0, 55.0, 25.0, 65.0],
    },
    Entry {
        id: "pl-r-1",
        category: CardCategory::PacketLoss,
        rarity: CardRarity::R,
        name: "Frequent Loss",
        description: "Requires constant retries.",
        flavor_text: "Like a cracked pipe: water keeps leaking away.",
        stats: [35.0, 30.0, 60.0, 35.0],
    },
    Entry {
        id: "spec-ssr-1",
        category: CardCategory::Special,
        rarity: CardRarity::Ssr,
        name: "Network Optimization",
        description: "Temporary performance boost.",
        flavor_text: "Like opening a green lane: everything flows smoothly.",
        stats: [85.0, 95.0, 5.0, 85.0],
    },
    Entry {
        id: "spec-sr-1",
        category: CardCategory::Special,
        rarity: CardRarity::Sr,
        name: "Traffic Surge",
        description: "Network congestion event.",
        flavor_text: "Like holiday highways: crowded lanes and slower speed.",
        stats: [40.0, 45.0, 100.0, 50.0],
    },
    Entry {
        id: "spec-r-1",
        category: CardCategory::Special,
        rarity: CardRarity::R,
        name: "Random Fluctuation",
        description: "Unpredictable changes.",
        flavor_text: "Like the weather: sun, rain, and sudden storms.",
        stats: [50.0, 60.0, 40.0, 30.0],
    },
];

impl Entry {
    fn to_card(&self) -> Card {
        let [stability, burst, delay, predictability] = self.stats;
        Card {
            id: self.id.to_string(),
            category: self.category,
            rarity: self.rarity,
            name: self.name.to_string(),
            description: self.description.to_string(),
            flavor_text: self.flavor_text.to_string(),
            stats: CardStats {
                stability,
                burst,
                delay,
                predictability,
            },
        }
    }
}

/// The full pool in catalog order
pub fn card_pool() -> Vec<Card> {
    POOL.iter().map(Entry::to_card).collect()
}

pub fn find_card(id: &str) -> Option<Card> {
    POOL.iter().find(|e| e.id == id).map(Entry::to_card)
}

/// Draw `count` distinct cards from the pool
pub fn draw_cards<R: Rng + ?Sized>(rng: &mut R, count: usize) -> Vec<Card> {
    let mut pool = card_pool();
    pool.shuffle(rng);
    pool.truncate(count);
    pool
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::consts::DECK_SIZE;
    use crate::sim::Lcg;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;
    use std::collections::HashSet;

    #[test]
    fn test_pool_shape() {
        let pool = card_pool();
        assert_eq!(pool.len(), 15);
        let ids: HashSet<&str> = pool.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), 15);
        for category in [
            CardCategory::Bandwidth,
            CardCategory::Latency,
            CardCategory::Jitter,
            CardCategory::PacketLoss,
            CardCategory::Special,
        ] {
            for rarity in [CardRarity::Ssr, CardRarity::Sr, CardRarity::R] {
                assert_eq!(
                    pool.iter()
                        .filter(|c| c.category == category && c.rarity == rarity)
                        .count(),
                    1
                );
            }
        }
    }

    #[test]
    fn test_find_card() {
        let card = find_card("spec-sr-1").unwrap();
        assert_eq!(card.name, "Traffic Surge");
        assert_eq!(card.stats.delay, 100.0);
        assert!(find_card("missing").is_none());
    }

    #[test]
    fn test_seeded_draws_reproducible() {
        let a = draw_cards(&mut Pcg32::seed_from_u64(7), DECK_SIZE);
        let b = draw_cards(&mut Pcg32::seed_from_u64(7), DECK_SIZE);
        assert_eq!(a, b);
        assert_eq!(a.len(), DECK_SIZE);
        let ids: HashSet<&str> = a.iter().map(|c| c.id.as_str()).collect();
        assert_eq!(ids.len(), DECK_SIZE);
    }

    #[test]
    fn test_draw_with_race_rng() {
        let mut rng = Lcg::new(99);
        let deck = draw_cards(&mut rng, 20);
        // capped at the pool size
        assert_eq!(deck.len(), 15);
        assert!(draw_cards(&mut rng, 0).is_empty());
    }
}
