//! Card model and deck aggregation
//!
//! Cards are read-only input to the race. Everything the engine needs from a
//! deck is reduced here to averages and category/rarity counts.

use serde::{Deserialize, Serialize};

use crate::consts::{EMPTY_DECK_SPEED, MAX_START_DELAY_MS};

/// Card category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum CardCategory {
    Bandwidth,
    Latency,
    Jitter,
    PacketLoss,
    Special,
}

impl CardCategory {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardCategory::Bandwidth => "bandwidth",
            CardCategory::Latency => "latency",
            CardCategory::Jitter => "jitter",
            CardCategory::PacketLoss => "packet-loss",
            CardCategory::Special => "special",
        }
    }
}

/// Card rarity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum CardRarity {
    Ssr,
    Sr,
    R,
}

impl CardRarity {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardRarity::Ssr => "SSR",
            CardRarity::Sr => "SR",
            CardRarity::R => "R",
        }
    }
}

/// Stat bundle carried by every card
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CardStats {
    /// 0-100
    pub stability: f64,
    /// 0-100
    pub burst: f64,
    /// Milliseconds (practically 0-150)
    pub delay: f64,
    /// 0-100
    pub predictability: f64,
}

/// Which stat to average
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stat {
    Stability,
    Burst,
    Delay,
    Predictability,
}

impl CardStats {
    pub fn get(&self, stat: Stat) -> f64 {
        match stat {
            Stat::Stability => self.stability,
            Stat::Burst => self.burst,
            Stat::Delay => self.delay,
            Stat::Predictability => self.predictability,
        }
    }
}

/// A catalog card
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub category: CardCategory,
    pub rarity: CardRarity,
    pub name: String,
    pub description: String,
    pub flavor_text: String,
    pub stats: CardStats,
}

impl Card {
    /// Identity string used for seed hashing: `id-category-rarity`
    pub fn identity(&self) -> String {
        format!("{}-{}-{}", self.id, self.category.as_str(), self.rarity.as_str())
    }
}

/// Average of one stat over the deck (0 for an empty deck)
pub fn average_stat(cards: &[Card], stat: Stat) -> f64 {
    if cards.is_empty() {
        return 0.0;
    }
    cards.iter().map(|c| c.stats.get(stat)).sum::<f64>() / cards.len() as f64
}

/// Number of cards in a category
pub fn count_category(cards: &[Card], category: CardCategory) -> usize {
    cards.iter().filter(|c| c.category == category).count()
}

/// Number of cards matching a (category, rarity) pair
pub fn count_with_rarity(cards: &[Card], category: CardCategory, rarity: CardRarity) -> usize {
    cards
        .iter()
        .filter(|c| c.category == category && c.rarity == rarity)
        .count()
}

/// Whether the deck holds at least one card of the given category and rarity
pub fn has_rarity(cards: &[Card], category: CardCategory, rarity: CardRarity) -> bool {
    count_with_rarity(cards, category, rarity) > 0
}

/// Aggregated view of a deck
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
pub struct CardProfile {
    pub card_count: usize,
    pub stability: f64,
    pub burst: f64,
    pub delay: f64,
    pub predictability: f64,
    pub bandwidth: usize,
    pub latency: usize,
    pub jitter: usize,
    pub packet_loss: usize,
    pub special: usize,
}

impl CardProfile {
    pub fn from_cards(cards: &[Card]) -> Self {
        Self {
            card_count: cards.len(),
            stability: average_stat(cards, Stat::Stability),
            burst: average_stat(cards, Stat::Burst),
            delay: average_stat(cards, Stat::Delay),
            predictability: average_stat(cards, Stat::Predictability),
            bandwidth: count_category(cards, CardCategory::Bandwidth),
            latency: count_category(cards, CardCategory::Latency),
            jitter: count_category(cards, CardCategory::Jitter),
            packet_loss: count_category(cards, CardCategory::PacketLoss),
            special: count_category(cards, CardCategory::Special),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.card_count == 0
    }

    /// Stat-weighted pace factor in [0.1, 1.0], penalized by average delay
    pub fn base_speed(&self) -> f64 {
        if self.is_empty() {
            return EMPTY_DECK_SPEED;
        }
        let weighted = (self.stability * 0.4 + self.burst * 0.3 + self.predictability * 0.3) / 100.0;
        let delay_penalty = (1.0 - self.delay / 200.0).max(0.0);
        crate::clamp(weighted * delay_penalty, 0.1, 1.0)
    }

    /// Staggered start derived from average delay (8ms per delay ms, capped)
    pub fn start_delay_ms(&self) -> f64 {
        if self.is_empty() {
            return 0.0;
        }
        crate::clamp((self.delay * 8.0).round(), 0.0, MAX_START_DELAY_MS)
    }
}

#[cfg(test)]
pub(crate) mod tests {
    use super::*;

    pub fn card(
        id: &str,
        category: CardCategory,
        rarity: CardRarity,
        stats: (f64, f64, f64, f64),
    ) -> Card {
        Card {
            id: id.to_string(),
            category,
            rarity,
            name: id.to_string(),
            description: String::new(),
            flavor_text: String::new(),
            stats: CardStats {
                stability: stats.0,
                burst: stats.1,
                delay: stats.2,
                predictability: stats.3,
            },
        }
    }

    #[test]
    fn test_empty_deck_fallbacks() {
        let profile = CardProfile::from_cards(&[]);
        assert_eq!(profile.stability, 0.0);
        assert_eq!(profile.delay, 0.0);
        assert_eq!(profile.base_speed(), EMPTY_DECK_SPEED);
        assert_eq!(profile.start_delay_ms(), 0.0);
    }

    #[test]
    fn test_averages_and_counts() {
        let deck = vec![
            card("a", CardCategory::Bandwidth, CardRarity::Ssr, (90.0, 80.0, 10.0, 70.0)),
            card("b", CardCategory::Bandwidth, CardRarity::R, (50.0, 40.0, 30.0, 50.0)),
            card("c", CardCategory::PacketLoss, CardRarity::Ssr, (100.0, 90.0, 2.0, 99.0)),
        ];
        assert_eq!(average_stat(&deck, Stat::Stability), 80.0);
        assert_eq!(average_stat(&deck, Stat::Delay), 14.0);
        assert_eq!(count_category(&deck, CardCategory::Bandwidth), 2);
        assert_eq!(count_category(&deck, CardCategory::Jitter), 0);
        assert_eq!(count_with_rarity(&deck, CardCategory::Bandwidth, CardRarity::Ssr), 1);
        assert!(has_rarity(&deck, CardCategory::PacketLoss, CardRarity::Ssr));
        assert!(!has_rarity(&deck, CardCategory::PacketLoss, CardRarity::Sr));
    }

    #[test]
    fn test_start_delay_is_capped() {
        let slow = vec![card("s", CardCategory::Special, CardRarity::Sr, (40.0, 45.0, 200.0, 50.0))];
        assert_eq!(CardProfile::from_cards(&slow).start_delay_ms(), MAX_START_DELAY_MS);

        let quick = vec![card("q", CardCategory::Latency, CardRarity::Sr, (70.0, 65.0, 25.0, 75.0))];
        assert_eq!(CardProfile::from_cards(&quick).start_delay_ms(), 200.0);
    }

    #[test]
    fn test_base_speed_penalized_by_delay() {
        let fast = vec![card("f", CardCategory::Jitter, CardRarity::Ssr, (98.0, 75.0, 3.0, 98.0))];
        let laggy = vec![card("l", CardCategory::Jitter, CardRarity::Ssr, (98.0, 75.0, 150.0, 98.0))];
        assert!(CardProfile::from_cards(&fast).base_speed() > CardProfile::from_cards(&laggy).base_speed());
        let zero = vec![card("z", CardCategory::Jitter, CardRarity::R, (0.0, 0.0, 0.0, 0.0))];
        assert_eq!(CardProfile::from_cards(&zero).base_speed(), 0.1);
    }

    #[test]
    fn test_identity_string() {
        let c = card("pl-ssr-1", CardCategory::PacketLoss, CardRarity::Ssr, (0.0, 0.0, 0.0, 0.0));
        assert_eq!(c.identity(), "pl-ssr-1-packet-loss-SSR");
    }
}
