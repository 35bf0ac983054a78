//! Deterministic race PRNG
//!
//! A 32-bit linear-congruential generator. The race state owns exactly one
//! generator word and every draw advances it, so identical seeds and deltas
//! replay identical races.

use rand::RngCore;
use serde::{Deserialize, Serialize};

use crate::cards::Card;

pub const LCG_MULTIPLIER: u32 = 1_664_525;
pub const LCG_INCREMENT: u32 = 1_013_904_223;

const TWO_POW_32: f64 = 4_294_967_296.0;

const FNV_OFFSET: u32 = 2_166_136_261;
const FNV_PRIME: u32 = 16_777_619;

/// Advance a generator word once: returns the unit draw in `[0, 1)` and the new word
#[inline]
pub fn next(state: u32) -> (f64, u32) {
    let next = state.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT);
    (next as f64 / TWO_POW_32, next)
}

/// Serializable generator state (serializes as the bare word)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Lcg {
    state: u32,
}

impl Lcg {
    pub fn new(seed: u32) -> Self {
        Self { state: seed }
    }

    pub fn state(&self) -> u32 {
        self.state
    }

    /// Unit draw in `[0, 1)`
    #[inline]
    pub fn next_f64(&mut self) -> f64 {
        let (value, state) = next(self.state);
        self.state = state;
        value
    }

    /// Uniform draw in `[min, max)`
    #[inline]
    pub fn range(&mut self, min: f64, max: f64) -> f64 {
        crate::lerp_range(self.next_f64(), min, max)
    }
}

impl RngCore for Lcg {
    fn next_u32(&mut self) -> u32 {
        self.next_f64();
        self.state
    }

    fn next_u64(&mut self) -> u64 {
        let hi = self.next_u32() as u64;
        let lo = self.next_u32() as u64;
        (hi << 32) | lo
    }

    fn fill_bytes(&mut self, dst: &mut [u8]) {
        for chunk in dst.chunks_mut(4) {
            let bytes = self.next_u32().to_le_bytes();
            chunk.copy_from_slice(&bytes[..chunk.len()]);
        }
    }
}

/// Race seed: FNV-1a over every card's `id-category-rarity` (UTF-16 units),
/// folded with the low 32 bits of the run id.
pub fn seed_from_cards<'a>(cards: impl IntoIterator<Item = &'a Card>, run_id: u64) -> u32 {
    let mut hash = FNV_OFFSET;
    for card in cards {
        for unit in card.identity().encode_utf16() {
            hash ^= unit as u32;
            hash = hash.wrapping_mul(FNV_PRIME);
        }
    }
    hash ^ (run_id as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cards::tests::card;
    use crate::cards::{CardCategory, CardRarity};

    #[test]
    fn test_recurrence() {
        let (value, state) = next(0);
        assert_eq!(state, LCG_INCREMENT);
        assert!((value - LCG_INCREMENT as f64 / TWO_POW_32).abs() < 1e-15);

        let (_, wrapped) = next(u32::MAX);
        assert_eq!(wrapped, u32::MAX.wrapping_mul(LCG_MULTIPLIER).wrapping_add(LCG_INCREMENT));
    }

    #[test]
    fn test_draws_in_unit_interval() {
        let mut rng = Lcg::new(42);
        for _ in 0..10_000 {
            let v = rng.next_f64();
            assert!((0.0..1.0).contains(&v));
        }
    }

    #[test]
    fn test_determinism() {
        let mut a = Lcg::new(12345);
        let mut b = Lcg::new(12345);
        for _ in 0..100 {
            assert_eq!(a.next_f64().to_bits(), b.next_f64().to_bits());
        }
        assert_eq!(a.state(), b.state());
    }

    #[test]
    fn test_rng_core_advances_same_stream() {
        let mut core = Lcg::new(7);
        let mut unit = Lcg::new(7);
        let word = core.next_u32();
        unit.next_f64();
        assert_eq!(word, unit.state());

        let mut bytes = [0u8; 6];
        core.fill_bytes(&mut bytes);
        assert_ne!(core.state(), unit.state());
    }

    #[test]
    fn test_seed_hash_is_order_sensitive() {
        let a = card("bw-ssr-1", CardCategory::Bandwidth, CardRarity::Ssr, (95.0, 85.0, 5.0, 90.0));
        let b = card("jit-r-1", CardCategory::Jitter, CardRarity::R, (40.0, 50.0, 50.0, 40.0));
        let ab = seed_from_cards([&a, &b], 0);
        let ba = seed_from_cards([&b, &a], 0);
        assert_ne!(ab, ba);
        assert_eq!(ab, seed_from_cards([&a, &b], 0));
        // run id folds in with xor on the low word
        assert_eq!(seed_from_cards([&a, &b], 0xFF), ab ^ 0xFF);
        assert_eq!(seed_from_cards([&a, &b], 1 << 32), ab);
    }

    #[test]
    fn test_empty_seed_is_fnv_offset() {
        assert_eq!(seed_from_cards(std::iter::empty::<&Card>(), 0), FNV_OFFSET);
    }
}
