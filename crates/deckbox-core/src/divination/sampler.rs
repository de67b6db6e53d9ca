//! Level-weighted single draw.

use rand::Rng;

use crate::card::{Card, Level};

/// Draw weight for a level. Smaller cards come up more often.
pub fn level_weight(level: Level) -> u32 {
    match level {
        Level::Quick => 4,
        Level::Short => 3,
        Level::Medium => 2,
        Level::Long => 1,
    }
}

/// Pick one card from `pool`, weighted by level.
///
/// The pool is not modified; callers drawing without replacement remove the
/// returned card from their own copy.
pub fn weighted_pick<'a, R: Rng + ?Sized>(pool: &[&'a Card], rng: &mut R) -> Option<&'a Card> {
    weighted_index(pool, rng).map(|i| pool[i])
}

/// Index of the weighted pick, `None` only for an empty pool.
pub(crate) fn weighted_index<R: Rng + ?Sized>(pool: &[&Card], rng: &mut R) -> Option<usize> {
    if pool.is_empty() {
        return None;
    }

    let total: u32 = pool.iter().map(|card| level_weight(card.level())).sum();
    if total == 0 {
        return Some(rng.gen_range(0..pool.len()));
    }

    let target = rng.gen_range(0.0..=f64::from(total));
    let mut cumulative = 0.0;
    for (index, card) in pool.iter().enumerate() {
        cumulative += f64::from(level_weight(card.level()));
        if cumulative >= target {
            return Some(index);
        }
    }

    Some(rng.gen_range(0..pool.len()))
}
