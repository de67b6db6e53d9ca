//! Divination engine.
//!
//! Draws cards from the deck with level-weighted randomness, either one card
//! at a time or as a combination whose total estimate lands in a
//! [`TimeRange`].
//!
//! - [`available_cards`]: pending cards whose predecessor is completed
//! - [`weighted_pick`]: one weighted draw from a pool
//! - [`search_combination`]: bounded random search with closest-fit fallback
//! - [`DivinationResult`]: snapshot kept in history
//!
//! Every random decision goes through a caller-supplied [`rand::Rng`], so a
//! seeded generator gives a reproducible draw.

pub mod availability;
pub mod result;
pub mod sampler;
pub mod search;

use serde::{Deserialize, Serialize};

pub use availability::available_cards;
pub use result::{DivinationOutcome, DivinationResult, HISTORY_LIMIT};
pub use sampler::{level_weight, weighted_pick};
pub use search::{
    draw_single, search_combination, select_combination, Combination, MatchKind,
    MAX_ATTEMPTS, MAX_COMBINATION_SIZE,
};

/// Inclusive range of total minutes a combination should fill.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct TimeRange {
    pub min_minutes: u32,
    pub max_minutes: u32,
}

impl TimeRange {
    pub const DEFAULT_MIN_MINUTES: u32 = 90;
    pub const DEFAULT_MAX_MINUTES: u32 = 150;

    pub fn new(min_minutes: u32, max_minutes: u32) -> Self {
        Self {
            min_minutes,
            max_minutes,
        }
    }

    /// A range with `min > max` can never be satisfied.
    pub fn is_valid(&self) -> bool {
        self.min_minutes <= self.max_minutes
    }

    pub fn contains(&self, minutes: u32) -> bool {
        self.min_minutes <= minutes && minutes <= self.max_minutes
    }

    pub fn midpoint(&self) -> f64 {
        (f64::from(self.min_minutes) + f64::from(self.max_minutes)) / 2.0
    }

    /// Absolute distance from `minutes` to the midpoint.
    pub fn distance(&self, minutes: u32) -> f64 {
        (f64::from(minutes) - self.midpoint()).abs()
    }
}

impl Default for TimeRange {
    fn default() -> Self {
        Self::new(Self::DEFAULT_MIN_MINUTES, Self::DEFAULT_MAX_MINUTES)
    }
}
