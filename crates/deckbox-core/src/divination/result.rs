//! Divination history entries.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::search::{Combination, MatchKind};
use crate::card::Card;

/// Number of results kept in history. Older entries are evicted first.
pub const HISTORY_LIMIT: usize = 10;

/// How a divination produced its cards.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum DivinationOutcome {
    /// One card drawn without a time range
    Single,
    /// Combination total within the requested range
    InRange,
    /// Closest combination found; total may be outside the range
    BestEffort,
}

impl DivinationOutcome {
    pub fn as_str(self) -> &'static str {
        match self {
            DivinationOutcome::Single => "single",
            DivinationOutcome::InRange => "in_range",
            DivinationOutcome::BestEffort => "best_effort",
        }
    }

    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "single" => Some(DivinationOutcome::Single),
            "in_range" => Some(DivinationOutcome::InRange),
            "best_effort" => Some(DivinationOutcome::BestEffort),
            _ => None,
        }
    }
}

impl From<MatchKind> for DivinationOutcome {
    fn from(kind: MatchKind) -> Self {
        match kind {
            MatchKind::InRange => DivinationOutcome::InRange,
            MatchKind::BestEffort => DivinationOutcome::BestEffort,
        }
    }
}

/// Snapshot of one divination. Cards are copies taken at draw time.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct DivinationResult {
    pub id: String,
    pub created_at: DateTime<Utc>,
    pub outcome: DivinationOutcome,
    pub cards: Vec<Card>,
    pub total_minutes: u32,
}

impl DivinationResult {
    pub fn new(cards: Vec<Card>, outcome: DivinationOutcome) -> Self {
        let total_minutes = cards
            .iter()
            .fold(0u32, |acc, card| acc.saturating_add(card.estimated_minutes()));
        Self {
            id: uuid::Uuid::new_v4().to_string(),
            created_at: Utc::now(),
            outcome,
            cards,
            total_minutes,
        }
    }

    pub fn single(card: Card) -> Self {
        Self::new(vec![card], DivinationOutcome::Single)
    }
}

impl From<Combination> for DivinationResult {
    fn from(combination: Combination) -> Self {
        Self::new(combination.cards, combination.kind.into())
    }
}
