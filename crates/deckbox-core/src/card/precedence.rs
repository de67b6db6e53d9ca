//! Predecessor link validation for the editing surface.
//!
//! The divination engine trusts predecessor links and only fails closed on
//! unknown ids. Links are checked here when they are set.

use std::collections::{HashMap, HashSet};

use super::Card;
use crate::error::ValidationError;

/// Check that `card_id` may depend on `predecessor_id`.
///
/// `card_id` may be a card that is not stored yet.
///
/// # Errors
/// - [`ValidationError::CardNotFound`] if the predecessor is unknown.
/// - [`ValidationError::PredecessorCycle`] if the link points at the card itself
///   or the predecessor chain already leads back to `card_id`.
pub fn check_predecessor(
    cards: &[Card],
    card_id: &str,
    predecessor_id: &str,
) -> Result<(), ValidationError> {
    let by_id: HashMap<&str, &Card> = cards.iter().map(|c| (c.id.as_str(), c)).collect();

    if !by_id.contains_key(predecessor_id) {
        return Err(ValidationError::CardNotFound(predecessor_id.to_string()));
    }

    let cycle = || ValidationError::PredecessorCycle {
        card: card_id.to_string(),
        predecessor: predecessor_id.to_string(),
    };

    let mut visited = HashSet::new();
    let mut current = Some(predecessor_id);
    while let Some(id) = current {
        if id == card_id {
            return Err(cycle());
        }
        // A pre-existing loop that does not involve card_id.
        if !visited.insert(id) {
            break;
        }
        current = by_id.get(id).and_then(|c| c.predecessor_id.as_deref());
    }
    Ok(())
}
