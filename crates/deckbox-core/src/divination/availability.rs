//! Eligible card pool.

use std::collections::HashMap;

use crate::card::Card;

/// Cards that may be drawn, in input order.
///
/// A card is available when it is pending and either has no predecessor or
/// its predecessor is a known, completed card. A predecessor id that does not
/// resolve makes the card unavailable.
pub fn available_cards(all_cards: &[Card]) -> Vec<&Card> {
    let registry: HashMap<&str, &Card> = all_cards.iter().map(|c| (c.id.as_str(), c)).collect();

    all_cards
        .iter()
        .filter(|card| card.is_pending())
        .filter(|card| match card.predecessor_id.as_deref() {
            None => true,
            Some(pred) => registry.get(pred).is_some_and(|p| p.is_completed()),
        })
        .collect()
}
