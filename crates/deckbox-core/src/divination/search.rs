//! Combination search.
//!
//! The search is randomized and bounded: each attempt draws a random number
//! of cards (weighted, without replacement) and stops at the first total that
//! lands in the range. When no attempt matches, the attempt closest to the
//! range midpoint is returned and tagged [`MatchKind::BestEffort`]; its total
//! may lie outside the range.

use rand::Rng;
use serde::{Deserialize, Serialize};
use tracing::debug;

use super::availability::available_cards;
use super::sampler::{weighted_index, weighted_pick};
use super::TimeRange;
use crate::card::Card;

/// Attempt budget per search.
pub const MAX_ATTEMPTS: usize = 1000;

/// Largest number of cards drawn in one attempt.
pub const MAX_COMBINATION_SIZE: usize = 5;

/// Whether a combination satisfied the requested range.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum MatchKind {
    InRange,
    BestEffort,
}

/// Cards picked by [`search_combination`], in draw order.
#[derive(Debug, Clone, PartialEq)]
pub struct Combination {
    pub cards: Vec<Card>,
    pub total_minutes: u32,
    pub kind: MatchKind,
    /// Attempts spent, including the returned one
    pub attempts: usize,
}

/// Search the deck for cards whose estimates add up to a total in `range`.
///
/// Returns `None` when the range is inverted, when no card is available, or
/// when the only available card does not fit the range.
pub fn search_combination<R: Rng + ?Sized>(
    all_cards: &[Card],
    range: TimeRange,
    rng: &mut R,
) -> Option<Combination> {
    if !range.is_valid() {
        debug!(
            min = range.min_minutes,
            max = range.max_minutes,
            "inverted time range, skipping search"
        );
        return None;
    }

    let pool = available_cards(all_cards);
    let combination = search_pool(&pool, range, rng, |_| {});

    match &combination {
        Some(found) => debug!(
            cards = found.cards.len(),
            total = found.total_minutes,
            attempts = found.attempts,
            kind = ?found.kind,
            "divination search finished"
        ),
        None => debug!(pool = pool.len(), "divination search found nothing"),
    }
    combination
}

/// Untagged form of [`search_combination`].
pub fn select_combination<R: Rng + ?Sized>(
    all_cards: &[Card],
    min_minutes: u32,
    max_minutes: u32,
    rng: &mut R,
) -> Option<Vec<Card>> {
    search_combination(all_cards, TimeRange::new(min_minutes, max_minutes), rng).map(|c| c.cards)
}

/// One weighted draw from the available cards, ignoring time.
pub fn draw_single<R: Rng + ?Sized>(all_cards: &[Card], rng: &mut R) -> Option<Card> {
    let pool = available_cards(all_cards);
    weighted_pick(&pool, rng).cloned()
}

/// Core loop over an already filtered pool. `on_attempt` sees every total.
fn search_pool<R, F>(
    pool: &[&Card],
    range: TimeRange,
    rng: &mut R,
    mut on_attempt: F,
) -> Option<Combination>
where
    R: Rng + ?Sized,
    F: FnMut(u32),
{
    match pool {
        [] => return None,
        [only] => {
            let minutes = only.estimated_minutes();
            on_attempt(minutes);
            return range.contains(minutes).then(|| Combination {
                cards: vec![(*only).clone()],
                total_minutes: minutes,
                kind: MatchKind::InRange,
                attempts: 1,
            });
        }
        _ => {}
    }

    let max_size = pool.len().min(MAX_COMBINATION_SIZE);
    let mut best: Option<(f64, Vec<&Card>, u32)> = None;

    for attempt in 1..=MAX_ATTEMPTS {
        let size = rng.gen_range(1..=max_size);
        let mut remaining = pool.to_vec();
        let mut picked = Vec::with_capacity(size);

        while picked.len() < size {
            let Some(index) = weighted_index(&remaining, rng) else {
                break;
            };
            picked.push(remaining.remove(index));
        }

        let total = picked
            .iter()
            .fold(0u32, |acc, card| acc.saturating_add(card.estimated_minutes()));
        on_attempt(total);

        if range.contains(total) {
            return Some(Combination {
                cards: picked.into_iter().cloned().collect(),
                total_minutes: total,
                kind: MatchKind::InRange,
                attempts: attempt,
            });
        }

        let distance = range.distance(total);
        if best.as_ref().map_or(true, |(d, _, _)| distance < *d) {
            best = Some((distance, picked, total));
        }
    }

    best.map(|(_, cards, total)| Combination {
        cards: cards.into_iter().cloned().collect(),
        total_minutes: total,
        kind: MatchKind::BestEffort,
        attempts: MAX_ATTEMPTS,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::card::{Mood, Quality};
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    fn card(name: &str, minutes: u32) -> Card {
        Card::new(name, minutes).unwrap()
    }

    fn rng(seed: u64) -> Mcg128Xsl64 {
        Mcg128Xsl64::seed_from_u64(seed)
    }

    #[test]
    fn empty_deck_returns_none() {
        assert!(select_combination(&[], 90, 150, &mut rng(1)).is_none());
        assert!(draw_single(&[], &mut rng(1)).is_none());
    }

    #[test]
    fn single_available_card_in_range() {
        let x = card("x", 100);
        let deck = vec![x.clone()];

        let found = select_combination(&deck, 90, 150, &mut rng(3)).unwrap();
        assert_eq!(found, vec![x]);
    }

    #[test]
    fn single_available_card_out_of_range() {
        let deck = vec![card("x", 100)];
        assert!(select_combination(&deck, 10, 50, &mut rng(3)).is_none());
    }

    #[test]
    fn single_available_among_completed_cards() {
        let mut done = card("done", 30);
        done.complete(Mood::Good, Quality::Good, 25).unwrap();
        let deck = vec![done, card("x", 100)];

        let found = search_combination(&deck, TimeRange::default(), &mut rng(5)).unwrap();
        assert_eq!(found.cards.len(), 1);
        assert_eq!(found.cards[0].name, "x");
        assert_eq!(found.kind, MatchKind::InRange);
    }

    #[test]
    fn inverted_range_returns_none() {
        let deck = vec![card("a", 10), card("b", 20), card("c", 100)];
        assert!(select_combination(&deck, 150, 90, &mut rng(11)).is_none());
    }

    #[test]
    fn finds_in_range_subset() {
        let deck = vec![card("a", 10), card("b", 20), card("c", 100)];

        for seed in 0..50 {
            let found = search_combination(&deck, TimeRange::new(90, 150), &mut rng(seed)).unwrap();
            assert_eq!(found.kind, MatchKind::InRange);
            assert!((90..=150).contains(&found.total_minutes), "seed {seed}");
            assert!(found.cards.iter().any(|c| c.name == "c"));
            let sum: u32 = found.cards.iter().map(|c| c.estimated_minutes()).sum();
            assert_eq!(sum, found.total_minutes);
        }
    }

    #[test]
    fn combination_has_no_duplicates() {
        let deck: Vec<Card> = (1..=8).map(|i| card(&format!("c{i}"), 10 * i)).collect();
        for seed in 0..20 {
            let found = search_combination(&deck, TimeRange::new(200, 220), &mut rng(seed)).unwrap();
            let mut ids: Vec<_> = found.cards.iter().map(|c| c.id.clone()).collect();
            ids.sort();
            ids.dedup();
            assert_eq!(ids.len(), found.cards.len());
            assert!(found.cards.len() <= MAX_COMBINATION_SIZE);
        }
    }

    #[test]
    fn unreachable_range_falls_back_to_closest() {
        let deck = vec![card("a", 10), card("b", 20)];

        let found = search_combination(&deck, TimeRange::new(100, 200), &mut rng(8)).unwrap();
        assert_eq!(found.kind, MatchKind::BestEffort);
        assert_eq!(found.total_minutes, 30);
        assert_eq!(found.attempts, MAX_ATTEMPTS);

        let found = search_combination(&deck, TimeRange::new(1, 5), &mut rng(8)).unwrap();
        assert_eq!(found.kind, MatchKind::BestEffort);
        assert_eq!(found.total_minutes, 10);
    }

    #[test]
    fn blocked_cards_are_never_drawn() {
        let blocker = card("blocker", 200);
        let deck = vec![
            blocker.clone(),
            card("free", 100),
            card("waiting", 10).with_predecessor(blocker.id.clone()),
        ];
        for seed in 0..30 {
            let found = select_combination(&deck, 90, 150, &mut rng(seed)).unwrap();
            assert!(found.iter().all(|c| c.name != "waiting"));
        }
    }

    #[test]
    fn draw_single_only_returns_available_cards() {
        let mut done = card("done", 10);
        done.complete(Mood::Bad, Quality::Poor, 15).unwrap();
        let deck = vec![done, card("open", 45)];
        for seed in 0..20 {
            assert_eq!(draw_single(&deck, &mut rng(seed)).unwrap().name, "open");
        }
    }

    #[test]
    fn seeded_search_is_reproducible() {
        let deck: Vec<Card> = [5, 15, 25, 40, 55, 70, 95]
            .iter()
            .map(|&m| card(&format!("m{m}"), m))
            .collect();
        let a = search_combination(&deck, TimeRange::default(), &mut rng(2024));
        let b = search_combination(&deck, TimeRange::default(), &mut rng(2024));
        assert_eq!(a, b);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn fallback_is_closest_attempt(
            minutes in prop::collection::vec(1u32..200, 2..8),
            min in 0u32..400,
            span in 0u32..100,
            seed in any::<u64>(),
        ) {
            let deck: Vec<Card> = minutes
                .iter()
                .enumerate()
                .map(|(i, &m)| card(&format!("c{i}"), m))
                .collect();
            let pool: Vec<&Card> = deck.iter().collect();
            let range = TimeRange::new(min, min + span);

            let mut totals = Vec::new();
            let found = search_pool(&pool, range, &mut rng(seed), |t| totals.push(t)).unwrap();

            prop_assert!(!totals.is_empty());
            prop_assert!(totals.len() <= MAX_ATTEMPTS);
            prop_assert!(found.cards.len() <= MAX_COMBINATION_SIZE);
            match found.kind {
                MatchKind::InRange => {
                    prop_assert!(range.contains(found.total_minutes));
                    prop_assert_eq!(totals.last().copied(), Some(found.total_minutes));
                }
                MatchKind::BestEffort => {
                    prop_assert_eq!(totals.len(), MAX_ATTEMPTS);
                    prop_assert!(totals.iter().all(|&t| !range.contains(t)));
                    let closest = totals
                        .iter()
                        .map(|&t| range.distance(t))
                        .fold(f64::INFINITY, f64::min);
                    prop_assert_eq!(range.distance(found.total_minutes), closest);
                }
            }
        }
    }
}
