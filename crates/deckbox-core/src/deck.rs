//! Card editing and divination over a [`DeckDb`].
//!
//! Each divination loads the card pool once, runs the engine in memory and
//! persists the outcome only when something was drawn.

use rand::Rng;

use crate::card::{check_predecessor, Card, Mood, Quality};
use crate::divination::{draw_single, search_combination, DivinationResult, TimeRange};
use crate::error::{Result, ValidationError};
use crate::storage::DeckDb;

/// Field changes for [`Deck::edit_card`]. `None` leaves a field untouched.
#[derive(Debug, Clone, Default)]
pub struct CardEdit {
    pub name: Option<String>,
    pub estimated_minutes: Option<u32>,
    /// `Some("")` clears the tag
    pub tag: Option<String>,
    /// `Some("")` clears the description
    pub description: Option<String>,
    /// `Some("")` clears the predecessor
    pub predecessor_id: Option<String>,
    /// Drop completion data and return the card to pending
    pub reopen: bool,
    /// Complete a pending card with mood and quality `good` and the
    /// estimate as actual time. Already completed cards are left as they are.
    pub complete: bool,
}

impl CardEdit {
    pub fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.estimated_minutes.is_none()
            && self.tag.is_none()
            && self.description.is_none()
            && self.predecessor_id.is_none()
            && !self.reopen
            && !self.complete
    }
}

fn non_empty(value: String) -> Option<String> {
    if value.trim().is_empty() {
        None
    } else {
        Some(value)
    }
}

pub struct Deck {
    db: DeckDb,
}

impl Deck {
    pub fn new(db: DeckDb) -> Self {
        Self { db }
    }

    /// Open the deck in the default data directory.
    pub fn open() -> Result<Self> {
        Ok(Self::new(DeckDb::open()?))
    }

    pub fn cards(&self) -> Result<Vec<Card>> {
        Ok(self.db.list_cards()?)
    }

    /// Fetch a card or fail with [`ValidationError::CardNotFound`].
    pub fn card(&self, id: &str) -> Result<Card> {
        self.db
            .get_card(id)?
            .ok_or_else(|| ValidationError::CardNotFound(id.to_string()).into())
    }

    /// Store a new card after checking its predecessor link.
    pub fn add_card(&self, card: Card) -> Result<Card> {
        if let Some(pred) = card.predecessor_id.as_deref() {
            check_predecessor(&self.db.list_cards()?, &card.id, pred)?;
        }
        self.db.create_card(&card)?;
        tracing::debug!(id = %card.id, minutes = card.estimated_minutes(), "card added");
        Ok(card)
    }

    /// Record completion of a pending card.
    pub fn complete_card(
        &self,
        id: &str,
        mood: Mood,
        quality: Quality,
        actual_minutes: u32,
    ) -> Result<Card> {
        let mut card = self.card(id)?;
        card.complete(mood, quality, actual_minutes)?;
        self.db.update_card(&card)?;
        Ok(card)
    }

    /// Apply `edit` to a stored card.
    pub fn edit_card(&self, id: &str, edit: CardEdit) -> Result<Card> {
        if edit.reopen && edit.complete {
            return Err(ValidationError::invalid("status", "cannot both complete and reopen").into());
        }
        let mut card = self.card(id)?;

        if let Some(name) = edit.name {
            card.name = non_empty(name)
                .ok_or_else(|| ValidationError::invalid("name", "must not be empty"))?;
        }
        if let Some(minutes) = edit.estimated_minutes {
            card.set_estimated_minutes(minutes)?;
        }
        if let Some(tag) = edit.tag {
            card.tag = non_empty(tag);
        }
        if let Some(description) = edit.description {
            card.description = non_empty(description);
        }
        if let Some(pred) = edit.predecessor_id {
            card.predecessor_id = match non_empty(pred) {
                Some(pred) => {
                    check_predecessor(&self.db.list_cards()?, &card.id, &pred)?;
                    Some(pred)
                }
                None => None,
            };
        }
        if edit.reopen {
            card.reopen();
        }
        if edit.complete && card.is_pending() {
            let minutes = card.estimated_minutes();
            card.complete(Mood::Good, Quality::Good, minutes)?;
        }

        self.db.update_card(&card)?;
        Ok(card)
    }

    /// Delete a card, returning it with the cards that named it as predecessor.
    pub fn delete_card(&self, id: &str) -> Result<(Card, Vec<Card>)> {
        let card = self.card(id)?;
        let dependents: Vec<Card> = self
            .db
            .list_cards()?
            .into_iter()
            .filter(|c| c.predecessor_id.as_deref() == Some(id))
            .collect();
        self.db.delete_card(id)?;
        Ok((card, dependents))
    }

    /// Draw a combination for `range` and save it to history.
    ///
    /// `Ok(None)` means nothing could be drawn; history is left untouched.
    pub fn divine<R: Rng + ?Sized>(
        &self,
        range: TimeRange,
        rng: &mut R,
    ) -> Result<Option<DivinationResult>> {
        let cards = self.db.list_cards()?;
        let Some(combination) = search_combination(&cards, range, rng) else {
            return Ok(None);
        };
        let result = DivinationResult::from(combination);
        self.db.save_divination(&result)?;
        Ok(Some(result))
    }

    /// Draw one card and save it to history.
    pub fn divine_single<R: Rng + ?Sized>(&self, rng: &mut R) -> Result<Option<DivinationResult>> {
        let cards = self.db.list_cards()?;
        let Some(card) = draw_single(&cards, rng) else {
            return Ok(None);
        };
        let result = DivinationResult::single(card);
        self.db.save_divination(&result)?;
        Ok(Some(result))
    }

    /// Stored results, oldest first.
    pub fn history(&self) -> Result<Vec<DivinationResult>> {
        Ok(self.db.list_divinations()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::divination::DivinationOutcome;
    use crate::error::CoreError;
    use rand::SeedableRng;
    use rand_pcg::Mcg128Xsl64;

    fn deck() -> Deck {
        Deck::new(DeckDb::open_memory().unwrap())
    }

    fn rng() -> Mcg128Xsl64 {
        Mcg128Xsl64::seed_from_u64(42)
    }

    #[test]
    fn add_card_rejects_unknown_predecessor() {
        let deck = deck();
        let card = Card::new("orphan", 10).unwrap().with_predecessor("nope");
        let err = deck.add_card(card).unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::CardNotFound(_))
        ));
        assert!(deck.cards().unwrap().is_empty());
    }

    #[test]
    fn complete_then_complete_again_fails() {
        let deck = deck();
        let card = deck.add_card(Card::new("task", 10).unwrap()).unwrap();

        let done = deck.complete_card(&card.id, Mood::Good, Quality::Good, 9).unwrap();
        assert!(done.is_completed());
        assert!(deck.card(&card.id).unwrap().is_completed());

        let err = deck
            .complete_card(&card.id, Mood::Good, Quality::Good, 9)
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::AlreadyCompleted(_))
        ));
    }

    #[test]
    fn completing_predecessor_unlocks_dependent() {
        let deck = deck();
        let first = deck.add_card(Card::new("first", 200).unwrap()).unwrap();
        let second = deck
            .add_card(Card::new("second", 100).unwrap().with_predecessor(first.id.clone()))
            .unwrap();

        // only `first` is available and it does not fit
        assert!(deck.divine(TimeRange::new(90, 150), &mut rng()).unwrap().is_none());
        assert!(deck.history().unwrap().is_empty());

        deck.complete_card(&first.id, Mood::Neutral, Quality::Medium, 180).unwrap();
        let result = deck.divine(TimeRange::new(90, 150), &mut rng()).unwrap().unwrap();
        assert_eq!(result.cards[0].id, second.id);
        assert_eq!(result.outcome, DivinationOutcome::InRange);
        assert_eq!(deck.history().unwrap().len(), 1);
    }

    #[test]
    fn edit_card_updates_fields_and_rejects_cycles() {
        let deck = deck();
        let a = deck.add_card(Card::new("a", 10).unwrap()).unwrap();
        let b = deck
            .add_card(Card::new("b", 10).unwrap().with_predecessor(a.id.clone()))
            .unwrap();

        let edited = deck
            .edit_card(
                &a.id,
                CardEdit {
                    name: Some("a2".into()),
                    estimated_minutes: Some(45),
                    tag: Some("home".into()),
                    ..CardEdit::default()
                },
            )
            .unwrap();
        assert_eq!(edited.name, "a2");
        assert_eq!(edited.level().as_u8(), 3);
        assert_eq!(edited.tag.as_deref(), Some("home"));

        let err = deck
            .edit_card(
                &a.id,
                CardEdit {
                    predecessor_id: Some(b.id.clone()),
                    ..CardEdit::default()
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::PredecessorCycle { .. })
        ));

        let cleared = deck
            .edit_card(
                &b.id,
                CardEdit {
                    predecessor_id: Some(String::new()),
                    ..CardEdit::default()
                },
            )
            .unwrap();
        assert!(cleared.predecessor_id.is_none());
    }

    #[test]
    fn edit_card_reopens() {
        let deck = deck();
        let card = deck.add_card(Card::new("again", 20).unwrap()).unwrap();
        deck.complete_card(&card.id, Mood::Bad, Quality::Poor, 40).unwrap();

        let reopened = deck
            .edit_card(
                &card.id,
                CardEdit {
                    reopen: true,
                    ..CardEdit::default()
                },
            )
            .unwrap();
        assert!(reopened.is_pending());
        assert!(deck.card(&card.id).unwrap().is_pending());
    }

    #[test]
    fn edit_card_completes_with_defaults() {
        let deck = deck();
        let card = deck.add_card(Card::new("quick win", 20).unwrap()).unwrap();

        let done = deck
            .edit_card(
                &card.id,
                CardEdit {
                    estimated_minutes: Some(25),
                    complete: true,
                    ..CardEdit::default()
                },
            )
            .unwrap();
        let completion = done.completion().unwrap();
        assert_eq!(completion.mood, Mood::Good);
        assert_eq!(completion.quality, Quality::Good);
        assert_eq!(completion.actual_minutes, 25);
        assert!(deck.card(&card.id).unwrap().is_completed());

        // a second request keeps the first completion
        let again = deck
            .edit_card(
                &card.id,
                CardEdit {
                    complete: true,
                    ..CardEdit::default()
                },
            )
            .unwrap();
        assert_eq!(again.completion(), Some(completion));
    }

    #[test]
    fn edit_card_rejects_complete_and_reopen_together() {
        let deck = deck();
        let card = deck.add_card(Card::new("torn", 20).unwrap()).unwrap();
        let err = deck
            .edit_card(
                &card.id,
                CardEdit {
                    reopen: true,
                    complete: true,
                    ..CardEdit::default()
                },
            )
            .unwrap_err();
        assert!(matches!(
            err,
            CoreError::Validation(ValidationError::InvalidValue { .. })
        ));
        assert!(deck.card(&card.id).unwrap().is_pending());
    }

    #[test]
    fn delete_reports_dependents() {
        let deck = deck();
        let a = deck.add_card(Card::new("a", 10).unwrap()).unwrap();
        let b = deck
            .add_card(Card::new("b", 10).unwrap().with_predecessor(a.id.clone()))
            .unwrap();

        let (deleted, dependents) = deck.delete_card(&a.id).unwrap();
        assert_eq!(deleted.id, a.id);
        assert_eq!(dependents.len(), 1);
        assert_eq!(dependents[0].id, b.id);
        assert!(matches!(
            deck.card(&a.id),
            Err(CoreError::Validation(ValidationError::CardNotFound(_)))
        ));
    }

    #[test]
    fn divine_single_saves_history() {
        let deck = deck();
        assert!(deck.divine_single(&mut rng()).unwrap().is_none());

        deck.add_card(Card::new("only", 300).unwrap()).unwrap();
        let result = deck.divine_single(&mut rng()).unwrap().unwrap();
        assert_eq!(result.outcome, DivinationOutcome::Single);
        assert_eq!(deck.history().unwrap()[0].id, result.id);
    }

    #[test]
    fn inverted_range_draws_nothing() {
        let deck = deck();
        deck.add_card(Card::new("a", 10).unwrap()).unwrap();
        deck.add_card(Card::new("b", 100).unwrap()).unwrap();
        assert!(deck.divine(TimeRange::new(150, 90), &mut rng()).unwrap().is_none());
    }
}
