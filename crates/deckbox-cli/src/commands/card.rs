//! Card management commands for CLI.

use clap::Subcommand;
use deckbox_core::{analyze_task, available_cards, Card, CardEdit, Config, Deck, Mood, Quality};

use crate::output::{card_line, header, print_card, print_json, CardView};

#[derive(Subcommand)]
pub enum CardAction {
    /// Add a new card
    Add {
        /// Card name
        #[arg(short, long)]
        name: String,
        /// Estimated time in minutes
        #[arg(short = 't', long = "time")]
        minutes: u32,
        /// Tag, e.g. work or home
        #[arg(short = 'g', long)]
        tag: Option<String>,
        /// Longer description
        #[arg(short, long)]
        description: Option<String>,
        /// ID of a card that must be completed first
        #[arg(short, long)]
        predecessor: Option<String>,
        /// Print the stored card as JSON
        #[arg(long)]
        json: bool,
    },
    /// List cards
    List {
        /// Only cards that can currently be drawn
        #[arg(long)]
        available: bool,
        #[arg(long)]
        json: bool,
    },
    /// Show card details
    Show {
        /// Card ID
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Mark a card completed
    Complete {
        /// Card ID
        id: String,
        /// awesome, good, neutral, bad or terrible
        #[arg(short, long)]
        mood: Mood,
        /// excellent, good, medium or poor
        #[arg(short, long)]
        quality: Quality,
        /// Minutes the work actually took
        #[arg(short = 't', long = "actual-time")]
        actual_minutes: u32,
    },
    /// Change card fields
    Modify {
        /// Card ID
        id: String,
        #[arg(short, long)]
        name: Option<String>,
        /// New estimate in minutes
        #[arg(short = 't', long = "time")]
        minutes: Option<u32>,
        /// New tag ("" clears it)
        #[arg(short = 'g', long)]
        tag: Option<String>,
        /// New description ("" clears it)
        #[arg(short, long)]
        description: Option<String>,
        /// New predecessor ID ("" clears it)
        #[arg(short, long)]
        predecessor: Option<String>,
        /// Return a completed card to pending
        #[arg(long, visible_alias = "not-completed")]
        reopen: bool,
        /// Complete with mood and quality "good" and the estimate as actual time
        #[arg(long, conflicts_with = "reopen")]
        completed: bool,
    },
    /// Delete a card
    Delete {
        /// Card ID
        id: String,
        /// Confirm deletion
        #[arg(long)]
        yes: bool,
    },
}

pub fn run(action: CardAction) -> Result<(), Box<dyn std::error::Error>> {
    let deck = Deck::open()?;

    match action {
        CardAction::Add {
            name,
            minutes,
            tag,
            description,
            predecessor,
            json,
        } => {
            let mut card = Card::new(name, minutes)?;
            card.tag = tag.filter(|s| !s.trim().is_empty());
            card.description = description.filter(|s| !s.trim().is_empty());
            card.predecessor_id = predecessor.filter(|s| !s.trim().is_empty());
            let card = deck.add_card(card)?;

            if json {
                return print_json(&CardView::from(&card));
            }
            println!("Card added: {}", card.id);
            print_card(&card);

            let config = Config::load_or_default();
            let analysis = analyze_task(&card.name, card.estimated_minutes(), &config.analyzer);
            if !analysis.is_empty() {
                println!();
                println!("{}", header("Suggestions"));
                for line in analysis.warnings.iter().chain(&analysis.suggestions) {
                    println!("  - {line}");
                }
            }
        }
        CardAction::List { available, json } => {
            let all = deck.cards()?;
            let cards: Vec<&Card> = if available {
                available_cards(&all)
            } else {
                all.iter().collect()
            };

            if json {
                let views: Vec<CardView> = cards.iter().map(|c| CardView::from(*c)).collect();
                return print_json(&views);
            }
            if cards.is_empty() {
                println!("No cards.");
                return Ok(());
            }
            println!("{}", header(&format!("Cards ({})", cards.len())));
            for (i, card) in cards.iter().enumerate() {
                println!("{}", card_line(i + 1, card));
            }
        }
        CardAction::Show { id, json } => {
            let card = deck.card(&id)?;
            if json {
                return print_json(&CardView::from(&card));
            }
            print_card(&card);
        }
        CardAction::Complete {
            id,
            mood,
            quality,
            actual_minutes,
        } => {
            let card = deck.complete_card(&id, mood, quality, actual_minutes)?;
            println!("Card completed: {}", card.id);
            print_card(&card);
        }
        CardAction::Modify {
            id,
            name,
            minutes,
            tag,
            description,
            predecessor,
            reopen,
            completed,
        } => {
            let edit = CardEdit {
                name,
                estimated_minutes: minutes,
                tag,
                description,
                predecessor_id: predecessor,
                reopen,
                complete: completed,
            };
            if edit.is_empty() {
                return Err("nothing to modify".into());
            }
            let card = deck.edit_card(&id, edit)?;
            println!("Card updated: {}", card.id);
            print_card(&card);
        }
        CardAction::Delete { id, yes } => {
            if !yes {
                return Err(format!("refusing to delete {id} without --yes").into());
            }
            let (card, dependents) = deck.delete_card(&id)?;
            println!("Card deleted: {} ({})", card.id, card.name);
            for dependent in dependents {
                println!(
                    "warning: '{}' ({}) waits on the deleted card and cannot be drawn until its predecessor is changed",
                    dependent.name, dependent.id
                );
            }
        }
    }
    Ok(())
}
