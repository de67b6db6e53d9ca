//! Plain-text and JSON rendering shared by the commands.

use deckbox_core::{Card, CardStatus, DivinationResult};
use serde::Serialize;

/// Format a key-value pair for display.
pub fn kv(key: &str, value: &str) -> String {
    format!("{key:>14}: {value}")
}

/// Format a header line.
pub fn header(title: &str) -> String {
    format!("=== {title} ===")
}

/// JSON shape of a card, with its derived level spelled out.
#[derive(Serialize)]
pub struct CardView<'a> {
    #[serde(flatten)]
    pub card: &'a Card,
    pub level: u8,
}

impl<'a> From<&'a Card> for CardView<'a> {
    fn from(card: &'a Card) -> Self {
        Self {
            card,
            level: card.level().as_u8(),
        }
    }
}

/// JSON shape of a divination result.
#[derive(Serialize)]
pub struct ResultView<'a> {
    pub id: &'a str,
    pub created_at: String,
    pub outcome: &'static str,
    pub total_minutes: u32,
    pub cards: Vec<CardView<'a>>,
}

impl<'a> From<&'a DivinationResult> for ResultView<'a> {
    fn from(result: &'a DivinationResult) -> Self {
        Self {
            id: &result.id,
            created_at: result.created_at.to_rfc3339(),
            outcome: result.outcome.as_str(),
            total_minutes: result.total_minutes,
            cards: result.cards.iter().map(CardView::from).collect(),
        }
    }
}

pub fn print_json<T: Serialize>(value: &T) -> Result<(), Box<dyn std::error::Error>> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

fn or_none(value: Option<&str>) -> &str {
    value.unwrap_or("none")
}

/// Multi-line card details.
pub fn print_card(card: &Card) {
    println!("{}", card.name);
    println!("{}", kv("id", &card.id));
    println!("{}", kv("status", card.status().as_str()));
    println!("{}", kv("level", &card.level().to_string()));
    println!("{}", kv("estimate", &format!("{} min", card.estimated_minutes())));
    println!("{}", kv("tag", or_none(card.tag.as_deref())));
    if let Some(description) = &card.description {
        println!("{}", kv("description", description));
    }
    if let Some(pred) = &card.predecessor_id {
        println!("{}", kv("predecessor", pred));
    }
    println!(
        "{}",
        kv("created", &card.created_at.format("%Y-%m-%d %H:%M:%S").to_string())
    );
    if let CardStatus::Completed(c) = card.status() {
        println!(
            "{}",
            kv("completed", &c.completed_at.format("%Y-%m-%d %H:%M:%S").to_string())
        );
        println!("{}", kv("actual", &format!("{} min", c.actual_minutes)));
        println!("{}", kv("mood", c.mood.as_str()));
        println!("{}", kv("quality", c.quality.as_str()));
    }
}

/// One-line card summary used in lists.
pub fn card_line(index: usize, card: &Card) -> String {
    format!(
        "{index:>3}. [{}] {} (level {}, {} min, tag: {}) {}",
        if card.is_completed() { "x" } else { " " },
        card.name,
        card.level(),
        card.estimated_minutes(),
        or_none(card.tag.as_deref()),
        card.id
    )
}

pub fn print_result(result: &DivinationResult) {
    println!("{}", header("Divination"));
    println!(
        "{}",
        kv("drawn", &result.created_at.format("%Y-%m-%d %H:%M:%S").to_string())
    );
    println!("{}", kv("outcome", result.outcome.as_str()));
    println!(
        "{}",
        kv(
            "total",
            &format!("{} card(s), {} min", result.cards.len(), result.total_minutes)
        )
    );
    for (i, card) in result.cards.iter().enumerate() {
        println!("{}", card_line(i + 1, card));
        if let Some(description) = &card.description {
            println!("       {description}");
        }
    }
}
