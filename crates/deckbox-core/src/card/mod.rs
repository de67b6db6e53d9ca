//! Card model.
//!
//! A card is one unit of work with an estimated duration in minutes. Its
//! [`Level`] is derived from that estimate and is never stored on its own.
//! Completion data lives inside [`CardStatus::Completed`], so a card is either
//! fully completed or not completed at all.

pub mod precedence;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use crate::error::ValidationError;

pub use precedence::check_predecessor;

/// Size tier of a card, derived from its estimated minutes.
///
/// | minutes | level |
/// |---------|-------|
/// | ..=15   | 1     |
/// | 16..=30 | 2     |
/// | 31..=60 | 3     |
/// | 61..    | 4     |
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(into = "u8", try_from = "u8")]
pub enum Level {
    Quick,
    Short,
    Medium,
    Long,
}

impl Level {
    pub fn from_minutes(minutes: u32) -> Self {
        match minutes {
            0..=15 => Level::Quick,
            16..=30 => Level::Short,
            31..=60 => Level::Medium,
            _ => Level::Long,
        }
    }

    /// Numeric level, 1 through 4.
    pub fn as_u8(self) -> u8 {
        match self {
            Level::Quick => 1,
            Level::Short => 2,
            Level::Medium => 3,
            Level::Long => 4,
        }
    }
}

impl From<Level> for u8 {
    fn from(level: Level) -> Self {
        level.as_u8()
    }
}

impl TryFrom<u8> for Level {
    type Error = ValidationError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            1 => Ok(Level::Quick),
            2 => Ok(Level::Short),
            3 => Ok(Level::Medium),
            4 => Ok(Level::Long),
            other => Err(ValidationError::invalid(
                "level",
                format!("expected 1-4, got {other}"),
            )),
        }
    }
}

impl fmt::Display for Level {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_u8())
    }
}

/// How the user felt after finishing a card.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Mood {
    Awesome,
    Good,
    Neutral,
    Bad,
    Terrible,
}

impl Mood {
    pub fn as_str(self) -> &'static str {
        match self {
            Mood::Awesome => "awesome",
            Mood::Good => "good",
            Mood::Neutral => "neutral",
            Mood::Bad => "bad",
            Mood::Terrible => "terrible",
        }
    }
}

impl FromStr for Mood {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "awesome" => Ok(Mood::Awesome),
            "good" => Ok(Mood::Good),
            "neutral" => Ok(Mood::Neutral),
            "bad" => Ok(Mood::Bad),
            "terrible" => Ok(Mood::Terrible),
            other => Err(ValidationError::invalid(
                "mood",
                format!("unknown mood '{other}' (awesome, good, neutral, bad, terrible)"),
            )),
        }
    }
}

/// Self-assessed quality of finished work.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Quality {
    Excellent,
    Good,
    Medium,
    Poor,
}

impl Quality {
    pub fn as_str(self) -> &'static str {
        match self {
            Quality::Excellent => "excellent",
            Quality::Good => "good",
            Quality::Medium => "medium",
            Quality::Poor => "poor",
        }
    }
}

impl FromStr for Quality {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "excellent" => Ok(Quality::Excellent),
            "good" => Ok(Quality::Good),
            "medium" => Ok(Quality::Medium),
            "poor" => Ok(Quality::Poor),
            other => Err(ValidationError::invalid(
                "quality",
                format!("unknown quality '{other}' (excellent, good, medium, poor)"),
            )),
        }
    }
}

/// Data recorded when a card is completed.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Completion {
    pub completed_at: DateTime<Utc>,
    pub mood: Mood,
    pub quality: Quality,
    /// Minutes the work actually took
    pub actual_minutes: u32,
}

/// Card status.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq, Default)]
#[serde(tag = "state", rename_all = "snake_case")]
pub enum CardStatus {
    #[default]
    Pending,
    Completed(Completion),
}

impl CardStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            CardStatus::Pending => "pending",
            CardStatus::Completed(_) => "completed",
        }
    }
}

/// A task card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Card {
    /// Unique identifier
    pub id: String,
    pub name: String,
    pub description: Option<String>,
    pub tag: Option<String>,
    estimated_minutes: u32,
    status: CardStatus,
    /// Card that must be completed before this one becomes available
    pub predecessor_id: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Card {
    /// Create a pending card.
    ///
    /// # Errors
    /// Returns an error if the name is blank or the estimate is zero.
    pub fn new(name: impl Into<String>, estimated_minutes: u32) -> Result<Self, ValidationError> {
        let name = name.into();
        if name.trim().is_empty() {
            return Err(ValidationError::invalid("name", "must not be empty"));
        }
        validate_minutes(estimated_minutes)?;
        Ok(Card {
            id: uuid::Uuid::new_v4().to_string(),
            name,
            description: None,
            tag: None,
            estimated_minutes,
            status: CardStatus::Pending,
            predecessor_id: None,
            created_at: Utc::now(),
        })
    }

    /// Rebuild a card from stored fields.
    pub(crate) fn from_parts(
        id: String,
        name: String,
        estimated_minutes: u32,
        status: CardStatus,
        created_at: DateTime<Utc>,
    ) -> Self {
        Card {
            id,
            name,
            description: None,
            tag: None,
            estimated_minutes,
            status,
            predecessor_id: None,
            created_at,
        }
    }

    pub fn with_tag(mut self, tag: impl Into<String>) -> Self {
        self.tag = Some(tag.into());
        self
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_predecessor(mut self, predecessor_id: impl Into<String>) -> Self {
        self.predecessor_id = Some(predecessor_id.into());
        self
    }

    pub fn estimated_minutes(&self) -> u32 {
        self.estimated_minutes
    }

    /// Change the estimate. The level follows automatically.
    pub fn set_estimated_minutes(&mut self, minutes: u32) -> Result<(), ValidationError> {
        validate_minutes(minutes)?;
        self.estimated_minutes = minutes;
        Ok(())
    }

    pub fn level(&self) -> Level {
        Level::from_minutes(self.estimated_minutes)
    }

    pub fn status(&self) -> &CardStatus {
        &self.status
    }

    pub fn is_pending(&self) -> bool {
        matches!(self.status, CardStatus::Pending)
    }

    pub fn is_completed(&self) -> bool {
        matches!(self.status, CardStatus::Completed(_))
    }

    pub fn completion(&self) -> Option<&Completion> {
        match &self.status {
            CardStatus::Completed(completion) => Some(completion),
            CardStatus::Pending => None,
        }
    }

    /// Mark the card completed.
    ///
    /// # Errors
    /// Returns [`ValidationError::AlreadyCompleted`] if the card was completed before.
    pub fn complete(
        &mut self,
        mood: Mood,
        quality: Quality,
        actual_minutes: u32,
    ) -> Result<&Completion, ValidationError> {
        if self.is_completed() {
            return Err(ValidationError::AlreadyCompleted(self.id.clone()));
        }
        self.status = CardStatus::Completed(Completion {
            completed_at: Utc::now(),
            mood,
            quality,
            actual_minutes,
        });
        self.completion()
            .ok_or_else(|| ValidationError::invalid("status", "completion was not recorded"))
    }

    /// Drop all completion data and return to pending.
    ///
    /// Returns `true` if the card was completed before.
    pub fn reopen(&mut self) -> bool {
        let was_completed = self.is_completed();
        self.status = CardStatus::Pending;
        was_completed
    }
}

fn validate_minutes(minutes: u32) -> Result<(), ValidationError> {
    if minutes == 0 {
        return Err(ValidationError::invalid(
            "estimated_minutes",
            "must be a positive number of minutes",
        ));
    }
    Ok(())
}
