//! # Deck Box Core Library
//!
//! Core logic for Deck Box, a task tracker that turns to-dos into cards and
//! picks what to work on by drawing from the deck. The `deckbox` CLI is a thin
//! layer over this crate.
//!
//! ## Architecture
//!
//! - **Cards**: tasks with an estimate, a derived level and an optional
//!   predecessor that must be completed first
//! - **Divination**: level-weighted random draws, single or as a combination
//!   fitting a time range
//! - **Analyzer**: wording heuristics that suggest splitting large or vague cards
//! - **Storage**: SQLite card and history store, TOML configuration
//!
//! ## Key Components
//!
//! - [`Card`]: the task model
//! - [`search_combination`]: bounded combination search
//! - [`Deck`]: card editing and divination over the store
//! - [`DeckDb`]: card and history persistence
//! - [`Config`]: application configuration

pub mod analyzer;
pub mod card;
pub mod deck;
pub mod divination;
pub mod error;
pub mod storage;

pub use analyzer::{analyze_task, TaskAnalysis};
pub use card::{Card, CardStatus, Completion, Level, Mood, Quality};
pub use deck::{CardEdit, Deck};
pub use divination::{
    available_cards, draw_single, search_combination, select_combination, weighted_pick,
    Combination, DivinationOutcome, DivinationResult, MatchKind, TimeRange,
};
pub use error::{ConfigError, CoreError, DatabaseError, ValidationError};
pub use storage::{Config, DeckDb};
