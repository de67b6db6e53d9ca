//! SQLite-based storage for cards and divination history.

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::Path;

use super::data_dir;
use super::migrations;
use crate::card::{Card, CardStatus, Completion};
use crate::divination::{DivinationOutcome, DivinationResult, HISTORY_LIMIT};
use crate::error::DatabaseError;

const CARD_COLUMNS: &str = "id, name, description, tag, estimated_minutes, status, predecessor_id,
                            created_at, completed_at, mood, quality, actual_minutes";

// === Helper Functions ===

/// Parse datetime from RFC3339 string with fallback to current time
fn parse_datetime_fallback(dt_str: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(dt_str)
        .map(|dt| dt.with_timezone(&Utc))
        .unwrap_or_else(|e| {
            tracing::warn!(value = dt_str, error = %e, "unparseable timestamp, using now");
            Utc::now()
        })
}

fn corrupt(table: &'static str, message: impl Into<String>) -> DatabaseError {
    DatabaseError::CorruptRecord {
        table,
        message: message.into(),
    }
}

/// Raw `cards` row before status decoding.
struct CardRow {
    id: String,
    name: String,
    description: Option<String>,
    tag: Option<String>,
    estimated_minutes: u32,
    status: String,
    predecessor_id: Option<String>,
    created_at: String,
    completed_at: Option<String>,
    mood: Option<String>,
    quality: Option<String>,
    actual_minutes: Option<u32>,
}

impl CardRow {
    fn from_row(row: &rusqlite::Row) -> Result<Self, rusqlite::Error> {
        Ok(CardRow {
            id: row.get(0)?,
            name: row.get(1)?,
            description: row.get(2)?,
            tag: row.get(3)?,
            estimated_minutes: row.get(4)?,
            status: row.get(5)?,
            predecessor_id: row.get(6)?,
            created_at: row.get(7)?,
            completed_at: row.get(8)?,
            mood: row.get(9)?,
            quality: row.get(10)?,
            actual_minutes: row.get(11)?,
        })
    }

    fn into_card(self) -> Result<Card, DatabaseError> {
        let status = match self.status.as_str() {
            "pending" => CardStatus::Pending,
            "completed" => {
                let (Some(completed_at), Some(mood), Some(quality), Some(actual_minutes)) =
                    (self.completed_at, self.mood, self.quality, self.actual_minutes)
                else {
                    return Err(corrupt(
                        "cards",
                        format!("card {} is completed but misses completion data", self.id),
                    ));
                };
                let completed_at = DateTime::parse_from_rfc3339(&completed_at)
                    .map_err(|e| corrupt("cards", format!("card {}: {e}", self.id)))?
                    .with_timezone(&Utc);
                CardStatus::Completed(Completion {
                    completed_at,
                    mood: mood
                        .parse()
                        .map_err(|e| corrupt("cards", format!("card {}: {e}", self.id)))?,
                    quality: quality
                        .parse()
                        .map_err(|e| corrupt("cards", format!("card {}: {e}", self.id)))?,
                    actual_minutes,
                })
            }
            other => {
                return Err(corrupt(
                    "cards",
                    format!("card {} has unknown status '{other}'", self.id),
                ))
            }
        };

        let mut card = Card::from_parts(
            self.id,
            self.name,
            self.estimated_minutes,
            status,
            parse_datetime_fallback(&self.created_at),
        );
        card.description = self.description;
        card.tag = self.tag;
        card.predecessor_id = self.predecessor_id;
        Ok(card)
    }
}

/// Flatten a card's status into the nullable completion columns.
fn status_columns(
    card: &Card,
) -> (
    &'static str,
    Option<String>,
    Option<&'static str>,
    Option<&'static str>,
    Option<u32>,
) {
    match card.completion() {
        Some(c) => (
            card.status().as_str(),
            Some(c.completed_at.to_rfc3339()),
            Some(c.mood.as_str()),
            Some(c.quality.as_str()),
            Some(c.actual_minutes),
        ),
        None => (card.status().as_str(), None, None, None, None),
    }
}

fn decode_divination(
    id: String,
    created_at: &str,
    outcome: &str,
    total_minutes: u32,
    cards_json: &str,
) -> Result<DivinationResult, DatabaseError> {
    let cards: Vec<Card> = serde_json::from_str(cards_json)
        .map_err(|e| corrupt("divinations", format!("result {id}: {e}")))?;
    let outcome = DivinationOutcome::parse(outcome).ok_or_else(|| {
        corrupt("divinations", format!("result {id}: unknown outcome '{outcome}'"))
    })?;
    Ok(DivinationResult {
        id,
        created_at: parse_datetime_fallback(created_at),
        outcome,
        cards,
        total_minutes,
    })
}

/// SQLite database for cards and divination history.
pub struct DeckDb {
    conn: Connection,
}

impl DeckDb {
    /// Open the database at `<data dir>/deckbox.db`.
    ///
    /// Creates tables if they don't exist.
    ///
    /// # Errors
    /// Returns an error if the database cannot be opened or migrated.
    pub fn open() -> Result<Self, DatabaseError> {
        let path = data_dir()?.join("deckbox.db");
        Self::open_at(&path)
    }

    /// Open (or create) the database file at `path`.
    pub fn open_at(path: &Path) -> Result<Self, DatabaseError> {
        let conn = Connection::open(path).map_err(|source| DatabaseError::OpenFailed {
            path: path.to_path_buf(),
            source,
        })?;
        Self::with_connection(conn)
    }

    /// Open an in-memory database.
    pub fn open_memory() -> Result<Self, DatabaseError> {
        Self::with_connection(Connection::open_in_memory()?)
    }

    fn with_connection(conn: Connection) -> Result<Self, DatabaseError> {
        migrations::migrate(&conn).map_err(|e| DatabaseError::MigrationFailed(e.to_string()))?;
        Ok(Self { conn })
    }

    // === Card CRUD ===

    /// Insert a new card.
    pub fn create_card(&self, card: &Card) -> Result<(), DatabaseError> {
        let (status, completed_at, mood, quality, actual_minutes) = status_columns(card);
        self.conn.execute(
            "INSERT INTO cards (
                id, name, description, tag, estimated_minutes, status, predecessor_id,
                created_at, completed_at, mood, quality, actual_minutes
             ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
            params![
                card.id,
                card.name,
                card.description,
                card.tag,
                card.estimated_minutes(),
                status,
                card.predecessor_id,
                card.created_at.to_rfc3339(),
                completed_at,
                mood,
                quality,
                actual_minutes,
            ],
        )?;
        Ok(())
    }

    /// Get a card by ID.
    pub fn get_card(&self, id: &str) -> Result<Option<Card>, DatabaseError> {
        let row = self
            .conn
            .query_row(
                &format!("SELECT {CARD_COLUMNS} FROM cards WHERE id = ?1"),
                params![id],
                CardRow::from_row,
            )
            .optional()?;
        row.map(CardRow::into_card).transpose()
    }

    /// List all cards in insertion order.
    ///
    /// Rows that cannot be decoded are logged and skipped.
    pub fn list_cards(&self) -> Result<Vec<Card>, DatabaseError> {
        let mut stmt = self
            .conn
            .prepare(&format!("SELECT {CARD_COLUMNS} FROM cards ORDER BY seq"))?;
        let rows = stmt.query_map([], CardRow::from_row)?;

        let mut cards = Vec::new();
        for row in rows {
            match row?.into_card() {
                Ok(card) => cards.push(card),
                Err(e) => tracing::warn!(error = %e, "skipping unreadable card"),
            }
        }
        Ok(cards)
    }

    /// Overwrite a stored card. Returns `false` if no card has this ID.
    pub fn update_card(&self, card: &Card) -> Result<bool, DatabaseError> {
        let (status, completed_at, mood, quality, actual_minutes) = status_columns(card);
        let changed = self.conn.execute(
            "UPDATE cards
             SET name = ?2, description = ?3, tag = ?4, estimated_minutes = ?5, status = ?6,
                 predecessor_id = ?7, completed_at = ?8, mood = ?9, quality = ?10,
                 actual_minutes = ?11
             WHERE id = ?1",
            params![
                card.id,
                card.name,
                card.description,
                card.tag,
                card.estimated_minutes(),
                status,
                card.predecessor_id,
                completed_at,
                mood,
                quality,
                actual_minutes,
            ],
        )?;
        Ok(changed > 0)
    }

    /// Delete a card. Returns `false` if no card has this ID.
    ///
    /// Cards that named it as predecessor keep the dangling link and stay
    /// unavailable for divination until the link is changed.
    pub fn delete_card(&self, id: &str) -> Result<bool, DatabaseError> {
        let changed = self
            .conn
            .execute("DELETE FROM cards WHERE id = ?1", params![id])?;
        Ok(changed > 0)
    }

    // === Divination history ===

    /// Append a result and evict everything but the newest [`HISTORY_LIMIT`].
    pub fn save_divination(&self, result: &DivinationResult) -> Result<(), DatabaseError> {
        let cards_json = serde_json::to_string(&result.cards)
            .map_err(|e| DatabaseError::QueryFailed(e.to_string()))?;

        self.conn.execute_batch("BEGIN IMMEDIATE TRANSACTION;")?;
        let outcome: Result<usize, rusqlite::Error> = (|| {
            self.conn.execute(
                "INSERT INTO divinations (id, created_at, outcome, total_minutes, cards_json)
                 VALUES (?1, ?2, ?3, ?4, ?5)",
                params![
                    result.id,
                    result.created_at.to_rfc3339(),
                    result.outcome.as_str(),
                    result.total_minutes,
                    cards_json,
                ],
            )?;
            self.conn.execute(
                "DELETE FROM divinations
                 WHERE seq NOT IN (SELECT seq FROM divinations ORDER BY seq DESC LIMIT ?1)",
                params![HISTORY_LIMIT as i64],
            )
        })();

        match outcome {
            Ok(evicted) => {
                self.conn.execute_batch("COMMIT;")?;
                tracing::info!(
                    id = %result.id,
                    cards = result.cards.len(),
                    total = result.total_minutes,
                    evicted,
                    "saved divination"
                );
                Ok(())
            }
            Err(err) => {
                let _ = self.conn.execute_batch("ROLLBACK;");
                Err(err.into())
            }
        }
    }

    /// Stored results, oldest first.
    ///
    /// Rows that cannot be decoded are logged and skipped.
    pub fn list_divinations(&self) -> Result<Vec<DivinationResult>, DatabaseError> {
        let mut stmt = self.conn.prepare(
            "SELECT id, created_at, outcome, total_minutes, cards_json
             FROM divinations ORDER BY seq",
        )?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, String>(2)?,
                row.get::<_, u32>(3)?,
                row.get::<_, String>(4)?,
            ))
        })?;

        let mut results = Vec::new();
        for row in rows {
            let (id, created_at, outcome, total_minutes, cards_json) = row?;
            match decode_divination(id, &created_at, &outcome, total_minutes, &cards_json) {
                Ok(result) => results.push(result),
                Err(e) => tracing::warn!(error = %e, "skipping unreadable divination"),
            }
        }
        Ok(results)
    }

    /// Most recent result, if any.
    pub fn last_divination(&self) -> Result<Option<DivinationResult>, DatabaseError> {
        Ok(self.list_divinations()?.pop())
    }
}
