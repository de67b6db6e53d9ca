//! Database schema migrations for deckbox.
//!
//! Migrations are versioned and applied automatically when opening the database.
//! The `schema_version` table tracks the current migration version.

use rusqlite::{Connection, Result as SqliteResult};

/// Current schema version.
pub const SCHEMA_VERSION: i32 = 1;

/// Apply all pending migrations to bring the database to the current schema version.
///
/// # Errors
/// Returns an error if migration fails.
pub fn migrate(conn: &Connection) -> SqliteResult<()> {
    create_schema_version_table(conn)?;

    let current_version = get_schema_version(conn);

    if current_version < 1 {
        migrate_v1(conn)?;
    }

    Ok(())
}

fn create_schema_version_table(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS schema_version (
            version INTEGER PRIMARY KEY
        );",
    )
}

/// Get the current schema version from the database.
///
/// Returns 0 if no version is set (initial database).
pub fn get_schema_version(conn: &Connection) -> i32 {
    conn.query_row("SELECT version FROM schema_version", [], |row| {
        row.get::<_, i32>(0)
    })
    .unwrap_or_else(|e| {
        if !matches!(e, rusqlite::Error::QueryReturnedNoRows) {
            tracing::warn!(error = %e, "failed to read schema_version");
        }
        0
    })
}

fn set_schema_version(conn: &Connection, version: i32) -> SqliteResult<()> {
    conn.execute("DELETE FROM schema_version", [])?;
    conn.execute("INSERT INTO schema_version (version) VALUES (?1)", [version])?;
    Ok(())
}

/// v1: cards, divination history and the predecessor lookup index.
fn migrate_v1(conn: &Connection) -> SqliteResult<()> {
    conn.execute_batch(
        "CREATE TABLE IF NOT EXISTS cards (
            seq               INTEGER PRIMARY KEY AUTOINCREMENT,
            id                TEXT NOT NULL UNIQUE,
            name              TEXT NOT NULL,
            description       TEXT,
            tag               TEXT,
            estimated_minutes INTEGER NOT NULL,
            status            TEXT NOT NULL DEFAULT 'pending',
            predecessor_id    TEXT,
            created_at        TEXT NOT NULL,
            completed_at      TEXT,
            mood              TEXT,
            quality           TEXT,
            actual_minutes    INTEGER
        );

        CREATE TABLE IF NOT EXISTS divinations (
            seq           INTEGER PRIMARY KEY AUTOINCREMENT,
            id            TEXT NOT NULL UNIQUE,
            created_at    TEXT NOT NULL,
            outcome       TEXT NOT NULL,
            total_minutes INTEGER NOT NULL,
            cards_json    TEXT NOT NULL
        );

        CREATE INDEX IF NOT EXISTS idx_cards_predecessor ON cards(predecessor_id);",
    )?;
    set_schema_version(conn, 1)
}
