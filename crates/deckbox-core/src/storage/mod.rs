mod config;
pub mod deck_db;
pub mod migrations;

pub use config::{AnalyzerConfig, Config, DivinationConfig};
pub use deck_db::DeckDb;

use std::path::PathBuf;

/// Returns the data directory, creating it if needed.
///
/// `DECKBOX_HOME` overrides the location. Otherwise `~/.config/deckbox`, or
/// `~/.config/deckbox-dev` when `DECKBOX_ENV=dev`.
///
/// # Errors
/// Returns an error if creating the directory fails.
pub fn data_dir() -> std::io::Result<PathBuf> {
    let dir = match std::env::var_os("DECKBOX_HOME") {
        Some(home) if !home.is_empty() => PathBuf::from(home),
        _ => {
            let base_dir = dirs::home_dir()
                .unwrap_or_else(|| PathBuf::from("."))
                .join(".config");
            let env = std::env::var("DECKBOX_ENV").unwrap_or_else(|_| "production".to_string());
            if env == "dev" {
                base_dir.join("deckbox-dev")
            } else {
                base_dir.join("deckbox")
            }
        }
    };

    std::fs::create_dir_all(&dir)?;
    Ok(dir)
}
