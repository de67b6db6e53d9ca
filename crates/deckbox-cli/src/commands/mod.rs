pub mod card;
pub mod config;
pub mod divine;
pub mod history;
