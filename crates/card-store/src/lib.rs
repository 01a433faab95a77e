//! Filesystem card library.
//!
//! Layout under the root directory: one directory per game with a
//! `config.json` describing its decks; one directory per deck holding the
//! card PNGs, a `cards.json` of per-card copy counts, and an optional
//! `back.png` shared by every card of the deck.
//!
//! The extraction and imposition crates never touch storage directly;
//! they exchange in-memory rasters with whatever drives them, and this
//! crate is one such driver backend.

mod config;
mod library;

pub use config::{CardMetadata, DeckConfig, GameConfig};
pub use library::{CardLibrary, CardRecord};

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("not found: {0}")]
    NotFound(String),
    #[error("already exists: {0}")]
    AlreadyExists(String),
    #[error("invalid name: {0:?}")]
    InvalidName(String),
    #[error("metadata error: {0}")]
    Json(#[from] serde_json::Error),
    #[error("image error: {0}")]
    Image(#[from] image::ImageError),
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
    #[error("task join error: {0}")]
    TaskJoin(#[from] tokio::task::JoinError),
}

pub type Result<T> = std::result::Result<T, StoreError>;
