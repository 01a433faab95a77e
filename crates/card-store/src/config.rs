//! On-disk metadata formats.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::{Result, StoreError};

/// `config.json` at a game's root: its decks, keyed by folder name.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct GameConfig {
    #[serde(default)]
    pub card_types: BTreeMap<String, DeckConfig>,
}

/// One configured deck (card type) of a game.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DeckConfig {
    /// Display name, as entered by the user.
    pub name: String,
    /// Sanitized directory name under the game.
    pub folder: String,
    pub width_mm: f32,
    pub height_mm: f32,
}

/// `cards.json` inside a deck: per-file metadata.
pub(crate) type DeckMetadata = BTreeMap<String, CardMetadata>;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardMetadata {
    /// Copies of this card in a print run.
    pub count: u32,
}

/// Restrict a user-supplied name to alphanumerics, spaces, dashes and
/// underscores - the characters the directory layout can safely hold.
pub(crate) fn sanitize_name(name: &str) -> Result<String> {
    let sanitized: String = name
        .chars()
        .filter(|c| c.is_alphanumeric() || matches!(c, ' ' | '-' | '_'))
        .collect();
    let sanitized = sanitized.trim().to_string();
    if sanitized.is_empty() {
        return Err(StoreError::InvalidName(name.to_string()));
    }
    Ok(sanitized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_keeps_safe_characters() {
        assert_eq!(sanitize_name("My Deck_2-b").unwrap(), "My Deck_2-b");
    }

    #[test]
    fn sanitize_strips_path_separators() {
        assert_eq!(sanitize_name("../evil/deck").unwrap(), "evildeck");
    }

    #[test]
    fn sanitize_rejects_empty_results() {
        assert!(sanitize_name("  ").is_err());
        assert!(sanitize_name("///").is_err());
    }
}
