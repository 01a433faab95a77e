use std::io::Cursor;
use std::path::{Path, PathBuf};

use image::RgbaImage;
use log::debug;
use serde::Serialize;
use serde::de::DeserializeOwned;

use crate::config::{CardMetadata, DeckConfig, DeckMetadata, GameConfig, sanitize_name};
use crate::{Result, StoreError};

const GAME_CONFIG: &str = "config.json";
const DECK_METADATA: &str = "cards.json";
const BACK_IMAGE: &str = "back.png";

/// A stored card with its print metadata.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CardRecord {
    pub name: String,
    /// Copies of this card in a print run.
    pub count: u32,
}

/// Filesystem-backed card library: games, decks, cards.
#[derive(Debug, Clone)]
pub struct CardLibrary {
    root: PathBuf,
}

impl CardLibrary {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    // -- Games --

    /// Existing games, sorted. An absent root directory is an empty
    /// library, not an error.
    pub async fn games(&self) -> Result<Vec<String>> {
        let mut games = Vec::new();
        let mut entries = match tokio::fs::read_dir(&self.root).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(games),
            Err(e) => return Err(e.into()),
        };
        while let Some(entry) = entries.next_entry().await? {
            if entry.file_type().await?.is_dir() {
                games.push(entry.file_name().to_string_lossy().into_owned());
            }
        }
        games.sort();
        Ok(games)
    }

    /// Create a game directory with an empty deck configuration. Returns
    /// the sanitized game name.
    pub async fn create_game(&self, name: &str) -> Result<String> {
        let game = sanitize_name(name)?;
        let path = self.root.join(&game);
        if tokio::fs::try_exists(&path).await? {
            return Err(StoreError::AlreadyExists(game));
        }
        tokio::fs::create_dir_all(&path).await?;
        write_json(&path.join(GAME_CONFIG), &GameConfig::default()).await?;
        debug!("created game {:?}", game);
        Ok(game)
    }

    // -- Decks --

    /// Add a deck (card type) to a game and create its directory. Returns
    /// the stored configuration.
    pub async fn add_deck(
        &self,
        game: &str,
        name: &str,
        width_mm: f32,
        height_mm: f32,
    ) -> Result<DeckConfig> {
        let game_path = self.game_path(game).await?;
        let folder = sanitize_name(name)?;

        let mut config: GameConfig = read_json(&game_path.join(GAME_CONFIG)).await?;
        if config.card_types.contains_key(&folder) {
            return Err(StoreError::AlreadyExists(folder));
        }

        tokio::fs::create_dir_all(game_path.join(&folder)).await?;
        let deck = DeckConfig {
            name: name.to_string(),
            folder: folder.clone(),
            width_mm,
            height_mm,
        };
        config.card_types.insert(folder, deck.clone());
        write_json(&game_path.join(GAME_CONFIG), &config).await?;
        Ok(deck)
    }

    /// Configured decks of a game, in folder order.
    pub async fn decks(&self, game: &str) -> Result<Vec<DeckConfig>> {
        let game_path = self.game_path(game).await?;
        let config: GameConfig = read_json(&game_path.join(GAME_CONFIG)).await?;
        Ok(config.card_types.into_values().collect())
    }

    /// Look up one deck by folder or display name.
    pub async fn find_deck(&self, game: &str, deck: &str) -> Result<DeckConfig> {
        self.decks(game)
            .await?
            .into_iter()
            .find(|d| d.folder == deck || d.name == deck)
            .ok_or_else(|| StoreError::NotFound(format!("{}/{}", game, deck)))
    }

    // -- Cards --

    /// Store a card image in a deck and record its copy count. Unnamed
    /// cards are auto-numbered `card_NNN`. Returns the stored card name.
    pub async fn save_card(
        &self,
        game: &str,
        deck: &str,
        image: RgbaImage,
        name: Option<&str>,
        count: u32,
    ) -> Result<String> {
        let deck_path = self.deck_path(game, deck).await?;

        let card_name = match name {
            Some(name) => sanitize_name(name)?,
            None => self.next_card_name(&deck_path).await?,
        };
        let filename = format!("{}.png", card_name);

        write_png(&deck_path.join(&filename), image).await?;

        let meta_path = deck_path.join(DECK_METADATA);
        let mut meta: DeckMetadata = read_json(&meta_path).await?;
        meta.insert(filename, CardMetadata { count });
        write_json(&meta_path, &meta).await?;

        debug!("saved card {:?} (x{}) to {}/{}", card_name, count, game, deck);
        Ok(card_name)
    }

    /// Load a stored card image.
    pub async fn retrieve(&self, game: &str, deck: &str, name: &str) -> Result<RgbaImage> {
        let path = self.deck_path(game, deck).await?.join(format!("{}.png", name));
        if !tokio::fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(format!("{}/{}/{}", game, deck, name)));
        }
        read_png(&path).await
    }

    /// Stored cards of a deck with their copy counts, sorted by name. The
    /// shared back image is not a card.
    pub async fn list_cards(&self, game: &str, deck: &str) -> Result<Vec<CardRecord>> {
        let deck_path = self.deck_path(game, deck).await?;
        let meta: DeckMetadata = read_json(&deck_path.join(DECK_METADATA)).await?;

        let mut cards = Vec::new();
        let mut entries = tokio::fs::read_dir(&deck_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "png") {
                continue;
            }
            let filename = entry.file_name().to_string_lossy().into_owned();
            if filename == BACK_IMAGE {
                continue;
            }
            let name = filename.strip_suffix(".png").unwrap_or(&filename).to_string();
            let count = meta.get(&filename).map_or(1, |m| m.count);
            cards.push(CardRecord { name, count });
        }
        cards.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(cards)
    }

    /// Update a card's copy count.
    pub async fn set_count(&self, game: &str, deck: &str, name: &str, count: u32) -> Result<()> {
        let deck_path = self.deck_path(game, deck).await?;
        let filename = format!("{}.png", name);
        if !tokio::fs::try_exists(deck_path.join(&filename)).await? {
            return Err(StoreError::NotFound(format!("{}/{}/{}", game, deck, name)));
        }

        let meta_path = deck_path.join(DECK_METADATA);
        let mut meta: DeckMetadata = read_json(&meta_path).await?;
        meta.insert(filename, CardMetadata { count });
        write_json(&meta_path, &meta).await
    }

    /// Rename a card within its deck, carrying its metadata along.
    pub async fn rename_card(
        &self,
        game: &str,
        deck: &str,
        name: &str,
        new_name: &str,
    ) -> Result<String> {
        let deck_path = self.deck_path(game, deck).await?;
        let new_name = sanitize_name(new_name)?;
        let old_filename = format!("{}.png", name);
        let new_filename = format!("{}.png", new_name);

        let old_path = deck_path.join(&old_filename);
        let new_path = deck_path.join(&new_filename);
        if !tokio::fs::try_exists(&old_path).await? {
            return Err(StoreError::NotFound(format!("{}/{}/{}", game, deck, name)));
        }
        if tokio::fs::try_exists(&new_path).await? {
            return Err(StoreError::AlreadyExists(new_name));
        }
        tokio::fs::rename(&old_path, &new_path).await?;

        let meta_path = deck_path.join(DECK_METADATA);
        let mut meta: DeckMetadata = read_json(&meta_path).await?;
        if let Some(data) = meta.remove(&old_filename) {
            meta.insert(new_filename, data);
        }
        write_json(&meta_path, &meta).await?;
        Ok(new_name)
    }

    /// Move a card into another deck of the same game, carrying its
    /// metadata along.
    pub async fn move_card(
        &self,
        game: &str,
        deck: &str,
        name: &str,
        new_deck: &str,
    ) -> Result<()> {
        let from_path = self.deck_path(game, deck).await?;
        let to_path = self.deck_path(game, new_deck).await?;
        let filename = format!("{}.png", name);

        let old_file = from_path.join(&filename);
        let new_file = to_path.join(&filename);
        if !tokio::fs::try_exists(&old_file).await? {
            return Err(StoreError::NotFound(format!("{}/{}/{}", game, deck, name)));
        }
        if tokio::fs::try_exists(&new_file).await? {
            return Err(StoreError::AlreadyExists(format!("{}/{}", new_deck, name)));
        }
        tokio::fs::rename(&old_file, &new_file).await?;

        let from_meta_path = from_path.join(DECK_METADATA);
        let mut from_meta: DeckMetadata = read_json(&from_meta_path).await?;
        let data = from_meta.remove(&filename).unwrap_or(CardMetadata { count: 1 });
        write_json(&from_meta_path, &from_meta).await?;

        let to_meta_path = to_path.join(DECK_METADATA);
        let mut to_meta: DeckMetadata = read_json(&to_meta_path).await?;
        to_meta.insert(filename, data);
        write_json(&to_meta_path, &to_meta).await
    }

    /// Delete a card and its metadata.
    pub async fn delete_card(&self, game: &str, deck: &str, name: &str) -> Result<()> {
        let deck_path = self.deck_path(game, deck).await?;
        let filename = format!("{}.png", name);
        let path = deck_path.join(&filename);
        if !tokio::fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(format!("{}/{}/{}", game, deck, name)));
        }
        tokio::fs::remove_file(&path).await?;

        let meta_path = deck_path.join(DECK_METADATA);
        let mut meta: DeckMetadata = read_json(&meta_path).await?;
        if meta.remove(&filename).is_some() {
            write_json(&meta_path, &meta).await?;
        }
        Ok(())
    }

    // -- Back image --

    /// Store the back image shared by every card of a deck.
    pub async fn set_back(&self, game: &str, deck: &str, image: RgbaImage) -> Result<()> {
        let deck_path = self.deck_path(game, deck).await?;
        write_png(&deck_path.join(BACK_IMAGE), image).await
    }

    /// The deck's shared back image, if one was stored.
    pub async fn back_image(&self, game: &str, deck: &str) -> Result<Option<RgbaImage>> {
        let path = self.deck_path(game, deck).await?.join(BACK_IMAGE);
        if !tokio::fs::try_exists(&path).await? {
            return Ok(None);
        }
        read_png(&path).await.map(Some)
    }

    // -- Paths --

    async fn game_path(&self, game: &str) -> Result<PathBuf> {
        let path = self.root.join(game);
        if !tokio::fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(game.to_string()));
        }
        Ok(path)
    }

    async fn deck_path(&self, game: &str, deck: &str) -> Result<PathBuf> {
        let path = self.game_path(game).await?.join(deck);
        if !tokio::fs::try_exists(&path).await? {
            return Err(StoreError::NotFound(format!("{}/{}", game, deck)));
        }
        Ok(path)
    }

    /// First free `card_NNN` name, numbering from the existing PNG count.
    async fn next_card_name(&self, deck_path: &Path) -> Result<String> {
        let mut existing = 0usize;
        let mut entries = tokio::fs::read_dir(deck_path).await?;
        while let Some(entry) = entries.next_entry().await? {
            if entry.path().extension().is_some_and(|ext| ext == "png") {
                existing += 1;
            }
        }

        let mut index = existing + 1;
        loop {
            let name = format!("card_{:03}", index);
            if !tokio::fs::try_exists(deck_path.join(format!("{}.png", name))).await? {
                return Ok(name);
            }
            index += 1;
        }
    }
}

// -- JSON and PNG helpers --

/// Read a JSON metadata file; a missing file is the empty default.
async fn read_json<T: DeserializeOwned + Default>(path: &Path) -> Result<T> {
    let bytes = match tokio::fs::read(path).await {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(T::default()),
        Err(e) => return Err(e.into()),
    };
    Ok(serde_json::from_slice(&bytes)?)
}

async fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let json = serde_json::to_string_pretty(value)?;
    tokio::fs::write(path, json).await?;
    Ok(())
}

async fn write_png(path: &Path, image: RgbaImage) -> Result<()> {
    let bytes = tokio::task::spawn_blocking(move || {
        let mut buffer = Cursor::new(Vec::new());
        image::DynamicImage::ImageRgba8(image).write_to(&mut buffer, image::ImageFormat::Png)?;
        Ok::<_, image::ImageError>(buffer.into_inner())
    })
    .await??;
    tokio::fs::write(path, bytes).await?;
    Ok(())
}

async fn read_png(path: &Path) -> Result<RgbaImage> {
    let bytes = tokio::fs::read(path).await?;
    let image = tokio::task::spawn_blocking(move || {
        image::load_from_memory(&bytes).map(|img| img.to_rgba8())
    })
    .await??;
    Ok(image)
}
