//! Player persistence.
//!
//! Characters are saved as human-readable JSON under a versioned envelope.
//! The envelope carries quick-display metadata so save pickers can list
//! characters without deserializing full player state. The persistence key
//! is the case-insensitive character name.

use crate::player::Player;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;
use tokio::fs;

/// Errors from persistence operations.
#[derive(Debug, Error)]
pub enum PersistError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("Version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: u32, found: u32 },
}

/// Current save file version.
pub const SAVE_VERSION: u32 = 1;

/// A saved character with everything needed to resume play.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedPlayer {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// When the save was created (unix seconds, as text).
    pub saved_at: String,

    /// The full player aggregate.
    pub player: Player,

    /// Quick-display metadata, readable without the full player.
    pub metadata: SaveMetadata,
}

/// Metadata about a save file.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaveMetadata {
    pub character_name: String,
    pub role: Option<String>,
    pub credits: i64,
    pub cycles: u64,
    pub scenarios_completed: usize,
    #[serde(default)]
    pub saved_at: String,
}

impl SavedPlayer {
    /// Wrap a player in a fresh save envelope.
    pub fn new(player: Player) -> Self {
        let saved_at = unix_now();
        let metadata = SaveMetadata {
            character_name: player.name.clone(),
            role: player.role.clone(),
            credits: player.resources.credits,
            cycles: player.resources.time.cycles,
            scenarios_completed: player.story.completed.len(),
            saved_at: saved_at.clone(),
        };
        Self {
            version: SAVE_VERSION,
            saved_at,
            player,
            metadata,
        }
    }

    /// Save to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Load from a JSON file, checking the format version.
    pub async fn load_json(path: impl AsRef<Path>) -> Result<Self, PersistError> {
        let content = fs::read_to_string(path).await?;
        let saved: Self = serde_json::from_str(&content)?;

        if saved.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: saved.version,
            });
        }

        Ok(saved)
    }

    /// Read only the metadata of a save file.
    pub async fn peek_metadata(path: impl AsRef<Path>) -> Result<SaveMetadata, PersistError> {
        let content = fs::read_to_string(path).await?;

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: SaveMetadata,
        }

        let partial: Partial = serde_json::from_str(&content)?;

        if partial.version != SAVE_VERSION {
            return Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: partial.version,
            });
        }

        Ok(partial.metadata)
    }
}

/// The save file path for a character name.
pub fn save_path(dir: impl AsRef<Path>, name: &str) -> PathBuf {
    let sanitized = name
        .to_lowercase()
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>();
    dir.as_ref().join(format!("{sanitized}.json"))
}

/// Save a player under its character name.
pub async fn save_player(dir: impl AsRef<Path>, player: &Player) -> Result<PathBuf, PersistError> {
    let path = save_path(dir, &player.name);
    SavedPlayer::new(player.clone()).save_json(&path).await?;
    Ok(path)
}

/// Load a player by character name.
///
/// A missing save is `Ok(None)`; a present-but-unreadable save surfaces its
/// error so callers can report it before treating the character as absent.
pub async fn load_player(
    dir: impl AsRef<Path>,
    name: &str,
) -> Result<Option<SavedPlayer>, PersistError> {
    let path = save_path(dir, name);
    match SavedPlayer::load_json(&path).await {
        Ok(saved) => Ok(Some(saved)),
        Err(PersistError::Io(err)) if err.kind() == std::io::ErrorKind::NotFound => Ok(None),
        Err(err) => Err(err),
    }
}

/// Delete a character's save. Returns whether a file was removed.
pub async fn delete_save(dir: impl AsRef<Path>, name: &str) -> Result<bool, PersistError> {
    let path = save_path(dir, name);
    match fs::remove_file(&path).await {
        Ok(()) => Ok(true),
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(err) => Err(err.into()),
    }
}

/// Information about a save file.
#[derive(Debug, Clone)]
pub struct SaveInfo {
    pub path: String,
    pub metadata: SaveMetadata,
}

/// List readable save files in a directory. Unreadable files are skipped.
pub async fn list_saves(dir: impl AsRef<Path>) -> Result<Vec<SaveInfo>, PersistError> {
    let mut saves = Vec::new();
    let mut entries = fs::read_dir(dir).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            if let Ok(metadata) = SavedPlayer::peek_metadata(&path).await {
                saves.push(SaveInfo {
                    path: path.to_string_lossy().to_string(),
                    metadata,
                });
            }
        }
    }

    saves.sort_by(|a, b| a.metadata.character_name.cmp(&b.metadata.character_name));
    Ok(saves)
}

fn unix_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();
    format!("{}", now.as_secs())
}
