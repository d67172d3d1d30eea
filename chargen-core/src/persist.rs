//! Character and history persistence.
//!
//! Two kinds of files live here. The autosave files (the character
//! record and the history log) are rewritten wholesale after every
//! mutation and loaded with a fall-back-to-fresh contract that never
//! fails. Named save slots wrap a finished character in a versioned
//! envelope with quick-access metadata, and those do return errors:
//! saving to or loading from a slot is an explicit action.

use crate::character::CharacterRecord;
use crate::history::HistoryLog;
use serde::{Deserialize, Serialize};
use std::path::Path;
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

/// Get current timestamp as unix seconds, stringified.
pub(crate) fn timestamp_now() -> String {
    use std::time::{SystemTime, UNIX_EPOCH};

    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default();

    format!("{}", now.as_secs())
}

// ============================================================================
// Autosave Files
// ============================================================================

/// Write the character record to its autosave path, overwriting
/// unconditionally.
pub async fn save_character(
    character: &CharacterRecord,
    path: impl AsRef<Path>,
) -> Result<(), PersistError> {
    let content = serde_json::to_string_pretty(character)?;
    fs::write(path, content).await?;
    Ok(())
}

/// Read the character record from its autosave path, or return a fresh
/// zero-valued record when the file is absent or unreadable. Never fails.
pub async fn load_character_or_new(path: impl AsRef<Path>) -> CharacterRecord {
    match fs::read_to_string(path).await {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|_| CharacterRecord::new()),
        Err(_) => CharacterRecord::new(),
    }
}

/// Write the history log to its path, overwriting unconditionally.
pub async fn save_history(log: &HistoryLog, path: impl AsRef<Path>) -> Result<(), PersistError> {
    let content = serde_json::to_string_pretty(log)?;
    fs::write(path, content).await?;
    Ok(())
}

/// Read a history log, or return an empty one. Never fails.
pub async fn load_history_or_new(path: impl AsRef<Path>) -> HistoryLog {
    match fs::read_to_string(path).await {
        Ok(content) => serde_json::from_str(&content).unwrap_or_else(|_| HistoryLog::new()),
        Err(_) => HistoryLog::new(),
    }
}

// ============================================================================
// Named Save Slots
// ============================================================================

/// Current save slot format version.
const SAVE_VERSION: u32 = 1;

/// A character saved to a named slot.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedCharacter {
    /// Save format version for compatibility checking.
    pub version: u32,

    /// When the character was saved.
    pub saved_at: String,

    /// The complete character record.
    pub character: CharacterRecord,

    /// Quick-access metadata about the character.
    pub metadata: CharacterMetadata,
}

/// Metadata about a saved character for quick display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CharacterMetadata {
    /// Character name.
    pub name: String,

    /// Race name.
    pub race: String,

    /// Class name.
    pub class: String,

    /// Whether every creation prompt was answered.
    pub complete: bool,
}

impl SavedCharacter {
    /// Create a new saved character from a record.
    pub fn new(character: CharacterRecord) -> Self {
        let metadata = CharacterMetadata {
            name: character.name.clone(),
            race: character
                .race
                .map(|r| r.name().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            class: character
                .class
                .map(|c| c.name().to_string())
                .unwrap_or_else(|| "Unknown".to_string()),
            complete: character.is_complete(),
        };

        Self {
            version: SAVE_VERSION,
            saved_at: timestamp_now(),
            character,
            metadata,
        }
    }

    /// Save to a JSON file.
    pub async fn save_json(&self, path: impl AsRef<Path>) -> Result<(), PersistError> {
        let content = serde_json::to_string_pretty(self)?;
        fs::write(path, content).await?;
        Ok(())
    }

    /// Load from a JSON file.
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

    /// Get metadata without loading the full record.
    pub async fn peek_metadata(path: impl AsRef<Path>) -> Result<CharacterMetadata, PersistError> {
        let content = fs::read_to_string(path).await?;

        #[derive(Deserialize)]
        struct Partial {
            version: u32,
            metadata: CharacterMetadata,
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

/// Information about a character save file.
#[derive(Debug, Clone)]
pub struct CharacterSaveInfo {
    /// Path to the save file.
    pub path: String,

    /// Character metadata.
    pub metadata: CharacterMetadata,
}

/// List all character save slots in a directory.
pub async fn list_character_saves(
    dir: impl AsRef<Path>,
) -> Result<Vec<CharacterSaveInfo>, PersistError> {
    let mut saves = Vec::new();

    // Create the directory if it doesn't exist
    let dir_path = dir.as_ref();
    if !dir_path.exists() {
        fs::create_dir_all(dir_path).await?;
        return Ok(saves);
    }

    let mut entries = fs::read_dir(dir_path).await?;

    while let Some(entry) = entries.next_entry().await? {
        let path = entry.path();
        if path.extension().map(|e| e == "json").unwrap_or(false) {
            if let Ok(metadata) = SavedCharacter::peek_metadata(&path).await {
                saves.push(CharacterSaveInfo {
                    path: path.to_string_lossy().to_string(),
                    metadata,
                });
            }
        }
    }

    // Sort by name
    saves.sort_by(|a, b| a.metadata.name.cmp(&b.metadata.name));
    Ok(saves)
}

/// Generate a save slot path for a character name.
pub fn character_save_path(dir: impl AsRef<Path>, name: &str) -> std::path::PathBuf {
    let sanitized = name
        .chars()
        .map(|c| if c.is_alphanumeric() { c } else { '_' })
        .collect::<String>();
    dir.as_ref().join(format!("{sanitized}.json"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::character::{CharacterClass, Pronouns, Race};
    use crate::gamedata::StatTable;
    use tempfile::TempDir;

    fn sample_record(name: &str) -> CharacterRecord {
        let mut record = CharacterRecord::new();
        record.name = name.to_string();
        record
            .set_race_and_class(Race::Dwarf, CharacterClass::Cleric, StatTable::builtin())
            .unwrap();
        record.pronouns = Some(Pronouns::TheyThem);
        record.attractiveness = 6;
        record
    }

    #[test]
    fn test_saved_character_metadata() {
        let saved = SavedCharacter::new(sample_record("Brunhild"));
        assert_eq!(saved.version, SAVE_VERSION);
        assert_eq!(saved.metadata.name, "Brunhild");
        assert_eq!(saved.metadata.race, "Dwarf");
        assert_eq!(saved.metadata.class, "Cleric");
        assert!(saved.metadata.complete);
    }

    #[test]
    fn test_incomplete_record_metadata() {
        let saved = SavedCharacter::new(CharacterRecord::new());
        assert_eq!(saved.metadata.race, "Unknown");
        assert_eq!(saved.metadata.class, "Unknown");
        assert!(!saved.metadata.complete);
    }

    #[test]
    fn test_character_save_path_sanitizes() {
        let path = character_save_path("saves", "Sir Reginald!@#");
        assert!(path.to_string_lossy().contains("Sir_Reginald"));
        assert!(!path.to_string_lossy().contains('!'));
        assert!(path.to_string_lossy().ends_with(".json"));
    }

    #[tokio::test]
    async fn test_autosave_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("user.json");

        let record = sample_record("Round Trip");
        save_character(&record, &path).await.expect("Save should succeed");

        let loaded = load_character_or_new(&path).await;
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn test_default_record_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("user.json");

        let record = CharacterRecord::new();
        save_character(&record, &path).await.expect("Save should succeed");

        let loaded = load_character_or_new(&path).await;
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn test_load_missing_character_is_fresh() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let loaded = load_character_or_new(temp_dir.path().join("missing.json")).await;
        assert!(loaded.name.is_empty());
        assert!(loaded.race.is_none());
    }

    #[tokio::test]
    async fn test_load_corrupt_character_is_fresh() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("user.json");
        fs::write(&path, "{ not json").await.unwrap();

        let loaded = load_character_or_new(&path).await;
        assert!(loaded.name.is_empty());
    }

    #[tokio::test]
    async fn test_history_round_trip() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("DialogueHistory.json");

        let mut log = HistoryLog::new();
        log.append("Narrator", "What is your name?");
        log.append("Player", "Kara");
        save_history(&log, &path).await.expect("Save should succeed");

        let loaded = load_history_or_new(&path).await;
        assert_eq!(loaded.entries, log.entries);
    }

    #[tokio::test]
    async fn test_save_slot_round_trip_and_peek() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("kara.json");

        let saved = SavedCharacter::new(sample_record("Kara"));
        saved.save_json(&path).await.expect("Save should succeed");

        let loaded = SavedCharacter::load_json(&path)
            .await
            .expect("Load should succeed");
        assert_eq!(loaded.character, saved.character);

        let metadata = SavedCharacter::peek_metadata(&path)
            .await
            .expect("Peek should succeed");
        assert_eq!(metadata.name, "Kara");
        assert_eq!(metadata.race, "Dwarf");
    }

    #[tokio::test]
    async fn test_version_mismatch_rejected() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let path = temp_dir.path().join("old.json");

        let mut saved = SavedCharacter::new(sample_record("Old Save"));
        saved.version = 99;
        let content = serde_json::to_string_pretty(&saved).unwrap();
        fs::write(&path, content).await.unwrap();

        assert!(matches!(
            SavedCharacter::load_json(&path).await,
            Err(PersistError::VersionMismatch {
                expected: SAVE_VERSION,
                found: 99
            })
        ));
    }

    #[tokio::test]
    async fn test_list_character_saves_sorted_by_name() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path().join("characters");
        std::fs::create_dir_all(&dir).expect("Create dir should succeed");

        for name in ["Charlie", "Alpha", "Beta"] {
            let saved = SavedCharacter::new(sample_record(name));
            saved
                .save_json(character_save_path(&dir, name))
                .await
                .expect("Save should succeed");
        }

        let saves = list_character_saves(&dir).await.expect("List should succeed");
        let names: Vec<_> = saves.iter().map(|s| s.metadata.name.as_str()).collect();
        assert_eq!(names, vec!["Alpha", "Beta", "Charlie"]);
    }

    #[tokio::test]
    async fn test_list_character_saves_creates_missing_dir() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path().join("empty_characters");

        let saves = list_character_saves(&dir).await.expect("List should succeed");
        assert!(saves.is_empty());
        assert!(dir.exists());
    }

    #[tokio::test]
    async fn test_list_skips_plain_autosave_files() {
        let temp_dir = TempDir::new().expect("Failed to create temp dir");
        let dir = temp_dir.path().to_path_buf();

        // A plain autosave record has no envelope, so peeking fails and
        // the file is skipped rather than erroring the listing.
        save_character(&sample_record("Plain"), dir.join("user.json"))
            .await
            .unwrap();
        let saved = SavedCharacter::new(sample_record("Slotted"));
        saved.save_json(dir.join("slotted.json")).await.unwrap();

        let saves = list_character_saves(&dir).await.expect("List should succeed");
        assert_eq!(saves.len(), 1);
        assert_eq!(saves[0].metadata.name, "Slotted");
    }
}
