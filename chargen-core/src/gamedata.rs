//! Race and class stat tables.
//!
//! Tables map each race and class to an attribute contribution; a
//! character's derived attributes are the per-attribute sum of its race
//! and class entries. Tables are loaded once from a JSON document (or
//! taken from the built-in set) and never mutated afterwards.
//!
//! A lookup miss at recompute time is a normal condition (not every
//! race or class is guaranteed an entry) and resolves to "no stats
//! applied". Unknown *names* in a document, by contrast, are load-time
//! errors: the race/class vocabulary is closed.

use crate::character::{Attributes, CharacterClass, Race};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Errors from stat table loading.
#[derive(Debug, Error)]
pub enum GameDataError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("unknown race {0:?} in stat table")]
    UnknownRace(String),

    #[error("unknown class {0:?} in stat table")]
    UnknownClass(String),

    #[error("duplicate stat entry for race {0}")]
    DuplicateRace(Race),

    #[error("duplicate stat entry for class {0}")]
    DuplicateClass(CharacterClass),
}

/// Wire form of the stat table document: `{"Races": [...], "Classes": [...]}`.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatDocument {
    #[serde(rename = "Races", default)]
    pub races: Vec<StatEntry>,

    #[serde(rename = "Classes", default)]
    pub classes: Vec<StatEntry>,
}

/// One stat table row. The key field is `Name`; `Race` and `Class` are
/// accepted as aliases since older documents used them.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StatEntry {
    #[serde(rename = "Name", alias = "Race", alias = "Class")]
    pub name: String,

    #[serde(rename = "Strength")]
    pub strength: i32,

    #[serde(rename = "Charisma")]
    pub charisma: i32,

    #[serde(rename = "Dexterity")]
    pub dexterity: i32,

    #[serde(rename = "Intelligence")]
    pub intelligence: i32,
}

impl StatEntry {
    fn attributes(&self) -> Attributes {
        Attributes::new(
            self.strength,
            self.charisma,
            self.dexterity,
            self.intelligence,
        )
    }
}

/// Immutable race/class attribute tables.
#[derive(Debug, Clone, Default)]
pub struct StatTable {
    races: HashMap<Race, Attributes>,
    classes: HashMap<CharacterClass, Attributes>,
}

impl StatTable {
    /// Create an empty table.
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a table from a parsed document, validating every entry name
    /// against the closed race/class vocabulary.
    pub fn from_document(document: &StatDocument) -> Result<Self, GameDataError> {
        let mut table = Self::new();

        for entry in &document.races {
            let race = Race::parse(&entry.name)
                .ok_or_else(|| GameDataError::UnknownRace(entry.name.clone()))?;
            if table.races.insert(race, entry.attributes()).is_some() {
                return Err(GameDataError::DuplicateRace(race));
            }
        }

        for entry in &document.classes {
            let class = CharacterClass::parse(&entry.name)
                .ok_or_else(|| GameDataError::UnknownClass(entry.name.clone()))?;
            if table.classes.insert(class, entry.attributes()).is_some() {
                return Err(GameDataError::DuplicateClass(class));
            }
        }

        Ok(table)
    }

    /// Parse a table from JSON text.
    pub fn from_json(text: &str) -> Result<Self, GameDataError> {
        let document: StatDocument = serde_json::from_str(text)?;
        Self::from_document(&document)
    }

    /// Load a table from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, GameDataError> {
        let content = fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    /// The built-in table, covering every race and class.
    pub fn builtin() -> &'static StatTable {
        &BUILTIN_TABLE
    }

    /// Add or replace a race entry. Intended for programmatic table
    /// construction in tests and tools.
    pub fn insert_race(&mut self, race: Race, stats: Attributes) {
        self.races.insert(race, stats);
    }

    /// Add or replace a class entry.
    pub fn insert_class(&mut self, class: CharacterClass, stats: Attributes) {
        self.classes.insert(class, stats);
    }

    /// Look up the attribute contribution for a race.
    pub fn race_stats(&self, race: Race) -> Option<Attributes> {
        self.races.get(&race).copied()
    }

    /// Look up the attribute contribution for a class.
    pub fn class_stats(&self, class: CharacterClass) -> Option<Attributes> {
        self.classes.get(&class).copied()
    }

    pub fn is_empty(&self) -> bool {
        self.races.is_empty() && self.classes.is_empty()
    }
}

lazy_static::lazy_static! {
    /// Default stat table shipped with the engine.
    static ref BUILTIN_TABLE: StatTable = {
        let mut table = StatTable::new();

        table.insert_race(Race::Human, Attributes::new(2, 2, 2, 2));
        table.insert_race(Race::Elf, Attributes::new(1, 3, 4, 4));
        table.insert_race(Race::Dwarf, Attributes::new(4, 1, 1, 2));
        table.insert_race(Race::Orc, Attributes::new(5, 1, 2, 1));
        table.insert_race(Race::Gnome, Attributes::new(1, 2, 3, 5));
        table.insert_race(Race::Tiefling, Attributes::new(2, 5, 2, 3));

        table.insert_class(CharacterClass::Warrior, Attributes::new(5, 1, 2, 1));
        table.insert_class(CharacterClass::Mage, Attributes::new(1, 2, 1, 5));
        table.insert_class(CharacterClass::Rogue, Attributes::new(2, 2, 5, 2));
        table.insert_class(CharacterClass::Bard, Attributes::new(1, 5, 3, 2));
        table.insert_class(CharacterClass::Cleric, Attributes::new(2, 3, 1, 3));
        table.insert_class(CharacterClass::Ranger, Attributes::new(3, 1, 4, 2));

        table
    };
}
