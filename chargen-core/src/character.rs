//! Player character types.
//!
//! Contains the closed race/class/pronoun vocabularies, the derived
//! attribute block, and the mutable character record accumulated over a
//! creation session.

use crate::gamedata::StatTable;
use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;
use uuid::Uuid;

// ============================================================================
// ID Types
// ============================================================================

/// Unique identifier for character records.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct CharacterId(pub Uuid);

impl CharacterId {
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }
}

impl Default for CharacterId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for CharacterId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ============================================================================
// Races
// ============================================================================

/// Playable races.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Race {
    Human,
    Elf,
    Dwarf,
    Orc,
    Gnome,
    Tiefling,
}

impl Race {
    pub fn name(&self) -> &'static str {
        match self {
            Race::Human => "Human",
            Race::Elf => "Elf",
            Race::Dwarf => "Dwarf",
            Race::Orc => "Orc",
            Race::Gnome => "Gnome",
            Race::Tiefling => "Tiefling",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            Race::Human => "Adaptable and ambitious, at home anywhere",
            Race::Elf => "Graceful and long-lived, keen of eye and wit",
            Race::Dwarf => "Stout and stubborn, bred for stone and steel",
            Race::Orc => "Broad-shouldered and blunt, strong beyond measure",
            Race::Gnome => "Small, curious, and cleverer than they look",
            Race::Tiefling => "Marked by an infernal bloodline and a silver tongue",
        }
    }

    /// Parse a player-supplied race name, case-insensitively.
    pub fn parse(s: &str) -> Option<Race> {
        match s.trim().to_lowercase().as_str() {
            "human" => Some(Race::Human),
            "elf" => Some(Race::Elf),
            "dwarf" => Some(Race::Dwarf),
            "orc" => Some(Race::Orc),
            "gnome" => Some(Race::Gnome),
            "tiefling" => Some(Race::Tiefling),
            _ => None,
        }
    }

    /// Get all playable races.
    pub fn all() -> &'static [Race] {
        &[
            Race::Human,
            Race::Elf,
            Race::Dwarf,
            Race::Orc,
            Race::Gnome,
            Race::Tiefling,
        ]
    }
}

impl fmt::Display for Race {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Classes
// ============================================================================

/// Playable classes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CharacterClass {
    Warrior,
    Mage,
    Rogue,
    Bard,
    Cleric,
    Ranger,
}

impl CharacterClass {
    pub fn name(&self) -> &'static str {
        match self {
            CharacterClass::Warrior => "Warrior",
            CharacterClass::Mage => "Mage",
            CharacterClass::Rogue => "Rogue",
            CharacterClass::Bard => "Bard",
            CharacterClass::Cleric => "Cleric",
            CharacterClass::Ranger => "Ranger",
        }
    }

    pub fn description(&self) -> &'static str {
        match self {
            CharacterClass::Warrior => "A front-line fighter who solves problems with muscle",
            CharacterClass::Mage => "A scholar of the arcane, fragile but formidable",
            CharacterClass::Rogue => "A light-footed opportunist who favors the shadows",
            CharacterClass::Bard => "A performer who talks their way through everything",
            CharacterClass::Cleric => "A devoted healer with a stubborn streak",
            CharacterClass::Ranger => "A wanderer who reads the wild like a map",
        }
    }

    /// Parse a player-supplied class name, case-insensitively.
    pub fn parse(s: &str) -> Option<CharacterClass> {
        match s.trim().to_lowercase().as_str() {
            "warrior" => Some(CharacterClass::Warrior),
            "mage" => Some(CharacterClass::Mage),
            "rogue" => Some(CharacterClass::Rogue),
            "bard" => Some(CharacterClass::Bard),
            "cleric" => Some(CharacterClass::Cleric),
            "ranger" => Some(CharacterClass::Ranger),
            _ => None,
        }
    }

    /// Get all playable classes.
    pub fn all() -> &'static [CharacterClass] {
        &[
            CharacterClass::Warrior,
            CharacterClass::Mage,
            CharacterClass::Rogue,
            CharacterClass::Bard,
            CharacterClass::Cleric,
            CharacterClass::Ranger,
        ]
    }
}

impl fmt::Display for CharacterClass {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Pronouns
// ============================================================================

/// Pronoun sets a player can choose during creation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Pronouns {
    SheHer,
    HeHim,
    TheyThem,
    ZeZir,
}

impl Pronouns {
    pub fn name(&self) -> &'static str {
        match self {
            Pronouns::SheHer => "she/her",
            Pronouns::HeHim => "he/him",
            Pronouns::TheyThem => "they/them",
            Pronouns::ZeZir => "ze/zir",
        }
    }

    /// Parse a player-supplied pronoun set. Accepts the full pair or
    /// either half of it, case-insensitively.
    pub fn parse(s: &str) -> Option<Pronouns> {
        match s.trim().to_lowercase().as_str() {
            "she/her" | "she" | "her" => Some(Pronouns::SheHer),
            "he/him" | "he" | "him" => Some(Pronouns::HeHim),
            "they/them" | "they" | "them" => Some(Pronouns::TheyThem),
            "ze/zir" | "ze" | "zir" => Some(Pronouns::ZeZir),
            _ => None,
        }
    }

    pub fn all() -> &'static [Pronouns] {
        &[
            Pronouns::SheHer,
            Pronouns::HeHim,
            Pronouns::TheyThem,
            Pronouns::ZeZir,
        ]
    }
}

impl fmt::Display for Pronouns {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}

// ============================================================================
// Attributes
// ============================================================================

/// The four derived attributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Attribute {
    Strength,
    Charisma,
    Dexterity,
    Intelligence,
}

impl Attribute {
    pub fn abbreviation(&self) -> &'static str {
        match self {
            Attribute::Strength => "STR",
            Attribute::Charisma => "CHA",
            Attribute::Dexterity => "DEX",
            Attribute::Intelligence => "INT",
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Attribute::Strength => "Strength",
            Attribute::Charisma => "Charisma",
            Attribute::Dexterity => "Dexterity",
            Attribute::Intelligence => "Intelligence",
        }
    }

    pub fn all() -> [Attribute; 4] {
        [
            Attribute::Strength,
            Attribute::Charisma,
            Attribute::Dexterity,
            Attribute::Intelligence,
        ]
    }
}

impl fmt::Display for Attribute {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.abbreviation())
    }
}

/// Attribute block. Used both for stat-table entries (per-race and
/// per-class contributions) and for the totals stored on the record.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Attributes {
    pub strength: i32,
    pub charisma: i32,
    pub dexterity: i32,
    pub intelligence: i32,
}

impl Attributes {
    pub fn new(strength: i32, charisma: i32, dexterity: i32, intelligence: i32) -> Self {
        Self {
            strength,
            charisma,
            dexterity,
            intelligence,
        }
    }

    pub fn get(&self, attribute: Attribute) -> i32 {
        match attribute {
            Attribute::Strength => self.strength,
            Attribute::Charisma => self.charisma,
            Attribute::Dexterity => self.dexterity,
            Attribute::Intelligence => self.intelligence,
        }
    }

    pub fn set(&mut self, attribute: Attribute, value: i32) {
        match attribute {
            Attribute::Strength => self.strength = value,
            Attribute::Charisma => self.charisma = value,
            Attribute::Dexterity => self.dexterity = value,
            Attribute::Intelligence => self.intelligence = value,
        }
    }

    /// Per-attribute sum of two blocks.
    pub fn sum(&self, other: &Attributes) -> Attributes {
        Attributes {
            strength: self.strength + other.strength,
            charisma: self.charisma + other.charisma,
            dexterity: self.dexterity + other.dexterity,
            intelligence: self.intelligence + other.intelligence,
        }
    }
}

// ============================================================================
// Character Record
// ============================================================================

/// A stat recomputation that could not be applied.
///
/// These are expected conditions, not fatal failures: the record's prior
/// attribute values are left untouched and the condition is reported to
/// the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum StatsError {
    #[error("no race has been chosen yet")]
    RaceNotChosen,

    #[error("no class has been chosen yet")]
    ClassNotChosen,

    #[error("the stat table has no entry for race {0}")]
    MissingRaceStats(Race),

    #[error("the stat table has no entry for class {0}")]
    MissingClassStats(CharacterClass),
}

/// The player character state accumulated through the creation dialogue.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CharacterRecord {
    /// Stable record id, kept across saves.
    pub id: CharacterId,

    /// Character name, empty until chosen.
    pub name: String,

    /// Chosen race, if any.
    pub race: Option<Race>,

    /// Chosen class, if any.
    pub class: Option<CharacterClass>,

    /// Chosen pronouns, if any.
    pub pronouns: Option<Pronouns>,

    /// Self-reported attractiveness score.
    pub attractiveness: i32,

    /// Derived attribute totals, recomputed from the stat table after
    /// race/class changes.
    pub attributes: Attributes,
}

impl CharacterRecord {
    /// Create a fresh, zero-valued record.
    pub fn new() -> Self {
        Self {
            id: CharacterId::new(),
            name: String::new(),
            race: None,
            class: None,
            pronouns: None,
            attractiveness: 0,
            attributes: Attributes::default(),
        }
    }

    /// Whether every creation prompt has been answered.
    pub fn is_complete(&self) -> bool {
        !self.name.is_empty()
            && self.race.is_some()
            && self.class.is_some()
            && self.pronouns.is_some()
    }

    /// Set race and class together, applying the summed stat-table
    /// entries. The record is left entirely unchanged when either table
    /// lookup misses.
    pub fn set_race_and_class(
        &mut self,
        race: Race,
        class: CharacterClass,
        table: &StatTable,
    ) -> Result<(), StatsError> {
        let race_stats = table
            .race_stats(race)
            .ok_or(StatsError::MissingRaceStats(race))?;
        let class_stats = table
            .class_stats(class)
            .ok_or(StatsError::MissingClassStats(class))?;

        self.race = Some(race);
        self.class = Some(class);
        self.attributes = race_stats.sum(&class_stats);
        Ok(())
    }

    /// Recompute derived attributes from the currently stored race and
    /// class. Prior attribute values are kept when either half is not
    /// chosen yet or its table entry is missing.
    pub fn update_stats(&mut self, table: &StatTable) -> Result<(), StatsError> {
        let race = self.race.ok_or(StatsError::RaceNotChosen)?;
        let class = self.class.ok_or(StatsError::ClassNotChosen)?;

        let race_stats = table
            .race_stats(race)
            .ok_or(StatsError::MissingRaceStats(race))?;
        let class_stats = table
            .class_stats(class)
            .ok_or(StatsError::MissingClassStats(class))?;

        self.attributes = race_stats.sum(&class_stats);
        Ok(())
    }

    /// One-line summary for status output.
    pub fn summary(&self) -> String {
        let name = if self.name.is_empty() {
            "(unnamed)"
        } else {
            self.name.as_str()
        };
        let race = self.race.map(|r| r.name()).unwrap_or("?");
        let class = self.class.map(|c| c.name()).unwrap_or("?");
        let pronouns = self.pronouns.map(|p| p.name()).unwrap_or("?");
        format!("{name} ({race} {class}, {pronouns})")
    }
}

impl Default for CharacterRecord {
    fn default() -> Self {
        Self::new()
    }
}
