//! Dialogue history log.
//!
//! An append-only record of every displayed line. The session rewrites
//! the whole serialized log after each append; with a single short
//! session there is no need for bounds or rotation.

use serde::{Deserialize, Serialize};

/// One displayed line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    #[serde(rename = "Speaker")]
    pub speaker: String,

    #[serde(rename = "Text")]
    pub text: String,

    /// Unix seconds, as a string.
    #[serde(rename = "Timestamp")]
    pub timestamp: String,
}

/// The full session history, in display order.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct HistoryLog {
    #[serde(rename = "History", default)]
    pub entries: Vec<HistoryEntry>,
}

impl HistoryLog {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a line, stamping it with the current time.
    pub fn append(&mut self, speaker: impl Into<String>, text: impl Into<String>) -> &HistoryEntry {
        self.entries.push(HistoryEntry {
            speaker: speaker.into(),
            text: text.into(),
            timestamp: crate::persist::timestamp_now(),
        });
        &self.entries[self.entries.len() - 1]
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn last(&self) -> Option<&HistoryEntry> {
        self.entries.last()
    }

    pub fn iter(&self) -> impl Iterator<Item = &HistoryEntry> {
        self.entries.iter()
    }
}
