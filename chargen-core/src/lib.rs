//! Dialogue-driven character creator engine.
//!
//! This crate provides:
//! - A validated dialogue document format and state-transition engine
//! - A character record with table-derived attributes
//! - JSON persistence for the record, the history log, and save slots
//! - A headless driver for scripted runs
//!
//! # Quick Start
//!
//! ```ignore
//! use chargen_core::{CreationSession, SessionConfig, StatTable, sample_document};
//! use std::sync::Arc;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut session = CreationSession::new(
//!         SessionConfig::new("./chargen-data"),
//!         Arc::new(sample_document()),
//!         Arc::new(StatTable::builtin().clone()),
//!     )
//!     .await?;
//!
//!     let outcome = session.submit("Kara").await?;
//!     if let Some(line) = outcome.line() {
//!         println!("{}: {}", line.speaker, line.text);
//!     }
//!
//!     Ok(())
//! }
//! ```

pub mod character;
pub mod dialogue;
pub mod gamedata;
pub mod headless;
pub mod history;
pub mod persist;
pub mod session;

// Primary public API
pub use character::{
    Attribute, Attributes, CharacterClass, CharacterRecord, Pronouns, Race, StatsError,
};
pub use dialogue::{sample_document, DialogueDocument, DialogueNode, DocumentError, Trigger};
pub use gamedata::{GameDataError, StatTable};
pub use headless::{CreationReply, HeadlessCreation};
pub use session::{
    CreationSession, SessionConfig, SessionError, SubmitOutcome, TriggerError,
};
