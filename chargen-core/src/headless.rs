//! Headless creation interface for programmatic use.
//!
//! Wraps [`CreationSession`] with a simpler interface for scripted runs:
//! automated tests, tooling, and agents driving the creator without a
//! terminal attached.
//!
//! # Example
//!
//! ```ignore
//! use chargen_core::headless::HeadlessCreation;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let mut creation = HeadlessCreation::sample("./chargen-data").await?;
//!     creation.run_script(&["Kara", "Elf", "Mage", "she/her", "7"]).await?;
//!     println!("{}", creation.character().summary());
//!     Ok(())
//! }
//! ```

use crate::character::{CharacterRecord, StatsError};
use crate::dialogue::{sample_document, DialogueDocument};
use crate::gamedata::StatTable;
use crate::session::{CreationSession, SessionConfig, SessionError};
use std::path::Path;
use std::sync::Arc;

/// A simplified reply from one submission.
#[derive(Debug, Clone)]
pub struct CreationReply {
    /// The line to display, formatted as `Speaker: text`.
    pub text: String,

    /// Whether the submission was accepted and applied.
    pub accepted: bool,

    /// Whether the session has reached its terminal node.
    pub finished: bool,

    /// A stat recomputation that could not be applied, if any.
    pub stats_skipped: Option<StatsError>,
}

/// An entry in the creation transcript.
#[derive(Debug, Clone)]
pub struct TranscriptEntry {
    /// Player input.
    pub player_input: String,

    /// Reply line shown for it.
    pub reply: String,

    /// Turn number.
    pub turn: usize,
}

/// A character creation run that can be controlled programmatically.
pub struct HeadlessCreation {
    session: CreationSession,
    /// Transcript of all exchanges.
    transcript: Vec<TranscriptEntry>,
}

impl HeadlessCreation {
    /// Create a headless run over the given document and stat table.
    pub async fn new(
        config: SessionConfig,
        document: Arc<DialogueDocument>,
        stats: Arc<StatTable>,
    ) -> Result<Self, SessionError> {
        let session = CreationSession::new(config, document, stats).await?;
        Ok(Self {
            session,
            transcript: Vec::new(),
        })
    }

    /// Create a headless run over the built-in creation script and the
    /// built-in stat table.
    pub async fn sample(data_dir: impl AsRef<Path>) -> Result<Self, SessionError> {
        Self::new(
            SessionConfig::new(data_dir.as_ref()),
            Arc::new(sample_document()),
            Arc::new(StatTable::builtin().clone()),
        )
        .await
    }

    /// Send one player response and get the reply.
    pub async fn send(&mut self, input: &str) -> Result<CreationReply, SessionError> {
        let outcome = self.session.submit(input).await?;

        let text = outcome
            .line()
            .map(|line| format!("{}: {}", line.speaker, line.text))
            .unwrap_or_else(|| "Character creation complete.".to_string());

        self.transcript.push(TranscriptEntry {
            player_input: input.to_string(),
            reply: text.clone(),
            turn: self.transcript.len() + 1,
        });

        Ok(CreationReply {
            text,
            accepted: outcome.accepted(),
            finished: self.session.is_finished(),
            stats_skipped: outcome.stats_skipped(),
        })
    }

    /// Send a sequence of responses, stopping early if the session
    /// finishes.
    pub async fn run_script<S: AsRef<str>>(
        &mut self,
        inputs: &[S],
    ) -> Result<Vec<CreationReply>, SessionError> {
        let mut replies = Vec::with_capacity(inputs.len());
        for input in inputs {
            let reply = self.send(input.as_ref()).await?;
            let finished = reply.finished;
            replies.push(reply);
            if finished {
                break;
            }
        }
        Ok(replies)
    }

    // ========================================================================
    // State Queries
    // ========================================================================

    /// The character record as accumulated so far.
    pub fn character(&self) -> &CharacterRecord {
        self.session.character()
    }

    /// The prompt currently awaiting an answer, if any.
    pub fn current_prompt(&self) -> Option<&str> {
        self.session.current_node().map(|node| node.prompt.as_str())
    }

    /// Whether the creation dialogue has finished.
    pub fn finished(&self) -> bool {
        self.session.is_finished()
    }

    /// Get the transcript of all exchanges.
    pub fn transcript(&self) -> &[TranscriptEntry] {
        &self.transcript
    }

    /// The last reply shown, if any.
    pub fn last_reply(&self) -> Option<&str> {
        self.transcript.last().map(|entry| entry.reply.as_str())
    }

    /// Get the underlying session for advanced use.
    pub fn session(&self) -> &CreationSession {
        &self.session
    }

    /// Get mutable access to the underlying session.
    pub fn session_mut(&mut self) -> &mut CreationSession {
        &mut self.session
    }
}
