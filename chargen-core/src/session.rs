//! CreationSession - the dialogue engine driving character creation.
//!
//! A session walks the dialogue document one submitted response at a
//! time: validate the response against the current node, dispatch the
//! node's trigger against the character record, advance to the next
//! node, and persist both the record and the history log along the way.
//!
//! Expected failures (a rejected response, an unparsable answer, an
//! unknown trigger name, a stat-table miss) are reported as values in
//! the [`SubmitOutcome`], leave the walk and the record unchanged, and
//! never abort the session.

use crate::character::{CharacterClass, CharacterRecord, Pronouns, Race, StatsError};
use crate::dialogue::{DialogueDocument, DocumentError, Trigger};
use crate::gamedata::{GameDataError, StatTable};
use crate::history::{HistoryEntry, HistoryLog};
use crate::persist::{self, PersistError};
use std::path::PathBuf;
use std::sync::Arc;
use thiserror::Error;
use tokio::fs;

/// Speaker used for engine-generated lines.
pub const SYSTEM_SPEAKER: &str = "System";

/// Line shown for an empty or whitespace-only submission.
pub const EMPTY_INPUT_RESPONSE: &str = "Please enter a response.";

const DEFAULT_REJECTED_RESPONSE: &str = "I don't understand that response.";
const ALREADY_FINISHED_RESPONSE: &str = "There is nothing more to answer.";

/// Errors from CreationSession operations.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("persistence error: {0}")]
    Persist(#[from] PersistError),

    #[error("dialogue document error: {0}")]
    Document(#[from] DocumentError),

    #[error("stat table error: {0}")]
    GameData(#[from] GameDataError),

    #[error("dialogue id {0:?} does not match any node")]
    UnknownNode(String),
}

/// A trigger that could not be applied. Non-fatal: reported in the
/// outcome with the record and the walk left unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TriggerError {
    #[error("trigger {0:?} is not recognized")]
    UnknownTrigger(String),

    #[error("{0:?} is not a race I know")]
    UnknownRace(String),

    #[error("{0:?} is not a class I know")]
    UnknownClass(String),

    #[error("{0:?} is not a pronoun set I know")]
    UnknownPronouns(String),

    #[error("expected a number, got {0:?}")]
    InvalidFormat(String),
}

/// Configuration for creating a session.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Directory holding the autosave files.
    pub data_dir: PathBuf,

    /// Character autosave file name.
    pub character_file: String,

    /// History autosave file name.
    pub history_file: String,

    /// Speaker name used when echoing player lines.
    pub player_speaker: String,
}

impl SessionConfig {
    /// Create a config with the default file names.
    pub fn new(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            character_file: "user.json".to_string(),
            history_file: "DialogueHistory.json".to_string(),
            player_speaker: "Player".to_string(),
        }
    }

    /// Set the character autosave file name.
    pub fn with_character_file(mut self, name: impl Into<String>) -> Self {
        self.character_file = name.into();
        self
    }

    /// Set the history autosave file name.
    pub fn with_history_file(mut self, name: impl Into<String>) -> Self {
        self.history_file = name.into();
        self
    }

    /// Set the speaker name used for player lines.
    pub fn with_player_speaker(mut self, name: impl Into<String>) -> Self {
        self.player_speaker = name.into();
        self
    }

    /// Full path of the character autosave file.
    pub fn character_path(&self) -> PathBuf {
        self.data_dir.join(&self.character_file)
    }

    /// Full path of the history autosave file.
    pub fn history_path(&self) -> PathBuf {
        self.data_dir.join(&self.history_file)
    }
}

/// Result of submitting one response.
#[derive(Debug, Clone, PartialEq)]
pub enum SubmitOutcome {
    /// The response was accepted; the walk advanced and the new node's
    /// prompt was appended to the history.
    Advanced {
        prompt: HistoryEntry,
        /// A stat recomputation that could not be applied, if any.
        stats_skipped: Option<StatsError>,
    },

    /// The response was accepted and the walk reached a terminal node.
    Finished { stats_skipped: Option<StatsError> },

    /// The response did not match the node's accepted inputs; the
    /// rejection line was redisplayed and nothing changed.
    Rejected { reply: HistoryEntry },

    /// The response was accepted but its trigger could not be applied;
    /// nothing changed.
    TriggerFailed {
        error: TriggerError,
        reply: HistoryEntry,
    },

    /// The submission was empty or whitespace-only.
    EmptyInput { reply: HistoryEntry },
}

impl SubmitOutcome {
    /// Whether the response was accepted and applied.
    pub fn accepted(&self) -> bool {
        matches!(
            self,
            SubmitOutcome::Advanced { .. } | SubmitOutcome::Finished { .. }
        )
    }

    /// Whether this outcome ended the session.
    pub fn is_finished(&self) -> bool {
        matches!(self, SubmitOutcome::Finished { .. })
    }

    /// The line appended for display, if any.
    pub fn line(&self) -> Option<&HistoryEntry> {
        match self {
            SubmitOutcome::Advanced { prompt, .. } => Some(prompt),
            SubmitOutcome::Finished { .. } => None,
            SubmitOutcome::Rejected { reply }
            | SubmitOutcome::TriggerFailed { reply, .. }
            | SubmitOutcome::EmptyInput { reply } => Some(reply),
        }
    }

    /// The reported stat miss, if any.
    pub fn stats_skipped(&self) -> Option<StatsError> {
        match self {
            SubmitOutcome::Advanced { stats_skipped, .. }
            | SubmitOutcome::Finished { stats_skipped } => *stats_skipped,
            _ => None,
        }
    }
}

/// A character creation session.
///
/// Owns the character record and the history log; the dialogue document
/// and the stat table are shared read-only references.
pub struct CreationSession {
    config: SessionConfig,
    document: Arc<DialogueDocument>,
    stats: Arc<StatTable>,
    character: CharacterRecord,
    history: HistoryLog,
    /// Current node id; `None` once a terminal node has been passed.
    current: Option<String>,
}

impl CreationSession {
    /// Start a session: load (or create) the character record, begin a
    /// fresh history log, and display the start prompt.
    pub async fn new(
        config: SessionConfig,
        document: Arc<DialogueDocument>,
        stats: Arc<StatTable>,
    ) -> Result<Self, SessionError> {
        fs::create_dir_all(&config.data_dir)
            .await
            .map_err(PersistError::from)?;

        let character = persist::load_character_or_new(config.character_path()).await;

        let mut session = Self {
            current: Some(document.start_id().to_string()),
            config,
            document,
            stats,
            character,
            history: HistoryLog::new(),
        };

        let start = session.document.start();
        let (speaker, prompt) = (start.speaker.clone(), start.prompt.clone());
        session.append_line(&speaker, &prompt).await?;

        Ok(session)
    }

    /// Submit one player response and run the transition algorithm.
    pub async fn submit(&mut self, input: &str) -> Result<SubmitOutcome, SessionError> {
        let input = input.trim();
        if input.is_empty() {
            let reply = self.append_line(SYSTEM_SPEAKER, EMPTY_INPUT_RESPONSE).await?;
            return Ok(SubmitOutcome::EmptyInput { reply });
        }

        let player = self.config.player_speaker.clone();
        self.append_line(&player, input).await?;

        let Some(current_id) = self.current.clone() else {
            let reply = self
                .append_line(SYSTEM_SPEAKER, ALREADY_FINISHED_RESPONSE)
                .await?;
            return Ok(SubmitOutcome::Rejected { reply });
        };

        let node = self
            .document
            .node(&current_id)
            .ok_or_else(|| SessionError::UnknownNode(current_id.clone()))?
            .clone();

        if !node.accepts(input) {
            let text = node
                .rejected_response
                .clone()
                .unwrap_or_else(|| DEFAULT_REJECTED_RESPONSE.to_string());
            let reply = self.append_line(&node.speaker, &text).await?;
            return Ok(SubmitOutcome::Rejected { reply });
        }

        let mut stats_skipped = None;
        if let Some(raw) = node.trigger.as_deref().filter(|name| !name.is_empty()) {
            let applied = match Trigger::parse(raw) {
                Some(trigger) => self.apply_trigger(trigger, input),
                None => Err(TriggerError::UnknownTrigger(raw.to_string())),
            };

            // Persist after every trigger application, hit or miss.
            persist::save_character(&self.character, self.config.character_path()).await?;

            match applied {
                Ok(skipped) => stats_skipped = skipped,
                Err(error) => {
                    let reply = self.append_line(SYSTEM_SPEAKER, &error.to_string()).await?;
                    return Ok(SubmitOutcome::TriggerFailed { error, reply });
                }
            }
        }

        match node.next_target() {
            None => {
                self.current = None;
                Ok(SubmitOutcome::Finished { stats_skipped })
            }
            Some(next_id) => {
                let next = self
                    .document
                    .node(next_id)
                    .ok_or_else(|| SessionError::UnknownNode(next_id.to_string()))?
                    .clone();
                self.current = Some(next.id.clone());
                let prompt = self.append_line(&next.speaker, &next.prompt).await?;
                Ok(SubmitOutcome::Advanced {
                    prompt,
                    stats_skipped,
                })
            }
        }
    }

    /// Apply one trigger to the record. Returns the stat miss to report,
    /// if the trigger succeeded but recomputation could not run.
    fn apply_trigger(
        &mut self,
        trigger: Trigger,
        input: &str,
    ) -> Result<Option<StatsError>, TriggerError> {
        match trigger {
            Trigger::SetName => {
                self.character.name = input.to_string();
                Ok(None)
            }
            Trigger::SetRace => {
                let race = Race::parse(input)
                    .ok_or_else(|| TriggerError::UnknownRace(input.to_string()))?;
                self.character.race = Some(race);
                Ok(self.character.update_stats(&self.stats).err())
            }
            Trigger::SetClass => {
                let class = CharacterClass::parse(input)
                    .ok_or_else(|| TriggerError::UnknownClass(input.to_string()))?;
                self.character.class = Some(class);
                Ok(self.character.update_stats(&self.stats).err())
            }
            Trigger::SetPronouns => {
                let pronouns = Pronouns::parse(input)
                    .ok_or_else(|| TriggerError::UnknownPronouns(input.to_string()))?;
                self.character.pronouns = Some(pronouns);
                Ok(None)
            }
            Trigger::SetAttractiveness => {
                let score = input
                    .parse::<i32>()
                    .map_err(|_| TriggerError::InvalidFormat(input.to_string()))?;
                self.character.attractiveness = score;
                Ok(None)
            }
        }
    }

    /// Append a line to the history and rewrite the history file.
    async fn append_line(
        &mut self,
        speaker: &str,
        text: &str,
    ) -> Result<HistoryEntry, SessionError> {
        let entry = self.history.append(speaker, text).clone();
        persist::save_history(&self.history, self.config.history_path()).await?;
        Ok(entry)
    }

    /// The character record as accumulated so far.
    pub fn character(&self) -> &CharacterRecord {
        &self.character
    }

    /// The full display history.
    pub fn history(&self) -> &HistoryLog {
        &self.history
    }

    /// The current node id, or `None` once finished.
    pub fn current_node_id(&self) -> Option<&str> {
        self.current.as_deref()
    }

    /// The current node, or `None` once finished.
    pub fn current_node(&self) -> Option<&crate::dialogue::DialogueNode> {
        self.current.as_deref().and_then(|id| self.document.node(id))
    }

    /// Whether a terminal node has been passed.
    pub fn is_finished(&self) -> bool {
        self.current.is_none()
    }

    /// The dialogue document driving this session.
    pub fn document(&self) -> &DialogueDocument {
        &self.document
    }

    /// The stat table consulted for derived attributes.
    pub fn stat_table(&self) -> &StatTable {
        &self.stats
    }

    /// The session configuration.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::dialogue::{sample_document, DialogueNode};
    use tempfile::TempDir;

    async fn sample_session(temp_dir: &TempDir) -> CreationSession {
        CreationSession::new(
            SessionConfig::new(temp_dir.path()),
            Arc::new(sample_document()),
            Arc::new(StatTable::builtin().clone()),
        )
        .await
        .expect("session should start")
    }

    #[test]
    fn test_session_config_builder() {
        let config = SessionConfig::new("/tmp/data")
            .with_character_file("hero.json")
            .with_history_file("log.json")
            .with_player_speaker("You");

        assert_eq!(config.character_path(), PathBuf::from("/tmp/data/hero.json"));
        assert_eq!(config.history_path(), PathBuf::from("/tmp/data/log.json"));
        assert_eq!(config.player_speaker, "You");
    }

    #[tokio::test]
    async fn test_start_prompt_is_displayed_and_persisted() {
        let temp_dir = TempDir::new().unwrap();
        let session = sample_session(&temp_dir).await;

        assert_eq!(session.current_node_id(), Some("charCreate002"));
        assert_eq!(session.history().len(), 1);
        let first = &session.history().entries[0];
        assert_eq!(first.speaker, "Narrator");
        assert!(first.text.contains("What is your name?"));
        assert!(session.config().history_path().exists());
    }

    #[tokio::test]
    async fn test_empty_input_changes_nothing() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = sample_session(&temp_dir).await;
        let before = session.character().clone();

        let outcome = session.submit("   ").await.unwrap();
        match &outcome {
            SubmitOutcome::EmptyInput { reply } => {
                assert_eq!(reply.speaker, SYSTEM_SPEAKER);
                assert_eq!(reply.text, EMPTY_INPUT_RESPONSE);
            }
            other => panic!("expected EmptyInput, got {other:?}"),
        }
        assert_eq!(session.current_node_id(), Some("charCreate002"));
        assert_eq!(session.character(), &before);
    }

    #[tokio::test]
    async fn test_free_text_name_node_accepts_anything() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = sample_session(&temp_dir).await;

        let outcome = session.submit("Xanthe Q. Riddle").await.unwrap();
        assert!(outcome.accepted());
        assert_eq!(session.character().name, "Xanthe Q. Riddle");
        assert_eq!(session.current_node_id(), Some("charCreate003"));
    }

    #[tokio::test]
    async fn test_rejected_input_fires_no_trigger() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = sample_session(&temp_dir).await;
        session.submit("Kara").await.unwrap();

        let outcome = session.submit("Robot").await.unwrap();
        match &outcome {
            SubmitOutcome::Rejected { reply } => {
                assert_eq!(reply.speaker, "Narrator");
                assert!(reply.text.contains("don't recognize that race"));
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
        assert!(session.character().race.is_none());
        assert_eq!(session.current_node_id(), Some("charCreate003"));
    }

    #[tokio::test]
    async fn test_case_insensitive_acceptance() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = sample_session(&temp_dir).await;
        session.submit("Kara").await.unwrap();

        let outcome = session.submit("ELF").await.unwrap();
        assert!(outcome.accepted());
        assert_eq!(session.character().race, Some(Race::Elf));
    }

    #[tokio::test]
    async fn test_race_before_class_reports_skipped_stats() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = sample_session(&temp_dir).await;
        session.submit("Kara").await.unwrap();

        let outcome = session.submit("Elf").await.unwrap();
        assert_eq!(outcome.stats_skipped(), Some(StatsError::ClassNotChosen));
        assert_eq!(
            session.character().attributes,
            crate::character::Attributes::default()
        );

        let outcome = session.submit("Mage").await.unwrap();
        assert_eq!(outcome.stats_skipped(), None);
        let expected = StatTable::builtin()
            .race_stats(Race::Elf)
            .unwrap()
            .sum(&StatTable::builtin().class_stats(CharacterClass::Mage).unwrap());
        assert_eq!(session.character().attributes, expected);
    }

    #[tokio::test]
    async fn test_invalid_attractiveness_is_reported_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = sample_session(&temp_dir).await;
        for input in ["Kara", "Elf", "Mage", "she/her"] {
            assert!(session.submit(input).await.unwrap().accepted());
        }

        let outcome = session.submit("very").await.unwrap();
        match &outcome {
            SubmitOutcome::TriggerFailed { error, reply } => {
                assert_eq!(error, &TriggerError::InvalidFormat("very".to_string()));
                assert_eq!(reply.speaker, SYSTEM_SPEAKER);
            }
            other => panic!("expected TriggerFailed, got {other:?}"),
        }
        assert_eq!(session.character().attractiveness, 0);
        assert_eq!(session.current_node_id(), Some("charCreate006"));

        // A numeric answer still works afterwards.
        let outcome = session.submit("7").await.unwrap();
        assert!(outcome.accepted());
        assert_eq!(session.character().attractiveness, 7);
    }

    #[tokio::test]
    async fn test_unknown_trigger_is_reported_not_fatal() {
        let temp_dir = TempDir::new().unwrap();
        let document = DialogueDocument::new(
            "n1",
            vec![
                DialogueNode::new("n1", "Narrator", "Choose your destiny.")
                    .with_trigger("SetDestiny")
                    .with_next("n2"),
                DialogueNode::new("n2", "Narrator", "Done."),
            ],
        )
        .unwrap();

        let mut session = CreationSession::new(
            SessionConfig::new(temp_dir.path()),
            Arc::new(document),
            Arc::new(StatTable::builtin().clone()),
        )
        .await
        .unwrap();

        let before = session.character().clone();
        let outcome = session.submit("glory").await.unwrap();
        match &outcome {
            SubmitOutcome::TriggerFailed { error, .. } => {
                assert_eq!(error, &TriggerError::UnknownTrigger("SetDestiny".to_string()));
            }
            other => panic!("expected TriggerFailed, got {other:?}"),
        }
        assert_eq!(session.character(), &before);
        assert_eq!(session.current_node_id(), Some("n1"));
    }

    #[tokio::test]
    async fn test_terminal_node_finishes_session() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = sample_session(&temp_dir).await;
        for input in ["Kara", "Elf", "Mage", "she/her", "7"] {
            assert!(session.submit(input).await.unwrap().accepted());
        }

        let outcome = session.submit("onward").await.unwrap();
        assert!(outcome.is_finished());
        assert!(session.is_finished());
        assert!(session.current_node().is_none());

        // Further submissions are turned away.
        let outcome = session.submit("hello?").await.unwrap();
        match outcome {
            SubmitOutcome::Rejected { reply } => {
                assert_eq!(reply.speaker, SYSTEM_SPEAKER);
            }
            other => panic!("expected Rejected, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_player_lines_are_echoed_to_history() {
        let temp_dir = TempDir::new().unwrap();
        let mut session = sample_session(&temp_dir).await;
        session.submit("Kara").await.unwrap();

        let speakers: Vec<_> = session
            .history()
            .iter()
            .map(|e| e.speaker.as_str())
            .collect();
        assert_eq!(speakers, vec!["Narrator", "Player", "Narrator"]);
    }

    #[tokio::test]
    async fn test_character_reloaded_from_autosave() {
        let temp_dir = TempDir::new().unwrap();
        {
            let mut session = sample_session(&temp_dir).await;
            session.submit("Kara").await.unwrap();
            session.submit("Elf").await.unwrap();
        }

        // A new session over the same data dir picks the record back up.
        let session = sample_session(&temp_dir).await;
        assert_eq!(session.character().name, "Kara");
        assert_eq!(session.character().race, Some(Race::Elf));
    }
}
