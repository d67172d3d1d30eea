//! Dialogue document types and load-time validation.
//!
//! A dialogue document is a keyed set of nodes plus a start id, parsed
//! once from JSON and immutable afterwards. Every node reference in the
//! document (next, negative, alternative) is checked at load time so the
//! engine can never walk off the graph mid-session.
//!
//! Negative/alternative input lists and their target ids are carried and
//! validated but not consulted by the transition algorithm; they are an
//! extension point without a defined branching contract.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::Path;
use thiserror::Error;
use tokio::fs;

/// Errors from dialogue document loading and validation.
#[derive(Debug, Error)]
pub enum DocumentError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("dialogue document has no nodes")]
    Empty,

    #[error("duplicate dialogue id {0:?}")]
    DuplicateId(String),

    #[error("start id {0:?} does not match any node")]
    UnknownStart(String),

    #[error("node {from:?} references missing node {to:?}")]
    DanglingEdge { from: String, to: String },
}

// ============================================================================
// Triggers
// ============================================================================

/// Side effects a node can attach to an accepted response.
///
/// Documents carry trigger names as plain strings so new triggers can be
/// authored before the engine knows them; parsing happens at dispatch
/// time and an unknown name is reported, never fatal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    SetName,
    SetRace,
    SetClass,
    SetPronouns,
    SetAttractiveness,
}

impl Trigger {
    pub fn name(&self) -> &'static str {
        match self {
            Trigger::SetName => "SetName",
            Trigger::SetRace => "SetRace",
            Trigger::SetClass => "SetClass",
            Trigger::SetPronouns => "SetPronouns",
            Trigger::SetAttractiveness => "SetAttractiveness",
        }
    }

    /// Parse a trigger name as authored in a document.
    pub fn parse(name: &str) -> Option<Trigger> {
        match name {
            "SetName" => Some(Trigger::SetName),
            "SetRace" => Some(Trigger::SetRace),
            "SetClass" => Some(Trigger::SetClass),
            "SetPronouns" => Some(Trigger::SetPronouns),
            "SetAttractiveness" => Some(Trigger::SetAttractiveness),
            _ => None,
        }
    }
}

// ============================================================================
// Nodes
// ============================================================================

/// One step of the scripted conversation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DialogueNode {
    #[serde(rename = "ID")]
    pub id: String,

    #[serde(rename = "Speaker")]
    pub speaker: String,

    #[serde(rename = "Prompt")]
    pub prompt: String,

    /// Responses this node accepts, matched case-insensitively. An empty
    /// list accepts anything.
    #[serde(rename = "AcceptedInput", default)]
    pub accepted_inputs: Vec<String>,

    /// Declared but unused by transitions; see module docs.
    #[serde(rename = "NegativeInput", default)]
    pub negative_inputs: Vec<String>,

    /// Declared but unused by transitions; see module docs.
    #[serde(rename = "AlternativeInputs", default)]
    pub alternative_inputs: Vec<String>,

    /// Next node after an accepted response. Empty/unset means this node
    /// is terminal.
    #[serde(rename = "NextPromptID", default)]
    pub next_id: Option<String>,

    #[serde(rename = "NegativePrompt", default)]
    pub negative_id: Option<String>,

    #[serde(rename = "AlternativePrompt", default)]
    pub alternative_id: Option<String>,

    /// Text redisplayed when a response is rejected.
    #[serde(rename = "UnacceptedInputResponse", default)]
    pub rejected_response: Option<String>,

    #[serde(rename = "Tags", default)]
    pub tags: Vec<String>,

    #[serde(rename = "Conditions", default)]
    pub conditions: Vec<String>,

    /// Trigger name dispatched on an accepted response.
    #[serde(rename = "Trigger", default)]
    pub trigger: Option<String>,

    /// Accept any non-empty response regardless of the accepted list.
    #[serde(rename = "FreeText", default)]
    pub free_text: bool,
}

impl DialogueNode {
    pub fn new(id: impl Into<String>, speaker: impl Into<String>, prompt: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            speaker: speaker.into(),
            prompt: prompt.into(),
            ..Self::default()
        }
    }

    pub fn with_next(mut self, id: impl Into<String>) -> Self {
        self.next_id = Some(id.into());
        self
    }

    pub fn with_trigger(mut self, name: impl Into<String>) -> Self {
        self.trigger = Some(name.into());
        self
    }

    pub fn with_accepted(mut self, inputs: &[&str]) -> Self {
        self.accepted_inputs = inputs.iter().map(|s| s.to_string()).collect();
        self
    }

    pub fn with_rejected_response(mut self, text: impl Into<String>) -> Self {
        self.rejected_response = Some(text.into());
        self
    }

    pub fn free_text(mut self) -> Self {
        self.free_text = true;
        self
    }

    /// Whether this node accepts the given (already trimmed, non-empty)
    /// response.
    pub fn accepts(&self, input: &str) -> bool {
        if self.free_text || self.accepted_inputs.is_empty() {
            return true;
        }
        let lowered = input.to_lowercase();
        self.accepted_inputs
            .iter()
            .any(|accepted| accepted.to_lowercase() == lowered)
    }

    /// The next node id, treating an empty string like an unset field.
    pub fn next_target(&self) -> Option<&str> {
        self.next_id.as_deref().filter(|id| !id.is_empty())
    }

    /// Every node id this node references.
    pub(crate) fn edge_targets(&self) -> impl Iterator<Item = &str> {
        [
            self.next_id.as_deref(),
            self.negative_id.as_deref(),
            self.alternative_id.as_deref(),
        ]
        .into_iter()
        .flatten()
        .filter(|id| !id.is_empty())
    }
}

// ============================================================================
// Documents
// ============================================================================

/// Wire form of a dialogue document.
#[derive(Debug, Deserialize)]
struct RawDocument {
    #[serde(rename = "StartDialogueID")]
    start_id: String,

    #[serde(rename = "dialogues")]
    nodes: Vec<DialogueNode>,
}

/// A validated, immutable dialogue document.
///
/// Construction fails fast on duplicate ids, an unknown start id, or any
/// dangling node reference, so lookups during playback cannot miss.
#[derive(Debug, Clone)]
pub struct DialogueDocument {
    start_id: String,
    nodes: Vec<DialogueNode>,
    index: HashMap<String, usize>,
}

impl DialogueDocument {
    /// Build and validate a document from its parts.
    pub fn new(
        start_id: impl Into<String>,
        nodes: Vec<DialogueNode>,
    ) -> Result<Self, DocumentError> {
        let start_id = start_id.into();

        if nodes.is_empty() {
            return Err(DocumentError::Empty);
        }

        let mut index = HashMap::with_capacity(nodes.len());
        for (position, node) in nodes.iter().enumerate() {
            if index.insert(node.id.clone(), position).is_some() {
                return Err(DocumentError::DuplicateId(node.id.clone()));
            }
        }

        if !index.contains_key(&start_id) {
            return Err(DocumentError::UnknownStart(start_id));
        }

        for node in &nodes {
            for target in node.edge_targets() {
                if !index.contains_key(target) {
                    return Err(DocumentError::DanglingEdge {
                        from: node.id.clone(),
                        to: target.to_string(),
                    });
                }
            }
        }

        Ok(Self {
            start_id,
            nodes,
            index,
        })
    }

    /// Parse and validate a document from JSON text.
    pub fn from_json(text: &str) -> Result<Self, DocumentError> {
        let raw: RawDocument = serde_json::from_str(text)?;
        Self::new(raw.start_id, raw.nodes)
    }

    /// Load and validate a document from a JSON file.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self, DocumentError> {
        let content = fs::read_to_string(path).await?;
        Self::from_json(&content)
    }

    pub fn start_id(&self) -> &str {
        &self.start_id
    }

    /// The start node. Guaranteed by validation.
    pub fn start(&self) -> &DialogueNode {
        &self.nodes[self.index[&self.start_id]]
    }

    /// Look up a node by id.
    pub fn node(&self, id: &str) -> Option<&DialogueNode> {
        self.index.get(id).map(|&position| &self.nodes[position])
    }

    pub fn nodes(&self) -> &[DialogueNode] {
        &self.nodes
    }

    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }
}

/// Built-in character creation script.
///
/// The name prompt is free text; every later prompt names its accepted
/// answers and redisplays a rejection line otherwise.
pub fn sample_document() -> DialogueDocument {
    let nodes = vec![
        DialogueNode::new(
            "charCreate002",
            "Narrator",
            "Welcome, traveler. What is your name?",
        )
        .free_text()
        .with_trigger("SetName")
        .with_next("charCreate003"),
        DialogueNode::new(
            "charCreate003",
            "Narrator",
            "What race do you hail from? (Human, Elf, Dwarf, Orc, Gnome, Tiefling)",
        )
        .with_accepted(&["Human", "Elf", "Dwarf", "Orc", "Gnome", "Tiefling"])
        .with_rejected_response(
            "I don't recognize that race. Try Human, Elf, Dwarf, Orc, Gnome, or Tiefling.",
        )
        .with_trigger("SetRace")
        .with_next("charCreate004"),
        DialogueNode::new(
            "charCreate004",
            "Narrator",
            "And your calling? (Warrior, Mage, Rogue, Bard, Cleric, Ranger)",
        )
        .with_accepted(&["Warrior", "Mage", "Rogue", "Bard", "Cleric", "Ranger"])
        .with_rejected_response(
            "That calling is unknown here. Try Warrior, Mage, Rogue, Bard, Cleric, or Ranger.",
        )
        .with_trigger("SetClass")
        .with_next("charCreate005"),
        DialogueNode::new(
            "charCreate005",
            "Narrator",
            "How shall the chronicles refer to you? (she/her, he/him, they/them, ze/zir)",
        )
        .with_accepted(&["she/her", "he/him", "they/them", "ze/zir"])
        .with_rejected_response(
            "I didn't catch that. Choose she/her, he/him, they/them, or ze/zir.",
        )
        .with_trigger("SetPronouns")
        .with_next("charCreate006"),
        DialogueNode::new(
            "charCreate006",
            "Narrator",
            "Be honest now: on a scale of 1 to 10, how attractive are you?",
        )
        .with_trigger("SetAttractiveness")
        .with_next("charCreate007"),
        DialogueNode::new(
            "charCreate007",
            "Narrator",
            "Then it is written. Your tale begins. Say anything to set forth.",
        ),
    ];

    DialogueDocument::new("charCreate002", nodes)
        .expect("built-in creation script is well-formed")
}
