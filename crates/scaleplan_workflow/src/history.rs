//! Conversation history replayed to the model, and the user-facing transcript.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Who produced a conversation turn.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum Speaker {
    /// The person reviewing the plan
    #[display("user")]
    User,
    /// The model
    #[display("assistant")]
    Assistant,
}

/// One replayed turn.
///
/// Serializes as `{"role": ..., "content": ...}`, the shape clients send.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Turn {
    /// Who spoke
    #[serde(rename = "role")]
    pub speaker: Speaker,
    /// What was said
    #[serde(rename = "content")]
    pub text: String,
}

impl Turn {
    /// A user turn.
    pub fn user(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::User,
            text: text.into(),
        }
    }

    /// An assistant turn.
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            speaker: Speaker::Assistant,
            text: text.into(),
        }
    }
}

/// Ordered dialogue turns. Only grows until the workflow is reset.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConversationHistory(Vec<Turn>);

impl ConversationHistory {
    /// Empty history.
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends a turn.
    pub fn push(&mut self, turn: Turn) {
        self.0.push(turn);
    }

    /// Turns in insertion order.
    pub fn turns(&self) -> &[Turn] {
        &self.0
    }

    /// Number of turns.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no turn has been recorded.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// The most recent turn.
    pub fn last(&self) -> Option<&Turn> {
        self.0.last()
    }
}

impl FromIterator<Turn> for ConversationHistory {
    fn from_iter<I: IntoIterator<Item = Turn>>(iter: I) -> Self {
        Self(iter.into_iter().collect())
    }
}

/// Kind of transcript entry.
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, derive_more::Display,
)]
#[serde(rename_all = "lowercase")]
pub enum EntryKind {
    /// Progress and error lines
    #[display("system")]
    System,
    /// Actions taken by the user
    #[display("user")]
    User,
    /// Model output
    #[display("assistant")]
    Assistant,
}

/// One UI-facing log line.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranscriptEntry {
    /// Entry kind
    pub kind: EntryKind,
    /// Display text
    pub text: String,
    /// When the entry was recorded
    pub created_at: DateTime<Utc>,
}

/// Presentation log. Never sent to the model.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Transcript(Vec<TranscriptEntry>);

impl Transcript {
    /// Entries in insertion order.
    pub fn entries(&self) -> &[TranscriptEntry] {
        &self.0
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the transcript is empty.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub(crate) fn push(&mut self, kind: EntryKind, text: impl Into<String>) {
        self.0.push(TranscriptEntry {
            kind,
            text: text.into(),
            created_at: Utc::now(),
        });
    }

    pub(crate) fn system(&mut self, text: impl Into<String>) {
        self.push(EntryKind::System, text);
    }

    pub(crate) fn user(&mut self, text: impl Into<String>) {
        self.push(EntryKind::User, text);
    }

    pub(crate) fn assistant(&mut self, text: impl Into<String>) {
        self.push(EntryKind::Assistant, text);
    }
}
