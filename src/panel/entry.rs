//! Transcript entries and their identifiers.

use std::fmt;
use std::sync::atomic::{AtomicU64, Ordering};

use serde::{Deserialize, Serialize};

use crate::llm::Message;

/// Identifier of a transcript entry, unique within one panel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct EntryId(u64);

impl fmt::Display for EntryId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Strictly monotonic id source.
///
/// Never rewinds, so ids stay unique across `clear`.
#[derive(Debug)]
pub struct EntryIdGenerator {
    next: AtomicU64,
}

impl Default for EntryIdGenerator {
    fn default() -> Self {
        Self::new()
    }
}

impl EntryIdGenerator {
    /// Create a generator starting at 1.
    #[must_use]
    pub fn new() -> Self {
        Self {
            next: AtomicU64::new(1),
        }
    }

    /// Hand out the next id.
    pub fn next_id(&self) -> EntryId {
        EntryId(self.next.fetch_add(1, Ordering::Relaxed))
    }
}

/// Content rendered for an entry.
///
/// The controller never looks inside; only the `ui` module does.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Renderable {
    /// Text the user submitted.
    User {
        /// Submitted text.
        text: String,
    },
    /// Reply produced by the assistant.
    Assistant {
        /// Reply text.
        text: String,
    },
    /// Informational line from an external pipeline.
    Notice {
        /// Notice text.
        text: String,
    },
    /// Visible failure of a submission.
    Error {
        /// Human-readable failure.
        message: String,
    },
}

impl Renderable {
    /// Build a user component.
    #[must_use]
    pub fn user(text: impl Into<String>) -> Self {
        Self::User { text: text.into() }
    }

    /// Build an assistant component.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self::Assistant { text: text.into() }
    }

    /// Build an error component.
    #[must_use]
    pub fn error(message: impl Into<String>) -> Self {
        Self::Error {
            message: message.into(),
        }
    }

    /// True when the component carries no visible text.
    #[must_use]
    pub fn is_blank(&self) -> bool {
        match self {
            Self::User { text } | Self::Assistant { text } | Self::Notice { text } => {
                text.trim().is_empty()
            }
            Self::Error { message } => message.trim().is_empty(),
        }
    }
}

/// One displayed conversation turn. Immutable once appended.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TranscriptEntry {
    /// Creation-order identifier.
    pub id: EntryId,
    /// Rendered content.
    pub component: Renderable,
    /// Whether the producer is still generating this entry.
    #[serde(default)]
    pub is_generating: bool,
    /// User entry this one answers, when it is a submission reply.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub reply_to: Option<EntryId>,
}

impl TranscriptEntry {
    /// Entry for text the user submitted.
    #[must_use]
    pub fn user(id: EntryId, text: impl Into<String>) -> Self {
        Self {
            id,
            component: Renderable::user(text),
            is_generating: false,
            reply_to: None,
        }
    }
}

/// What the AI action resolves to. Ids are assigned by the panel.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ActionReply {
    /// Renderable content; `None` marks a malformed reply.
    #[serde(default)]
    pub component: Option<Renderable>,
    /// Whether the reply is still being generated.
    #[serde(default)]
    pub is_generating: bool,
    /// Turns to record in the conversation mirror. The panel appends them
    /// only if the conversation was not cleared while the action ran.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub turns: Vec<Message>,
}

impl ActionReply {
    /// Completed assistant reply.
    #[must_use]
    pub fn assistant(text: impl Into<String>) -> Self {
        Self {
            component: Some(Renderable::assistant(text)),
            is_generating: false,
            turns: Vec::new(),
        }
    }

    /// Attach the turns this exchange adds to the model context.
    #[must_use]
    pub fn with_turns(mut self, turns: impl IntoIterator<Item = Message>) -> Self {
        self.turns.extend(turns);
        self
    }
}

/// Entry payload pushed through the inbound channel, before an id is stamped.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct InboundEntry {
    /// Rendered content.
    pub component: Renderable,
    /// Whether the producer is still generating this entry.
    #[serde(default)]
    pub is_generating: bool,
}
