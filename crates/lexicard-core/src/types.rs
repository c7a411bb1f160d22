// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Common types shared by the generator, the stores, the coordinator and the
//! channel adapters.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use strum::{Display, EnumIter, EnumString};

/// One of the two supported target languages.
#[derive(
    Debug,
    Clone,
    Copy,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Display,
    EnumString,
    EnumIter,
    Serialize,
    Deserialize,
)]
#[strum(serialize_all = "lowercase")]
#[serde(rename_all = "lowercase")]
pub enum Language {
    English,
    German,
}

impl Language {
    /// Both languages, in display order.
    pub const ALL: [Language; 2] = [Language::English, Language::German];

    /// Capitalized name for user-facing text.
    pub fn display_name(self) -> &'static str {
        match self {
            Language::English => "English",
            Language::German => "German",
        }
    }

    pub fn flag(self) -> &'static str {
        match self {
            Language::English => "🇬🇧",
            Language::German => "🇩🇪",
        }
    }

    /// Command used to submit a word in this language (without the slash).
    pub fn submit_command(self) -> &'static str {
        match self {
            Language::English => "en",
            Language::German => "de",
        }
    }

    /// Command used to dump this language's buffer (without the slash).
    pub fn dump_command(self) -> &'static str {
        match self {
            Language::English => "dump_english",
            Language::German => "dump_german",
        }
    }

    /// Word used in usage hints.
    pub fn example_word(self) -> &'static str {
        match self {
            Language::English => "useful",
            Language::German => "aufgeben",
        }
    }
}

/// Opaque identifier correlating a displayed candidate with its pending state.
///
/// Allocated from a monotonically increasing counter; never reused within a
/// process lifetime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Handle(pub u64);

impl std::fmt::Display for Handle {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl std::str::FromStr for Handle {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim().parse().map(Handle)
    }
}

/// The content of a card for a word that exists.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CardBody {
    /// Canonical lemma form, used as the front side.
    pub normalized_term: String,
    pub definition: String,
    /// Two or three collocations.
    pub collocations: Vec<String>,
    /// Two or three gap-fill sentences, each with exactly one gap marker.
    pub examples: Vec<String>,
}

/// A validated generation result.
///
/// The dependent fields exist only in the `Found` variant, so a
/// half-populated card cannot be represented.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Card {
    /// The service stated that the term does not exist.
    Missing,
    Found(CardBody),
}

impl Card {
    pub fn exists(&self) -> bool {
        matches!(self, Card::Found(_))
    }
}

/// Last-seen metadata for a term that was accepted at some point.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryEntry {
    /// The term exactly as submitted.
    #[serde(alias = "word")]
    pub term: String,
    /// ISO-8601 timestamp of the most recent accept.
    #[serde(rename = "addedAt", alias = "added_at")]
    pub added_at: String,
    /// Short definition text for duplicate warnings.
    pub definition: String,
}

impl HistoryEntry {
    /// Date part (`YYYY-MM-DD`) of the timestamp for display.
    pub fn added_on(&self) -> &str {
        self.added_at.get(..10).unwrap_or(&self.added_at)
    }
}

/// A formatted card sitting in a language buffer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BufferEntry {
    pub term: String,
    pub body: String,
}

/// Snapshot of a language buffer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct BufferStats {
    pub cards_in_buffer: usize,
    pub unique_words_this_session: usize,
}

/// A generated card awaiting an accept/decline/regenerate decision.
#[derive(Debug, Clone)]
pub struct PendingCard {
    pub handle: Handle,
    /// Raw user input, preserving disambiguating context such as "bank (river)".
    pub term_identifier: String,
    pub card: CardBody,
    pub language: Language,
    pub created_at: DateTime<Utc>,
    pub is_duplicate: bool,
    pub duplicate_info: Option<HistoryEntry>,
}

/// Health status reported by adapter health checks.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HealthStatus {
    Healthy,
    Degraded(String),
    Unhealthy(String),
}

/// Identifies the type of an adapter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, Serialize, Deserialize)]
pub enum AdapterType {
    Channel,
    Provider,
}

// --- Provider types ---

/// A structured-output request to the generation service.
#[derive(Debug, Clone)]
pub struct ProviderRequest {
    /// Language-specific system instruction.
    pub system_prompt: String,
    /// The raw word as the user turn.
    pub user_input: String,
    /// Name of the response schema.
    pub schema_name: String,
    /// JSON schema the response must conform to.
    pub schema: serde_json::Value,
}

/// Raw response from the generation service.
#[derive(Debug, Clone)]
pub struct ProviderResponse {
    pub id: String,
    /// The structured payload as returned (JSON text).
    pub content: String,
    pub model: String,
}

// --- Channel types ---

/// Unique identifier for a transport message.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(pub String);

/// Decision actions available on a displayed pending card.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase")]
pub enum Decision {
    Accept,
    Decline,
    Regenerate,
}

/// What the user sent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InboundKind {
    /// A text message, with or without a leading command.
    Text(String),
    /// A button press on a displayed card.
    Decision { action: Decision, handle: Handle },
}

/// An event received from a channel adapter.
#[derive(Debug, Clone)]
pub struct InboundMessage {
    /// Transport id of the message that carried the event. For decisions,
    /// the id of the message displaying the card.
    pub id: MessageId,
    pub sender_id: String,
    pub chat_id: String,
    pub kind: InboundKind,
    pub timestamp: DateTime<Utc>,
}

/// Payload of an outbound message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum OutboundContent {
    /// Plain text, optionally with decision buttons bound to a pending handle.
    Text {
        text: String,
        decisions: Option<Handle>,
    },
    /// A file delivered as a document.
    Document {
        path: PathBuf,
        file_name: String,
        caption: String,
    },
}

/// A message to deliver via a channel adapter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutboundMessage {
    pub chat_id: String,
    pub content: OutboundContent,
    /// When set, replace the text of this earlier message instead of sending a new one.
    pub edit: Option<MessageId>,
}

impl OutboundMessage {
    pub fn text(chat_id: impl Into<String>, text: impl Into<String>) -> Self {
        Self {
            chat_id: chat_id.into(),
            content: OutboundContent::Text {
                text: text.into(),
                decisions: None,
            },
            edit: None,
        }
    }

    /// Returns the text payload, if any.
    pub fn as_text(&self) -> Option<&str> {
        match &self.content {
            OutboundContent::Text { text, .. } => Some(text),
            OutboundContent::Document { .. } => None,
        }
    }
}
