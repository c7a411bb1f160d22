// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Error types for lexicard.
//!
//! Two layers exist. [`ServiceError`] describes one failed attempt against the
//! generation service and carries an [`ErrorKind`] that decides whether the
//! generator retries. [`LexicardError`] is what crosses crate boundaries.

use thiserror::Error;

use crate::types::Handle;

/// Maximum number of characters kept from an error message shown to the user.
pub const MAX_ERROR_MESSAGE_CHARS: usize = 300;

/// Classification of a single failed generation attempt.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    /// The service answered, but the payload did not satisfy the card schema.
    SchemaViolation,
    /// The request did not complete within the per-attempt timeout.
    TransportTimeout,
    /// The connection could not be established or was dropped.
    TransportConnection,
    /// The service answered with a non-success HTTP status.
    ServiceStatus { code: u16 },
    /// Anything else.
    Unexpected,
}

impl ErrorKind {
    /// Whether another attempt may succeed after this failure.
    ///
    /// Client errors (4xx other than 429) are permanent; everything else,
    /// including unclassified failures, is worth another attempt.
    pub fn is_retryable(self) -> bool {
        match self {
            ErrorKind::ServiceStatus { code } => !((400..500).contains(&code) && code != 429),
            ErrorKind::SchemaViolation
            | ErrorKind::TransportTimeout
            | ErrorKind::TransportConnection
            | ErrorKind::Unexpected => true,
        }
    }
}

impl std::fmt::Display for ErrorKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ErrorKind::SchemaViolation => write!(f, "SchemaViolation"),
            ErrorKind::TransportTimeout => write!(f, "TransportTimeout"),
            ErrorKind::TransportConnection => write!(f, "TransportConnection"),
            ErrorKind::ServiceStatus { code } => write!(f, "ServiceStatusError({code})"),
            ErrorKind::Unexpected => write!(f, "Unexpected"),
        }
    }
}

/// One failed call to the generation service, already classified.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ServiceError {
    pub kind: ErrorKind,
    pub message: String,
}

impl ServiceError {
    pub fn new(kind: ErrorKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }

    pub fn schema(message: impl Into<String>) -> Self {
        Self::new(ErrorKind::SchemaViolation, message)
    }
}

/// Raised when the generator gives up on a word.
///
/// Carries the classification of the last failure and the number of attempts
/// actually made (1 when the first failure was not retryable).
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("generation failed after {attempts} attempt(s), last error ({last_error_kind}): {message}")]
pub struct GenerationError {
    pub last_error_kind: ErrorKind,
    pub attempts: u32,
    pub message: String,
}

impl GenerationError {
    /// Builds the error from the last attempt's failure, truncating its message.
    pub fn exhausted(last: &ServiceError, attempts: u32) -> Self {
        Self {
            last_error_kind: last.kind,
            attempts,
            message: truncate_chars(&last.message, MAX_ERROR_MESSAGE_CHARS),
        }
    }
}

/// The primary error type used across lexicard crates.
#[derive(Debug, Error)]
pub enum LexicardError {
    /// Configuration errors (invalid TOML, missing required fields, unreadable prompt files).
    #[error("configuration error: {0}")]
    Config(String),

    /// Durable storage errors (history persistence, export file writes).
    #[error("storage error: {source}")]
    Storage {
        source: Box<dyn std::error::Error + Send + Sync>,
    },

    /// Channel adapter errors (connection failure, message delivery).
    #[error("channel error: {message}")]
    Channel {
        message: String,
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// A single classified provider failure.
    #[error("provider error: {0}")]
    Provider(#[from] ServiceError),

    /// The generator exhausted its attempts or hit a permanent error.
    #[error(transparent)]
    Generation(#[from] GenerationError),

    /// The handle does not refer to a pending card (unknown or already resolved).
    #[error("no pending card for handle {handle}")]
    PendingNotFound { handle: Handle },

    /// Too many cards are awaiting a decision.
    #[error("too many pending cards (limit {limit})")]
    PendingLimit { limit: usize },

    /// The caller is not the configured principal.
    #[error("not authorized")]
    NotAuthorized,

    /// Internal or unexpected errors.
    #[error("internal error: {0}")]
    Internal(String),
}

impl LexicardError {
    /// Wraps an I/O or serialization failure as a storage error.
    pub fn storage(source: impl std::error::Error + Send + Sync + 'static) -> Self {
        LexicardError::Storage {
            source: Box::new(source),
        }
    }
}

/// Truncates `text` to at most `max_chars` characters, respecting char boundaries.
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    match text.char_indices().nth(max_chars) {
        Some((idx, _)) => text[..idx].to_string(),
        None => text.to_string(),
    }
}
