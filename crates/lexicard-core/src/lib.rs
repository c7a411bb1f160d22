// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Core library for lexicard.
//!
//! This crate provides the shared types, the card schema validator, the error
//! taxonomy and the adapter traits used throughout the workspace. Channel and
//! provider adapters implement traits defined here.

pub mod error;
pub mod schema;
pub mod traits;
pub mod types;

pub use error::{ErrorKind, GenerationError, LexicardError, ServiceError};
pub use types::{
    AdapterType, BufferEntry, BufferStats, Card, CardBody, Decision, Handle, HealthStatus,
    HistoryEntry, Language, MessageId, PendingCard,
};

pub use traits::{ChannelAdapter, PluginAdapter, ProviderAdapter};

#[cfg(test)]
mod tests {
    use std::str::FromStr;

    use strum::IntoEnumIterator;

    use super::*;

    #[test]
    fn lexicard_error_has_all_variants() {
        let _config = LexicardError::Config("test".into());
        let _storage = LexicardError::storage(std::io::Error::other("test"));
        let _channel = LexicardError::Channel {
            message: "test".into(),
            source: None,
        };
        let _provider = LexicardError::from(ServiceError::schema("test"));
        let _generation = LexicardError::from(GenerationError {
            last_error_kind: ErrorKind::TransportTimeout,
            attempts: 3,
            message: "test".into(),
        });
        let _pending = LexicardError::PendingNotFound { handle: Handle(1) };
        let _limit = LexicardError::PendingLimit { limit: 1 };
        let _auth = LexicardError::NotAuthorized;
        let _internal = LexicardError::Internal("test".into());
    }

    #[test]
    fn language_round_trips_through_strings() {
        for language in Language::iter() {
            let s = language.to_string();
            assert_eq!(Language::from_str(&s).unwrap(), language);
        }
        assert_eq!(Language::English.to_string(), "english");
        assert_eq!(Language::German.display_name(), "German");
        assert_eq!(Language::ALL.len(), 2);
    }

    #[test]
    fn language_serializes_lowercase() {
        let json = serde_json::to_string(&Language::German).unwrap();
        assert_eq!(json, "\"german\"");
    }

    #[test]
    fn decision_parses_callback_prefixes() {
        assert_eq!(Decision::from_str("accept").unwrap(), Decision::Accept);
        assert_eq!(Decision::from_str("decline").unwrap(), Decision::Decline);
        assert_eq!(Decision::from_str("regenerate").unwrap(), Decision::Regenerate);
        assert!(Decision::from_str("approve").is_err());
    }

    #[test]
    fn handle_parses_and_displays() {
        let handle = Handle::from_str("42").unwrap();
        assert_eq!(handle, Handle(42));
        assert_eq!(handle.to_string(), "42");
        assert!(Handle::from_str("abc").is_err());
    }

    #[test]
    fn history_entry_accepts_legacy_field_names() {
        let legacy = r#"{"word": "run", "added_at": "2025-01-02T10:00:00", "definition": "move"}"#;
        let entry: HistoryEntry = serde_json::from_str(legacy).unwrap();
        assert_eq!(entry.term, "run");
        assert_eq!(entry.added_on(), "2025-01-02");

        let json = serde_json::to_value(&entry).unwrap();
        assert!(json.get("addedAt").is_some());
    }

    #[test]
    fn all_traits_are_exported() {
        fn _assert_plugin_adapter<T: PluginAdapter>() {}
        fn _assert_channel_adapter<T: ChannelAdapter>() {}
        fn _assert_provider_adapter<T: ProviderAdapter>() {}
    }
}
