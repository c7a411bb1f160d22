// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Cross-session history of accepted terms, used for duplicate warnings.
//!
//! One JSON file per language maps the term as submitted to
//! `{term, addedAt, definition}`. Files are read once at startup and
//! rewritten in full on every [`HistoryStore::record`].

use std::collections::{BTreeMap, HashMap};
use std::path::PathBuf;

use chrono::{SecondsFormat, Utc};
use lexicard_config::StorageConfig;
use lexicard_core::{HistoryEntry, Language, LexicardError};
use tracing::{debug, info, warn};

use crate::write_atomic;

/// Per-language history, in insertion order.
#[derive(Debug)]
pub struct HistoryStore {
    paths: HashMap<Language, PathBuf>,
    entries: HashMap<Language, Vec<HistoryEntry>>,
}

impl HistoryStore {
    /// Loads both history files.
    ///
    /// A missing file means no history. An unreadable or corrupt file is
    /// logged and also treated as empty; startup never fails here.
    pub async fn open(config: &StorageConfig) -> Self {
        let mut paths = HashMap::new();
        let mut entries = HashMap::new();

        for language in Language::ALL {
            let path = config.history_path(language);
            let loaded = load_file(&path, language).await;
            info!(%language, count = loaded.len(), path = %path.display(), "history loaded");
            entries.insert(language, loaded);
            paths.insert(language, path);
        }

        Self { paths, entries }
    }

    /// Finds an earlier entry for `term`.
    ///
    /// Comparison is on trimmed, lowercased text. Stored keys are unique as
    /// raw strings but several may normalize equally (`"Run"`, `"run "`); the
    /// first one in insertion order wins.
    pub fn lookup(&self, term: &str, language: Language) -> Option<&HistoryEntry> {
        let needle = normalize(term);
        self.language_entries(language)
            .iter()
            .find(|entry| normalize(&entry.term) == needle)
    }

    /// Inserts or overwrites the entry for `term` (exact key) and persists
    /// the language file before returning.
    ///
    /// The in-memory entry is kept even when persisting fails, so the
    /// duplicate warning still works for the rest of the session and the
    /// next successful write catches the file up.
    pub async fn record(
        &mut self,
        term: &str,
        language: Language,
        definition: &str,
    ) -> Result<HistoryEntry, LexicardError> {
        let entry = HistoryEntry {
            term: term.to_string(),
            added_at: Utc::now().to_rfc3339_opts(SecondsFormat::Secs, true),
            definition: definition.to_string(),
        };

        let list = self.entries.entry(language).or_default();
        match list.iter_mut().find(|existing| existing.term == term) {
            Some(existing) => *existing = entry.clone(),
            None => list.push(entry.clone()),
        }

        self.persist(language).await?;
        debug!(%language, term = %truncate_term(term), "history entry recorded");
        Ok(entry)
    }

    /// Number of recorded terms per language.
    pub fn count_by_language(&self) -> BTreeMap<Language, usize> {
        Language::ALL
            .into_iter()
            .map(|language| (language, self.language_entries(language).len()))
            .collect()
    }

    pub fn entries(&self, language: Language) -> &[HistoryEntry] {
        self.language_entries(language)
    }

    fn language_entries(&self, language: Language) -> &[HistoryEntry] {
        self.entries.get(&language).map(Vec::as_slice).unwrap_or_default()
    }

    async fn persist(&self, language: Language) -> Result<(), LexicardError> {
        let Some(path) = self.paths.get(&language) else {
            return Err(LexicardError::Internal(format!(
                "no history path configured for {language}"
            )));
        };

        let mut map = serde_json::Map::new();
        for entry in self.language_entries(language) {
            let value = serde_json::to_value(entry).map_err(LexicardError::storage)?;
            map.insert(entry.term.clone(), value);
        }
        let json = serde_json::to_string_pretty(&map).map_err(LexicardError::storage)?;

        write_atomic(path, json.as_bytes()).await
    }
}

fn normalize(term: &str) -> String {
    term.trim().to_lowercase()
}

fn truncate_term(term: &str) -> String {
    lexicard_core::error::truncate_chars(term, 50)
}

async fn load_file(path: &std::path::Path, language: Language) -> Vec<HistoryEntry> {
    let content = match tokio::fs::read_to_string(path).await {
        Ok(content) => content,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Vec::new(),
        Err(e) => {
            warn!(%language, path = %path.display(), error = %e, "failed to read history, starting empty");
            return Vec::new();
        }
    };

    match parse_history(&content) {
        Ok(entries) => entries,
        Err(e) => {
            warn!(%language, path = %path.display(), error = %e, "history file is corrupt, starting empty");
            Vec::new()
        }
    }
}

/// Parses a history file. The map key is authoritative for the term.
fn parse_history(content: &str) -> Result<Vec<HistoryEntry>, serde_json::Error> {
    let map: serde_json::Map<String, serde_json::Value> = serde_json::from_str(content)?;
    map.into_iter()
        .map(|(key, value)| -> Result<HistoryEntry, serde_json::Error> {
            let mut entry: HistoryEntry = serde_json::from_value(value)?;
            entry.term = key;
            Ok(entry)
        })
        .collect()
}
