// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! In-memory per-language buffers of accepted cards.

use std::collections::HashMap;
use std::path::PathBuf;

use lexicard_config::StorageConfig;
use lexicard_core::{BufferEntry, BufferStats, Language, LexicardError};
use tracing::info;

use crate::{export, write_atomic};

#[derive(Debug, Default)]
struct LanguageBuffer {
    entries: Vec<BufferEntry>,
    /// Accepts since the last dump.
    unique_words: usize,
}

/// Accepted cards awaiting export, one ordered buffer per language.
///
/// Takes `&mut self` for every mutation; the owner serializes access.
#[derive(Debug)]
pub struct BufferManager {
    export_paths: HashMap<Language, PathBuf>,
    buffers: HashMap<Language, LanguageBuffer>,
}

impl BufferManager {
    pub fn new(config: &StorageConfig) -> Self {
        let export_paths = Language::ALL
            .into_iter()
            .map(|language| (language, config.export_path(language)))
            .collect();
        Self {
            export_paths,
            buffers: HashMap::new(),
        }
    }

    /// Adds a card to the tail of the language's buffer.
    pub fn append(&mut self, term: &str, body: &str, language: Language) {
        let buffer = self.buffers.entry(language).or_default();
        buffer.entries.push(BufferEntry {
            term: term.to_string(),
            body: body.to_string(),
        });
        buffer.unique_words += 1;
    }

    pub fn stats(&self, language: Language) -> BufferStats {
        self.buffers
            .get(&language)
            .map(|buffer| BufferStats {
                cards_in_buffer: buffer.entries.len(),
                unique_words_this_session: buffer.unique_words,
            })
            .unwrap_or_default()
    }

    pub fn is_empty(&self, language: Language) -> bool {
        self.buffers
            .get(&language)
            .is_none_or(|buffer| buffer.entries.is_empty())
    }

    pub fn entries(&self, language: Language) -> &[BufferEntry] {
        self.buffers
            .get(&language)
            .map(|buffer| buffer.entries.as_slice())
            .unwrap_or_default()
    }

    pub fn export_path(&self, language: Language) -> Option<&PathBuf> {
        self.export_paths.get(&language)
    }

    /// Writes the buffer to the language's export file, then clears it.
    ///
    /// Returns `None` without touching the file when the buffer is empty.
    /// The buffer is cleared only after the write succeeded; on error it is
    /// left exactly as it was.
    pub async fn dump_and_clear(
        &mut self,
        language: Language,
    ) -> Result<Option<PathBuf>, LexicardError> {
        if self.is_empty(language) {
            return Ok(None);
        }

        let path = self
            .export_paths
            .get(&language)
            .cloned()
            .ok_or_else(|| {
                LexicardError::Internal(format!("no export path configured for {language}"))
            })?;

        let contents = export::serialize(self.entries(language));
        write_atomic(&path, contents.as_bytes()).await?;

        let cleared = self
            .buffers
            .insert(language, LanguageBuffer::default())
            .map(|buffer| buffer.entries.len())
            .unwrap_or_default();
        info!(%language, cards = cleared, path = %path.display(), "buffer dumped");

        Ok(Some(path))
    }
}
