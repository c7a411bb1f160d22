// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Language-specific system instructions for card generation.
//!
//! Both instructions are resolved once when the generator is built: a
//! configured file wins, otherwise the built-in text is used.

use lexicard_config::GenerationConfig;
use lexicard_core::{Language, LexicardError};
use tracing::info;

const BUILTIN_ENGLISH: &str = include_str!("../prompts/english.md");
const BUILTIN_GERMAN: &str = include_str!("../prompts/german.md");

/// The two system instructions.
#[derive(Debug, Clone)]
pub struct PromptSet {
    english: String,
    german: String,
}

impl PromptSet {
    /// The instructions compiled into the binary.
    pub fn builtin() -> Self {
        Self {
            english: BUILTIN_ENGLISH.trim().to_string(),
            german: BUILTIN_GERMAN.trim().to_string(),
        }
    }

    /// Resolves both instructions from config.
    ///
    /// A configured file that cannot be read, or is empty, is a configuration
    /// error rather than a silent fallback.
    pub async fn load(config: &GenerationConfig) -> Result<Self, LexicardError> {
        let mut prompts = Self::builtin();
        for language in Language::ALL {
            let Some(path) = config.prompt_file(language) else {
                continue;
            };
            let content = tokio::fs::read_to_string(path).await.map_err(|e| {
                LexicardError::Config(format!(
                    "failed to read {language} prompt file `{path}`: {e}"
                ))
            })?;
            let content = content.trim();
            if content.is_empty() {
                return Err(LexicardError::Config(format!(
                    "{language} prompt file `{path}` is empty"
                )));
            }
            info!(%language, path, "loaded system prompt from file");
            *prompts.slot(language) = content.to_string();
        }
        Ok(prompts)
    }

    pub fn get(&self, language: Language) -> &str {
        match language {
            Language::English => &self.english,
            Language::German => &self.german,
        }
    }

    fn slot(&mut self, language: Language) -> &mut String {
        match language {
            Language::English => &mut self.english,
            Language::German => &mut self.german,
        }
    }
}
