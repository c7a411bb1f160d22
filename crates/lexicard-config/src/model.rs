// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration model structs.
//!
//! All structs use `#[serde(deny_unknown_fields)]` to reject unrecognized
//! config keys at startup, providing actionable error messages.

use std::path::{Path, PathBuf};

use lexicard_core::Language;
use serde::{Deserialize, Serialize};

/// Top-level configuration. Every section is optional.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct LexicardConfig {
    #[serde(default)]
    pub bot: BotConfig,

    #[serde(default)]
    pub telegram: TelegramConfig,

    /// Generation service connection settings.
    #[serde(default)]
    pub openrouter: OpenRouterConfig,

    /// Retry policy and instruction templates.
    #[serde(default)]
    pub generation: GenerationConfig,

    /// Export and history file locations.
    #[serde(default)]
    pub storage: StorageConfig,
}

/// Process-wide behaviour.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct BotConfig {
    /// Logging level (trace, debug, info, warn, error).
    #[serde(default = "default_log_level")]
    pub log_level: String,

    /// Maximum number of cards awaiting a decision at once.
    #[serde(default = "default_max_pending")]
    pub max_pending: usize,
}

impl Default for BotConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            max_pending: default_max_pending(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

fn default_max_pending() -> usize {
    50
}

/// Telegram bot integration configuration.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct TelegramConfig {
    /// Telegram Bot API token. Required by `serve`.
    #[serde(default)]
    pub bot_token: Option<String>,

    /// Numeric Telegram user id of the single authorized user.
    /// `None` rejects everyone.
    #[serde(default)]
    pub allowed_user: Option<String>,
}

/// OpenAI-compatible chat completions endpoint (OpenRouter by default).
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct OpenRouterConfig {
    /// API key. `None` falls back to the `OPENROUTER_API_KEY` environment variable.
    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_base_url")]
    pub base_url: String,

    #[serde(default = "default_model")]
    pub model: String,

    /// Per-attempt request timeout.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    #[serde(default = "default_max_tokens")]
    pub max_tokens: u32,
}

impl Default for OpenRouterConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: default_base_url(),
            model: default_model(),
            timeout_secs: default_timeout_secs(),
            max_tokens: default_max_tokens(),
        }
    }
}

fn default_base_url() -> String {
    "https://openrouter.ai/api/v1".to_string()
}

fn default_model() -> String {
    "x-ai/grok-4.1-fast".to_string()
}

fn default_timeout_secs() -> u64 {
    60
}

fn default_max_tokens() -> u32 {
    2048
}

/// Card generation retry policy and instruction templates.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct GenerationConfig {
    /// Attempts per word, including the first.
    #[serde(default = "default_max_attempts")]
    pub max_attempts: u32,

    /// Linear backoff base: the delay after attempt `n` is `n * base_delay_ms`.
    #[serde(default = "default_base_delay_ms")]
    pub base_delay_ms: u64,

    /// Markdown file overriding the built-in English instruction.
    #[serde(default)]
    pub english_prompt_file: Option<String>,

    /// Markdown file overriding the built-in German instruction.
    #[serde(default)]
    pub german_prompt_file: Option<String>,
}

impl GenerationConfig {
    pub fn prompt_file(&self, language: Language) -> Option<&str> {
        match language {
            Language::English => self.english_prompt_file.as_deref(),
            Language::German => self.german_prompt_file.as_deref(),
        }
    }
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            max_attempts: default_max_attempts(),
            base_delay_ms: default_base_delay_ms(),
            english_prompt_file: None,
            german_prompt_file: None,
        }
    }
}

fn default_max_attempts() -> u32 {
    3
}

fn default_base_delay_ms() -> u64 {
    2000
}

/// Export file and history locations.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(deny_unknown_fields)]
pub struct StorageConfig {
    /// Directory holding the per-language history files.
    #[serde(default = "default_data_dir")]
    pub data_dir: String,

    #[serde(default = "default_english_export")]
    pub english_export: String,

    #[serde(default = "default_german_export")]
    pub german_export: String,
}

impl StorageConfig {
    /// Where `dumpAndClear` writes the language's export file.
    pub fn export_path(&self, language: Language) -> PathBuf {
        match language {
            Language::English => PathBuf::from(&self.english_export),
            Language::German => PathBuf::from(&self.german_export),
        }
    }

    /// `<data_dir>/<language>_history.json`.
    pub fn history_path(&self, language: Language) -> PathBuf {
        Path::new(&self.data_dir).join(format!("{language}_history.json"))
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: default_data_dir(),
            english_export: default_english_export(),
            german_export: default_german_export(),
        }
    }
}

fn default_data_dir() -> String {
    "data".to_string()
}

fn default_english_export() -> String {
    "data/english.txt".to_string()
}

fn default_german_export() -> String {
    "data/german.txt".to_string()
}
