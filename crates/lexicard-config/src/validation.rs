// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Post-deserialization validation for configuration values.
//!
//! Checks constraints serde cannot express: non-empty paths, bounded retry
//! counts and distinct export files.

use std::path::Path;

use crate::diagnostic::ConfigError;
use crate::model::LexicardConfig;

/// Hard cap on generation attempts per word.
pub const MAX_GENERATION_ATTEMPTS: u32 = 3;

const LOG_LEVELS: [&str; 5] = ["trace", "debug", "info", "warn", "error"];

/// Validate a deserialized configuration for semantic correctness.
///
/// Collects every problem instead of failing on the first one.
pub fn validate_config(config: &LexicardConfig) -> Result<(), Vec<ConfigError>> {
    let mut errors = Vec::new();
    let mut fail = |message: String| errors.push(ConfigError::Validation { message });

    if !LOG_LEVELS.contains(&config.bot.log_level.to_ascii_lowercase().as_str()) {
        fail(format!(
            "bot.log_level must be one of {}, got `{}`",
            LOG_LEVELS.join(", "),
            config.bot.log_level
        ));
    }

    if config.bot.max_pending == 0 {
        fail("bot.max_pending must be at least 1".to_string());
    }

    if let Some(user) = &config.telegram.allowed_user
        && user.trim().parse::<i64>().is_err()
    {
        fail(format!(
            "telegram.allowed_user must be a numeric Telegram user id, got `{user}`"
        ));
    }

    let base_url = config.openrouter.base_url.trim();
    if !(base_url.starts_with("http://") || base_url.starts_with("https://")) {
        fail(format!(
            "openrouter.base_url must start with http:// or https://, got `{base_url}`"
        ));
    }

    if config.openrouter.model.trim().is_empty() {
        fail("openrouter.model must not be empty".to_string());
    }

    if config.openrouter.timeout_secs == 0 {
        fail("openrouter.timeout_secs must be at least 1".to_string());
    }

    let attempts = config.generation.max_attempts;
    if !(1..=MAX_GENERATION_ATTEMPTS).contains(&attempts) {
        fail(format!(
            "generation.max_attempts must be between 1 and {MAX_GENERATION_ATTEMPTS}, got {attempts}"
        ));
    }

    for (key, value) in [
        ("storage.data_dir", &config.storage.data_dir),
        ("storage.english_export", &config.storage.english_export),
        ("storage.german_export", &config.storage.german_export),
    ] {
        if value.trim().is_empty() {
            fail(format!("{key} must not be empty"));
        }
    }

    if Path::new(config.storage.english_export.trim())
        == Path::new(config.storage.german_export.trim())
    {
        fail(format!(
            "storage.english_export and storage.german_export must differ, both are `{}`",
            config.storage.english_export
        ));
    }

    if errors.is_empty() { Ok(()) } else { Err(errors) }
}
