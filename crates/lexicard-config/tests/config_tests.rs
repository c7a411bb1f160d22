// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Integration tests for the lexicard configuration system.

use std::io::Write;

use lexicard_config::diagnostic::ConfigError;
use lexicard_config::model::LexicardConfig;
use lexicard_config::{load_and_validate_path, load_and_validate_str, load_config_from_str};

#[test]
fn full_toml_deserializes() {
    let toml = r#"
[bot]
log_level = "debug"
max_pending = 5

[telegram]
bot_token = "123:ABC"
allowed_user = "424242"

[openrouter]
api_key = "sk-or-123"
base_url = "http://localhost:9999/v1"
model = "some/model"
timeout_secs = 10
max_tokens = 512

[generation]
max_attempts = 2
base_delay_ms = 100
german_prompt_file = "prompts/de.md"

[storage]
data_dir = "/var/lib/lexicard"
english_export = "/var/lib/lexicard/en.txt"
german_export = "/var/lib/lexicard/de.txt"
"#;

    let config = load_and_validate_str(toml).expect("valid TOML should load");
    assert_eq!(config.bot.log_level, "debug");
    assert_eq!(config.bot.max_pending, 5);
    assert_eq!(config.telegram.bot_token.as_deref(), Some("123:ABC"));
    assert_eq!(config.telegram.allowed_user.as_deref(), Some("424242"));
    assert_eq!(config.openrouter.api_key.as_deref(), Some("sk-or-123"));
    assert_eq!(config.openrouter.base_url, "http://localhost:9999/v1");
    assert_eq!(config.openrouter.timeout_secs, 10);
    assert_eq!(config.openrouter.max_tokens, 512);
    assert_eq!(config.generation.max_attempts, 2);
    assert_eq!(config.generation.base_delay_ms, 100);
    assert!(config.generation.english_prompt_file.is_none());
    assert_eq!(config.storage.data_dir, "/var/lib/lexicard");
}

#[test]
fn empty_toml_uses_defaults() {
    let config = load_config_from_str("").expect("empty TOML should use defaults");

    assert_eq!(config.bot.log_level, "info");
    assert_eq!(config.bot.max_pending, 50);
    assert!(config.telegram.bot_token.is_none());
    assert!(config.telegram.allowed_user.is_none());
    assert_eq!(config.openrouter.base_url, "https://openrouter.ai/api/v1");
    assert_eq!(config.openrouter.model, "x-ai/grok-4.1-fast");
    assert_eq!(config.openrouter.timeout_secs, 60);
    assert_eq!(config.generation.max_attempts, 3);
    assert_eq!(config.generation.base_delay_ms, 2000);
    assert_eq!(config.storage.english_export, "data/english.txt");
    assert_eq!(config.storage.german_export, "data/german.txt");
}

/// `LEXICARD_TELEGRAM_BOT_TOKEN` lands on `telegram.bot_token`, not `telegram.bot.token`.
#[test]
fn dotted_override_sets_bot_token() {
    use figment::{Figment, providers::Serialized};

    let config: LexicardConfig = Figment::new()
        .merge(Serialized::defaults(LexicardConfig::default()))
        .merge(("telegram.bot_token", "xyz-from-env"))
        .extract()
        .expect("should set bot_token via dot notation");

    assert_eq!(config.telegram.bot_token.as_deref(), Some("xyz-from-env"));
}

#[test]
fn missing_config_files_silently_skipped() {
    use figment::{
        Figment,
        providers::{Format, Serialized, Toml},
    };

    let config: LexicardConfig = Figment::new()
        .merge(Serialized::defaults(LexicardConfig::default()))
        .merge(Toml::file("/nonexistent/path/lexicard.toml"))
        .extract()
        .expect("missing file should be silently skipped");

    assert_eq!(config.bot.max_pending, 50);
}

#[test]
fn unknown_top_level_section_rejected() {
    let err = load_config_from_str("[logging]\nlevel = \"debug\"\n")
        .expect_err("unknown top-level section should be rejected");
    let err_str = format!("{err}");
    assert!(
        err_str.contains("unknown field") || err_str.contains("logging"),
        "got: {err_str}"
    );
}

#[test]
fn unknown_key_suggests_closest() {
    let toml = r#"
[telegram]
bot_tken = "abc"
"#;

    let errors = load_and_validate_str(toml).expect_err("should produce errors");
    let matched = errors.iter().any(|e| {
        matches!(e, ConfigError::UnknownKey { key, suggestion, valid_keys, span, .. } if {
            key == "bot_tken"
                && suggestion.as_deref() == Some("bot_token")
                && valid_keys.contains("allowed_user")
                && span.is_some()
        })
    });
    assert!(matched, "expected UnknownKey for bot_tken, got: {errors:?}");
}

#[test]
fn invalid_type_is_reported() {
    let toml = r#"
[generation]
max_attempts = "three"
"#;

    let errors = load_and_validate_str(toml).expect_err("should reject invalid type");
    assert!(
        errors
            .iter()
            .any(|e| matches!(e, ConfigError::InvalidType { key, .. } if key.contains("max_attempts"))),
        "got: {errors:?}"
    );
}

#[test]
fn validation_errors_surface_through_loader() {
    let toml = r#"
[generation]
max_attempts = 4

[storage]
english_export = "same.txt"
german_export = "same.txt"
"#;

    let errors = load_and_validate_str(toml).expect_err("should fail validation");
    assert_eq!(errors.len(), 2, "got: {errors:?}");
    assert!(errors.iter().all(|e| matches!(e, ConfigError::Validation { .. })));
}

#[test]
fn unknown_key_help_renders_with_miette() {
    use miette::{Diagnostic, GraphicalReportHandler};

    let error = ConfigError::UnknownKey {
        key: "max_pendng".to_string(),
        suggestion: Some("max_pending".to_string()),
        valid_keys: "log_level, max_pending".to_string(),
        span: None,
        src: None,
    };

    assert!(error.code().is_some());
    let help = error.help().expect("help text").to_string();
    assert!(help.contains("did you mean `max_pending`"), "got: {help}");

    let mut buf = String::new();
    GraphicalReportHandler::new()
        .render_report(&mut buf, &error)
        .expect("should render");
    assert!(buf.contains("max_pendng"));
}

#[test]
fn explicit_path_is_loaded() {
    let mut file = tempfile::NamedTempFile::new().expect("temp file");
    writeln!(file, "[bot]\nmax_pending = 7").expect("write config");

    let config = load_and_validate_path(file.path()).expect("file should load");
    assert_eq!(config.bot.max_pending, 7);
}
