// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Configuration loader using Figment for layered config merging.
//!
//! Lookup order: `/etc/lexicard/lexicard.toml` < `~/.config/lexicard/lexicard.toml`
//! < `./lexicard.toml` < `LEXICARD_*` environment variables.

#![allow(clippy::result_large_err)] // figment::Error is external and cannot be boxed without wrapper

use std::path::{Path, PathBuf};

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};

use crate::model::LexicardConfig;

/// Config file name looked up in every directory of the hierarchy.
pub const CONFIG_FILE_NAME: &str = "lexicard.toml";

/// Top-level sections that `LEXICARD_<SECTION>_<KEY>` variables map into.
const ENV_SECTIONS: [&str; 5] = ["bot", "telegram", "openrouter", "generation", "storage"];

/// The config files considered, lowest priority first.
pub fn config_file_candidates() -> Vec<PathBuf> {
    let mut files = vec![PathBuf::from("/etc/lexicard").join(CONFIG_FILE_NAME)];
    if let Some(dir) = dirs::config_dir() {
        files.push(dir.join("lexicard").join(CONFIG_FILE_NAME));
    }
    files.push(PathBuf::from(CONFIG_FILE_NAME));
    files
}

/// Builds the full figment: defaults, the file hierarchy, then env vars.
pub fn build_figment() -> Figment {
    config_file_candidates()
        .into_iter()
        .fold(
            Figment::new().merge(Serialized::defaults(LexicardConfig::default())),
            |figment, file| figment.merge(Toml::file(file)),
        )
        .merge(env_provider())
}

/// Load configuration from the standard hierarchy with env var overrides.
pub fn load_config() -> Result<LexicardConfig, figment::Error> {
    build_figment().extract()
}

/// Load configuration from a TOML string only (no files, no env).
pub fn load_config_from_str(toml_content: &str) -> Result<LexicardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LexicardConfig::default()))
        .merge(Toml::string(toml_content))
        .extract()
}

/// Load configuration from an explicit file path with env var overrides.
pub fn load_config_from_path(path: &Path) -> Result<LexicardConfig, figment::Error> {
    Figment::new()
        .merge(Serialized::defaults(LexicardConfig::default()))
        .merge(Toml::file(path))
        .merge(env_provider())
        .extract()
}

/// Maps `LEXICARD_TELEGRAM_BOT_TOKEN` to `telegram.bot_token`.
///
/// Only the first underscore after a known section name becomes a dot, so
/// keys that contain underscores stay intact.
fn env_provider() -> Env {
    Env::prefixed("LEXICARD_").map(|key| map_env_key(key.as_str()).into())
}

fn map_env_key(key: &str) -> String {
    ENV_SECTIONS
        .iter()
        .find_map(|section| {
            key.strip_prefix(section)
                .and_then(|rest| rest.strip_prefix('_'))
                .map(|rest| format!("{section}.{rest}"))
        })
        .unwrap_or_else(|| key.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn env_keys_map_to_sections() {
        assert_eq!(map_env_key("telegram_bot_token"), "telegram.bot_token");
        assert_eq!(map_env_key("openrouter_api_key"), "openrouter.api_key");
        assert_eq!(map_env_key("generation_base_delay_ms"), "generation.base_delay_ms");
        assert_eq!(map_env_key("storage_data_dir"), "storage.data_dir");
        assert_eq!(map_env_key("bot_max_pending"), "bot.max_pending");
    }

    #[test]
    fn unknown_env_keys_pass_through() {
        assert_eq!(map_env_key("something_else"), "something_else");
    }

    #[test]
    fn candidates_end_with_local_file() {
        let files = config_file_candidates();
        assert_eq!(files.first().unwrap(), &PathBuf::from("/etc/lexicard/lexicard.toml"));
        assert_eq!(files.last().unwrap(), &PathBuf::from("lexicard.toml"));
    }
}
