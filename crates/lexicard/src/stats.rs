// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lexicard stats` command implementation.
//!
//! Reads the history files and the last export of each language from disk.
//! Works while the bot is stopped; the in-memory buffers of a running bot are
//! not visible here.

use std::io::IsTerminal;

use lexicard_config::LexicardConfig;
use lexicard_core::{Language, LexicardError};
use lexicard_storage::{HistoryStore, export};
use serde::Serialize;

/// Per-language figures for `--json` output.
#[derive(Debug, Serialize)]
pub struct LanguageReport {
    pub language: Language,
    pub history_total: usize,
    pub last_added: Option<String>,
    pub export_path: String,
    /// `None` when no export file exists yet.
    pub exported_cards: Option<usize>,
}

/// Run the `lexicard stats` command.
pub async fn run_stats(config: &LexicardConfig, json: bool) -> Result<(), LexicardError> {
    let reports = collect(config).await?;

    if json {
        let rendered = serde_json::to_string_pretty(&reports)
            .map_err(|e| LexicardError::Internal(format!("failed to render stats: {e}")))?;
        println!("{rendered}");
    } else {
        print_reports(&reports, std::io::stdout().is_terminal());
    }
    Ok(())
}

pub async fn collect(config: &LexicardConfig) -> Result<Vec<LanguageReport>, LexicardError> {
    let history = HistoryStore::open(&config.storage).await;
    let counts = history.count_by_language();

    let mut reports = Vec::with_capacity(Language::ALL.len());
    for language in Language::ALL {
        let path = config.storage.export_path(language);
        let exported_cards = match tokio::fs::read_to_string(&path).await {
            Ok(content) => Some(export::parse(&content).len()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => None,
            Err(e) => return Err(LexicardError::storage(e)),
        };

        reports.push(LanguageReport {
            language,
            history_total: counts.get(&language).copied().unwrap_or(0),
            last_added: history
                .entries(language)
                .last()
                .map(|entry| format!("{} ({})", entry.term, entry.added_on())),
            export_path: path.display().to_string(),
            exported_cards,
        });
    }
    Ok(reports)
}

fn print_reports(reports: &[LanguageReport], use_color: bool) {
    use colored::Colorize;

    println!();
    println!("  lexicard stats");
    println!("  {}", "-".repeat(35));

    for report in reports {
        let title = format!("{} {}", report.language.flag(), report.language.display_name());
        if use_color {
            println!("  {}", title.bold());
        } else {
            println!("  {title}");
        }
        println!("    words in history: {}", report.history_total);
        if let Some(last) = &report.last_added {
            println!("    last added:       {last}");
        }
        match report.exported_cards {
            Some(count) => println!("    last export:      {count} cards in {}", report.export_path),
            None => println!("    last export:      none yet"),
        }
    }
    println!();
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexicard_config::StorageConfig;

    fn config_in(dir: &std::path::Path) -> LexicardConfig {
        let mut config = LexicardConfig::default();
        config.storage = StorageConfig {
            data_dir: dir.join("data").display().to_string(),
            english_export: dir.join("english.txt").display().to_string(),
            german_export: dir.join("german.txt").display().to_string(),
        };
        config
    }

    #[tokio::test]
    async fn empty_data_dir_reports_zero() {
        let dir = tempfile::tempdir().unwrap();
        let reports = collect(&config_in(dir.path())).await.unwrap();

        assert_eq!(reports.len(), 2);
        for report in &reports {
            assert_eq!(report.history_total, 0);
            assert!(report.last_added.is_none());
            assert!(report.exported_cards.is_none());
        }
    }

    #[tokio::test]
    async fn counts_history_and_export_records() {
        let dir = tempfile::tempdir().unwrap();
        let config = config_in(dir.path());

        let mut history = HistoryStore::open(&config.storage).await;
        history.record("run", Language::English, "to move fast").await.unwrap();
        history.record("bank", Language::English, "a river side").await.unwrap();
        tokio::fs::write(dir.path().join("english.txt"), "run\tbody\n####bank\tbody")
            .await
            .unwrap();

        let reports = collect(&config).await.unwrap();
        let english = reports
            .iter()
            .find(|r| r.language == Language::English)
            .unwrap();
        assert_eq!(english.history_total, 2);
        assert!(english.last_added.as_deref().unwrap().starts_with("bank ("));
        assert_eq!(english.exported_cards, Some(2));

        let german = reports.iter().find(|r| r.language == Language::German).unwrap();
        assert_eq!(german.history_total, 0);
    }
}
