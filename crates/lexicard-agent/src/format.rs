// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Card bodies for the export file and every user-facing text.

use lexicard_core::error::{GenerationError, truncate_chars};
use lexicard_core::{CardBody, HistoryEntry, Language, PendingCard};

use crate::session::LanguageStats;

/// Characters of the word repeated back in failure messages.
const DISPLAY_WORD_CHARS: usize = 100;

/// Reply to anyone but the configured user.
pub const NOT_AUTHORIZED: &str = "⛔ Sorry, this bot is private.";

pub const PROCESSING: &str = "🔄 Processing your word...";

pub const CARD_UNAVAILABLE: &str = "❌ This card is no longer available.";

/// Back side of a card as stored in the buffer and the export file.
///
/// ```text
/// definition
///
/// Collocations:
/// - first
/// - second
///
/// Examples:
/// - She _____ daily.
/// ```
pub fn format_body(card: &CardBody) -> String {
    let mut lines = vec![card.definition.clone()];
    for (label, items) in [("Collocations:", &card.collocations), ("Examples:", &card.examples)] {
        if items.is_empty() {
            continue;
        }
        lines.push(String::new());
        lines.push(label.to_string());
        lines.extend(items.iter().map(|item| format!("- {item}")));
    }
    lines.join("\n")
}

/// Card as displayed for a decision.
pub fn render_card(pending: &PendingCard, regenerated: bool) -> String {
    let duplicate = if pending.is_duplicate {
        " ⚠️ (duplicate)"
    } else {
        ""
    };
    let card = &pending.card;
    let mut text = format!(
        "⚡️ Term: \"{}\"{duplicate}\n\n📝 Definition:\n{}\n\n🔗 Collocations:\n{}\n\n📚 Examples:\n{}",
        pending.term_identifier,
        card.definition,
        bullets(&card.collocations),
        bullets(&card.examples),
    );
    if regenerated {
        text.push_str("\n\n🔄 Regenerated");
    }
    text
}

fn bullets(items: &[String]) -> String {
    items
        .iter()
        .map(|item| format!("• {item}"))
        .collect::<Vec<_>>()
        .join("\n")
}

pub fn duplicate_warning(entry: &HistoryEntry) -> String {
    format!(
        "⚠️ This word was already added before!\n\nPrevious definition: {}\n\nAdded on: {}\n\nContinuing anyway...",
        entry.definition,
        entry.added_on()
    )
}

pub fn word_not_found(term_identifier: &str, language: Language) -> String {
    format!(
        "❌ Word not found: \"{term_identifier}\"\n\nThis word does not exist in {}, or it may be a typo, made-up word, or gibberish.",
        language.display_name()
    )
}

/// `action` is "create" or "regenerate".
pub fn generation_failed(action: &str, word: &str, error: &GenerationError) -> String {
    let word = word.trim();
    let shown = truncate_chars(word, DISPLAY_WORD_CHARS);
    let ellipsis = if shown.len() < word.len() { "..." } else { "" };
    format!(
        "❌ Failed to {action} card after {} attempt{}.\n\nWord: {shown}{ellipsis}\nError: {}",
        error.attempts,
        if error.attempts == 1 { "" } else { "s" },
        error.message
    )
}

pub fn unexpected_error(details: &str) -> String {
    format!(
        "❌ Unexpected error occurred.\n\nPlease try again later.\nDetails: {}",
        truncate_chars(details, 200)
    )
}

pub fn pending_limit(limit: usize) -> String {
    format!(
        "⏳ {limit} cards are already waiting for a decision. Accept or decline some of them first."
    )
}

pub fn accepted(pending: &PendingCard, added: usize, history_saved: bool) -> String {
    let language = pending.language;
    let mut text = format!(
        "✅ Card accepted: \"{}\"\n\nAdded {added} card for {} {}",
        pending.term_identifier,
        language.display_name(),
        language.flag()
    );
    if !history_saved {
        text.push_str("\n\n⚠️ Could not save the word history; the duplicate warning may be missing next time.");
    }
    text
}

pub fn declined(pending: &PendingCard) -> String {
    format!(
        "❌ Card declined: \"{}\"\n\nThe card was not added to your buffer.",
        pending.term_identifier
    )
}

pub fn regenerated_missing(term_identifier: &str, language: Language) -> String {
    format!(
        "{}\n\nThe card was removed.",
        word_not_found(term_identifier, language)
    )
}

pub fn usage_hint(language: Language) -> String {
    format!(
        "❓ Please provide a word after the command.\nExample: /{} {}",
        language.submit_command(),
        language.example_word()
    )
}

pub fn language_hint() -> String {
    Language::ALL
        .into_iter()
        .map(|language| {
            format!(
                "• /{} word — for {}",
                language.submit_command(),
                language.display_name()
            )
        })
        .fold("❓ Please specify the language:".to_string(), |text, line| {
            format!("{text}\n{line}")
        })
}

pub fn welcome() -> String {
    let usage = Language::ALL
        .into_iter()
        .map(|language| {
            format!(
                "• /{} {} — for {} words",
                language.submit_command(),
                language.example_word(),
                language.display_name()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");
    let dumps = Language::ALL
        .into_iter()
        .map(|language| {
            format!(
                "/{} — Get {} cards (.txt) and clear buffer",
                language.dump_command(),
                language.display_name()
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "👋 Welcome to the Vocabulary Builder Bot!\n\n\
         Methodology: Contextual Immersion\n\
         I create flashcards using definitions, collocations and gap-fill examples, \
         all in the target language. No translations.\n\n\
         Usage:\n{usage}\n\n\
         Card format:\n\
         Side 1 (Term): the word or phrase\n\
         Side 2 (Definition): definition, collocations and gap-fill examples\n\n\
         Commands:\n{dumps}\n\
         /stats — View current statistics"
    )
}

pub fn stats(stats: &[LanguageStats]) -> String {
    let sections = stats
        .iter()
        .map(|s| {
            format!(
                "{} {}:\n   • Cards in buffer: {}\n   • Unique words (session): {}\n   • Total in history: {}",
                s.language.flag(),
                s.language.display_name(),
                s.buffer.cards_in_buffer,
                s.buffer.unique_words_this_session,
                s.history_total
            )
        })
        .collect::<Vec<_>>()
        .join("\n\n");
    format!("📊 Current Statistics\n\n{sections}")
}

pub fn empty_buffer(language: Language) -> String {
    format!("📭 No {} cards in the buffer yet.", language.display_name())
}

/// File name the export is delivered under.
pub fn export_file_name(language: Language) -> String {
    format!("{language}_vocabulary.txt")
}

pub fn export_caption(language: Language) -> String {
    format!(
        "📥 Here are your {} cards! Ready for Quizlet Custom Import. Buffer cleared.",
        language.display_name()
    )
}

pub fn dump_failed(language: Language) -> String {
    format!(
        "❌ Could not write the {} export file. Your cards are still in the buffer, please try again.",
        language.display_name()
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;
    use lexicard_core::error::ErrorKind;
    use lexicard_core::{BufferStats, Handle};

    fn body() -> CardBody {
        CardBody {
            normalized_term: "run".into(),
            definition: "to move quickly on foot".into(),
            collocations: vec!["run a business".into(), "run late".into()],
            examples: vec!["She _____ every morning.".into(), "We _____ out of milk.".into()],
        }
    }

    fn pending(is_duplicate: bool) -> PendingCard {
        PendingCard {
            handle: Handle(7),
            term_identifier: "run".into(),
            card: body(),
            language: Language::English,
            created_at: Utc::now(),
            is_duplicate,
            duplicate_info: None,
        }
    }

    #[test]
    fn body_layout() {
        assert_eq!(
            format_body(&body()),
            "to move quickly on foot\n\nCollocations:\n- run a business\n- run late\n\nExamples:\n- She _____ every morning.\n- We _____ out of milk."
        );
    }

    #[test]
    fn card_display_marks_duplicates_and_regeneration() {
        let plain = render_card(&pending(false), false);
        assert!(plain.starts_with("⚡️ Term: \"run\"\n"));
        assert!(plain.contains("• run late"));
        assert!(!plain.contains("duplicate"));

        let marked = render_card(&pending(true), true);
        assert!(marked.contains("(duplicate)"));
        assert!(marked.ends_with("🔄 Regenerated"));
    }

    #[test]
    fn failure_message_truncates_long_words() {
        let error = GenerationError {
            last_error_kind: ErrorKind::TransportTimeout,
            attempts: 3,
            message: "timed out".into(),
        };
        let text = generation_failed("create", &"x".repeat(150), &error);
        assert!(text.contains(&format!("Word: {}...", "x".repeat(100))));
        assert!(text.contains("after 3 attempts"));

        let short = generation_failed("regenerate", "run", &GenerationError { attempts: 1, ..error });
        assert!(short.contains("Word: run\n"));
        assert!(short.contains("after 1 attempt."));
    }

    #[test]
    fn duplicate_warning_shows_date_only() {
        let entry = HistoryEntry {
            term: "run".into(),
            added_at: "2025-06-01T12:30:00Z".into(),
            definition: "to move".into(),
        };
        let text = duplicate_warning(&entry);
        assert!(text.contains("Previous definition: to move"));
        assert!(text.contains("Added on: 2025-06-01\n"));
    }

    #[test]
    fn stats_lists_every_language() {
        let text = stats(&[
            LanguageStats {
                language: Language::English,
                buffer: BufferStats {
                    cards_in_buffer: 2,
                    unique_words_this_session: 3,
                },
                history_total: 40,
            },
            LanguageStats {
                language: Language::German,
                buffer: BufferStats::default(),
                history_total: 0,
            },
        ]);
        assert!(text.contains("English:\n   • Cards in buffer: 2"));
        assert!(text.contains("Total in history: 40"));
        assert!(text.contains("German:"));
    }

    #[test]
    fn hints_name_commands() {
        assert!(usage_hint(Language::German).contains("/de aufgeben"));
        assert!(language_hint().contains("/en word"));
        assert!(welcome().contains("/dump_german"));
        assert_eq!(export_file_name(Language::English), "english_vocabulary.txt");
        assert_eq!(empty_buffer(Language::German), "📭 No German cards in the buffer yet.");
    }
}
