// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Slash-command parsing for inbound text.

use lexicard_core::Language;

/// What an inbound text asks for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    /// `/start` or `/help`.
    Help,
    /// `/en <word>` or `/de <word>`. The word is the trimmed argument text,
    /// inner spacing untouched.
    Submit { language: Language, word: String },
    /// `/en` or `/de` without a word.
    MissingWord(Language),
    Stats,
    /// `/dump_english` or `/dump_german`.
    Dump(Language),
    /// A slash command nobody handles.
    Unknown(String),
    /// Text without a leading command.
    PlainText,
}

impl Command {
    pub fn parse(text: &str) -> Self {
        let text = text.trim();
        let Some(rest) = text.strip_prefix('/') else {
            return Command::PlainText;
        };

        let (head, args) = rest
            .split_once(char::is_whitespace)
            .unwrap_or((rest, ""));
        // Group chats address commands as `/en@botname`.
        let name = head.split('@').next().unwrap_or(head).to_lowercase();

        match name.as_str() {
            "start" | "help" => Command::Help,
            "stats" => Command::Stats,
            _ => {
                for language in Language::ALL {
                    if name == language.submit_command() {
                        let word = args.trim().to_string();
                        return if word.is_empty() {
                            Command::MissingWord(language)
                        } else {
                            Command::Submit { language, word }
                        };
                    }
                    if name == language.dump_command() {
                        return Command::Dump(language);
                    }
                }
                Command::Unknown(name)
            }
        }
    }
}
