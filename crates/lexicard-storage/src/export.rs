// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Export file format.
//!
//! Each record is `term`, a tab, then the body (which may span several
//! lines). Records are separated by a newline followed by `####`; there is no
//! separator after the last record. Nothing is escaped. This matches Quizlet's
//! custom import with `####` as the card separator.

use lexicard_core::BufferEntry;

/// Separator placed between two records.
pub const RECORD_SEPARATOR: &str = "\n####";

/// Separates the term from the body inside a record.
pub const FIELD_SEPARATOR: char = '\t';

/// Serializes entries in order.
pub fn serialize(entries: &[BufferEntry]) -> String {
    entries
        .iter()
        .map(|entry| format!("{}{FIELD_SEPARATOR}{}", entry.term, entry.body))
        .collect::<Vec<_>>()
        .join(RECORD_SEPARATOR)
}

/// Reads an export file back into entries.
///
/// Records are split on [`RECORD_SEPARATOR`], then on the first tab. A record
/// without a tab yields an empty body.
pub fn parse(content: &str) -> Vec<BufferEntry> {
    if content.is_empty() {
        return Vec::new();
    }
    content
        .split(RECORD_SEPARATOR)
        .map(|record| match record.split_once(FIELD_SEPARATOR) {
            Some((term, body)) => BufferEntry {
                term: term.to_string(),
                body: body.to_string(),
            },
            None => BufferEntry {
                term: record.to_string(),
                body: String::new(),
            },
        })
        .collect()
}
