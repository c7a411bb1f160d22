// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Splitting of long texts into Telegram-sized messages.

/// Characters per message, below Telegram's 4096 limit to leave room for
/// emoji that count double on Telegram's side.
pub const SAFE_MESSAGE_LENGTH: usize = 3800;

/// A newline is used as the cut point only past this share of a chunk.
const MIN_SPLIT_RATIO_PERCENT: usize = 70;

/// Splits `text` into chunks of at most [`SAFE_MESSAGE_LENGTH`] characters.
///
/// Each cut prefers the last newline in the chunk when it lies in the final
/// 30%; the newline itself is dropped. Otherwise the chunk is cut hard.
pub fn split_message(text: &str) -> Vec<String> {
    split_with_limit(text, SAFE_MESSAGE_LENGTH)
}

fn split_with_limit(text: &str, limit: usize) -> Vec<String> {
    let min_newline = limit * MIN_SPLIT_RATIO_PERCENT / 100;
    let mut chunks = Vec::new();
    let mut remaining = text;

    while !remaining.is_empty() {
        let Some((cut, _)) = remaining.char_indices().nth(limit) else {
            chunks.push(remaining.to_string());
            break;
        };

        let chunk = &remaining[..cut];
        match chunk.rfind('\n') {
            Some(newline) if chunk[..newline].chars().count() > min_newline => {
                chunks.push(chunk[..newline].to_string());
                remaining = &remaining[newline + 1..];
            }
            _ => {
                chunks.push(chunk.to_string());
                remaining = &remaining[cut..];
            }
        }
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn short_text_is_one_chunk() {
        assert_eq!(split_message("hello"), vec!["hello".to_string()]);
        assert!(split_message("").is_empty());
    }

    #[test]
    fn exact_limit_is_not_split() {
        let text = "a".repeat(SAFE_MESSAGE_LENGTH);
        assert_eq!(split_message(&text).len(), 1);
    }

    #[test]
    fn late_newline_is_preferred() {
        let text = format!("{}\n{}", "a".repeat(8), "b".repeat(5));
        assert_eq!(split_with_limit(&text, 10), vec!["a".repeat(8), "b".repeat(5)]);
    }

    #[test]
    fn early_newline_is_ignored() {
        let text = format!("{}\n{}", "a".repeat(3), "b".repeat(10));
        let chunks = split_with_limit(&text, 10);
        assert_eq!(chunks[0], format!("aaa\n{}", "b".repeat(6)));
        assert_eq!(chunks[1], "bbbb");
    }

    #[test]
    fn multibyte_text_splits_on_char_boundaries() {
        let text = "ä".repeat(25);
        let chunks = split_with_limit(&text, 10);
        assert_eq!(chunks.len(), 3);
        assert_eq!(chunks[2].chars().count(), 5);
        assert_eq!(chunks.concat(), text);
    }
}
