// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Canned generation payloads and storage layouts.

use std::path::Path;

use lexicard_config::StorageConfig;
use serde_json::json;

/// A valid structured payload for an existing word: two collocations and two
/// gap-fill examples.
pub fn card_json(term: &str) -> String {
    json!({
        "exists": true,
        "normalized_term": term,
        "definition": format!("meaning of {term}"),
        "collocations": [format!("{term} quickly"), format!("{term} away")],
        "examples": [
            "She had to _____ to catch the bus.",
            "They _____ every morning before work.",
        ],
    })
    .to_string()
}

/// The payload stating that the word does not exist.
pub fn missing_json() -> String {
    json!({ "exists": false }).to_string()
}

/// Storage paths rooted at `dir`: history under `dir/data`, exports under
/// `dir/export`.
pub fn storage_config(dir: &Path) -> StorageConfig {
    StorageConfig {
        data_dir: dir.join("data").display().to_string(),
        english_export: dir.join("export/english.txt").display().to_string(),
        german_export: dir.join("export/german.txt").display().to_string(),
    }
}
