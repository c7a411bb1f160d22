// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Durable and in-memory card storage for lexicard.
//!
//! [`HistoryStore`] keeps one JSON file per language recording every term ever
//! accepted. [`BufferManager`] holds accepted cards in memory until they are
//! dumped to the language's export file in the format of [`export`].

pub mod buffer;
pub mod export;
pub mod history;

use std::path::Path;

use lexicard_core::LexicardError;
use tokio::io::AsyncWriteExt;

pub use buffer::BufferManager;
pub use history::HistoryStore;

/// Writes `contents` to `path` via a sibling temp file and a rename, so a
/// reader never sees a half-written file. Missing parent directories are
/// created.
pub(crate) async fn write_atomic(path: &Path, contents: &[u8]) -> Result<(), LexicardError> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .map_err(LexicardError::storage)?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    let mut file = tokio::fs::File::create(tmp_path)
        .await
        .map_err(LexicardError::storage)?;
    file.write_all(contents)
        .await
        .map_err(LexicardError::storage)?;
    file.sync_all().await.map_err(LexicardError::storage)?;
    drop(file);

    tokio::fs::rename(tmp_path, path)
        .await
        .map_err(LexicardError::storage)
}
