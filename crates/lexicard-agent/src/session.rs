// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Session coordinator: owns the pending cards, the history store and the
//! buffers, and drives the submit/accept/decline/regenerate transitions.
//!
//! Generation never runs under a lock. The pending map and the stores each
//! sit behind their own `tokio::sync::Mutex`; the stores share one so every
//! mutation of per-language state is serialized.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::atomic::{AtomicU64, Ordering};

use chrono::Utc;
use lexicard_core::{
    BufferStats, Card, GenerationError, Handle, HistoryEntry, Language, LexicardError,
    PendingCard,
};
use lexicard_storage::{BufferManager, HistoryStore};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use crate::format::format_body;
use crate::generator::CardGenerator;

/// Result of [`SessionCoordinator::submit`].
#[derive(Debug)]
pub enum SubmitOutcome {
    /// The card is waiting for a decision under `PendingCard::handle`.
    Pending(PendingCard),
    /// The service says the word does not exist; nothing was retained.
    NotFound,
    /// The generator gave up.
    Failed(GenerationError),
}

/// Result of a successful [`SessionCoordinator::accept`].
#[derive(Debug)]
pub struct AcceptOutcome {
    pub card: PendingCard,
    /// Buffer entries added; always 1.
    pub added: usize,
    /// False when the history file could not be written. The card is in the
    /// buffer regardless.
    pub history_saved: bool,
}

/// Result of [`SessionCoordinator::regenerate`].
#[derive(Debug)]
pub enum RegenerateOutcome {
    /// The card was replaced in place.
    Replaced(PendingCard),
    /// The new attempt says the word does not exist; the card was removed.
    NotFound(PendingCard),
    /// The generator gave up; the card was removed.
    Failed {
        card: PendingCard,
        error: GenerationError,
    },
}

/// Per-language numbers for the stats view.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LanguageStats {
    pub language: Language,
    pub buffer: BufferStats,
    pub history_total: usize,
}

struct Stores {
    history: HistoryStore,
    buffers: BufferManager,
}

/// Single owner of all mutable bot state.
pub struct SessionCoordinator {
    generator: CardGenerator,
    pending: Mutex<HashMap<Handle, PendingCard>>,
    stores: Mutex<Stores>,
    next_handle: AtomicU64,
    max_pending: usize,
}

impl SessionCoordinator {
    pub fn new(
        generator: CardGenerator,
        history: HistoryStore,
        buffers: BufferManager,
        max_pending: usize,
    ) -> Self {
        Self {
            generator,
            pending: Mutex::new(HashMap::new()),
            stores: Mutex::new(Stores { history, buffers }),
            next_handle: AtomicU64::new(1),
            max_pending: max_pending.max(1),
        }
    }

    /// Earlier history entry for `term`, if any. Informational only.
    pub async fn check_duplicate(&self, term: &str, language: Language) -> Option<HistoryEntry> {
        self.stores
            .lock()
            .await
            .history
            .lookup(term, language)
            .cloned()
    }

    /// Generates a card for `term_identifier` and parks it as pending.
    ///
    /// Fails with [`LexicardError::PendingLimit`] when too many cards are
    /// already awaiting a decision; the limit is checked before generating
    /// and again when inserting.
    pub async fn submit(
        &self,
        term_identifier: &str,
        language: Language,
    ) -> Result<SubmitOutcome, LexicardError> {
        self.ensure_capacity().await?;
        let duplicate = self.check_duplicate(term_identifier, language).await;

        let body = match self.generator.generate(term_identifier, language).await {
            Ok(Card::Found(body)) => body,
            Ok(Card::Missing) => {
                info!(%language, "word not found");
                return Ok(SubmitOutcome::NotFound);
            }
            Err(error) => return Ok(SubmitOutcome::Failed(error)),
        };

        let mut pending = self.pending.lock().await;
        if pending.len() >= self.max_pending {
            return Err(LexicardError::PendingLimit {
                limit: self.max_pending,
            });
        }
        let card = PendingCard {
            handle: Handle(self.next_handle.fetch_add(1, Ordering::Relaxed)),
            term_identifier: term_identifier.to_string(),
            card: body,
            language,
            created_at: Utc::now(),
            is_duplicate: duplicate.is_some(),
            duplicate_info: duplicate,
        };
        pending.insert(card.handle, card.clone());
        debug!(handle = %card.handle, %language, pending = pending.len(), "card pending");
        Ok(SubmitOutcome::Pending(card))
    }

    /// Moves a pending card into the buffer and the history.
    ///
    /// The card leaves the pending set first, so a repeated accept fails with
    /// [`LexicardError::PendingNotFound`]. A history write failure is logged
    /// and reported through [`AcceptOutcome::history_saved`]; the buffer
    /// append stands.
    pub async fn accept(&self, handle: Handle) -> Result<AcceptOutcome, LexicardError> {
        let card = self.take(handle).await?;
        let body = format_body(&card.card);

        let mut stores = self.stores.lock().await;
        stores
            .buffers
            .append(&card.term_identifier, &body, card.language);
        let history_saved = match stores
            .history
            .record(&card.term_identifier, card.language, &card.card.definition)
            .await
        {
            Ok(_) => true,
            Err(e) => {
                warn!(%handle, language = %card.language, error = %e, "failed to persist history entry");
                false
            }
        };
        let stats = stores.buffers.stats(card.language);
        drop(stores);

        info!(
            %handle,
            language = %card.language,
            cards_in_buffer = stats.cards_in_buffer,
            "card accepted"
        );
        Ok(AcceptOutcome {
            card,
            added: 1,
            history_saved,
        })
    }

    /// Drops a pending card without touching the buffer or history.
    pub async fn decline(&self, handle: Handle) -> Result<PendingCard, LexicardError> {
        let card = self.take(handle).await?;
        info!(%handle, language = %card.language, "card declined");
        Ok(card)
    }

    /// Generates a fresh card for the same word and language.
    ///
    /// On success the card is replaced in place; handle and duplicate flags
    /// stay. On failure, or when the word now comes back as missing, the
    /// pending card is removed. If the card was resolved while generating,
    /// the new result is discarded and this fails with
    /// [`LexicardError::PendingNotFound`].
    pub async fn regenerate(&self, handle: Handle) -> Result<RegenerateOutcome, LexicardError> {
        let (term, language) = {
            let pending = self.pending.lock().await;
            let card = pending
                .get(&handle)
                .ok_or(LexicardError::PendingNotFound { handle })?;
            (card.term_identifier.clone(), card.language)
        };

        let result = self.generator.generate(&term, language).await;

        let mut pending = self.pending.lock().await;
        let Some(card) = pending.get_mut(&handle) else {
            debug!(%handle, "card resolved during regeneration");
            return Err(LexicardError::PendingNotFound { handle });
        };

        match result {
            Ok(Card::Found(body)) => {
                card.card = body;
                info!(%handle, %language, "card regenerated");
                Ok(RegenerateOutcome::Replaced(card.clone()))
            }
            Ok(Card::Missing) => {
                let card = pending
                    .remove(&handle)
                    .ok_or(LexicardError::PendingNotFound { handle })?;
                info!(%handle, %language, "regenerated word not found, card removed");
                Ok(RegenerateOutcome::NotFound(card))
            }
            Err(error) => {
                let card = pending
                    .remove(&handle)
                    .ok_or(LexicardError::PendingNotFound { handle })?;
                warn!(%handle, %language, attempts = error.attempts, "regeneration failed, card removed");
                Ok(RegenerateOutcome::Failed { card, error })
            }
        }
    }

    /// Writes the language's buffer to its export file and clears it.
    ///
    /// `None` when the buffer was empty. On a write error the buffer is kept.
    pub async fn dump(&self, language: Language) -> Result<Option<PathBuf>, LexicardError> {
        self.stores
            .lock()
            .await
            .buffers
            .dump_and_clear(language)
            .await
    }

    pub async fn stats(&self) -> Vec<LanguageStats> {
        let stores = self.stores.lock().await;
        let totals = stores.history.count_by_language();
        Language::ALL
            .into_iter()
            .map(|language| LanguageStats {
                language,
                buffer: stores.buffers.stats(language),
                history_total: totals.get(&language).copied().unwrap_or_default(),
            })
            .collect()
    }

    pub async fn pending_count(&self) -> usize {
        self.pending.lock().await.len()
    }

    pub async fn is_pending(&self, handle: Handle) -> bool {
        self.pending.lock().await.contains_key(&handle)
    }

    pub fn max_pending(&self) -> usize {
        self.max_pending
    }

    async fn ensure_capacity(&self) -> Result<(), LexicardError> {
        if self.pending.lock().await.len() >= self.max_pending {
            return Err(LexicardError::PendingLimit {
                limit: self.max_pending,
            });
        }
        Ok(())
    }

    async fn take(&self, handle: Handle) -> Result<PendingCard, LexicardError> {
        self.pending
            .lock()
            .await
            .remove(&handle)
            .ok_or(LexicardError::PendingNotFound { handle })
    }
}
