// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Turns inbound events into coordinator calls and their results into
//! outbound messages.

use std::sync::Arc;

use lexicard_core::traits::ChannelAdapter;
use lexicard_core::types::{InboundKind, InboundMessage, OutboundContent, OutboundMessage};
use lexicard_core::{Decision, Handle, Language, LexicardError, MessageId};
use tracing::{debug, error, warn};

use crate::commands::Command;
use crate::format;
use crate::session::{RegenerateOutcome, SessionCoordinator, SubmitOutcome};

/// Dispatches one inbound event for the single authorized user.
pub struct Router {
    coordinator: Arc<SessionCoordinator>,
    allowed_user: Option<String>,
}

impl Router {
    /// `allowed_user` is the only sender served. With `None` every sender is
    /// turned away.
    pub fn new(coordinator: Arc<SessionCoordinator>, allowed_user: Option<String>) -> Self {
        Self {
            coordinator,
            allowed_user,
        }
    }

    pub fn coordinator(&self) -> &Arc<SessionCoordinator> {
        &self.coordinator
    }

    pub fn is_authorized(&self, sender_id: &str) -> bool {
        self.allowed_user
            .as_deref()
            .is_some_and(|allowed| allowed == sender_id)
    }

    /// Handles one inbound event, replying through `channel`.
    ///
    /// Only delivery failures are returned; every coordinator error is turned
    /// into a user-facing reply.
    pub async fn handle(
        &self,
        channel: &dyn ChannelAdapter,
        msg: InboundMessage,
    ) -> Result<(), LexicardError> {
        if !self.is_authorized(&msg.sender_id) {
            warn!(sender_id = %msg.sender_id, "rejected message from unauthorized sender");
            channel
                .send(OutboundMessage::text(&msg.chat_id, format::NOT_AUTHORIZED))
                .await?;
            return Err(LexicardError::NotAuthorized);
        }

        match msg.kind {
            InboundKind::Text(ref text) => {
                let command = Command::parse(text);
                debug!(?command, "dispatching command");
                self.handle_command(channel, &msg.chat_id, command).await
            }
            InboundKind::Decision { action, handle } => {
                debug!(%action, %handle, "dispatching decision");
                self.handle_decision(channel, &msg.chat_id, &msg.id, action, handle)
                    .await
            }
        }
    }

    async fn handle_command(
        &self,
        channel: &dyn ChannelAdapter,
        chat_id: &str,
        command: Command,
    ) -> Result<(), LexicardError> {
        let reply = match command {
            Command::Help | Command::Unknown(_) => format::welcome(),
            Command::PlainText => format::language_hint(),
            Command::MissingWord(language) => format::usage_hint(language),
            Command::Stats => format::stats(&self.coordinator.stats().await),
            Command::Dump(language) => return self.dump(channel, chat_id, language).await,
            Command::Submit { language, word } => {
                return self.submit(channel, chat_id, &word, language).await;
            }
        };
        channel.send(OutboundMessage::text(chat_id, reply)).await?;
        Ok(())
    }

    async fn submit(
        &self,
        channel: &dyn ChannelAdapter,
        chat_id: &str,
        word: &str,
        language: Language,
    ) -> Result<(), LexicardError> {
        if let Some(entry) = self.coordinator.check_duplicate(word, language).await {
            channel
                .send(OutboundMessage::text(chat_id, format::duplicate_warning(&entry)))
                .await?;
        }
        let processing = channel
            .send(OutboundMessage::text(chat_id, format::PROCESSING))
            .await?;

        let (text, decisions) = match self.coordinator.submit(word, language).await {
            Ok(SubmitOutcome::Pending(card)) => (format::render_card(&card, false), Some(card.handle)),
            Ok(SubmitOutcome::NotFound) => (format::word_not_found(word, language), None),
            Ok(SubmitOutcome::Failed(e)) => {
                error!(%language, attempts = e.attempts, error = %e.message, "card generation failed");
                (format::generation_failed("create", word, &e), None)
            }
            Err(LexicardError::PendingLimit { limit }) => (format::pending_limit(limit), None),
            Err(e) => {
                error!(%language, error = %e, "unexpected error while submitting");
                (format::unexpected_error(&e.to_string()), None)
            }
        };

        channel
            .send(edit(chat_id, processing, text, decisions))
            .await?;
        Ok(())
    }

    async fn dump(
        &self,
        channel: &dyn ChannelAdapter,
        chat_id: &str,
        language: Language,
    ) -> Result<(), LexicardError> {
        let reply = match self.coordinator.dump(language).await {
            Ok(Some(path)) => OutboundMessage {
                chat_id: chat_id.to_string(),
                content: OutboundContent::Document {
                    path,
                    file_name: format::export_file_name(language),
                    caption: format::export_caption(language),
                },
                edit: None,
            },
            Ok(None) => OutboundMessage::text(chat_id, format::empty_buffer(language)),
            Err(e) => {
                error!(%language, error = %e, "failed to dump buffer");
                OutboundMessage::text(chat_id, format::dump_failed(language))
            }
        };
        channel.send(reply).await?;
        Ok(())
    }

    async fn handle_decision(
        &self,
        channel: &dyn ChannelAdapter,
        chat_id: &str,
        card_message: &MessageId,
        action: Decision,
        handle: Handle,
    ) -> Result<(), LexicardError> {
        let result = match action {
            Decision::Accept => self.coordinator.accept(handle).await.map(|accepted| {
                (
                    format::accepted(&accepted.card, accepted.added, accepted.history_saved),
                    None,
                )
            }),
            Decision::Decline => self
                .coordinator
                .decline(handle)
                .await
                .map(|card| (format::declined(&card), None)),
            Decision::Regenerate => self.coordinator.regenerate(handle).await.map(|outcome| {
                match outcome {
                    RegenerateOutcome::Replaced(card) => {
                        (format::render_card(&card, true), Some(card.handle))
                    }
                    RegenerateOutcome::NotFound(card) => (
                        format::regenerated_missing(&card.term_identifier, card.language),
                        None,
                    ),
                    RegenerateOutcome::Failed { card, error } => {
                        error!(%handle, attempts = error.attempts, error = %error.message, "card regeneration failed");
                        (
                            format::generation_failed("regenerate", &card.term_identifier, &error),
                            None,
                        )
                    }
                }
            }),
        };

        let (text, decisions) = match result {
            Ok(reply) => reply,
            Err(LexicardError::PendingNotFound { .. }) => {
                debug!(%handle, %action, "decision on unavailable card");
                (format::CARD_UNAVAILABLE.to_string(), None)
            }
            Err(e) => {
                error!(%handle, %action, error = %e, "decision failed");
                (format::unexpected_error(&e.to_string()), None)
            }
        };

        channel
            .send(edit(chat_id, card_message.clone(), text, decisions))
            .await?;
        Ok(())
    }
}

fn edit(chat_id: &str, target: MessageId, text: String, decisions: Option<Handle>) -> OutboundMessage {
    OutboundMessage {
        chat_id: chat_id.to_string(),
        content: OutboundContent::Text { text, decisions },
        edit: Some(target),
    }
}
