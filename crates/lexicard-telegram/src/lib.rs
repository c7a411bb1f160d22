// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Telegram channel adapter for lexicard.
//!
//! Implements [`ChannelAdapter`] for the Telegram Bot API via teloxide:
//! long polling for text messages and button presses, inline decision
//! keyboards, edit-in-place replies, document delivery and splitting of
//! long texts.

pub mod handler;
pub mod split;

use async_trait::async_trait;
use lexicard_config::TelegramConfig;
use lexicard_core::LexicardError;
use lexicard_core::traits::{ChannelAdapter, PluginAdapter};
use lexicard_core::types::{
    AdapterType, HealthStatus, InboundKind, InboundMessage, MessageId, OutboundContent, OutboundMessage,
};
use lexicard_core::{Handle, error::truncate_chars};
use teloxide::dispatching::ShutdownToken;
use teloxide::prelude::*;
use teloxide::types::{ChatId, InputFile};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Capacity of the queue between the polling task and `receive()`.
const INBOUND_QUEUE: usize = 100;

/// Telegram channel adapter implementing [`ChannelAdapter`].
pub struct TelegramChannel {
    bot: Bot,
    inbound_rx: tokio::sync::Mutex<mpsc::Receiver<InboundMessage>>,
    inbound_tx: mpsc::Sender<InboundMessage>,
    polling_handle: Option<tokio::task::JoinHandle<()>>,
    shutdown_token: Option<ShutdownToken>,
}

impl TelegramChannel {
    /// Requires `config.bot_token` to be set and non-empty.
    pub fn new(config: &TelegramConfig) -> Result<Self, LexicardError> {
        let token = config.bot_token.as_deref().ok_or_else(|| {
            LexicardError::Config("telegram.bot_token is required for the Telegram adapter".into())
        })?;

        if token.trim().is_empty() {
            return Err(LexicardError::Config(
                "telegram.bot_token cannot be empty".into(),
            ));
        }

        let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_QUEUE);

        Ok(Self {
            bot: Bot::new(token.trim()),
            inbound_rx: tokio::sync::Mutex::new(inbound_rx),
            inbound_tx,
            polling_handle: None,
            shutdown_token: None,
        })
    }

    pub fn bot(&self) -> &Bot {
        &self.bot
    }

    async fn send_text(
        &self,
        chat_id: ChatId,
        text: &str,
        decisions: Option<Handle>,
        edit: Option<&MessageId>,
    ) -> Result<MessageId, LexicardError> {
        let chunks = split::split_message(text);
        let mut first_id = None;

        for (index, chunk) in chunks.iter().enumerate() {
            // The keyboard goes on the first message, which is the one the
            // decision callbacks point at.
            let keyboard = decisions
                .filter(|_| index == 0)
                .map(handler::decision_keyboard);

            let id = match edit.filter(|_| index == 0) {
                Some(target) => {
                    let target = parse_message_id(target)?;
                    self.edit_text(chat_id, target, chunk, keyboard).await?;
                    target
                }
                None => {
                    let mut request = self.bot.send_message(chat_id, chunk.as_str());
                    if let Some(keyboard) = keyboard {
                        request = request.reply_markup(keyboard);
                    }
                    request.await.map_err(|e| channel_error("failed to send message", e))?.id
                }
            };
            first_id.get_or_insert(id);
        }

        match first_id {
            Some(id) => Ok(MessageId(id.0.to_string())),
            // Nothing to send for empty text; an edit keeps its target.
            None => edit.cloned().ok_or_else(|| LexicardError::Channel {
                message: "refusing to send an empty message".into(),
                source: None,
            }),
        }
    }

    async fn edit_text(
        &self,
        chat_id: ChatId,
        message_id: teloxide::types::MessageId,
        text: &str,
        keyboard: Option<teloxide::types::InlineKeyboardMarkup>,
    ) -> Result<(), LexicardError> {
        let mut request = self.bot.edit_message_text(chat_id, message_id, text);
        if let Some(keyboard) = keyboard {
            request = request.reply_markup(keyboard);
        }

        match request.await {
            Ok(_) => Ok(()),
            Err(e) if e.to_string().contains("message is not modified") => {
                debug!(message_id = message_id.0, "edit left message unchanged");
                Ok(())
            }
            Err(e) => Err(channel_error("failed to edit message", e)),
        }
    }
}

#[async_trait]
impl PluginAdapter for TelegramChannel {
    fn name(&self) -> &str {
        "telegram"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, LexicardError> {
        match self.bot.get_me().await {
            Ok(_) => Ok(HealthStatus::Healthy),
            Err(e) => Ok(HealthStatus::Unhealthy(format!(
                "Telegram bot unreachable: {e}"
            ))),
        }
    }

    async fn shutdown(&self) -> Result<(), LexicardError> {
        debug!("Telegram channel shutting down");
        if let Some(token) = &self.shutdown_token {
            match token.shutdown() {
                Ok(stopped) => stopped.await,
                Err(_) => debug!("dispatcher was not running"),
            }
        }
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for TelegramChannel {
    async fn connect(&mut self) -> Result<(), LexicardError> {
        if self.polling_handle.is_some() {
            return Ok(());
        }

        let message_tx = self.inbound_tx.clone();
        let callback_tx = self.inbound_tx.clone();

        info!("starting Telegram long polling");

        let handler = dptree::entry()
            .branch(Update::filter_message().endpoint(move |msg: Message| {
                let tx = message_tx.clone();
                async move {
                    if let Some(inbound) = handler::text_to_inbound(&msg)
                        && tx.send(inbound).await.is_err()
                    {
                        warn!("inbound channel closed, dropping message");
                    }
                    respond(())
                }
            }))
            .branch(Update::filter_callback_query().endpoint(
                move |bot: Bot, query: CallbackQuery| {
                    let tx = callback_tx.clone();
                    async move {
                        let inbound = handler::callback_to_inbound(&query);
                        let notice = inbound.as_ref().and_then(|inbound| match inbound.kind {
                            InboundKind::Decision { action, .. } => {
                                handler::callback_notice(action)
                            }
                            InboundKind::Text(_) => None,
                        });

                        let mut answer = bot.answer_callback_query(query.id.clone());
                        if let Some(notice) = notice {
                            answer = answer.text(notice);
                        }
                        if let Err(e) = answer.await {
                            debug!(error = %e, "failed to answer callback query");
                        }

                        if let Some(inbound) = inbound
                            && tx.send(inbound).await.is_err()
                        {
                            warn!("inbound channel closed, dropping button press");
                        }
                        respond(())
                    }
                },
            ));

        let mut dispatcher = Dispatcher::builder(self.bot.clone(), handler)
            .default_handler(|_| async {})
            .build();
        self.shutdown_token = Some(dispatcher.shutdown_token());

        self.polling_handle = Some(tokio::spawn(async move {
            dispatcher.dispatch().await;
        }));
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, LexicardError> {
        let chat_id = parse_chat_id(&msg.chat_id)?;

        match msg.content {
            OutboundContent::Text { text, decisions } => {
                self.send_text(chat_id, &text, decisions, msg.edit.as_ref())
                    .await
            }
            OutboundContent::Document {
                path,
                file_name,
                caption,
            } => {
                debug!(path = %path.display(), file_name = %file_name, "sending document");
                let sent = self
                    .bot
                    .send_document(chat_id, InputFile::file(path).file_name(file_name))
                    .caption(truncate_chars(&caption, MAX_CAPTION_CHARS))
                    .await
                    .map_err(|e| channel_error("failed to send document", e))?;
                Ok(MessageId(sent.id.0.to_string()))
            }
        }
    }

    async fn receive(&self) -> Result<InboundMessage, LexicardError> {
        let mut rx = self.inbound_rx.lock().await;
        rx.recv().await.ok_or_else(|| LexicardError::Channel {
            message: "Telegram inbound channel closed".into(),
            source: None,
        })
    }
}

/// Telegram's limit on document captions.
const MAX_CAPTION_CHARS: usize = 1024;

fn parse_chat_id(chat_id: &str) -> Result<ChatId, LexicardError> {
    chat_id
        .parse::<i64>()
        .map(ChatId)
        .map_err(|e| LexicardError::Channel {
            message: format!("invalid chat_id `{chat_id}`: {e}"),
            source: None,
        })
}

fn parse_message_id(id: &MessageId) -> Result<teloxide::types::MessageId, LexicardError> {
    id.0.parse::<i32>()
        .map(teloxide::types::MessageId)
        .map_err(|e| LexicardError::Channel {
            message: format!("invalid message_id `{}`: {e}", id.0),
            source: None,
        })
}

fn channel_error(context: &str, e: teloxide::RequestError) -> LexicardError {
    LexicardError::Channel {
        message: format!("{context}: {e}"),
        source: Some(Box::new(e)),
    }
}
