// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Channel adapter trait for the chat transport (Telegram).

use async_trait::async_trait;

use crate::error::LexicardError;
use crate::traits::adapter::PluginAdapter;
use crate::types::{InboundMessage, MessageId, OutboundMessage};

/// Bidirectional transport: delivers text and files to the user and yields
/// the user's commands and button presses.
#[async_trait]
pub trait ChannelAdapter: PluginAdapter {
    /// Establishes a connection to the messaging platform.
    async fn connect(&mut self) -> Result<(), LexicardError>;

    /// Sends (or edits, when `msg.edit` is set) a message.
    ///
    /// Returns the id of the message now holding the content.
    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, LexicardError>;

    /// Receives the next inbound event from the channel.
    async fn receive(&self) -> Result<InboundMessage, LexicardError>;
}
