// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Conversion of Telegram updates into channel-agnostic inbound events, and
//! the decision keyboard.
//!
//! Authorization is not decided here: every sender is forwarded and the
//! router answers strangers with the private-bot notice.

use std::str::FromStr;

use lexicard_core::types::{InboundKind, InboundMessage};
use lexicard_core::{Decision, Handle, MessageId};
use teloxide::types::{CallbackQuery, InlineKeyboardButton, InlineKeyboardMarkup, Message};
use tracing::debug;

/// Converts a text message. Non-text messages (stickers, photos, ...) are
/// ignored.
pub fn text_to_inbound(msg: &Message) -> Option<InboundMessage> {
    let Some(text) = msg.text() else {
        debug!(msg_id = msg.id.0, "ignoring non-text message");
        return None;
    };

    let sender_id = msg
        .from
        .as_ref()
        .map(|user| user.id.0.to_string())
        .unwrap_or_else(|| "unknown".to_string());

    Some(InboundMessage {
        id: MessageId(msg.id.0.to_string()),
        sender_id,
        chat_id: msg.chat.id.0.to_string(),
        kind: InboundKind::Text(text.to_string()),
        timestamp: msg.date,
    })
}

/// Converts a button press. Returns `None` when the data is malformed or the
/// card message is not attached to the query.
pub fn callback_to_inbound(query: &CallbackQuery) -> Option<InboundMessage> {
    let data = query.data.as_deref()?;
    let Some((action, handle)) = parse_callback_data(data) else {
        debug!(data, "ignoring malformed callback data");
        return None;
    };
    let message = query.message.as_ref()?;

    Some(InboundMessage {
        id: MessageId(message.id().0.to_string()),
        sender_id: query.from.id.0.to_string(),
        chat_id: message.chat().id.0.to_string(),
        kind: InboundKind::Decision { action, handle },
        timestamp: chrono::Utc::now(),
    })
}

/// Parses `accept:<handle>`, `decline:<handle>` or `regenerate:<handle>`.
pub fn parse_callback_data(data: &str) -> Option<(Decision, Handle)> {
    let (action, handle) = data.split_once(':')?;
    let action = Decision::from_str(action).ok()?;
    let handle = Handle::from_str(handle).ok()?;
    Some((action, handle))
}

pub fn callback_data(action: Decision, handle: Handle) -> String {
    format!("{action}:{handle}")
}

/// The three decision buttons for a pending card, in one row.
pub fn decision_keyboard(handle: Handle) -> InlineKeyboardMarkup {
    let row = [Decision::Accept, Decision::Decline, Decision::Regenerate]
        .into_iter()
        .map(|action| InlineKeyboardButton::callback(button_label(action), callback_data(action, handle)))
        .collect::<Vec<_>>();
    InlineKeyboardMarkup::new(vec![row])
}

/// Toast shown while a button press is processed.
pub fn callback_notice(action: Decision) -> Option<&'static str> {
    match action {
        Decision::Regenerate => Some("🔄 Regenerating..."),
        Decision::Accept | Decision::Decline => None,
    }
}

fn button_label(action: Decision) -> &'static str {
    match action {
        Decision::Accept => "✅ Accept",
        Decision::Decline => "❌ Decline",
        Decision::Regenerate => "🔄 Regenerate",
    }
}
