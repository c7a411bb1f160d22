// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Mock channel adapter for deterministic testing.
//!
//! `MockChannel` implements `ChannelAdapter` with injectable inbound events
//! and captured outbound messages for assertion in tests.

use std::collections::VecDeque;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use chrono::Utc;
use tokio::sync::{Mutex, Notify};

use lexicard_core::LexicardError;
use lexicard_core::traits::adapter::PluginAdapter;
use lexicard_core::traits::channel::ChannelAdapter;
use lexicard_core::types::{
    AdapterType, Decision, Handle, HealthStatus, InboundKind, InboundMessage, MessageId,
    OutboundMessage,
};

/// A mock messaging channel.
///
/// - **inbound**: events injected via [`inject_message`](Self::inject_message)
///   are returned by `receive()`; after [`close`](Self::close) and once the
///   queue is empty, `receive()` fails with a "channel closed" error.
/// - **sent**: every `send()` is captured. New messages get ids
///   `mock-msg-0`, `mock-msg-1`, ...; edits return the id they target.
pub struct MockChannel {
    inbound: Arc<Mutex<VecDeque<InboundMessage>>>,
    sent: Arc<Mutex<Vec<OutboundMessage>>>,
    notify: Arc<Notify>,
    sent_notify: Arc<Notify>,
    next_id: AtomicUsize,
    closed: AtomicBool,
}

impl MockChannel {
    pub fn new() -> Self {
        Self {
            inbound: Arc::new(Mutex::new(VecDeque::new())),
            sent: Arc::new(Mutex::new(Vec::new())),
            notify: Arc::new(Notify::new()),
            sent_notify: Arc::new(Notify::new()),
            next_id: AtomicUsize::new(0),
            closed: AtomicBool::new(false),
        }
    }

    /// Queues an inbound event for the next `receive()`.
    pub async fn inject_message(&self, msg: InboundMessage) {
        self.inbound.lock().await.push_back(msg);
        self.notify.notify_one();
    }

    /// Queues a text message from `sender_id`.
    pub async fn inject_text(&self, sender_id: &str, text: &str) {
        self.inject_message(text_message(sender_id, text)).await;
    }

    /// Queues a button press on the card shown in `card_message`.
    pub async fn inject_decision(
        &self,
        sender_id: &str,
        action: Decision,
        handle: Handle,
        card_message: MessageId,
    ) {
        self.inject_message(InboundMessage {
            id: card_message,
            sender_id: sender_id.to_string(),
            chat_id: MOCK_CHAT.to_string(),
            kind: InboundKind::Decision { action, handle },
            timestamp: Utc::now(),
        })
        .await;
    }

    /// Makes `receive()` fail once the inbound queue is drained.
    pub async fn close(&self) {
        self.closed.store(true, Ordering::SeqCst);
        self.notify.notify_one();
    }

    pub async fn sent_messages(&self) -> Vec<OutboundMessage> {
        self.sent.lock().await.clone()
    }

    pub async fn sent_count(&self) -> usize {
        self.sent.lock().await.len()
    }

    pub async fn clear_sent(&self) {
        self.sent.lock().await.clear();
    }

    /// Id handed out for the `index`-th new (non-edit) message.
    pub fn message_id(&self, index: usize) -> MessageId {
        MessageId(format!("mock-msg-{index}"))
    }

    /// Waits until at least `count` messages have been captured.
    pub async fn wait_for_sent(&self, count: usize) {
        loop {
            let notified = self.sent_notify.notified();
            if self.sent.lock().await.len() >= count {
                return;
            }
            notified.await;
        }
    }
}

impl Default for MockChannel {
    fn default() -> Self {
        Self::new()
    }
}

/// Chat id used by injected events.
pub const MOCK_CHAT: &str = "mock-chat";

/// A text event as the channel would deliver it.
pub fn text_message(sender_id: &str, text: &str) -> InboundMessage {
    InboundMessage {
        id: MessageId(format!("in-{}", Utc::now().timestamp_nanos_opt().unwrap_or_default())),
        sender_id: sender_id.to_string(),
        chat_id: MOCK_CHAT.to_string(),
        kind: InboundKind::Text(text.to_string()),
        timestamp: Utc::now(),
    }
}

#[async_trait]
impl PluginAdapter for MockChannel {
    fn name(&self) -> &str {
        "mock-channel"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Channel
    }

    async fn health_check(&self) -> Result<HealthStatus, LexicardError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LexicardError> {
        Ok(())
    }
}

#[async_trait]
impl ChannelAdapter for MockChannel {
    async fn connect(&mut self) -> Result<(), LexicardError> {
        Ok(())
    }

    async fn send(&self, msg: OutboundMessage) -> Result<MessageId, LexicardError> {
        let id = match &msg.edit {
            Some(target) => target.clone(),
            None => self.message_id(self.next_id.fetch_add(1, Ordering::SeqCst)),
        };
        self.sent.lock().await.push(msg);
        self.sent_notify.notify_waiters();
        Ok(id)
    }

    async fn receive(&self) -> Result<InboundMessage, LexicardError> {
        loop {
            let notified = self.notify.notified();
            {
                let mut queue = self.inbound.lock().await;
                if let Some(msg) = queue.pop_front() {
                    return Ok(msg);
                }
            }
            if self.closed.load(Ordering::SeqCst) {
                return Err(LexicardError::Channel {
                    message: "mock channel closed".into(),
                    source: None,
                });
            }
            notified.await;
        }
    }
}
