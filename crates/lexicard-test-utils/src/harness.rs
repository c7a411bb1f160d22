// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Test harness for end-to-end integration testing.
//!
//! `TestHarness` assembles the full bot stack (prompts, generator,
//! coordinator, router) over a temp directory with mock adapters, and drives
//! it the way the agent loop does: one inbound event at a time through
//! [`Router::handle`].

use std::sync::Arc;
use std::time::Duration;

use lexicard_agent::{Router, SessionCoordinator, build_coordinator};
use lexicard_config::{LexicardConfig, StorageConfig};
use lexicard_core::types::{InboundMessage, OutboundContent, OutboundMessage};
use lexicard_core::{Decision, Handle, LexicardError, MessageId};

use crate::fixtures;
use crate::mock_channel::{MOCK_CHAT, MockChannel, text_message};
use crate::mock_provider::MockProvider;

/// Sender id the harness authorizes.
pub const TEST_USER: &str = "1001";

/// Builder for creating test environments with configurable options.
pub struct TestHarnessBuilder {
    max_attempts: u32,
    base_delay: Duration,
    max_pending: usize,
    allowed_user: Option<String>,
}

impl TestHarnessBuilder {
    fn new() -> Self {
        Self {
            max_attempts: 3,
            base_delay: Duration::from_millis(10),
            max_pending: 50,
            allowed_user: Some(TEST_USER.to_string()),
        }
    }

    pub fn with_retry(mut self, max_attempts: u32, base_delay: Duration) -> Self {
        self.max_attempts = max_attempts;
        self.base_delay = base_delay;
        self
    }

    pub fn with_max_pending(mut self, max_pending: usize) -> Self {
        self.max_pending = max_pending;
        self
    }

    pub fn with_allowed_user(mut self, allowed_user: Option<String>) -> Self {
        self.allowed_user = allowed_user;
        self
    }

    /// Builds the harness over a fresh temp directory.
    pub async fn build(self) -> Result<TestHarness, LexicardError> {
        let temp_dir = tempfile::TempDir::new().map_err(LexicardError::storage)?;

        let mut config = LexicardConfig::default();
        config.bot.max_pending = self.max_pending;
        config.telegram.allowed_user = self.allowed_user.clone();
        config.generation.max_attempts = self.max_attempts;
        config.generation.base_delay_ms = u64::try_from(self.base_delay.as_millis())
            .map_err(|e| LexicardError::Internal(e.to_string()))?;
        config.storage = fixtures::storage_config(temp_dir.path());

        let mock_provider = Arc::new(MockProvider::new());
        let coordinator = Arc::new(build_coordinator(&config, mock_provider.clone()).await?);
        let router = Router::new(Arc::clone(&coordinator), self.allowed_user);

        Ok(TestHarness {
            mock_provider,
            mock_channel: Arc::new(MockChannel::new()),
            coordinator,
            router,
            config,
            _temp_dir: temp_dir,
        })
    }
}

/// A complete test environment with mock adapters and temp storage.
pub struct TestHarness {
    /// The scripted generation service.
    pub mock_provider: Arc<MockProvider>,
    /// Captures everything the router sends.
    pub mock_channel: Arc<MockChannel>,
    pub coordinator: Arc<SessionCoordinator>,
    pub router: Router,
    pub config: LexicardConfig,
    /// Kept alive for cleanup on drop.
    _temp_dir: tempfile::TempDir,
}

impl TestHarness {
    pub fn builder() -> TestHarnessBuilder {
        TestHarnessBuilder::new()
    }

    pub fn storage(&self) -> &StorageConfig {
        &self.config.storage
    }

    /// Sends `text` as the authorized user and returns the messages the bot
    /// sent in reply.
    pub async fn send_text(&self, text: &str) -> Result<Vec<OutboundMessage>, LexicardError> {
        self.dispatch(text_message(TEST_USER, text)).await
    }

    /// Sends `text` as `sender_id`.
    pub async fn send_text_as(
        &self,
        sender_id: &str,
        text: &str,
    ) -> Result<Vec<OutboundMessage>, LexicardError> {
        self.dispatch(text_message(sender_id, text)).await
    }

    /// Presses a decision button on the card displayed in `card_message`.
    pub async fn decide(
        &self,
        action: Decision,
        handle: Handle,
        card_message: MessageId,
    ) -> Result<Vec<OutboundMessage>, LexicardError> {
        self.dispatch(InboundMessage {
            id: card_message,
            sender_id: TEST_USER.to_string(),
            chat_id: MOCK_CHAT.to_string(),
            kind: lexicard_core::types::InboundKind::Decision { action, handle },
            timestamp: chrono::Utc::now(),
        })
        .await
    }

    /// Submits `word` with the given command and returns the displayed card's
    /// handle and message id. Fails when no card came back.
    pub async fn submit(
        &self,
        command: &str,
        word: &str,
    ) -> Result<(Handle, MessageId), LexicardError> {
        let replies = self.send_text(&format!("/{command} {word}")).await?;
        replies
            .iter()
            .find_map(|msg| match (&msg.content, &msg.edit) {
                (
                    OutboundContent::Text {
                        decisions: Some(handle),
                        ..
                    },
                    Some(target),
                ) => Some((*handle, target.clone())),
                _ => None,
            })
            .ok_or_else(|| LexicardError::Internal(format!("no card displayed for {word:?}")))
    }

    async fn dispatch(&self, msg: InboundMessage) -> Result<Vec<OutboundMessage>, LexicardError> {
        let before = self.mock_channel.sent_count().await;
        match self.router.handle(self.mock_channel.as_ref(), msg).await {
            Ok(()) | Err(LexicardError::NotAuthorized) => {}
            Err(e) => return Err(e),
        }
        let sent = self.mock_channel.sent_messages().await;
        Ok(sent.into_iter().skip(before).collect())
    }
}
