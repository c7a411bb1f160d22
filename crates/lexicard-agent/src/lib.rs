// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Card generation, session coordination and the agent loop for lexicard.
//!
//! The [`AgentLoop`] receives events from a channel adapter and hands each one
//! to the [`Router`] on its own task. The router talks to the single
//! [`SessionCoordinator`], which owns the pending cards, the history store and
//! the buffers, and calls the [`CardGenerator`] for new cards.

pub mod commands;
pub mod format;
pub mod generator;
pub mod prompts;
pub mod router;
pub mod session;
pub mod shutdown;

use std::sync::Arc;
use std::time::Duration;

use lexicard_config::LexicardConfig;
use lexicard_core::{ChannelAdapter, LexicardError, ProviderAdapter};
use lexicard_storage::{BufferManager, HistoryStore};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info};

pub use generator::{CardGenerator, RetryPolicy};
pub use prompts::PromptSet;
pub use router::Router;
pub use session::{
    AcceptOutcome, LanguageStats, RegenerateOutcome, SessionCoordinator, SubmitOutcome,
};

/// How long in-flight requests get to finish after a shutdown signal.
pub const DEFAULT_DRAIN_TIMEOUT: Duration = Duration::from_secs(30);

/// Builds the coordinator from config: loads the prompts, opens the history
/// files and prepares empty buffers.
pub async fn build_coordinator(
    config: &LexicardConfig,
    provider: Arc<dyn ProviderAdapter>,
) -> Result<SessionCoordinator, LexicardError> {
    let prompts = PromptSet::load(&config.generation).await?;
    let generator = CardGenerator::new(provider, prompts, RetryPolicy::from_config(&config.generation));
    let history = HistoryStore::open(&config.storage).await;
    let buffers = BufferManager::new(&config.storage);
    Ok(SessionCoordinator::new(
        generator,
        history,
        buffers,
        config.bot.max_pending,
    ))
}

/// Receives channel events and dispatches each on its own task.
pub struct AgentLoop {
    channel: Arc<dyn ChannelAdapter>,
    router: Arc<Router>,
    drain_timeout: Duration,
}

impl AgentLoop {
    /// `channel` must already be connected.
    pub fn new(channel: Arc<dyn ChannelAdapter>, router: Router) -> Self {
        Self {
            channel,
            router: Arc::new(router),
            drain_timeout: DEFAULT_DRAIN_TIMEOUT,
        }
    }

    pub fn with_drain_timeout(mut self, timeout: Duration) -> Self {
        self.drain_timeout = timeout;
        self
    }

    /// Runs until `cancel` fires or the channel closes, then drains in-flight
    /// requests.
    pub async fn run(self, cancel: CancellationToken) -> Result<(), LexicardError> {
        info!(channel = self.channel.name(), "agent loop running");
        let mut tasks = JoinSet::new();

        loop {
            tokio::select! {
                _ = cancel.cancelled() => {
                    info!("shutdown signal received, stopping agent loop");
                    break;
                }
                msg = self.channel.receive() => {
                    match msg {
                        Ok(inbound) => {
                            let channel = Arc::clone(&self.channel);
                            let router = Arc::clone(&self.router);
                            tasks.spawn(async move {
                                match router.handle(channel.as_ref(), inbound).await {
                                    Ok(()) => {}
                                    Err(LexicardError::NotAuthorized) => {}
                                    Err(e) => error!(error = %e, "failed to handle inbound message"),
                                }
                            });
                        }
                        Err(e) => {
                            error!(error = %e, "channel receive error");
                            if is_closed(&e) {
                                break;
                            }
                        }
                    }
                }
                Some(joined) = tasks.join_next(), if !tasks.is_empty() => {
                    if let Err(e) = joined {
                        error!(error = %e, "request task failed");
                    }
                }
            }
        }

        let aborted = shutdown::drain_tasks(&mut tasks, self.drain_timeout).await;
        debug!(aborted, "drain finished");

        if let Err(e) = self.channel.shutdown().await {
            error!(error = %e, "channel shutdown failed");
        }
        let pending = self.router.coordinator().pending_count().await;
        info!(pending, "agent loop stopped");
        Ok(())
    }
}

fn is_closed(error: &LexicardError) -> bool {
    matches!(error, LexicardError::Channel { message, .. } if message.contains("closed"))
}
