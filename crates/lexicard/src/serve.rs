// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! `lexicard serve` command implementation.
//!
//! Wires the OpenRouter provider, the session coordinator and the Telegram
//! channel together and runs the agent loop until SIGINT/SIGTERM.

use std::sync::Arc;

use lexicard_agent::shutdown::install_signal_handler;
use lexicard_agent::{AgentLoop, Router, build_coordinator};
use lexicard_config::LexicardConfig;
use lexicard_core::types::HealthStatus;
use lexicard_core::{ChannelAdapter, LexicardError, PluginAdapter};
use lexicard_openrouter::OpenRouterProvider;
use lexicard_telegram::TelegramChannel;
use tracing::{info, warn};

/// Runs the bot until a shutdown signal arrives.
pub async fn run_serve(config: LexicardConfig) -> Result<(), LexicardError> {
    init_tracing(&config.bot.log_level);

    info!(version = env!("CARGO_PKG_VERSION"), "lexicard starting");

    if config.telegram.allowed_user.is_none() {
        warn!("telegram.allowed_user is not set, every sender will be rejected");
    }

    let provider = Arc::new(OpenRouterProvider::new(&config)?);
    let coordinator = Arc::new(build_coordinator(&config, provider).await?);

    let mut telegram = TelegramChannel::new(&config.telegram)?;
    match telegram.health_check().await? {
        HealthStatus::Healthy => info!("Telegram bot reachable"),
        status => warn!(?status, "Telegram health check failed, polling anyway"),
    }
    telegram.connect().await?;

    let channel: Arc<dyn ChannelAdapter> = Arc::new(telegram);
    let router = Router::new(coordinator, config.telegram.allowed_user.clone());

    let cancel = install_signal_handler();
    AgentLoop::new(channel, router).run(cancel).await?;

    info!("lexicard stopped");
    Ok(())
}

/// Initializes the tracing subscriber with the given log level.
fn init_tracing(log_level: &str) {
    use tracing_subscriber::EnvFilter;

    let filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(format!("lexicard={log_level},warn")));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_thread_names(false)
        .init();
}
