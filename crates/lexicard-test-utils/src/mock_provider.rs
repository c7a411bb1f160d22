// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Scripted generation service for deterministic testing.
//!
//! `MockProvider` implements `ProviderAdapter` by popping one scripted result
//! per call and recording every request together with the (tokio) instant it
//! arrived, so retry timing can be asserted under paused time.

use std::collections::VecDeque;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;
use tokio::time::Instant;

use lexicard_core::error::{ErrorKind, ServiceError};
use lexicard_core::traits::adapter::PluginAdapter;
use lexicard_core::traits::provider::ProviderAdapter;
use lexicard_core::types::{AdapterType, HealthStatus, ProviderRequest, ProviderResponse};
use lexicard_core::LexicardError;

/// One request seen by the mock.
#[derive(Debug, Clone)]
pub struct MockCall {
    pub at: Instant,
    pub request: ProviderRequest,
}

/// A provider that answers from a FIFO script.
///
/// An empty script answers with an `Unexpected` error, which the generator
/// treats as retryable.
pub struct MockProvider {
    script: Arc<Mutex<VecDeque<Result<String, ServiceError>>>>,
    calls: Arc<Mutex<Vec<MockCall>>>,
}

impl MockProvider {
    pub fn new() -> Self {
        Self {
            script: Arc::new(Mutex::new(VecDeque::new())),
            calls: Arc::new(Mutex::new(Vec::new())),
        }
    }

    /// Queues a successful response carrying `content`.
    pub async fn push_ok(&self, content: String) {
        self.script.lock().await.push_back(Ok(content));
    }

    /// Queues a failed attempt.
    pub async fn push_err(&self, error: ServiceError) {
        self.script.lock().await.push_back(Err(error));
    }

    pub async fn calls(&self) -> Vec<MockCall> {
        self.calls.lock().await.clone()
    }

    pub async fn call_count(&self) -> usize {
        self.calls.lock().await.len()
    }

    /// Scripted results not consumed yet.
    pub async fn remaining(&self) -> usize {
        self.script.lock().await.len()
    }
}

impl Default for MockProvider {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl PluginAdapter for MockProvider {
    fn name(&self) -> &str {
        "mock-provider"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, LexicardError> {
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LexicardError> {
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for MockProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ServiceError> {
        let call_number = {
            let mut calls = self.calls.lock().await;
            calls.push(MockCall {
                at: Instant::now(),
                request,
            });
            calls.len()
        };

        let next = self.script.lock().await.pop_front().unwrap_or_else(|| {
            Err(ServiceError::new(
                ErrorKind::Unexpected,
                "mock provider script exhausted",
            ))
        });

        next.map(|content| ProviderResponse {
            id: format!("mock-resp-{call_number}"),
            content,
            model: "mock-model".to_string(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fixtures;

    fn request(word: &str) -> ProviderRequest {
        ProviderRequest {
            system_prompt: "prompt".into(),
            user_input: word.into(),
            schema_name: "card".into(),
            schema: serde_json::json!({}),
        }
    }

    #[tokio::test]
    async fn script_is_consumed_in_order() {
        let provider = MockProvider::new();
        provider.push_ok(fixtures::card_json("run")).await;
        provider
            .push_err(ServiceError::new(ErrorKind::ServiceStatus { code: 503 }, "down"))
            .await;

        let first = provider.complete(request("run")).await.unwrap();
        assert_eq!(first.id, "mock-resp-1");
        let second = provider.complete(request("run")).await.unwrap_err();
        assert_eq!(second.kind, ErrorKind::ServiceStatus { code: 503 });
        let third = provider.complete(request("run")).await.unwrap_err();
        assert_eq!(third.kind, ErrorKind::Unexpected);

        assert_eq!(provider.call_count().await, 3);
        assert_eq!(provider.remaining().await, 0);
    }

    #[tokio::test(start_paused = true)]
    async fn calls_record_arrival_time() {
        let provider = MockProvider::new();
        provider.complete(request("a")).await.unwrap_err();
        tokio::time::sleep(std::time::Duration::from_secs(3)).await;
        provider.complete(request("b")).await.unwrap_err();

        let calls = provider.calls().await;
        assert_eq!(calls[1].at - calls[0].at, std::time::Duration::from_secs(3));
        assert_eq!(calls[1].request.user_input, "b");
    }
}
