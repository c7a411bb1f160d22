// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! OpenRouter provider adapter for lexicard.
//!
//! Implements [`ProviderAdapter`] over the OpenAI-compatible chat completions
//! API with strict JSON-schema output. One HTTP call per
//! [`complete`](ProviderAdapter::complete); failures are classified, never retried here.

pub mod client;
pub mod types;

use std::time::Duration;

use async_trait::async_trait;
use lexicard_config::LexicardConfig;
use lexicard_core::error::{LexicardError, ServiceError};
use lexicard_core::traits::{PluginAdapter, ProviderAdapter};
use lexicard_core::types::{AdapterType, HealthStatus, ProviderRequest, ProviderResponse};
use tracing::{debug, info};

use crate::client::OpenRouterClient;
use crate::types::{ChatMessage, ChatRequest, ChatResponse, ResponseFormat};

/// Environment variable consulted when `openrouter.api_key` is unset.
pub const API_KEY_ENV: &str = "OPENROUTER_API_KEY";

/// OpenRouter provider implementing [`ProviderAdapter`].
///
/// API key resolution order: config -> `OPENROUTER_API_KEY` env var -> error.
pub struct OpenRouterProvider {
    client: OpenRouterClient,
    model: String,
    max_tokens: u32,
}

impl OpenRouterProvider {
    /// Creates a provider from the `[openrouter]` config section.
    pub fn new(config: &LexicardConfig) -> Result<Self, LexicardError> {
        let section = &config.openrouter;
        let api_key = resolve_api_key(section.api_key.as_deref())?;
        let client = OpenRouterClient::new(
            &api_key,
            &section.base_url,
            Duration::from_secs(section.timeout_secs),
        )?;

        info!(
            model = section.model,
            endpoint = client.endpoint(),
            "OpenRouter provider initialized"
        );

        Ok(Self {
            client,
            model: section.model.clone(),
            max_tokens: section.max_tokens,
        })
    }

    fn to_chat_request(&self, request: ProviderRequest) -> ChatRequest {
        ChatRequest {
            model: self.model.clone(),
            messages: vec![
                ChatMessage::system(request.system_prompt),
                ChatMessage::user(request.user_input),
            ],
            max_tokens: self.max_tokens,
            response_format: ResponseFormat::strict_schema(request.schema_name, request.schema),
        }
    }
}

#[async_trait]
impl PluginAdapter for OpenRouterProvider {
    fn name(&self) -> &str {
        "openrouter"
    }

    fn version(&self) -> semver::Version {
        semver::Version::new(0, 1, 0)
    }

    fn adapter_type(&self) -> AdapterType {
        AdapterType::Provider
    }

    async fn health_check(&self) -> Result<HealthStatus, LexicardError> {
        // No test request: it would cost tokens.
        Ok(HealthStatus::Healthy)
    }

    async fn shutdown(&self) -> Result<(), LexicardError> {
        debug!("OpenRouter provider shutting down");
        Ok(())
    }
}

#[async_trait]
impl ProviderAdapter for OpenRouterProvider {
    async fn complete(&self, request: ProviderRequest) -> Result<ProviderResponse, ServiceError> {
        let chat_request = self.to_chat_request(request);
        let response = self.client.complete(&chat_request).await?;
        into_provider_response(response)
    }
}

/// Extracts the structured payload from the first choice.
///
/// A missing, refused or truncated payload is a generation artifact and
/// reported as a schema violation so the generator retries it.
fn into_provider_response(response: ChatResponse) -> Result<ProviderResponse, ServiceError> {
    let choice = response
        .choices
        .into_iter()
        .next()
        .ok_or_else(|| ServiceError::schema("response contained no choices"))?;

    if let Some(refusal) = choice.message.refusal.filter(|r| !r.trim().is_empty()) {
        return Err(ServiceError::schema(format!("model refused: {refusal}")));
    }

    if choice.finish_reason.as_deref() == Some("length") {
        return Err(ServiceError::schema(
            "response was truncated at the token limit",
        ));
    }

    let content = choice
        .message
        .content
        .filter(|c| !c.trim().is_empty())
        .ok_or_else(|| ServiceError::schema("response contained no content"))?;

    Ok(ProviderResponse {
        id: response.id,
        content,
        model: response.model,
    })
}

/// Resolves the API key from config or environment.
fn resolve_api_key(config_key: Option<&str>) -> Result<String, LexicardError> {
    if let Some(key) = config_key
        && !key.trim().is_empty()
    {
        return Ok(key.to_string());
    }

    std::env::var(API_KEY_ENV)
        .ok()
        .filter(|key| !key.trim().is_empty())
        .ok_or_else(|| {
            LexicardError::Config(format!(
                "OpenRouter API key not found. Set openrouter.api_key in config or the {API_KEY_ENV} environment variable."
            ))
        })
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexicard_core::error::ErrorKind;
    use lexicard_core::schema::{SCHEMA_NAME, card_json_schema};
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(base_url: &str) -> LexicardConfig {
        let mut config = LexicardConfig::default();
        config.openrouter.api_key = Some("sk-or-test".into());
        config.openrouter.base_url = base_url.to_string();
        config.openrouter.model = "test/model".into();
        config.openrouter.max_tokens = 300;
        config
    }

    fn request() -> ProviderRequest {
        ProviderRequest {
            system_prompt: "You write English flashcards.".into(),
            user_input: "run".into(),
            schema_name: SCHEMA_NAME.into(),
            schema: card_json_schema(),
        }
    }

    fn choice_body(content: serde_json::Value) -> serde_json::Value {
        serde_json::json!({
            "id": "gen-1",
            "model": "test/model",
            "choices": [{"message": {"role": "assistant", "content": content}, "finish_reason": "stop"}]
        })
    }

    #[tokio::test]
    async fn sends_system_prompt_word_and_schema() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "test/model",
                "max_tokens": 300,
                "messages": [
                    {"role": "system", "content": "You write English flashcards."},
                    {"role": "user", "content": "run"}
                ],
                "response_format": {
                    "type": "json_schema",
                    "json_schema": {"name": "vocabulary_card", "strict": true}
                }
            })))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(choice_body("{\"exists\": false}".into())),
            )
            .expect(1)
            .mount(&server)
            .await;

        let provider = OpenRouterProvider::new(&test_config(&server.uri())).unwrap();
        let response = provider.complete(request()).await.unwrap();
        assert_eq!(response.content, "{\"exists\": false}");
        assert_eq!(response.model, "test/model");
    }

    #[tokio::test]
    async fn empty_content_is_schema_violation() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(choice_body(serde_json::Value::Null)))
            .mount(&server)
            .await;

        let provider = OpenRouterProvider::new(&test_config(&server.uri())).unwrap();
        let err = provider.complete(request()).await.unwrap_err();
        assert_eq!(err.kind, ErrorKind::SchemaViolation);
    }

    #[test]
    fn truncated_output_is_schema_violation() {
        let response: ChatResponse = serde_json::from_value(serde_json::json!({
            "id": "gen-2",
            "choices": [{"message": {"content": "{\"exists\": tr"}, "finish_reason": "length"}]
        }))
        .unwrap();
        let err = into_provider_response(response).unwrap_err();
        assert_eq!(err.kind, ErrorKind::SchemaViolation);
        assert!(err.message.contains("truncated"));
    }

    #[test]
    fn refusal_is_schema_violation() {
        let response: ChatResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"content": null, "refusal": "I can't help with that"}}]
        }))
        .unwrap();
        let err = into_provider_response(response).unwrap_err();
        assert!(err.message.contains("refused"));
    }

    #[test]
    fn configured_key_wins() {
        assert_eq!(resolve_api_key(Some("sk-or-1")).unwrap(), "sk-or-1");
    }

    #[test]
    fn metadata() {
        let provider = OpenRouterProvider::new(&test_config("http://localhost")).unwrap();
        assert_eq!(provider.name(), "openrouter");
        assert_eq!(provider.adapter_type(), AdapterType::Provider);
    }
}
