// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Card generator: one structured-output request per attempt, bounded
//! retries with linear backoff, and classification of every failure.

use std::sync::Arc;
use std::time::Duration;

use lexicard_config::GenerationConfig;
use lexicard_core::error::{GenerationError, ServiceError, truncate_chars};
use lexicard_core::schema::{SCHEMA_NAME, card_json_schema, parse_card};
use lexicard_core::traits::ProviderAdapter;
use lexicard_core::types::ProviderRequest;
use lexicard_core::{Card, Language};
use tracing::{info, warn};

use crate::prompts::PromptSet;

/// Characters of the word kept in log lines.
const LOG_WORD_CHARS: usize = 50;
/// Characters of an attempt's error kept in log lines.
const LOG_ERROR_CHARS: usize = 200;

/// How many attempts to make and how long to wait between them.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_delay: Duration,
}

impl RetryPolicy {
    pub fn from_config(config: &GenerationConfig) -> Self {
        Self {
            max_attempts: config.max_attempts.max(1),
            base_delay: Duration::from_millis(config.base_delay_ms),
        }
    }

    /// Pause after failed attempt `attempt` (1-based): `attempt * base_delay`.
    pub fn delay_after(&self, attempt: u32) -> Duration {
        self.base_delay.saturating_mul(attempt)
    }
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self::from_config(&GenerationConfig::default())
    }
}

/// What one attempt means for the loop.
#[derive(Debug)]
enum AttemptOutcome {
    Ok(Card),
    Retry(ServiceError),
    Abort(ServiceError),
}

impl From<Result<Card, ServiceError>> for AttemptOutcome {
    fn from(result: Result<Card, ServiceError>) -> Self {
        match result {
            Ok(card) => AttemptOutcome::Ok(card),
            Err(error) if error.kind.is_retryable() => AttemptOutcome::Retry(error),
            Err(error) => AttemptOutcome::Abort(error),
        }
    }
}

/// Produces validated cards from the generation service.
pub struct CardGenerator {
    provider: Arc<dyn ProviderAdapter>,
    prompts: PromptSet,
    policy: RetryPolicy,
    schema: serde_json::Value,
}

impl CardGenerator {
    pub fn new(provider: Arc<dyn ProviderAdapter>, prompts: PromptSet, policy: RetryPolicy) -> Self {
        Self {
            provider,
            prompts,
            policy,
            schema: card_json_schema(),
        }
    }

    pub fn policy(&self) -> RetryPolicy {
        self.policy
    }

    /// Generates a card for `word`.
    ///
    /// Returns on the first valid answer, which may be [`Card::Missing`].
    /// Fails once a non-retryable error occurs or every attempt failed; the
    /// error carries the last failure and the number of attempts made.
    pub async fn generate(&self, word: &str, language: Language) -> Result<Card, GenerationError> {
        let log_word = truncate_chars(word, LOG_WORD_CHARS);
        let max_attempts = self.policy.max_attempts;
        let mut attempt = 0;

        loop {
            attempt += 1;
            info!(attempt, max_attempts, %language, word = %log_word, "generating card");

            let error = match AttemptOutcome::from(self.attempt(word, language).await) {
                AttemptOutcome::Ok(card) => {
                    info!(attempt, exists = card.exists(), "card generated");
                    return Ok(card);
                }
                AttemptOutcome::Abort(error) => {
                    warn!(
                        attempt,
                        kind = %error.kind,
                        error = %truncate_chars(&error.message, LOG_ERROR_CHARS),
                        "non-retryable generation error, giving up"
                    );
                    return Err(GenerationError::exhausted(&error, attempt));
                }
                AttemptOutcome::Retry(error) => error,
            };

            warn!(
                attempt,
                kind = %error.kind,
                error = %truncate_chars(&error.message, LOG_ERROR_CHARS),
                "generation attempt failed"
            );

            if attempt >= max_attempts {
                return Err(GenerationError::exhausted(&error, attempt));
            }
            tokio::time::sleep(self.policy.delay_after(attempt)).await;
        }
    }

    async fn attempt(&self, word: &str, language: Language) -> Result<Card, ServiceError> {
        let request = ProviderRequest {
            system_prompt: self.prompts.get(language).to_string(),
            user_input: word.to_string(),
            schema_name: SCHEMA_NAME.to_string(),
            schema: self.schema.clone(),
        };
        let response = self.provider.complete(request).await?;
        parse_card(&response.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use lexicard_core::error::ErrorKind;
    use lexicard_test_utils::{MockProvider, fixtures};

    const BASE: Duration = Duration::from_millis(2000);

    fn generator(provider: Arc<MockProvider>) -> CardGenerator {
        CardGenerator::new(
            provider,
            PromptSet::builtin(),
            RetryPolicy {
                max_attempts: 3,
                base_delay: BASE,
            },
        )
    }

    fn status(code: u16) -> ServiceError {
        ServiceError::new(ErrorKind::ServiceStatus { code }, format!("API returned {code}"))
    }

    #[test]
    fn delay_is_linear() {
        let policy = RetryPolicy {
            max_attempts: 3,
            base_delay: Duration::from_secs(2),
        };
        assert_eq!(policy.delay_after(1), Duration::from_secs(2));
        assert_eq!(policy.delay_after(2), Duration::from_secs(4));
    }

    #[test]
    fn outcome_classification() {
        assert!(matches!(AttemptOutcome::from(Ok(Card::Missing)), AttemptOutcome::Ok(_)));
        assert!(matches!(AttemptOutcome::from(Err(status(503))), AttemptOutcome::Retry(_)));
        assert!(matches!(AttemptOutcome::from(Err(status(429))), AttemptOutcome::Retry(_)));
        assert!(matches!(AttemptOutcome::from(Err(status(401))), AttemptOutcome::Abort(_)));
        assert!(matches!(
            AttemptOutcome::from(Err(ServiceError::schema("bad"))),
            AttemptOutcome::Retry(_)
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn first_success_returns_immediately() {
        let provider = Arc::new(MockProvider::new());
        provider.push_ok(fixtures::card_json("run")).await;

        let card = generator(provider.clone())
            .generate("bank  (river)", Language::English)
            .await
            .unwrap();

        assert!(card.exists());
        let calls = provider.calls().await;
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0].request.user_input, "bank  (river)");
        assert!(calls[0].request.system_prompt.contains("English"));
        assert_eq!(calls[0].request.schema_name, SCHEMA_NAME);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_word_is_a_result_not_an_error() {
        let provider = Arc::new(MockProvider::new());
        provider.push_ok(fixtures::missing_json()).await;

        let card = generator(provider.clone())
            .generate("asdfgh", Language::German)
            .await
            .unwrap();
        assert_eq!(card, Card::Missing);
        assert_eq!(provider.call_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn persistent_503_uses_three_attempts_with_linear_backoff() {
        let provider = Arc::new(MockProvider::new());
        for _ in 0..3 {
            provider.push_err(status(503)).await;
        }

        let err = generator(provider.clone())
            .generate("run", Language::English)
            .await
            .unwrap_err();

        assert_eq!(err.attempts, 3);
        assert_eq!(err.last_error_kind, ErrorKind::ServiceStatus { code: 503 });

        let calls = provider.calls().await;
        assert_eq!(calls.len(), 3);
        assert_eq!(calls[1].at - calls[0].at, BASE);
        assert_eq!(calls[2].at - calls[1].at, BASE * 2);
    }

    #[tokio::test(start_paused = true)]
    async fn no_sleep_after_final_attempt() {
        let provider = Arc::new(MockProvider::new());
        for _ in 0..3 {
            provider.push_err(status(500)).await;
        }

        let start = tokio::time::Instant::now();
        generator(provider).generate("run", Language::English).await.unwrap_err();
        // base + 2*base, nothing after the third attempt.
        assert_eq!(start.elapsed(), BASE * 3);
    }

    #[tokio::test(start_paused = true)]
    async fn client_error_aborts_after_one_attempt() {
        let provider = Arc::new(MockProvider::new());
        provider.push_err(status(404)).await;
        provider.push_ok(fixtures::card_json("run")).await;

        let err = generator(provider.clone())
            .generate("run", Language::English)
            .await
            .unwrap_err();

        assert_eq!(err.attempts, 1);
        assert_eq!(err.last_error_kind, ErrorKind::ServiceStatus { code: 404 });
        assert_eq!(provider.call_count().await, 1);
    }

    #[tokio::test(start_paused = true)]
    async fn schema_violation_then_success() {
        let provider = Arc::new(MockProvider::new());
        provider.push_ok(r#"{"exists": true, "definition": "half"}"#.to_string()).await;
        provider
            .push_err(ServiceError::new(ErrorKind::TransportTimeout, "timed out"))
            .await;
        provider.push_ok(fixtures::card_json("run")).await;

        let card = generator(provider.clone())
            .generate("run", Language::English)
            .await
            .unwrap();
        assert!(card.exists());
        assert_eq!(provider.call_count().await, 3);
    }

    #[tokio::test(start_paused = true)]
    async fn exhausted_message_is_truncated() {
        let provider = Arc::new(MockProvider::new());
        provider
            .push_err(ServiceError::new(ErrorKind::ServiceStatus { code: 400 }, "e".repeat(2000)))
            .await;

        let err = generator(provider).generate("run", Language::English).await.unwrap_err();
        assert_eq!(err.message.chars().count(), 300);
    }

    #[tokio::test(start_paused = true)]
    async fn german_uses_german_prompt() {
        let provider = Arc::new(MockProvider::new());
        provider.push_ok(fixtures::card_json("aufgeben")).await;

        generator(provider.clone())
            .generate("aufgeben", Language::German)
            .await
            .unwrap();
        let calls = provider.calls().await;
        assert_eq!(
            calls[0].request.system_prompt,
            PromptSet::builtin().get(Language::German)
        );
    }
}
