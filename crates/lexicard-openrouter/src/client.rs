// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for OpenAI-compatible chat completions.
//!
//! [`OpenRouterClient`] sends exactly one request per call and maps every
//! failure to a classified [`ServiceError`]. Retrying is the caller's job.

use std::time::Duration;

use lexicard_core::error::{ErrorKind, LexicardError, ServiceError, truncate_chars};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::debug;

use crate::types::{ApiErrorResponse, ChatRequest, ChatResponse};

/// Error bodies are cut to this many characters before they reach a message.
const MAX_BODY_CHARS: usize = 500;

/// HTTP client for the chat completions endpoint.
#[derive(Debug, Clone)]
pub struct OpenRouterClient {
    client: reqwest::Client,
    endpoint: String,
}

impl OpenRouterClient {
    /// Creates a client for `{base_url}/chat/completions`.
    ///
    /// `timeout` bounds each request, connection included.
    pub fn new(api_key: &str, base_url: &str, timeout: Duration) -> Result<Self, LexicardError> {
        let mut headers = HeaderMap::new();
        let mut auth = HeaderValue::from_str(&format!("Bearer {api_key}"))
            .map_err(|e| LexicardError::Config(format!("invalid API key header value: {e}")))?;
        auth.set_sensitive(true);
        headers.insert(AUTHORIZATION, auth);
        headers.insert("X-Title", HeaderValue::from_static("lexicard"));

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| LexicardError::Config(format!("failed to build HTTP client: {e}")))?;

        Ok(Self {
            client,
            endpoint: format!("{}/chat/completions", base_url.trim_end_matches('/')),
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    /// Sends one completion request.
    pub async fn complete(&self, request: &ChatRequest) -> Result<ChatResponse, ServiceError> {
        let response = self
            .client
            .post(&self.endpoint)
            .json(request)
            .send()
            .await
            .map_err(classify_transport_error)?;

        let status = response.status();
        debug!(status = %status, "completion response received");

        let body = response.text().await.map_err(classify_transport_error)?;

        if !status.is_success() {
            return Err(ServiceError::new(
                ErrorKind::ServiceStatus {
                    code: status.as_u16(),
                },
                describe_error_body(status.as_u16(), &body),
            ));
        }

        let parsed: ChatResponse = serde_json::from_str(&body).map_err(|e| {
            ServiceError::new(
                ErrorKind::Unexpected,
                format!(
                    "failed to parse API response: {e}; body: {}",
                    truncate_chars(&body, MAX_BODY_CHARS)
                ),
            )
        })?;

        // Upstream failures can arrive inside a 200 envelope.
        if let Some(error) = &parsed.error {
            let kind = match error.status_code() {
                Some(code) => ErrorKind::ServiceStatus { code },
                None => ErrorKind::Unexpected,
            };
            return Err(ServiceError::new(kind, format!("API error: {}", error.message)));
        }

        Ok(parsed)
    }
}

/// Maps a reqwest failure to a transport error kind.
pub fn classify_transport_error(error: reqwest::Error) -> ServiceError {
    let kind = if error.is_timeout() {
        ErrorKind::TransportTimeout
    } else if error.is_connect() || error.is_request() || error.is_body() {
        ErrorKind::TransportConnection
    } else {
        ErrorKind::Unexpected
    };
    ServiceError::new(kind, format!("HTTP request failed: {error}"))
}

fn describe_error_body(status: u16, body: &str) -> String {
    match serde_json::from_str::<ApiErrorResponse>(body) {
        Ok(api_err) => format!("API returned {status}: {}", api_err.error.message),
        Err(_) => format!(
            "API returned {status}: {}",
            truncate_chars(body, MAX_BODY_CHARS)
        ),
    }
}
