// SPDX-FileCopyrightText: 2026 Lexicard Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! Chat completions request/response types (OpenAI-compatible wire format).

use serde::{Deserialize, Serialize};

// --- Request types ---

/// A request to `POST {base_url}/chat/completions`.
#[derive(Debug, Clone, Serialize)]
pub struct ChatRequest {
    pub model: String,
    pub messages: Vec<ChatMessage>,
    pub max_tokens: u32,
    /// Constrains the output to a JSON schema.
    pub response_format: ResponseFormat,
}

/// A single message in the conversation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    /// Role: "system", "user" or "assistant".
    pub role: String,
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".into(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".into(),
            content: content.into(),
        }
    }
}

/// `{"type": "json_schema", "json_schema": {...}}`.
#[derive(Debug, Clone, Serialize)]
pub struct ResponseFormat {
    #[serde(rename = "type")]
    pub format_type: String,
    pub json_schema: JsonSchemaSpec,
}

impl ResponseFormat {
    /// Strict JSON-schema output named `name`.
    pub fn strict_schema(name: impl Into<String>, schema: serde_json::Value) -> Self {
        Self {
            format_type: "json_schema".into(),
            json_schema: JsonSchemaSpec {
                name: name.into(),
                strict: true,
                schema,
            },
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct JsonSchemaSpec {
    pub name: String,
    pub strict: bool,
    pub schema: serde_json::Value,
}

// --- Response types ---

/// Successful response envelope.
///
/// OpenRouter may also answer 200 with an `error` object when the upstream
/// model failed, so both shapes are optional here.
#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub model: String,
    #[serde(default)]
    pub choices: Vec<Choice>,
    #[serde(default)]
    pub error: Option<ApiError>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct Choice {
    pub message: ResponseMessage,
    #[serde(default)]
    pub finish_reason: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ResponseMessage {
    #[serde(default)]
    pub content: Option<String>,
    /// Set by models that decline to answer in the requested format.
    #[serde(default)]
    pub refusal: Option<String>,
}

/// Error body: `{"error": {"code": 404, "message": "..."}}`.
#[derive(Debug, Clone, Deserialize)]
pub struct ApiErrorResponse {
    pub error: ApiError,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ApiError {
    /// Numeric on OpenRouter, a string on some compatible servers.
    #[serde(default)]
    pub code: Option<serde_json::Value>,
    #[serde(default)]
    pub message: String,
}

impl ApiError {
    /// The error code when it is a valid HTTP status.
    pub fn status_code(&self) -> Option<u16> {
        let code: Option<u16> = match self.code.as_ref()? {
            serde_json::Value::Number(n) => n.as_u64().and_then(|c| u16::try_from(c).ok()),
            serde_json::Value::String(s) => s.parse().ok(),
            _ => None,
        };
        code.filter(|code| (100..600).contains(code))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_serializes_strict_schema() {
        let request = ChatRequest {
            model: "m".into(),
            messages: vec![ChatMessage::system("sys"), ChatMessage::user("run")],
            max_tokens: 100,
            response_format: ResponseFormat::strict_schema(
                "vocabulary_card",
                serde_json::json!({"type": "object"}),
            ),
        };
        let json = serde_json::to_value(&request).unwrap();
        assert_eq!(json["response_format"]["type"], "json_schema");
        assert_eq!(json["response_format"]["json_schema"]["strict"], true);
        assert_eq!(json["response_format"]["json_schema"]["name"], "vocabulary_card");
        assert_eq!(json["messages"][0]["role"], "system");
        assert_eq!(json["messages"][1]["content"], "run");
    }

    #[test]
    fn error_code_accepts_number_or_string() {
        let numeric: ApiErrorResponse =
            serde_json::from_str(r#"{"error": {"code": 429, "message": "slow down"}}"#).unwrap();
        assert_eq!(numeric.error.status_code(), Some(429));

        let text: ApiErrorResponse =
            serde_json::from_str(r#"{"error": {"code": "502", "message": "bad"}}"#).unwrap();
        assert_eq!(text.error.status_code(), Some(502));

        let named: ApiErrorResponse =
            serde_json::from_str(r#"{"error": {"code": "invalid_api_key", "message": "x"}}"#)
                .unwrap();
        assert_eq!(named.error.status_code(), None);
    }

    #[test]
    fn response_without_choices_deserializes() {
        let response: ChatResponse = serde_json::from_str(r#"{"id": "gen-1"}"#).unwrap();
        assert!(response.choices.is_empty());
        assert!(response.error.is_none());
    }
}
