// SPDX-FileCopyrightText: 2026 Notigate Contributors
// SPDX-License-Identifier: MIT OR Apache-2.0

//! HTTP client for an OpenAI-compatible chat completions API.
//!
//! Provides [`OpenAiClient`] which handles request construction,
//! authentication, bounded retry on transient errors, and markdown
//! code-fence stripping on replies.

use std::time::Duration;

use async_trait::async_trait;
use notigate_config::model::ProviderConfig;
use notigate_core::NotigateError;
use notigate_core::traits::LanguageModel;
use notigate_core::types::ChatMessage;
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use tracing::{debug, warn};

use crate::types::{ApiErrorResponse, CompletionRequest, CompletionResponse};

/// Sampling temperature used for pipeline requests. Low, since every call
/// here is classification or constrained generation.
const TEMPERATURE: f32 = 0.3;

/// HTTP client for chat completion requests.
///
/// Manages the auth header, connection pooling, request timeout, and retry
/// with linear backoff for transient statuses (429, 5xx).
#[derive(Debug, Clone)]
pub struct OpenAiClient {
    client: reqwest::Client,
    base_url: String,
    default_model: String,
    max_attempts: u32,
}

impl OpenAiClient {
    /// Creates a new client.
    ///
    /// # Arguments
    /// * `api_key` - bearer token; `None` falls back to `OPENAI_API_KEY`
    /// * `base_url` - full URL of the chat completions endpoint
    /// * `model` - default model identifier
    /// * `timeout` - per-request timeout
    /// * `max_attempts` - attempts per call (first try plus retries)
    pub fn new(
        api_key: Option<String>,
        base_url: String,
        model: String,
        timeout: Duration,
        max_attempts: u32,
    ) -> Result<Self, NotigateError> {
        let key = api_key
            .or_else(|| std::env::var("OPENAI_API_KEY").ok())
            .ok_or_else(|| {
                NotigateError::Config(
                    "no API key: set provider.api_key or OPENAI_API_KEY".to_string(),
                )
            })?;

        let mut headers = HeaderMap::new();
        headers.insert(
            AUTHORIZATION,
            HeaderValue::from_str(&format!("Bearer {key}"))
                .map_err(|e| NotigateError::Config(format!("invalid API key header: {e}")))?,
        );

        let client = reqwest::Client::builder()
            .default_headers(headers)
            .timeout(timeout)
            .build()
            .map_err(|e| NotigateError::Service {
                message: format!("failed to build HTTP client: {e}"),
                source: Some(Box::new(e)),
            })?;

        Ok(Self {
            client,
            base_url,
            default_model: model,
            max_attempts: max_attempts.max(1),
        })
    }

    /// Creates a client from the provider config section.
    pub fn from_config(config: &ProviderConfig) -> Result<Self, NotigateError> {
        Self::new(
            config.api_key.clone(),
            config.base_url.clone(),
            config.default_model.clone(),
            Duration::from_secs(config.timeout_secs),
            config.max_attempts,
        )
    }

    /// Returns the default model identifier.
    pub fn default_model(&self) -> &str {
        &self.default_model
    }

    /// Sends a completion request and returns the assistant text.
    ///
    /// On transient statuses the request is retried with linear backoff
    /// until `max_attempts` is exhausted.
    async fn complete_chat(
        &self,
        messages: &[ChatMessage],
        model: Option<&str>,
    ) -> Result<String, NotigateError> {
        let request = CompletionRequest {
            model: model.unwrap_or(&self.default_model).to_string(),
            messages: messages.to_vec(),
            temperature: TEMPERATURE,
        };

        let mut last_error = None;

        for attempt in 1..=self.max_attempts {
            if attempt > 1 {
                warn!(attempt, "retrying completion request after transient error");
                tokio::time::sleep(Duration::from_secs(attempt as u64 - 1)).await;
            }

            let response = self
                .client
                .post(&self.base_url)
                .json(&request)
                .send()
                .await
                .map_err(|e| NotigateError::Service {
                    message: format!("HTTP request failed: {e}"),
                    source: Some(Box::new(e)),
                })?;

            let status = response.status();
            debug!(status = %status, attempt, "completion response received");

            if status.is_success() {
                let body = response.text().await.map_err(|e| NotigateError::Service {
                    message: format!("failed to read response body: {e}"),
                    source: Some(Box::new(e)),
                })?;
                let completion: CompletionResponse =
                    serde_json::from_str(&body).map_err(|e| NotigateError::Service {
                        message: format!("failed to parse API response: {e}"),
                        source: Some(Box::new(e)),
                    })?;
                let content = completion
                    .choices
                    .into_iter()
                    .next()
                    .and_then(|c| c.message.content)
                    .ok_or_else(|| NotigateError::service("API response carried no choices"))?;
                return Ok(strip_code_fences(&content).to_string());
            }

            if is_transient_error(status) && attempt < self.max_attempts {
                let body = response.text().await.unwrap_or_default();
                warn!(status = %status, body = %body, "transient error, will retry");
                last_error = Some(NotigateError::service(format!(
                    "API returned {status}: {body}"
                )));
                continue;
            }

            // Non-transient error or exhausted retries.
            let body = response.text().await.unwrap_or_default();
            let message = if let Ok(api_err) = serde_json::from_str::<ApiErrorResponse>(&body) {
                format!(
                    "API error ({}): {}",
                    api_err.error.type_.as_deref().unwrap_or("unknown"),
                    api_err.error.message
                )
            } else {
                format!("API returned {status}: {body}")
            };
            return Err(NotigateError::service(message));
        }

        Err(last_error
            .unwrap_or_else(|| NotigateError::service("completion request failed after retries")))
    }
}

#[async_trait]
impl LanguageModel for OpenAiClient {
    async fn complete(
        &self,
        messages: &[ChatMessage],
        model: Option<&str>,
    ) -> Result<String, NotigateError> {
        self.complete_chat(messages, model).await
    }
}

/// Returns true for HTTP status codes that indicate transient errors worth
/// retrying.
fn is_transient_error(status: reqwest::StatusCode) -> bool {
    matches!(status.as_u16(), 429 | 500 | 502 | 503 | 529)
}

/// Strip a surrounding markdown code fence from a model reply.
///
/// Models wrap JSON replies in ```json fences often enough that every caller
/// would otherwise repeat this.
pub fn strip_code_fences(content: &str) -> &str {
    let trimmed = content.trim();
    let Some(rest) = trimmed.strip_prefix("```") else {
        return trimmed;
    };
    // Drop the language tag on the opening fence line.
    let rest = match rest.find('\n') {
        Some(idx) => &rest[idx + 1..],
        None => rest,
    };
    rest.strip_suffix("```").unwrap_or(rest).trim()
}

#[cfg(test)]
mod tests {
    use super::*;
    use wiremock::matchers::{header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_client(base_url: &str) -> OpenAiClient {
        OpenAiClient::new(
            Some("test-api-key".into()),
            format!("{base_url}/v1/chat/completions"),
            "gpt-4o-mini".into(),
            Duration::from_secs(5),
            2,
        )
        .unwrap()
    }

    fn test_messages() -> Vec<ChatMessage> {
        vec![
            ChatMessage::system("당신은 알림 메시지 분류기입니다."),
            ChatMessage::user("주문이 완료되었습니다"),
        ]
    }

    fn completion_body(content: &str) -> serde_json::Value {
        serde_json::json!({
            "id": "chatcmpl-test",
            "choices": [{
                "message": {"role": "assistant", "content": content},
                "finish_reason": "stop"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5}
        })
    }

    #[tokio::test]
    async fn complete_returns_assistant_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(header("authorization", "Bearer test-api-key"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("BASIC")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let reply = client.complete(&test_messages(), None).await.unwrap();
        assert_eq!(reply, "BASIC");
    }

    #[tokio::test]
    async fn complete_strips_markdown_fences() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body(
                "```json\n{\"type\": \"BASIC\"}\n```",
            )))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let reply = client.complete(&test_messages(), None).await.unwrap();
        assert_eq!(reply, "{\"type\": \"BASIC\"}");
    }

    #[tokio::test]
    async fn complete_retries_on_429() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "error": {"type": "rate_limit_error", "message": "Rate limited"}
        });

        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_json(&error_body))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("after retry")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let reply = client.complete(&test_messages(), None).await.unwrap();
        assert_eq!(reply, "after retry");
    }

    #[tokio::test]
    async fn complete_fails_on_400_without_retry() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "error": {"type": "invalid_request_error", "message": "Bad model"}
        });
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(400).set_body_json(&error_body))
            .expect(1)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete(&test_messages(), None).await.unwrap_err();
        assert!(err.to_string().contains("invalid_request_error"), "got: {err}");
    }

    #[tokio::test]
    async fn complete_exhausts_retries_on_503() {
        let server = MockServer::start().await;
        let error_body = serde_json::json!({
            "error": {"type": "overloaded_error", "message": "Service overloaded"}
        });
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .respond_with(ResponseTemplate::new(503).set_body_json(&error_body))
            .expect(2)
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let err = client.complete(&test_messages(), None).await.unwrap_err();
        assert!(matches!(err, NotigateError::Service { .. }));
        assert!(err.to_string().contains("overloaded_error"), "got: {err}");
    }

    #[tokio::test]
    async fn model_override_is_sent() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/v1/chat/completions"))
            .and(wiremock::matchers::body_partial_json(
                serde_json::json!({"model": "gpt-4o"}),
            ))
            .respond_with(ResponseTemplate::new(200).set_body_json(completion_body("ok")))
            .mount(&server)
            .await;

        let client = test_client(&server.uri());
        let reply = client.complete(&test_messages(), Some("gpt-4o")).await.unwrap();
        assert_eq!(reply, "ok");
    }

    #[test]
    fn strip_code_fences_handles_plain_and_fenced() {
        assert_eq!(strip_code_fences("plain"), "plain");
        assert_eq!(strip_code_fences("```json\n{\"a\":1}\n```"), "{\"a\":1}");
        assert_eq!(strip_code_fences("```\ntext\n```"), "text");
    }

    #[test]
    fn missing_api_key_is_config_error() {
        // Only meaningful when OPENAI_API_KEY is not set in the environment.
        if std::env::var("OPENAI_API_KEY").is_err() {
            let result = OpenAiClient::new(
                None,
                "http://localhost".into(),
                "gpt-4o-mini".into(),
                Duration::from_secs(1),
                1,
            );
            assert!(matches!(result, Err(NotigateError::Config(_))));
        }
    }
}
