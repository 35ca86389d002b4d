//! Generation client — the single point of entry for all remote
//! text-generation calls.
//!
//! ARCHITECTURAL RULE: no other module may call the generation endpoint
//! directly. The client is a pure prompt-in/text-out boundary: it never
//! interprets the payload and never retries — failure policy belongs to the
//! pipeline, which degrades a failed stage to its fallback.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

/// Endpoint used when the configuration does not override it.
pub const DEFAULT_API_URL: &str = "https://generativelanguage.googleapis.com/v1beta";
/// Model used when the configuration does not override it.
pub const DEFAULT_MODEL: &str = "gemini-2.0-flash";

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("transport error: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("generation call timed out")]
    Timeout,

    #[error("rate limited by the generation endpoint")]
    RateLimited,

    #[error("generation endpoint rejected the configured credential")]
    Unauthorized,

    #[error("generation endpoint returned status {status}: {message}")]
    Api { status: u16, message: String },

    #[error("generation endpoint returned no text content")]
    EmptyContent,
}

/// The single capability the pipeline needs from the remote service:
/// submit a prompt, receive raw text or fail.
///
/// Carried in `AppState` as `Arc<dyn GenerationClient>` so tests can swap in
/// a scripted client.
#[async_trait]
pub trait GenerationClient: Send + Sync {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}

// ────────────────────────────────────────────────────────────────────────────
// Wire types (generateContent request/response)
// ────────────────────────────────────────────────────────────────────────────

#[derive(Debug, Serialize)]
struct GenerateContentRequest<'a> {
    contents: Vec<RequestContent<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestContent<'a> {
    parts: Vec<RequestPart<'a>>,
}

#[derive(Debug, Serialize)]
struct RequestPart<'a> {
    text: &'a str,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GenerateContentResponse {
    #[serde(default)]
    candidates: Vec<Candidate>,
    prompt_feedback: Option<PromptFeedback>,
}

#[derive(Debug, Deserialize)]
struct Candidate {
    content: CandidateContent,
}

#[derive(Debug, Deserialize)]
struct CandidateContent {
    #[serde(default)]
    parts: Vec<ResponsePart>,
}

#[derive(Debug, Deserialize)]
struct ResponsePart {
    #[serde(default)]
    text: String,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct PromptFeedback {
    block_reason: Option<String>,
}

// ────────────────────────────────────────────────────────────────────────────
// Gemini-backed client
// ────────────────────────────────────────────────────────────────────────────

/// Production client for the Gemini `generateContent` endpoint.
#[derive(Clone)]
pub struct GeminiClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl GeminiClient {
    pub fn new(base_url: String, api_key: String, model: String, timeout: Duration) -> Self {
        Self {
            client: Client::builder()
                .timeout(timeout)
                .build()
                .expect("Failed to build HTTP client"),
            base_url,
            api_key,
            model,
        }
    }
}

#[async_trait]
impl GenerationClient for GeminiClient {
    async fn generate(&self, prompt: &str) -> Result<String, LlmError> {
        let url = format!("{}/models/{}:generateContent", self.base_url, self.model);
        let request_body = GenerateContentRequest {
            contents: vec![RequestContent {
                parts: vec![RequestPart { text: prompt }],
            }],
        };

        debug!(model = %self.model, prompt_len = prompt.len(), "calling generation endpoint");

        let response = self
            .client
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .header("content-type", "application/json")
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    LlmError::Timeout
                } else {
                    LlmError::Transport(e)
                }
            })?;

        let status = response.status();
        match status.as_u16() {
            429 => return Err(LlmError::RateLimited),
            401 | 403 => return Err(LlmError::Unauthorized),
            s if !status.is_success() => {
                let message = response.text().await.unwrap_or_default();
                return Err(LlmError::Api { status: s, message });
            }
            _ => {}
        }

        let parsed: GenerateContentResponse = response.json().await.map_err(|e| {
            if e.is_timeout() {
                LlmError::Timeout
            } else {
                LlmError::Transport(e)
            }
        })?;

        if let Some(feedback) = &parsed.prompt_feedback {
            if let Some(reason) = &feedback.block_reason {
                return Err(LlmError::Api {
                    status: status.as_u16(),
                    message: format!("prompt blocked: {reason}"),
                });
            }
        }

        let text = parsed
            .candidates
            .first()
            .and_then(|c| c.content.parts.first())
            .map(|p| p.text.clone())
            .filter(|t| !t.is_empty())
            .ok_or(LlmError::EmptyContent)?;

        debug!(response_len = text.len(), "generation call succeeded");

        Ok(text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use mockito::Server;

    fn client_for(server: &mockito::Server) -> GeminiClient {
        GeminiClient::new(
            server.url(),
            "test-key".to_string(),
            DEFAULT_MODEL.to_string(),
            Duration::from_secs(5),
        )
    }

    #[tokio::test]
    async fn test_generate_returns_candidate_text() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.0-flash:generateContent")
            .match_header("x-goog-api-key", "test-key")
            .with_status(200)
            .with_body(
                r#"{
                    "candidates": [{
                        "content": {
                            "parts": [{"text": "Detected Role: Software Engineer"}],
                            "role": "model"
                        }
                    }]
                }"#,
            )
            .create_async()
            .await;

        let result = client_for(&server).generate("test prompt").await;

        mock.assert_async().await;
        assert_eq!(result.unwrap(), "Detected Role: Software Engineer");
    }

    #[tokio::test]
    async fn test_generate_rate_limited_maps_to_rate_limited() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.0-flash:generateContent")
            .with_status(429)
            .with_body(r#"{"error": "Rate limit exceeded"}"#)
            .create_async()
            .await;

        let result = client_for(&server).generate("test prompt").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(LlmError::RateLimited)));
    }

    #[tokio::test]
    async fn test_generate_forbidden_maps_to_unauthorized() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.0-flash:generateContent")
            .with_status(403)
            .with_body(r#"{"error": "API key not valid"}"#)
            .create_async()
            .await;

        let result = client_for(&server).generate("test prompt").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(LlmError::Unauthorized)));
    }

    #[tokio::test]
    async fn test_generate_server_error_maps_to_api() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.0-flash:generateContent")
            .with_status(500)
            .with_body("internal error")
            .create_async()
            .await;

        let result = client_for(&server).generate("test prompt").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(LlmError::Api { status: 500, .. })));
    }

    #[tokio::test]
    async fn test_generate_empty_candidates_maps_to_empty_content() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.0-flash:generateContent")
            .with_status(200)
            .with_body(r#"{"candidates": []}"#)
            .create_async()
            .await;

        let result = client_for(&server).generate("test prompt").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(LlmError::EmptyContent)));
    }

    #[tokio::test]
    async fn test_generate_blocked_prompt_maps_to_api_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.0-flash:generateContent")
            .with_status(200)
            .with_body(
                r#"{
                    "candidates": [],
                    "promptFeedback": {"blockReason": "SAFETY"}
                }"#,
            )
            .create_async()
            .await;

        let result = client_for(&server).generate("test prompt").await;

        mock.assert_async().await;
        match result {
            Err(LlmError::Api { message, .. }) => assert!(message.contains("SAFETY")),
            other => panic!("expected Api error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_generate_non_json_body_is_transport_error() {
        let mut server = Server::new_async().await;
        let mock = server
            .mock("POST", "/models/gemini-2.0-flash:generateContent")
            .with_status(200)
            .with_body("This is not JSON")
            .create_async()
            .await;

        let result = client_for(&server).generate("test prompt").await;

        mock.assert_async().await;
        assert!(matches!(result, Err(LlmError::Transport(_))));
    }
}
