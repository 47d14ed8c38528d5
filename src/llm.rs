//! Completion API client for recommendation generation.
//!
//! Sends the assembled prompt as a single user-role message at a fixed
//! temperature and returns the first choice's text. Every call is a single
//! best-effort request: no retry, no backoff, no idempotency key, and the
//! HTTP client's default timeout behavior. Re-invocation performs a new,
//! independently billed call.

use reqwest::{Client, StatusCode};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const COMPLETIONS_URL: &str = "https://api.openai.com/v1/chat/completions";
const TEMPERATURE: f64 = 0.7;

/// Returned when the API produces an empty completion
pub const EMPTY_COMPLETION_PLACEHOLDER: &str = "No answer generated";

/// Errors from the completion API, carrying the upstream message
#[derive(Debug, Clone, Error)]
pub enum LlmError {
    /// Network-level failure
    #[error("network error: {0}")]
    Transport(String),
    /// Non-success HTTP status from the API
    #[error("http {status}: {body}")]
    Http {
        /// Status code returned by the API
        status: u16,
        /// Response body, as returned
        body: String,
    },
    /// HTTP 429 from the API; not retried by this client
    #[error("rate limited")]
    RateLimited,
    /// HTTP 401 from the API
    #[error("invalid api key")]
    InvalidApiKey,
    /// Response body did not match the expected shape
    #[error("json error: {0}")]
    Serde(String),
    /// `OPENAI_API_KEY` environment variable not set
    #[error("missing api key: OPENAI_API_KEY environment variable not set")]
    MissingApiKey,
}

/// A message in the conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Message {
    /// `"user"`, `"assistant"` or `"system"`
    pub role: String,
    /// Message text
    pub content: String,
}

impl Message {
    /// Builds a user-role message
    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }
}

/// Request body for the chat completions endpoint
#[derive(Debug, Serialize)]
struct CompletionRequest {
    model: String,
    messages: Vec<Message>,
    temperature: f64,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

/// Token usage block as reported by the API; all fields may be absent
#[derive(Debug, Default, Deserialize)]
struct ApiUsage {
    #[serde(default)]
    total_tokens: Option<i64>,
    #[serde(default)]
    prompt_tokens: Option<i64>,
    #[serde(default)]
    completion_tokens: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<ApiUsage>,
}

/// Resolved token accounting for one generation call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TokenUsage {
    /// API-reported total, or `estimate_tokens` of the prompt when absent
    pub total_tokens: i64,
    /// API-reported prompt tokens (0 when unreported)
    pub prompt_tokens: i64,
    /// API-reported completion tokens (0 when unreported)
    pub completion_tokens: i64,
}

/// One generation result: the text plus its token accounting
#[derive(Debug, Clone)]
pub struct Completion {
    /// First choice's text, or [`EMPTY_COMPLETION_PLACEHOLDER`]
    pub text: String,
    /// Resolved token usage
    pub usage: TokenUsage,
}

/// Estimates token count from prompt length: `ceil(len / 4)`.
/// Used when the API does not report usage.
#[must_use]
pub fn estimate_tokens(prompt_len: usize) -> i64 {
    i64::try_from(prompt_len.div_ceil(4)).unwrap_or(i64::MAX)
}

/// Converts a raw API response into a [`Completion`], applying the
/// empty-completion placeholder and the token estimate fallback.
fn resolve_completion(response: CompletionResponse, prompt_len: usize) -> Completion {
    let text = response
        .choices
        .into_iter()
        .next()
        .and_then(|choice| choice.message.content)
        .map(|content| content.trim().to_string())
        .filter(|content| !content.is_empty())
        .unwrap_or_else(|| EMPTY_COMPLETION_PLACEHOLDER.to_string());

    let usage = response.usage.unwrap_or_default();
    let usage = TokenUsage {
        total_tokens: usage
            .total_tokens
            .unwrap_or_else(|| estimate_tokens(prompt_len)),
        prompt_tokens: usage.prompt_tokens.unwrap_or(0),
        completion_tokens: usage.completion_tokens.unwrap_or(0),
    };

    Completion { text, usage }
}

/// Completion API client
#[derive(Debug, Clone)]
pub struct LlmClient {
    http: Client,
    api_key: String,
    base_url: String,
}

impl LlmClient {
    /// Creates a client from the `OPENAI_API_KEY` environment variable.
    pub fn from_env() -> Result<Self, LlmError> {
        let api_key = std::env::var("OPENAI_API_KEY").map_err(|_| LlmError::MissingApiKey)?;
        Self::new(api_key)
    }

    /// Creates a client with the given API key.
    pub fn new(api_key: String) -> Result<Self, LlmError> {
        let http = Client::builder()
            .user_agent(concat!("parquest-core/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        Ok(Self {
            http,
            api_key,
            base_url: COMPLETIONS_URL.to_string(),
        })
    }

    /// Overrides the completions endpoint (local gateways, tests).
    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Sends `prompt` as a single user message and returns the completion.
    pub async fn complete(&self, model: &str, prompt: &str) -> Result<Completion, LlmError> {
        let request = CompletionRequest {
            model: model.to_string(),
            messages: vec![Message::user(prompt)],
            temperature: TEMPERATURE,
        };

        let res = self
            .http
            .post(&self.base_url)
            .bearer_auth(&self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| LlmError::Transport(e.to_string()))?;

        match res.status() {
            s if s.is_success() => {
                let response = res
                    .json::<CompletionResponse>()
                    .await
                    .map_err(|e| LlmError::Serde(e.to_string()))?;
                Ok(resolve_completion(response, prompt.len()))
            }
            StatusCode::UNAUTHORIZED => Err(LlmError::InvalidApiKey),
            StatusCode::TOO_MANY_REQUESTS => Err(LlmError::RateLimited),
            s => {
                let status = s.as_u16();
                let body = res.text().await.unwrap_or_default();
                Err(LlmError::Http { status, body })
            }
        }
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;

    #[test]
    fn test_estimate_tokens_rounds_up() {
        assert_eq!(estimate_tokens(0), 0);
        assert_eq!(estimate_tokens(1), 1);
        assert_eq!(estimate_tokens(4), 1);
        assert_eq!(estimate_tokens(5), 2);
        assert_eq!(estimate_tokens(4000), 1000);
    }

    #[test]
    fn test_resolve_completion_first_choice() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{
                "choices": [
                    {"message": {"content": "Plan a picnic."}},
                    {"message": {"content": "ignored second choice"}}
                ],
                "usage": {"total_tokens": 42, "prompt_tokens": 30, "completion_tokens": 12}
            }"#,
        )
        .unwrap();

        let completion = resolve_completion(response, 100);
        assert_eq!(completion.text, "Plan a picnic.");
        assert_eq!(completion.usage.total_tokens, 42);
        assert_eq!(completion.usage.prompt_tokens, 30);
        assert_eq!(completion.usage.completion_tokens, 12);
    }

    #[test]
    fn test_resolve_completion_empty_uses_placeholder() {
        let response: CompletionResponse =
            serde_json::from_str(r#"{"choices": [{"message": {"content": "  "}}]}"#).unwrap();

        let completion = resolve_completion(response, 20);
        assert_eq!(completion.text, EMPTY_COMPLETION_PLACEHOLDER);
    }

    #[test]
    fn test_resolve_completion_no_choices() {
        let response: CompletionResponse = serde_json::from_str(r"{}").unwrap();
        let completion = resolve_completion(response, 9);
        assert_eq!(completion.text, EMPTY_COMPLETION_PLACEHOLDER);
        // No usage block: estimated as ceil(9 / 4)
        assert_eq!(completion.usage.total_tokens, 3);
        assert_eq!(completion.usage.prompt_tokens, 0);
        assert_eq!(completion.usage.completion_tokens, 0);
    }

    #[tokio::test]
    async fn test_complete_parses_response_over_http() {
        let endpoint = crate::test_utils::spawn_one_shot_http(
            r#"{"choices": [{"message": {"content": "Plan a picnic."}}],
                "usage": {"total_tokens": 42}}"#,
        )
        .await
        .unwrap();

        let client = LlmClient::new("test-key".to_string())
            .unwrap()
            .with_base_url(endpoint);
        let completion = client.complete("gpt-4o-mini", "prompt").await.unwrap();

        assert_eq!(completion.text, "Plan a picnic.");
        assert_eq!(completion.usage.total_tokens, 42);
    }

    #[tokio::test]
    async fn test_complete_connection_refused_is_transport() {
        let client = LlmClient::new("test-key".to_string())
            .unwrap()
            .with_base_url("http://127.0.0.1:9/v1/chat/completions");

        let err = client.complete("gpt-4o-mini", "prompt").await.unwrap_err();
        assert!(matches!(err, LlmError::Transport(_)));
    }

    #[test]
    fn test_resolve_completion_missing_total_estimates() {
        let response: CompletionResponse = serde_json::from_str(
            r#"{
                "choices": [{"message": {"content": "Answer"}}],
                "usage": {"prompt_tokens": 5}
            }"#,
        )
        .unwrap();

        let completion = resolve_completion(response, 16);
        assert_eq!(completion.usage.total_tokens, 4);
        assert_eq!(completion.usage.prompt_tokens, 5);
    }
}
