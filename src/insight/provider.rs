//! LLM provider client for observation generation.
//!
//! Speaks the OpenAI-compatible chat-completions protocol so any gateway can
//! front it via `LLM_BASE_URL`. The client carries a hard request timeout;
//! the soft per-call budget lives in the generator. Provider 429s are
//! reported distinctly so the pipeline can surface `RATE_LIMIT_EXCEEDED`;
//! every other failure degrades to the deterministic fallback upstream.

use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use thiserror::Error;

const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";
const DEFAULT_MODEL: &str = "gpt-4o-mini";
const HARD_TIMEOUT_SECS: u64 = 30;
const CONNECT_TIMEOUT_SECS: u64 = 5;
const DEFAULT_RETRY_AFTER_SECS: u64 = 30;

#[derive(Debug, Error)]
pub enum LlmCallError {
    #[error("provider rate limited; retry after {retry_after}s")]
    RateLimited { retry_after: u64 },
    #[error("llm call failed: {0}")]
    Failed(String),
}

pub struct LlmClient {
    client: Client,
    base_url: String,
    api_key: String,
    model: String,
}

impl LlmClient {
    pub fn new(api_key: String, base_url: Option<String>, model: Option<String>) -> Self {
        let client = Client::builder()
            .timeout(Duration::from_secs(HARD_TIMEOUT_SECS))
            .connect_timeout(Duration::from_secs(CONNECT_TIMEOUT_SECS))
            .build()
            .unwrap_or_default();
        Self {
            client,
            base_url: base_url.unwrap_or_else(|| DEFAULT_BASE_URL.to_string()),
            api_key,
            model: model.unwrap_or_else(|| DEFAULT_MODEL.to_string()),
        }
    }

    /// Build from environment variables.
    ///
    /// | Env Var | Default | Purpose |
    /// |---------|---------|---------|
    /// | `LLM_API_KEY` | (none) | Provider key; unset disables the client |
    /// | `LLM_BASE_URL` | OpenAI API | Any chat-completions-compatible endpoint |
    /// | `LLM_MODEL` | `gpt-4o-mini` | Model id |
    pub fn from_env() -> Option<Self> {
        let api_key = std::env::var("LLM_API_KEY").ok().filter(|k| !k.is_empty())?;
        Some(Self::new(
            api_key,
            std::env::var("LLM_BASE_URL").ok().filter(|u| !u.is_empty()),
            std::env::var("LLM_MODEL").ok().filter(|m| !m.is_empty()),
        ))
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub async fn complete(&self, prompt: &str, max_tokens: u32) -> Result<String, LlmCallError> {
        let body = ChatRequest {
            model: &self.model,
            messages: vec![ChatMessage {
                role: "user",
                content: prompt,
            }],
            max_tokens,
            temperature: 0.4,
        };

        let response = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmCallError::Failed(e.to_string()))?;

        if response.status().as_u16() == 429 {
            let retry_after = response
                .headers()
                .get("retry-after")
                .and_then(|v| v.to_str().ok())
                .and_then(|v| v.parse().ok())
                .unwrap_or(DEFAULT_RETRY_AFTER_SECS);
            return Err(LlmCallError::RateLimited { retry_after });
        }
        if !response.status().is_success() {
            return Err(LlmCallError::Failed(format!(
                "provider returned {}",
                response.status()
            )));
        }

        let parsed: ChatResponse = response
            .json()
            .await
            .map_err(|e| LlmCallError::Failed(e.to_string()))?;
        let text = parsed
            .choices
            .into_iter()
            .next()
            .map(|c| c.message.content)
            .unwrap_or_default();
        let text = text.trim().to_string();
        if text.is_empty() {
            return Err(LlmCallError::Failed("empty completion".to_string()));
        }
        Ok(text)
    }
}

#[derive(Serialize)]
struct ChatRequest<'a> {
    model: &'a str,
    messages: Vec<ChatMessage<'a>>,
    max_tokens: u32,
    temperature: f64,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'a str,
    content: &'a str,
}

#[derive(Deserialize)]
struct ChatResponse {
    choices: Vec<ChatChoice>,
}

#[derive(Deserialize)]
struct ChatChoice {
    message: ChatChoiceMessage,
}

#[derive(Deserialize)]
struct ChatChoiceMessage {
    content: String,
}
