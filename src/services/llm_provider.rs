use std::time::Duration;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::phonics::feedback::TextGenerator;

const DEFAULT_MODEL: &str = "gpt-4o-mini";
const DEFAULT_API_ENDPOINT: &str = "https://api.openai.com/v1";
const DEFAULT_TIMEOUT_MS: u64 = 30_000;
const DEFAULT_TEMPERATURE: f32 = 0.7;
const DEFAULT_MAX_TOKENS: u32 = 500;

#[derive(Debug, Clone)]
pub struct LLMConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub api_endpoint: String,
    pub timeout: Duration,
    pub temperature: f32,
    pub max_tokens: u32,
}

impl LLMConfig {
    pub fn from_env() -> Self {
        Self {
            api_key: env_string("LLM_API_KEY"),
            model: env_string("LLM_MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string()),
            api_endpoint: normalize_endpoint(
                env_string("LLM_API_ENDPOINT")
                    .or_else(|| env_string("LLM_BASE_URL"))
                    .unwrap_or_else(|| DEFAULT_API_ENDPOINT.to_string()),
            ),
            timeout: Duration::from_millis(env_u64("LLM_TIMEOUT").unwrap_or(DEFAULT_TIMEOUT_MS)),
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String,
    pub content: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatResponse {
    pub model: Option<String>,
    pub choices: Vec<ChatChoice>,
}

impl ChatResponse {
    pub fn first_content(&self) -> Option<&str> {
        self.choices
            .first()
            .map(|c| c.message.content.as_str())
            .filter(|c| !c.trim().is_empty())
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct ChatChoice {
    pub message: ChatMessage,
}

#[derive(Debug, Error)]
pub enum LLMError {
    #[error("LLM not configured: {0}")]
    NotConfigured(&'static str),
    #[error("request failed: {0}")]
    Request(#[from] reqwest::Error),
    #[error("HTTP {status}: {body}")]
    HttpStatus { status: reqwest::StatusCode, body: String },
    #[error("JSON decode failed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("empty response")]
    EmptyChoices,
}

/// OpenAI-compatible chat completion client. One request per call, no retry.
#[derive(Clone)]
pub struct LLMProvider {
    config: LLMConfig,
    client: reqwest::Client,
}

impl LLMProvider {
    pub fn from_env() -> Self {
        Self::new(LLMConfig::from_env())
    }

    pub fn new(config: LLMConfig) -> Self {
        let client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new());
        Self { config, client }
    }

    pub fn config(&self) -> &LLMConfig {
        &self.config
    }

    pub fn is_available(&self) -> bool {
        self.config.api_key.as_deref().is_some_and(|v| !v.trim().is_empty())
            && !self.config.model.trim().is_empty()
            && !self.config.api_endpoint.trim().is_empty()
    }

    pub async fn complete(&self, prompt: &str) -> Result<String, LLMError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .filter(|v| !v.trim().is_empty())
            .ok_or(LLMError::NotConfigured("LLM_API_KEY"))?;

        let url = format!("{}/chat/completions", self.config.api_endpoint.trim_end_matches('/'));
        let payload = serde_json::json!({
            "model": self.config.model,
            "messages": [ChatMessage { role: "user".into(), content: prompt.into() }],
            "temperature": self.config.temperature,
            "max_tokens": self.config.max_tokens,
            "stream": false
        });

        let resp = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&payload)
            .send()
            .await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(LLMError::HttpStatus { status, body });
        }

        let bytes = resp.bytes().await?;
        let parsed: ChatResponse = serde_json::from_slice(&bytes).map_err(|e| {
            tracing::error!(error = %e, body = %String::from_utf8_lossy(&bytes), "failed to parse LLM response JSON");
            LLMError::Json(e)
        })?;

        parsed
            .first_content()
            .map(str::to_string)
            .ok_or(LLMError::EmptyChoices)
    }
}

impl TextGenerator for LLMProvider {
    fn is_available(&self) -> bool {
        LLMProvider::is_available(self)
    }

    async fn generate(&self, prompt: &str) -> Result<String, LLMError> {
        self.complete(prompt).await
    }
}

fn env_string(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.trim().is_empty())
}

fn env_u64(key: &str) -> Option<u64> {
    env_string(key)?.parse().ok()
}

pub(crate) fn normalize_endpoint(endpoint: String) -> String {
    let trimmed = endpoint.trim().trim_end_matches('/');
    if trimmed.ends_with("/v1") || trimmed.contains("/v1/") {
        trimmed.to_string()
    } else {
        format!("{trimmed}/v1")
    }
}
