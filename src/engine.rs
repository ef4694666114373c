use std::time::{Duration, Instant};

use anyhow::{Context, Result};
use serde::Serialize;
use thiserror::Error;
use tracing::{debug, info};

use crate::prompt::SYSTEM_INSTRUCTION;

pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";
pub const DEFAULT_MODEL: &str = "llama3-70b-8192";
pub const DEFAULT_TEMPERATURE: f32 = 0.1;
pub const DEFAULT_MAX_TOKENS: u32 = 1024;
pub const DEFAULT_TIMEOUT_SECS: u64 = 60;

const MAX_ERROR_BODY_CHARS: usize = 512;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ChatMessage {
    pub role: Role,
    pub content: String,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SamplingParams {
    pub temperature: f32,
    pub max_tokens: u32,
}

impl Default for SamplingParams {
    fn default() -> Self {
        Self {
            temperature: DEFAULT_TEMPERATURE,
            max_tokens: DEFAULT_MAX_TOKENS,
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct CompletionRequest {
    pub messages: Vec<ChatMessage>,
    pub sampling: SamplingParams,
}

impl CompletionRequest {
    /// Fixed system instruction followed by `prompt` as the user turn.
    pub fn for_prompt(prompt: String, sampling: SamplingParams) -> Self {
        Self {
            messages: vec![
                ChatMessage {
                    role: Role::System,
                    content: SYSTEM_INSTRUCTION.to_string(),
                },
                ChatMessage {
                    role: Role::User,
                    content: prompt,
                },
            ],
            sampling,
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("no API key configured; set GROQ_API_KEY or pass --api-key")]
    MissingApiKey,

    #[error("request to {url} failed: {source}")]
    Http {
        url: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("engine returned status {status}: {body}")]
    Status { status: u16, body: String },

    #[error("failed to decode engine response: {0}")]
    Decode(String),

    #[error("engine response contained no message content")]
    EmptyContent,
}

/// Prompt in, free text out. Implementations own transport, credentials,
/// timeouts and model choice.
pub trait ReasoningEngine {
    fn complete(&self, request: &CompletionRequest) -> Result<String, EngineError>;

    fn model(&self) -> Option<&str> {
        None
    }
}

#[derive(Debug, Clone)]
pub struct EngineConfig {
    pub api_key: Option<String>,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            base_url: DEFAULT_BASE_URL.to_string(),
            model: DEFAULT_MODEL.to_string(),
            timeout: Duration::from_secs(DEFAULT_TIMEOUT_SECS),
        }
    }
}

#[derive(Serialize)]
struct ChatCompletionBody<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
    temperature: f32,
    max_tokens: u32,
}

/// Blocking client for OpenAI-compatible `/chat/completions` endpoints.
pub struct ChatCompletionsEngine {
    config: EngineConfig,
    client: reqwest::blocking::Client,
}

impl ChatCompletionsEngine {
    pub fn new(config: EngineConfig) -> Result<Self> {
        let client = reqwest::blocking::Client::builder()
            .timeout(config.timeout)
            .build()
            .context("failed to build HTTP client")?;
        Ok(Self { config, client })
    }

    fn endpoint(&self) -> String {
        format!(
            "{}/chat/completions",
            self.config.base_url.trim_end_matches('/')
        )
    }
}

impl ReasoningEngine for ChatCompletionsEngine {
    fn complete(&self, request: &CompletionRequest) -> Result<String, EngineError> {
        let api_key = self
            .config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|value| !value.is_empty())
            .ok_or(EngineError::MissingApiKey)?;

        let url = self.endpoint();
        let body = ChatCompletionBody {
            model: &self.config.model,
            messages: &request.messages,
            temperature: request.sampling.temperature,
            max_tokens: request.sampling.max_tokens,
        };

        info!(model = %self.config.model, url = %url, "requesting completion");
        let started = Instant::now();

        let response = self
            .client
            .post(&url)
            .bearer_auth(api_key)
            .json(&body)
            .send()
            .map_err(|source| EngineError::Http {
                url: url.clone(),
                source,
            })?;

        let status = response.status();
        let text = response.text().map_err(|source| EngineError::Http {
            url: url.clone(),
            source,
        })?;

        debug!(
            status = status.as_u16(),
            elapsed_ms = started.elapsed().as_millis() as u64,
            body_len = text.len(),
            "completion response received"
        );

        if !status.is_success() {
            return Err(EngineError::Status {
                status: status.as_u16(),
                body: truncate_chars(text.trim(), MAX_ERROR_BODY_CHARS),
            });
        }

        parse_completion(&text)
    }

    fn model(&self) -> Option<&str> {
        Some(&self.config.model)
    }
}

pub(crate) fn parse_completion(body: &str) -> Result<String, EngineError> {
    let json: serde_json::Value =
        serde_json::from_str(body).map_err(|err| EngineError::Decode(err.to_string()))?;

    let content = json
        .pointer("/choices/0/message/content")
        .and_then(|value| value.as_str())
        .ok_or(EngineError::EmptyContent)?;

    if content.trim().is_empty() {
        return Err(EngineError::EmptyContent);
    }
    Ok(content.to_string())
}

fn truncate_chars(value: &str, max_chars: usize) -> String {
    match value.char_indices().nth(max_chars) {
        Some((index, _)) => format!("{}...", &value[..index]),
        None => value.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn request_carries_system_then_user_message() {
        let request =
            CompletionRequest::for_prompt("rate this".to_string(), SamplingParams::default());
        assert_eq!(request.messages.len(), 2);
        assert_eq!(request.messages[0].role, Role::System);
        assert_eq!(request.messages[0].content, SYSTEM_INSTRUCTION);
        assert_eq!(request.messages[1].role, Role::User);
        assert_eq!(request.messages[1].content, "rate this");
        assert_eq!(request.sampling.temperature, 0.1);
        assert_eq!(request.sampling.max_tokens, 1024);
    }

    #[test]
    fn body_serializes_openai_shape() {
        let request = CompletionRequest::for_prompt("hi".to_string(), SamplingParams::default());
        let body = ChatCompletionBody {
            model: DEFAULT_MODEL,
            messages: &request.messages,
            temperature: request.sampling.temperature,
            max_tokens: request.sampling.max_tokens,
        };
        let value = serde_json::to_value(&body).unwrap();

        assert_eq!(value["model"], "llama3-70b-8192");
        assert_eq!(value["messages"][0]["role"], "system");
        assert_eq!(value["messages"][1]["role"], "user");
        assert_eq!(value["messages"][1]["content"], "hi");
        assert_eq!(value["max_tokens"], 1024);
    }

    #[test]
    fn parse_completion_reads_first_choice() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"FINAL SENTIMENT: POSITIVE"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), "FINAL SENTIMENT: POSITIVE");
    }

    #[test]
    fn parse_completion_rejects_missing_or_blank_content() {
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(EngineError::EmptyContent)
        ));
        assert!(matches!(
            parse_completion(r#"{"choices":[{"message":{"content":"  "}}]}"#),
            Err(EngineError::EmptyContent)
        ));
        assert!(matches!(
            parse_completion("<html>bad gateway</html>"),
            Err(EngineError::Decode(_))
        ));
    }

    #[test]
    fn missing_api_key_fails_before_any_request() {
        let engine = ChatCompletionsEngine::new(EngineConfig {
            base_url: "http://127.0.0.1:9".to_string(),
            ..EngineConfig::default()
        })
        .unwrap();
        let request = CompletionRequest::for_prompt("x".to_string(), SamplingParams::default());

        assert!(matches!(
            engine.complete(&request),
            Err(EngineError::MissingApiKey)
        ));
    }

    #[test]
    fn endpoint_joins_without_double_slash() {
        let engine = ChatCompletionsEngine::new(EngineConfig {
            base_url: "https://example.test/v1/".to_string(),
            ..EngineConfig::default()
        })
        .unwrap();
        assert_eq!(engine.endpoint(), "https://example.test/v1/chat/completions");
    }

    #[test]
    fn truncate_chars_respects_char_boundaries() {
        assert_eq!(truncate_chars("héllo", 2), "hé...");
        assert_eq!(truncate_chars("ok", 5), "ok");
    }
}
