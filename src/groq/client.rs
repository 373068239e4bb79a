//! Groq chat-completions client
//!
//! Thin client for Groq's OpenAI-compatible `/chat/completions` endpoint.
//! The agent loop talks to it through the [`CompletionBackend`] trait, so a
//! run can be driven by a scripted backend in tests.

use std::time::Instant;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::metrics::LLM_CALL_TIME;

/// Default API base URL.
pub const DEFAULT_BASE_URL: &str = "https://api.groq.com/openai/v1";

/// Model used for code generation (production runs).
pub const DEFAULT_CODE_MODEL: &str = "qwen-2.5-coder-32b";

/// Heavier-reasoning model selected in debug mode.
pub const DEFAULT_REASONING_MODEL: &str = "qwen-2.5-32b";

/// Completions are deterministic and bounded.
const TEMPERATURE: f64 = 0.0;
const MAX_COMPLETION_TOKENS: u32 = 1024;

/// A message in a chat conversation
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChatMessage {
    pub role: String, // "system", "user", "assistant"
    pub content: String,
}

impl ChatMessage {
    pub fn system(content: impl Into<String>) -> Self {
        Self {
            role: "system".to_string(),
            content: content.into(),
        }
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self {
            role: "user".to_string(),
            content: content.into(),
        }
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self {
            role: "assistant".to_string(),
            content: content.into(),
        }
    }
}

/// Error type for completion calls
#[derive(Debug)]
pub enum ProviderError {
    /// `GROQ_API_KEY` is not set. A startup-time configuration error.
    MissingCredential,
    Request(reqwest::Error),
    Status { code: u16, body: String },
    Parse(serde_json::Error),
    EmptyResponse,
}

impl std::fmt::Display for ProviderError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ProviderError::MissingCredential => {
                write!(f, "GROQ_API_KEY is not set")
            }
            ProviderError::Request(e) => write!(f, "Request error: {}", e),
            ProviderError::Status { code, body } => {
                write!(f, "Provider returned HTTP {}: {}", code, body)
            }
            ProviderError::Parse(e) => write!(f, "Parse error: {}", e),
            ProviderError::EmptyResponse => write!(f, "Empty response from provider"),
        }
    }
}

impl std::error::Error for ProviderError {}

impl From<reqwest::Error> for ProviderError {
    fn from(e: reqwest::Error) -> Self {
        ProviderError::Request(e)
    }
}

impl From<serde_json::Error> for ProviderError {
    fn from(e: serde_json::Error) -> Self {
        ProviderError::Parse(e)
    }
}

/// The model-provider seam consumed by the orchestrator.
///
/// `debug_mode` selects the heavier-reasoning model variant. Failures are
/// never swallowed here; the orchestrator terminates the run on any error.
#[async_trait]
pub trait CompletionBackend: Send + Sync {
    async fn complete(
        &self,
        history: &[ChatMessage],
        debug_mode: bool,
    ) -> Result<String, ProviderError>;
}

/// Client for Groq's chat completions API
#[derive(Clone)]
pub struct GroqClient {
    base_url: String,
    api_key: String,
    code_model: String,
    reasoning_model: String,
    client: reqwest::Client,
}

impl GroqClient {
    /// Create a new client with the default base URL and models.
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            code_model: DEFAULT_CODE_MODEL.to_string(),
            reasoning_model: DEFAULT_REASONING_MODEL.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Create a client from the environment.
    ///
    /// Reads `GROQ_API_KEY` (required) and `GROQ_BASE_URL` (optional).
    pub fn from_env() -> Result<Self, ProviderError> {
        let api_key = std::env::var("GROQ_API_KEY")
            .ok()
            .filter(|key| !key.is_empty())
            .ok_or(ProviderError::MissingCredential)?;
        let mut client = Self::new(api_key);
        if let Ok(base_url) = std::env::var("GROQ_BASE_URL") {
            client.base_url = base_url;
        }
        Ok(client)
    }

    /// Override the base URL (e.g. a local OpenAI-compatible server).
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    /// Override the production and debug model names.
    pub fn with_models(
        mut self,
        code_model: impl Into<String>,
        reasoning_model: impl Into<String>,
    ) -> Self {
        self.code_model = code_model.into();
        self.reasoning_model = reasoning_model.into();
        self
    }

    /// Model name selected for the given mode.
    pub fn model_for(&self, debug_mode: bool) -> &str {
        if debug_mode {
            &self.reasoning_model
        } else {
            &self.code_model
        }
    }

    fn request_body(&self, history: &[ChatMessage], debug_mode: bool) -> serde_json::Value {
        serde_json::json!({
            "model": self.model_for(debug_mode),
            "messages": history,
            "temperature": TEMPERATURE,
            "max_tokens": MAX_COMPLETION_TOKENS,
        })
    }
}

#[derive(Debug, Deserialize)]
struct ChatCompletion {
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    content: Option<String>,
}

#[async_trait]
impl CompletionBackend for GroqClient {
    async fn complete(
        &self,
        history: &[ChatMessage],
        debug_mode: bool,
    ) -> Result<String, ProviderError> {
        let endpoint = format!("{}/chat/completions", self.base_url);
        let model = self.model_for(debug_mode).to_string();
        let body = self.request_body(history, debug_mode);

        let start = Instant::now();
        let response = self
            .client
            .post(&endpoint)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await?;

        let status = response.status();
        let text = response.text().await?;
        LLM_CALL_TIME
            .with_label_values(&[&model])
            .observe(start.elapsed().as_secs_f64());

        if !status.is_success() {
            return Err(ProviderError::Status {
                code: status.as_u16(),
                body: text,
            });
        }
        if text.is_empty() {
            return Err(ProviderError::EmptyResponse);
        }

        let completion: ChatCompletion = serde_json::from_str(&text)?;
        let content = completion
            .choices
            .into_iter()
            .next()
            .and_then(|choice| choice.message.content)
            .unwrap_or_default();

        if content.trim().is_empty() {
            return Err(ProviderError::EmptyResponse);
        }
        Ok(content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_chat_message_construction() {
        let user_msg = ChatMessage::user("Hello, world!");
        assert_eq!(user_msg.role, "user");
        assert_eq!(user_msg.content, "Hello, world!");

        let system_msg = ChatMessage::system("You are helpful.");
        assert_eq!(system_msg.role, "system");

        let assistant_msg = ChatMessage::assistant("I can help!");
        assert_eq!(assistant_msg.role, "assistant");
    }

    #[test]
    fn test_chat_message_serialization() {
        let msg = ChatMessage::user("test message");
        let json = serde_json::to_string(&msg).unwrap();

        assert!(json.contains("\"role\":\"user\""));
        assert!(json.contains("\"content\":\"test message\""));
    }

    #[test]
    fn debug_mode_selects_the_reasoning_model() {
        let client = GroqClient::new("key");
        assert_eq!(client.model_for(false), DEFAULT_CODE_MODEL);
        assert_eq!(client.model_for(true), DEFAULT_REASONING_MODEL);
    }

    #[test]
    fn request_body_pins_sampling_parameters() {
        let client = GroqClient::new("key");
        let history = vec![ChatMessage::system("sys"), ChatMessage::user("hi")];
        let body = client.request_body(&history, false);

        assert_eq!(body["model"], DEFAULT_CODE_MODEL);
        assert_eq!(body["temperature"], 0.0);
        assert_eq!(body["max_tokens"], 1024);
        assert_eq!(body["messages"].as_array().unwrap().len(), 2);
        assert_eq!(body["messages"][0]["role"], "system");
    }

    #[test]
    fn completion_response_shape_deserializes() {
        let json = r#"{"choices":[{"message":{"role":"assistant","content":"hello"}}]}"#;
        let completion: ChatCompletion = serde_json::from_str(json).unwrap();
        assert_eq!(
            completion.choices[0].message.content.as_deref(),
            Some("hello")
        );
    }
}
