//! Default AI action backed by an OpenAI-compatible model endpoint.
//!
//! The panel treats the action as a black box; this module is one
//! implementation of [`ChatAction`](crate::panel::ChatAction) that sends the
//! conversation mirror plus the new input to `/v1/chat/completions` and
//! resolves with a single assistant entry.
//!
//! # Example
//!
//! ```rust,ignore
//! use cogno_chat::llm::{CompletionAction, LlmSettings};
//!
//! let settings = LlmSettings::from_env(Duration::from_secs(60))?;
//! let action = CompletionAction::new(settings)?;
//! ```

pub mod chat_completions;
pub mod provider;

pub use chat_completions::CompletionAction;
pub use provider::Provider;

use std::time::Duration;

/// LLM connection and model settings.
#[derive(Debug, Clone)]
pub struct LlmSettings {
    /// Base URL for the LLM API (e.g., `https://api.openai.com`).
    pub base_url: String,
    /// Optional API key for authentication.
    pub api_key: Option<String>,
    /// Model identifier (e.g., `gpt-4o-mini`).
    pub model: String,
    /// Provider type (auto-detected from `base_url`).
    pub provider: Provider,
    /// Upper bound on a single completion request.
    pub timeout: Duration,
}

impl LlmSettings {
    /// Read settings from `LLM_BASE_URL`, `LLM_MODEL`, `LLM_API_KEY` and the
    /// Azure deployment variables.
    pub fn from_env(timeout: Duration) -> Result<Self, String> {
        let base_url = std::env::var("LLM_BASE_URL")
            .map_err(|_| "Missing required env var: LLM_BASE_URL".to_string())?;
        if base_url.trim().is_empty() {
            return Err("LLM_BASE_URL cannot be empty".to_string());
        }

        let model = std::env::var("LLM_MODEL")
            .map_err(|_| "Missing required env var: LLM_MODEL".to_string())?;
        if model.trim().is_empty() {
            return Err("LLM_MODEL cannot be empty".to_string());
        }

        let api_key = std::env::var("LLM_API_KEY")
            .ok()
            .filter(|s| !s.trim().is_empty());

        let provider = match Provider::detect_from_url(&base_url) {
            Provider::AzureOpenAI {
                deployment_name,
                api_version,
            } => Provider::AzureOpenAI {
                deployment_name: std::env::var("AZURE_DEPLOYMENT_NAME").unwrap_or(deployment_name),
                api_version: std::env::var("AZURE_API_VERSION").unwrap_or(api_version),
            },
            other => other,
        };

        Ok(Self {
            base_url,
            api_key,
            model,
            provider,
            timeout,
        })
    }
}

/// A message in the model context.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Message {
    /// Role of the message author.
    pub role: MessageRole,
    /// Text content.
    pub content: String,
}

impl Message {
    #[must_use]
    pub fn new(role: MessageRole, content: impl Into<String>) -> Self {
        Self {
            role,
            content: content.into(),
        }
    }
}

/// Role of a message author.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum MessageRole {
    /// System prompt.
    System,
    /// User message.
    User,
    /// Assistant response.
    Assistant,
}
