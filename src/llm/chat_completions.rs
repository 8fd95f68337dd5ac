//! Chat Completions implementation of the AI action.

use async_trait::async_trait;
use serde::Deserialize;

use super::provider::AuthStyle;
use super::{LlmSettings, Message, MessageRole};
use crate::error::ChatError;
use crate::panel::{ActionReply, ChatAction, ConversationMirror, FormPayload};

/// Resolves each submission with one non-streaming completion.
#[derive(Clone)]
pub struct CompletionAction {
    http: reqwest::Client,
    settings: LlmSettings,
}

impl std::fmt::Debug for CompletionAction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CompletionAction")
            .field("base_url", &self.settings.base_url)
            .field("model", &self.settings.model)
            .field("provider", &self.settings.provider)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Deserialize)]
struct CompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ChoiceMessage,
}

#[derive(Debug, Deserialize)]
struct ChoiceMessage {
    #[serde(default)]
    content: Option<String>,
}

impl CompletionAction {
    /// Create an action with the given settings.
    pub fn new(settings: LlmSettings) -> Result<Self, ChatError> {
        let http = reqwest::Client::builder()
            .timeout(settings.timeout)
            .build()?;
        Ok(Self { http, settings })
    }

    fn request_body(&self, messages: &[Message]) -> serde_json::Value {
        serde_json::json!({
            "model": self.settings.model,
            "stream": false,
            "messages": messages,
        })
    }
}

#[async_trait]
impl ChatAction for CompletionAction {
    async fn submit(
        &self,
        mirror: &ConversationMirror,
        payload: FormPayload,
    ) -> Result<ActionReply, ChatError> {
        let url = self
            .settings
            .provider
            .build_chat_url(&self.settings.base_url);

        let mut messages = mirror.messages_with_system();
        messages.push(Message::new(MessageRole::User, payload.input.clone()));

        tracing::debug!(
            url = %url,
            model = %self.settings.model,
            message_count = messages.len(),
            "Requesting completion"
        );

        let mut rb = self.http.post(&url).json(&self.request_body(&messages));
        if let Some(key) = &self.settings.api_key {
            rb = match self.settings.provider.auth_style() {
                AuthStyle::Bearer => rb.bearer_auth(key),
                AuthStyle::ApiKeyHeader => rb.header("api-key", key),
            };
        }

        let resp = rb.send().await.map_err(map_transport_error)?;
        let status = resp.status();
        if !status.is_success() {
            let message = resp.text().await.unwrap_or_default();
            tracing::error!(status = %status, "Completion endpoint returned error status");
            return Err(ChatError::Api {
                status: status.as_u16(),
                message,
            });
        }

        let body: CompletionResponse = resp.json().await.map_err(map_transport_error)?;
        let content = body
            .choices
            .into_iter()
            .next()
            .and_then(|c| c.message.content);

        let Some(text) = content else {
            // Let the panel decide how a reply without content is shown.
            return Ok(ActionReply::default());
        };

        tracing::debug!(content_length = text.len(), "Completion received");
        let turns = [
            Message::new(MessageRole::User, payload.input),
            Message::new(MessageRole::Assistant, text.clone()),
        ];
        Ok(ActionReply::assistant(text).with_turns(turns))
    }
}

fn map_transport_error(err: reqwest::Error) -> ChatError {
    if err.is_timeout() {
        ChatError::Timeout
    } else {
        ChatError::Http(err)
    }
}
