//! The external AI action a panel submits to.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use super::entry::ActionReply;
use super::mirror::ConversationMirror;
use crate::error::ChatError;

/// Form data posted by the input panel.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FormPayload {
    /// The `input` field of the chat form.
    pub input: String,
}

impl FormPayload {
    #[must_use]
    pub fn new(input: impl Into<String>) -> Self {
        Self {
            input: input.into(),
        }
    }
}

/// Server-side action that turns a submission into one reply.
///
/// Implementations keep `mirror` in sync with the context they used.
#[async_trait]
pub trait ChatAction: Send + Sync + std::fmt::Debug {
    /// Resolve a submission.
    ///
    /// # Errors
    ///
    /// Returns an error when the action cannot produce a reply.
    async fn submit(
        &self,
        mirror: &ConversationMirror,
        payload: FormPayload,
    ) -> Result<ActionReply, ChatError>;
}
