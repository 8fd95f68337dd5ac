//! Server-side mirror of the conversation the AI action sees.
//!
//! The AI action reads it as context. The panel appends each exchange the
//! action reports and resets it when a new conversation starts.

use std::sync::{Arc, PoisonError, RwLock};

use crate::llm::{Message, MessageRole};

/// Shared handle to one conversation's model context.
#[derive(Debug, Clone)]
pub struct ConversationMirror {
    inner: Arc<MirrorInner>,
}

#[derive(Debug)]
struct MirrorInner {
    messages: RwLock<Vec<Message>>,
    system_prompt: RwLock<Option<String>>,
}

impl Default for ConversationMirror {
    fn default() -> Self {
        Self::new()
    }
}

impl ConversationMirror {
    /// Create an empty mirror.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: Arc::new(MirrorInner {
                messages: RwLock::new(Vec::new()),
                system_prompt: RwLock::new(None),
            }),
        }
    }

    /// Set the system prompt prepended to [`Self::messages_with_system`].
    pub fn set_system_prompt(&self, prompt: impl Into<String>) {
        *self
            .inner
            .system_prompt
            .write()
            .unwrap_or_else(PoisonError::into_inner) = Some(prompt.into());
    }

    #[must_use]
    pub fn system_prompt(&self) -> Option<String> {
        self.inner
            .system_prompt
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Append one turn.
    pub fn add_message(&self, message: Message) {
        self.inner
            .messages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .push(message);
    }

    #[must_use]
    pub fn messages(&self) -> Vec<Message> {
        self.inner
            .messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Messages with the system prompt, if any, in front.
    #[must_use]
    pub fn messages_with_system(&self) -> Vec<Message> {
        let mut result = Vec::new();
        if let Some(prompt) = self.system_prompt() {
            result.push(Message::new(MessageRole::System, prompt));
        }
        result.extend(self.messages());
        result
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .messages
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Drop every message. The system prompt survives.
    pub fn reset(&self) {
        self.inner
            .messages
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mirror_lifecycle() {
        let mirror = ConversationMirror::new();
        assert!(mirror.is_empty());

        mirror.add_message(Message::new(MessageRole::User, "Hello"));
        mirror.add_message(Message::new(MessageRole::Assistant, "Hi there!"));
        assert_eq!(mirror.len(), 2);

        let messages = mirror.messages();
        assert_eq!(messages[0].role, MessageRole::User);
        assert_eq!(messages[1].role, MessageRole::Assistant);

        mirror.reset();
        assert!(mirror.is_empty());
    }

    #[test]
    fn test_system_prompt_survives_reset() {
        let mirror = ConversationMirror::new();
        mirror.set_system_prompt("You are Cogno.");
        mirror.add_message(Message::new(MessageRole::User, "q"));
        mirror.reset();

        let messages = mirror.messages_with_system();
        assert_eq!(messages.len(), 1);
        assert_eq!(messages[0].role, MessageRole::System);
    }

    #[test]
    fn test_clones_share_state() {
        let mirror = ConversationMirror::new();
        let other = mirror.clone();
        other.add_message(Message::new(MessageRole::User, "shared"));
        assert_eq!(mirror.len(), 1);
        assert_eq!(mirror.messages()[0].content, "shared");
    }
}
