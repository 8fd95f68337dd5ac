//! Thread-safe map of session id to chat panel.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock};
use std::time::Duration;

use uuid::Uuid;

use crate::panel::{ChatAction, ChatPanel, ConversationMirror, FailurePolicy};

/// Default idle timeout (30 minutes).
pub const DEFAULT_SESSION_TIMEOUT: Duration = Duration::from_secs(30 * 60);

/// Store for all live panels.
///
/// Every panel it creates shares the same action and failure policy.
#[derive(Debug, Clone)]
pub struct PanelStore {
    inner: Arc<PanelStoreInner>,
}

#[derive(Debug)]
struct PanelStoreInner {
    panels: RwLock<HashMap<String, ChatPanel>>,
    action: Arc<dyn ChatAction>,
    policy: FailurePolicy,
    system_prompt: Option<String>,
}

impl PanelStore {
    /// Create an empty store.
    #[must_use]
    pub fn new(
        action: Arc<dyn ChatAction>,
        policy: FailurePolicy,
        system_prompt: Option<String>,
    ) -> Self {
        Self {
            inner: Arc::new(PanelStoreInner {
                panels: RwLock::new(HashMap::new()),
                action,
                policy,
                system_prompt,
            }),
        }
    }

    /// Create a panel under a fresh UUID.
    #[must_use]
    pub fn create(&self) -> ChatPanel {
        self.create_with_id(Uuid::new_v4().to_string())
    }

    /// Create a panel under a specific id, replacing any existing one.
    #[must_use]
    pub fn create_with_id(&self, id: impl Into<String>) -> ChatPanel {
        let id = id.into();
        let panel = self.build_panel(&id);
        self.inner
            .panels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .insert(id, panel.clone());
        tracing::debug!(session_id = %panel.session_id(), "Panel created");
        panel
    }

    #[must_use]
    pub fn get(&self, id: &str) -> Option<ChatPanel> {
        self.inner
            .panels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .get(id)
            .cloned()
    }

    /// Get a panel by id, creating it if it doesn't exist.
    #[must_use]
    pub fn get_or_create(&self, id: &str) -> ChatPanel {
        if let Some(panel) = self.get(id) {
            return panel;
        }

        let mut guard = self
            .inner
            .panels
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard
            .entry(id.to_string())
            .or_insert_with(|| self.build_panel(id))
            .clone()
    }

    pub fn remove(&self, id: &str) -> Option<ChatPanel> {
        self.inner
            .panels
            .write()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(id)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.inner
            .panels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    #[must_use]
    pub fn list_ids(&self) -> Vec<String> {
        self.inner
            .panels
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .keys()
            .cloned()
            .collect()
    }

    fn build_panel(&self, id: &str) -> ChatPanel {
        let mirror = ConversationMirror::new();
        if let Some(prompt) = &self.inner.system_prompt {
            mirror.set_system_prompt(prompt.clone());
        }
        ChatPanel::new(
            id,
            Arc::clone(&self.inner.action),
            mirror,
            self.inner.policy,
        )
    }

    /// Remove panels idle longer than the default timeout.
    pub fn cleanup_expired(&self) -> usize {
        self.cleanup_expired_with_timeout(DEFAULT_SESSION_TIMEOUT)
    }

    /// Remove panels idle longer than `timeout`.
    ///
    /// Returns the number of panels removed.
    pub fn cleanup_expired_with_timeout(&self, timeout: Duration) -> usize {
        let mut guard = self
            .inner
            .panels
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        let before = guard.len();
        guard.retain(|_, panel| !panel.is_expired_with_timeout(timeout));
        before - guard.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ChatError;
    use crate::llm::MessageRole;
    use crate::panel::{ActionReply, FormPayload};
    use async_trait::async_trait;

    #[derive(Debug)]
    struct Echo;

    #[async_trait]
    impl ChatAction for Echo {
        async fn submit(
            &self,
            _mirror: &ConversationMirror,
            payload: FormPayload,
        ) -> Result<ActionReply, ChatError> {
            Ok(ActionReply::assistant(payload.input))
        }
    }

    fn store() -> PanelStore {
        PanelStore::new(Arc::new(Echo), FailurePolicy::Surface, None)
    }

    #[test]
    fn test_panel_store() {
        let store = store();
        assert!(store.is_empty());

        let panel = store.create();
        assert_eq!(store.len(), 1);

        let retrieved = store.get(panel.session_id()).unwrap();
        assert_eq!(retrieved.session_id(), panel.session_id());

        store.remove(panel.session_id());
        assert!(store.is_empty());
    }

    #[test]
    fn test_get_or_create_reuses_panel() {
        let store = store();
        let a = store.get_or_create("fixed");
        a.set_draft("typing");
        let b = store.get_or_create("fixed");
        assert_eq!(b.draft(), "typing");
        assert_eq!(store.list_ids(), vec!["fixed".to_string()]);
    }

    #[test]
    fn test_system_prompt_applied_to_new_mirrors() {
        let store = PanelStore::new(
            Arc::new(Echo),
            FailurePolicy::Silent,
            Some("Be brief.".to_string()),
        );
        let panel = store.create();
        let messages = panel.mirror().messages_with_system();
        assert_eq!(messages[0].role, MessageRole::System);
        assert_eq!(panel.policy(), FailurePolicy::Silent);
    }

    #[test]
    fn test_cleanup_expired() {
        let store = store();
        let _ = store.create();
        let _ = store.create();
        assert_eq!(store.cleanup_expired(), 0);

        std::thread::sleep(Duration::from_millis(5));
        assert_eq!(store.cleanup_expired_with_timeout(Duration::from_millis(1)), 2);
        assert!(store.is_empty());
    }
}
