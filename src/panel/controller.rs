//! Transcript controller: the chat panel state machine.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, PoisonError, RwLock, RwLockWriteGuard};
use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::{debug, info, warn};

use super::action::{ChatAction, FormPayload};
use super::entry::{ActionReply, EntryIdGenerator, InboundEntry, Renderable, TranscriptEntry};
use super::inbound::InboundBuffer;
use super::mirror::ConversationMirror;
use crate::error::{ChatError, Result};
use crate::llm::Message;

/// Presentation mode of the panel.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UiMode {
    /// Transcript and input form are shown.
    #[default]
    Expanded,
    /// Only the "start new" control is shown.
    Collapsed,
}

/// What to do when a submission fails or resolves malformed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FailurePolicy {
    /// Append a visible error entry answering the user's message.
    #[default]
    Surface,
    /// Leave the user's message unanswered.
    Silent,
}

impl FailurePolicy {
    #[must_use]
    pub fn from_surface_errors(surface: bool) -> Self {
        if surface { Self::Surface } else { Self::Silent }
    }
}

/// Read-only view of a panel, used for rendering and the JSON API.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PanelSnapshot {
    pub session_id: String,
    pub mode: UiMode,
    pub transcript: Vec<TranscriptEntry>,
    pub draft: String,
    pub show_suggestions: bool,
    pub inbound_len: usize,
    pub pending: usize,
}

/// Per-session chat panel.
///
/// Cheap to clone; clones share state. Locks are never held across the
/// action's `.await`, so a panel stays usable while a submission is pending.
#[derive(Debug, Clone)]
pub struct ChatPanel {
    inner: Arc<PanelInner>,
}

#[derive(Debug)]
struct PanelInner {
    session_id: String,
    action: Arc<dyn ChatAction>,
    mirror: ConversationMirror,
    policy: FailurePolicy,
    ids: EntryIdGenerator,
    in_flight: AtomicUsize,
    state: RwLock<PanelState>,
}

#[derive(Debug)]
struct PanelState {
    transcript: Vec<TranscriptEntry>,
    inbound: InboundBuffer,
    draft: String,
    /// One-shot flag set by `clear` and consumed by focus management.
    just_cleared: bool,
    show_suggestions: bool,
    /// Bumped by `clear`; replies from older epochs are discarded.
    epoch: u64,
    last_activity: DateTime<Utc>,
}

/// Decrements the in-flight count even if the submit future is dropped.
struct InFlight<'a>(&'a AtomicUsize);

impl<'a> InFlight<'a> {
    fn enter(counter: &'a AtomicUsize) -> Self {
        counter.fetch_add(1, Ordering::SeqCst);
        Self(counter)
    }
}

impl Drop for InFlight<'_> {
    fn drop(&mut self) {
        self.0.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ChatPanel {
    /// Create a panel with an empty transcript in `Expanded` mode.
    #[must_use]
    pub fn new(
        session_id: impl Into<String>,
        action: Arc<dyn ChatAction>,
        mirror: ConversationMirror,
        policy: FailurePolicy,
    ) -> Self {
        Self {
            inner: Arc::new(PanelInner {
                session_id: session_id.into(),
                action,
                mirror,
                policy,
                ids: EntryIdGenerator::new(),
                in_flight: AtomicUsize::new(0),
                state: RwLock::new(PanelState {
                    transcript: Vec::new(),
                    inbound: InboundBuffer::new(),
                    draft: String::new(),
                    just_cleared: false,
                    show_suggestions: false,
                    epoch: 0,
                    last_activity: Utc::now(),
                }),
            }),
        }
    }

    #[must_use]
    pub fn session_id(&self) -> &str {
        &self.inner.session_id
    }

    #[must_use]
    pub fn mirror(&self) -> &ConversationMirror {
        &self.inner.mirror
    }

    #[must_use]
    pub fn policy(&self) -> FailurePolicy {
        self.inner.policy
    }

    /// Push entries through the inbound channel without draining them.
    ///
    /// Returns the mode the panel is in right after delivery.
    pub fn deliver(&self, entries: impl IntoIterator<Item = InboundEntry>) -> UiMode {
        let mut state = self.write_state();
        // Stamp under the lock so id order matches transcript order
        let stamped: Vec<TranscriptEntry> = entries
            .into_iter()
            .map(|e| TranscriptEntry {
                id: self.inner.ids.next_id(),
                component: e.component,
                is_generating: e.is_generating,
                reply_to: None,
            })
            .collect();
        state.inbound.extend(stamped);
        debug!(
            session_id = %self.inner.session_id,
            buffered = state.inbound.len(),
            "Inbound entries delivered"
        );
        state.mode()
    }

    /// Move every buffered inbound entry to the end of the transcript.
    ///
    /// Returns how many entries moved; an empty buffer is a no-op.
    pub fn on_inbound_change(&self) -> usize {
        let mut state = self.write_state();
        if state.inbound.is_empty() {
            return 0;
        }
        let drained = state.inbound.drain();
        let moved = drained.len();
        state.transcript.extend(drained);
        debug!(
            session_id = %self.inner.session_id,
            moved,
            transcript_len = state.transcript.len(),
            "Inbound buffer drained"
        );
        moved
    }

    /// Submit the user's draft to the AI action.
    ///
    /// The user's entry is appended and the draft cleared before the action
    /// is awaited. On success the reply is appended and returned, and the
    /// turns it reports are recorded in the mirror. `Ok(None)` means the reply
    /// arrived after a `clear` and was discarded along with its turns.
    pub async fn submit(&self, draft: &str) -> Result<Option<TranscriptEntry>> {
        if draft.trim().is_empty() {
            return Err(ChatError::EmptyDraft);
        }

        let (user_id, epoch) = {
            let mut state = self.write_state();
            let user_id = self.inner.ids.next_id();
            state
                .transcript
                .push(TranscriptEntry::user(user_id, draft));
            state.draft.clear();
            state.show_suggestions = false;
            (user_id, state.epoch)
        };

        info!(
            name: "chat.submit.started",
            session_id = %self.inner.session_id,
            entry_id = %user_id,
            input_length = draft.len(),
            "Submitting draft"
        );

        let result = {
            let _guard = InFlight::enter(&self.inner.in_flight);
            self.inner
                .action
                .submit(&self.inner.mirror, FormPayload::new(draft))
                .await
        };

        let outcome = result.and_then(validate_reply);
        let mut state = self.write_state();
        if state.epoch != epoch {
            debug!(
                session_id = %self.inner.session_id,
                entry_id = %user_id,
                "Discarding reply to a cleared conversation"
            );
            return outcome.map(|_| None);
        }

        match outcome {
            Ok(reply) => {
                // Mirror writes happen under the state lock, as in `clear`.
                for turn in reply.turns {
                    self.inner.mirror.add_message(turn);
                }
                let entry = TranscriptEntry {
                    id: self.inner.ids.next_id(),
                    component: reply.component,
                    is_generating: reply.is_generating,
                    reply_to: Some(user_id),
                };
                state.transcript.push(entry.clone());
                info!(
                    name: "chat.submit.completed",
                    session_id = %self.inner.session_id,
                    entry_id = %entry.id,
                    reply_to = %user_id,
                    "Reply appended"
                );
                Ok(Some(entry))
            }
            Err(err) => {
                warn!(
                    name: "chat.submit.failed",
                    session_id = %self.inner.session_id,
                    entry_id = %user_id,
                    error = %err,
                    policy = ?self.inner.policy,
                    "Submission failed"
                );
                if self.inner.policy == FailurePolicy::Surface {
                    state.transcript.push(TranscriptEntry {
                        id: self.inner.ids.next_id(),
                        component: Renderable::error(err.to_string()),
                        is_generating: false,
                        reply_to: Some(user_id),
                    });
                }
                Err(err)
            }
        }
    }

    /// Start a new conversation.
    pub fn clear(&self) {
        let mut state = self.write_state();
        state.just_cleared = true;
        state.transcript.clear();
        state.epoch += 1;
        self.inner.mirror.reset();
        drop(state);
        info!(
            name: "chat.cleared",
            session_id = %self.inner.session_id,
            "Conversation cleared"
        );
    }

    /// Consume the one-shot focus request left by [`Self::clear`].
    pub fn take_focus_request(&self) -> bool {
        let mut state = self.write_state();
        std::mem::take(&mut state.just_cleared)
    }

    /// Replace the draft as the user types.
    pub fn set_draft(&self, text: impl Into<String>) {
        let mut state = self.write_state();
        state.draft = text.into();
        state.show_suggestions = state.draft.is_empty();
    }

    /// Copy a suggestion into the draft.
    pub fn pick_suggestion(&self, message: impl Into<String>) {
        self.write_state().draft = message.into();
    }

    pub fn focus_input(&self) {
        self.write_state().show_suggestions = true;
    }

    pub fn blur_input(&self) {
        self.write_state().show_suggestions = false;
    }

    #[must_use]
    pub fn mode(&self) -> UiMode {
        self.read_state(PanelState::mode)
    }

    #[must_use]
    pub fn transcript(&self) -> Vec<TranscriptEntry> {
        self.read_state(|s| s.transcript.clone())
    }

    #[must_use]
    pub fn draft(&self) -> String {
        self.read_state(|s| s.draft.clone())
    }

    /// Number of submissions awaiting the action.
    #[must_use]
    pub fn pending(&self) -> usize {
        self.inner.in_flight.load(Ordering::SeqCst)
    }

    #[must_use]
    pub fn snapshot(&self) -> PanelSnapshot {
        self.read_state(|s| PanelSnapshot {
            session_id: self.inner.session_id.clone(),
            mode: s.mode(),
            transcript: s.transcript.clone(),
            draft: s.draft.clone(),
            show_suggestions: s.show_suggestions,
            inbound_len: s.inbound.len(),
            pending: self.pending(),
        })
    }

    /// Whether the panel has been idle longer than `timeout`.
    #[must_use]
    pub fn is_expired_with_timeout(&self, timeout: Duration) -> bool {
        if self.pending() > 0 {
            return false;
        }
        let last = self.read_state(|s| s.last_activity);
        (Utc::now() - last)
            .to_std()
            .is_ok_and(|idle| idle > timeout)
    }

    fn read_state<T>(&self, f: impl FnOnce(&PanelState) -> T) -> T {
        let guard = self
            .inner
            .state
            .read()
            .unwrap_or_else(PoisonError::into_inner);
        f(&guard)
    }

    fn write_state(&self) -> RwLockWriteGuard<'_, PanelState> {
        let mut guard = self
            .inner
            .state
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        guard.last_activity = Utc::now();
        guard
    }
}

impl PanelState {
    fn mode(&self) -> UiMode {
        if !self.inbound.is_empty() && !self.just_cleared {
            UiMode::Collapsed
        } else {
            UiMode::Expanded
        }
    }
}

/// A reply that passed validation.
struct ValidReply {
    component: Renderable,
    is_generating: bool,
    turns: Vec<Message>,
}

fn validate_reply(reply: ActionReply) -> Result<ValidReply> {
    match reply.component {
        None => Err(ChatError::Malformed("reply has no component".to_string())),
        Some(c) if c.is_blank() => Err(ChatError::Malformed("reply is blank".to_string())),
        Some(component) => Ok(ValidReply {
            component,
            is_generating: reply.is_generating,
            turns: reply.turns,
        }),
    }
}
