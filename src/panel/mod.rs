//! Chat panel state.
//!
//! A [`ChatPanel`] owns one conversation's visible transcript, the draft the
//! user is typing, and the inbound buffer filled by out-of-band producers.
//! Submissions go to a [`ChatAction`]; the [`ConversationMirror`] holds the
//! context that action sees and is reset when a new conversation starts.
//!
//! # Example
//!
//! ```rust,ignore
//! use cogno_chat::panel::{ChatPanel, ConversationMirror, FailurePolicy};
//!
//! let panel = ChatPanel::new("abc", action, ConversationMirror::new(), FailurePolicy::Surface);
//! panel.submit("hello").await?;
//! assert_eq!(panel.transcript().len(), 2);
//! ```

mod action;
mod controller;
mod entry;
mod inbound;
mod mirror;

pub use action::{ChatAction, FormPayload};
pub use controller::{ChatPanel, FailurePolicy, PanelSnapshot, UiMode};
pub use entry::{ActionReply, EntryId, InboundEntry, Renderable, TranscriptEntry};
pub use inbound::InboundBuffer;
pub use mirror::ConversationMirror;
