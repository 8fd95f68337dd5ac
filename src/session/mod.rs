//! Per-session panel storage.
//!
//! Each browser session gets its own [`ChatPanel`], identified by UUID and
//! kept in memory until it idles out.
//!
//! # Example
//!
//! ```rust,ignore
//! use cogno_chat::session::PanelStore;
//!
//! let store = PanelStore::new(action, FailurePolicy::Surface, None);
//! let panel = store.create();
//! assert!(store.get(panel.session_id()).is_some());
//! ```

mod store;

pub use store::PanelStore;
