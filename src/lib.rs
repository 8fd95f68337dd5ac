//! Cogno: a single-panel chat assistant.
//!
//! Server-rendered HTML swapped in by HTMX, with a transcript controller that
//! talks to an AI action and accepts entries pushed in from outside.
//!
//! # Architecture
//!
//! - **Server**: Axum router serving the page, panel fragments and a JSON API
//! - **Panel**: transcript state machine (submit, clear, inbound drain)
//! - **LLM**: OpenAI-compatible Chat Completions action
//! - **UI**: HTML strings + HTMX + Alpine.js
//!
//! # Modules
//!
//! - [`panel`]: transcript controller and its entry types
//! - [`session`]: per-session panel store
//! - [`llm`]: default AI action
//! - [`ui`]: HTML rendering
//! - [`server`]: routes and handlers

// Allow pedantic clippy warnings that don't add value for this codebase
#![allow(clippy::missing_fields_in_debug)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::cargo_common_metadata)]
#![allow(clippy::multiple_crate_versions)]
#![allow(clippy::unused_async)]
#![allow(clippy::map_err_ignore)]

pub mod config;
pub mod error;
pub mod llm;
pub mod panel;
pub mod server;
pub mod session;
pub mod ui;

use crate::config::AppConfig;

use session::PanelStore;
use std::sync::Arc;

/// Application state shared across all handlers.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Live chat panels keyed by session id.
    pub panels: PanelStore,
    /// Global configuration.
    pub config: Arc<AppConfig>,
}
