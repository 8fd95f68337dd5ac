//! Server-rendered HTML for the chat page.
//!
//! Fragments are plain strings swapped in by HTMX; Alpine.js handles the
//! purely client-side bits (submit button state, theme toggle).
//!
//! # Structure
//!
//! - [`page`]: full document shell
//! - [`header`]: logo, title and theme toggle
//! - [`panel`]: the chat panel in each of its modes
//! - [`empty_screen`]: suggestion list shown on an empty transcript

pub mod empty_screen;
pub mod header;
pub mod page;
pub mod panel;

pub use page::render_page;
pub use panel::{PanelView, render_panel};

/// Escape text for element content.
pub(crate) fn text(s: &str) -> String {
    html_escape::encode_text(s).into_owned()
}

/// Escape text for a double-quoted attribute value.
pub(crate) fn attr(s: &str) -> String {
    html_escape::encode_double_quoted_attribute(s).into_owned()
}
