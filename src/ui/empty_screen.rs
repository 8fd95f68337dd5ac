//! Suggestion list shown under the input of an empty conversation.

use super::{attr, text};
use crate::config::Suggestion;

const ARROW_SVG: &str = r#"<svg class="mr-2 h-4 w-4 text-muted-foreground" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" aria-hidden="true"><path d="M5 12h14M12 5l7 7-7 7"/></svg>"#;

/// Render the suggestion list.
///
/// Each button posts its `message` value to `/chat/{session_id}/suggestion`, which
/// copies it into the draft. The list stays in the DOM when hidden so its
/// layout does not jump.
#[must_use]
pub fn render_suggestions(session_id: &str, suggestions: &[Suggestion], visible: bool) -> String {
    let visibility = if visible { "visible" } else { "invisible" };
    let buttons: String = suggestions
        .iter()
        .map(|s| {
            format!(
                r##"<button type="button" class="h-auto p-0 text-base inline-flex items-center hover:underline" name="message" value="{value}" hx-post="/chat/{sid}/suggestion" hx-target="#chat-panel" hx-swap="outerHTML">{ARROW_SVG}{heading}</button>"##,
                value = attr(&s.message),
                sid = attr(session_id),
                heading = text(&s.heading),
            )
        })
        .collect();

    format!(
        r#"<div id="suggestions" class="mx-auto w-full transition-all {visibility}"><div class="bg-background p-2"><div class="mt-4 flex flex-col items-start space-y-2 mb-4">{buttons}</div></div></div>"#
    )
}
