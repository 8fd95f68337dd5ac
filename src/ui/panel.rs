//! Chat panel fragment.
//!
//! The whole panel is one swappable element (`#chat-panel`). Which parts are
//! rendered depends on the panel mode and on whether the transcript is empty.

use super::empty_screen::render_suggestions;
use super::{attr, text};
use crate::config::Suggestion;
use crate::panel::{PanelSnapshot, Renderable, TranscriptEntry, UiMode};

const PLUS_SVG: &str = r#"<svg class="h-[18px] w-[18px] group-hover:rotate-90 transition-all" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" aria-hidden="true"><path d="M12 5v14M5 12h14"/></svg>"#;

const SEND_SVG: &str = r#"<svg class="h-5 w-5" xmlns="http://www.w3.org/2000/svg" viewBox="0 0 24 24" fill="none" stroke="currentColor" stroke-width="2" aria-hidden="true"><path d="M5 12h14M12 5l7 7-7 7"/></svg>"#;

/// Everything needed to render a panel.
#[derive(Debug, Clone, Copy)]
pub struct PanelView<'a> {
    pub snapshot: &'a PanelSnapshot,
    pub suggestions: &'a [Suggestion],
    pub placeholder: &'a str,
    /// Focus the input on load (set after a new conversation starts).
    pub autofocus: bool,
}

/// Render the panel for its current mode.
#[must_use]
pub fn render_panel(view: &PanelView<'_>) -> String {
    let snapshot = view.snapshot;
    let body = match snapshot.mode {
        UiMode::Collapsed => render_collapsed(&snapshot.session_id),
        UiMode::Expanded if snapshot.transcript.is_empty() => render_empty(view),
        UiMode::Expanded => render_conversation(view),
    };

    format!(
        r#"<div id="chat-panel" data-mode="{mode}" data-pending="{pending}">{body}</div>"#,
        mode = mode_name(snapshot.mode),
        pending = snapshot.pending,
    )
}

fn mode_name(mode: UiMode) -> &'static str {
    match mode {
        UiMode::Expanded => "expanded",
        UiMode::Collapsed => "collapsed",
    }
}

fn render_collapsed(session_id: &str) -> String {
    format!(
        r#"<div class="fixed bottom-2 md:bottom-8 left-0 right-0 flex justify-center items-center mx-auto">{}</div>"#,
        render_new_button(session_id, true)
    )
}

fn render_conversation(view: &PanelView<'_>) -> String {
    let snapshot = view.snapshot;
    let entries: String = snapshot.transcript.iter().map(render_entry).collect();

    format!(
        r#"<div id="transcript" class="mb-20 space-y-4 px-4 overflow-y-auto">{entries}</div>
<div class="fixed bottom-2 md:bottom-8 left-0 right-0 flex justify-between items-center mx-auto px-4 max-w-2xl">
    {form}
    {new_button}
</div>"#,
        form = render_form(view, "flex-1 mr-4", None),
        new_button = render_new_button(&snapshot.session_id, false),
    )
}

fn render_empty(view: &PanelView<'_>) -> String {
    let snapshot = view.snapshot;
    let suggestions = render_suggestions(
        &snapshot.session_id,
        view.suggestions,
        snapshot.show_suggestions,
    );
    format!(
        r#"<div class="fixed bottom-8 left-0 right-0 top-10 mx-auto h-screen flex flex-col items-center justify-center">{}</div>"#,
        render_form(view, "max-w-2xl w-full px-6", Some(&suggestions))
    )
}

/// Input form. When a suggestion list is given it is rendered below the
/// input, and focus and blur toggle it.
fn render_form(view: &PanelView<'_>, class: &str, suggestions: Option<&str>) -> String {
    let snapshot = view.snapshot;
    let sid = attr(&snapshot.session_id);
    let empty = snapshot.draft.is_empty();

    let (draft_target, focus_handlers) = if suggestions.is_some() {
        (
            r##"hx-target="#suggestions" hx-swap="outerHTML""##.to_string(),
            format!(
                r##" x-on:focus="htmx.ajax('POST', '/chat/{sid}/focus', {{target: '#suggestions', swap: 'outerHTML'}})" x-on:blur="htmx.ajax('POST', '/chat/{sid}/blur', {{target: '#suggestions', swap: 'outerHTML'}})""##
            ),
        )
    } else {
        (r#"hx-swap="none""#.to_string(), String::new())
    };

    format!(
        r##"<form class="{class}" hx-post="/chat/{sid}/submit" hx-target="#chat-panel" hx-swap="outerHTML" x-data="{{ empty: {empty} }}">
    <div class="relative flex items-center w-full">
        <input type="text" name="input" placeholder="{placeholder}" value="{draft}" autocomplete="off" class="pl-4 pr-10 h-12 rounded-full bg-muted w-full"{autofocus} hx-post="/chat/{sid}/draft" hx-trigger="input changed delay:300ms" {draft_target} x-on:input="empty = $el.value.length === 0"{focus_handlers}/>
        <button type="submit" aria-label="Send" class="absolute right-2 top-1/2 transform -translate-y-1/2" x-bind:disabled="empty"{disabled}>{SEND_SVG}</button>
    </div>
    {below}
</form>"##,
        placeholder = attr(view.placeholder),
        draft = attr(&snapshot.draft),
        autofocus = if view.autofocus { " autofocus" } else { "" },
        disabled = if empty { " disabled" } else { "" },
        below = suggestions.unwrap_or_default(),
    )
}

fn render_new_button(session_id: &str, with_label: bool) -> String {
    let label = if with_label {
        r#"<span class="text-sm mr-2 group-hover:block hidden animate-in fade-in duration-300">New</span>"#
    } else {
        ""
    };
    format!(
        r##"<button type="button" aria-label="New conversation" class="new-chat rounded-full bg-secondary/80 group transition-all hover:scale-105 inline-flex items-center px-3 py-2" hx-post="/chat/{sid}/clear" hx-target="#chat-panel" hx-swap="outerHTML">{label}{PLUS_SVG}</button>"##,
        sid = attr(session_id),
    )
}

/// Render one transcript entry.
#[must_use]
pub fn render_entry(entry: &TranscriptEntry) -> String {
    let generating = if entry.is_generating {
        r#"<span class="generating animate-pulse text-textMuted" aria-label="Generating">…</span>"#
    } else {
        ""
    };
    let reply_to = entry
        .reply_to
        .map(|id| format!(r#" data-reply-to="{id}""#))
        .unwrap_or_default();

    format!(
        r#"<div id="entry-{id}" data-entry-id="{id}"{reply_to} class="p-4 rounded-lg border border-border/50 bg-background/80 backdrop-blur-sm">{content}{generating}</div>"#,
        id = entry.id,
        content = render_component(&entry.component),
    )
}

fn render_component(component: &Renderable) -> String {
    match component {
        Renderable::User { text: t } => {
            format!(r#"<div class="user-message font-medium"><p>{}</p></div>"#, text(t))
        }
        Renderable::Assistant { text: t } => format!(
            r#"<div class="assistant-message whitespace-pre-wrap"><p>{}</p></div>"#,
            text(t)
        ),
        Renderable::Notice { text: t } => {
            format!(r#"<p class="notice text-sm text-textMuted">{}</p>"#, text(t))
        }
        Renderable::Error { message } => format!(
            r#"<div class="error-message text-red-500" role="alert"><p>{}</p></div>"#,
            text(message)
        ),
    }
}
