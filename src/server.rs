//! HTTP surface: the chat page, HTMX panel fragments and a small JSON API.
//!
//! Fragment routes live under `/chat/{id}` and answer with HTML; the JSON
//! routes under `/api` let outside producers push entries and read state.

use axum::{
    Form, Json, Router,
    extract::{DefaultBodyLimit, Path, Request, State},
    http::StatusCode,
    middleware::Next,
    response::{Html, IntoResponse, Redirect, Response},
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Duration;

use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use tracing::{info, warn};

use crate::AppState;
use crate::config::{AppConfig, Suggestion};
use crate::error::ChatError;
use crate::panel::{ChatAction, ChatPanel, InboundEntry, PanelSnapshot, UiMode};
use crate::session::PanelStore;
use crate::ui::{self, PanelView, empty_screen::render_suggestions, render_panel};

/// How often idle panels are swept.
const CLEANUP_INTERVAL: Duration = Duration::from_secs(60);

/// Slack added on top of the model timeout before a request is cut off.
const REQUEST_TIMEOUT_SLACK: Duration = Duration::from_secs(5);

type HandlerError = (StatusCode, String);

/// Start the Axum server with the provided configuration and AI action.
pub async fn start_server(
    config: Arc<AppConfig>,
    action: Arc<dyn ChatAction>,
) -> anyhow::Result<()> {
    let panels = PanelStore::new(
        action,
        config.chat.failure_policy(),
        config.llm.system_prompt.clone(),
    );

    let state = AppState {
        panels: panels.clone(),
        config: Arc::clone(&config),
    };

    // Sweep idle panels in the background
    let timeout = config.chat.session_timeout();
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(CLEANUP_INTERVAL);
        loop {
            interval.tick().await;
            let removed = panels.cleanup_expired_with_timeout(timeout);
            if removed > 0 {
                info!(name: "session.cleanup", removed, "Expired panels removed");
            }
        }
    });

    let app = build_router(state);

    let addr = format!("{}:{}", config.server.host, config.server.port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    info!(
        name: "server.started",
        address = %addr,
        "Server started"
    );

    axum::serve(listener, app.into_make_service()).await?;
    Ok(())
}

/// Build the application router.
pub fn build_router(state: AppState) -> Router {
    let request_timeout = state.config.llm.timeout() + REQUEST_TIMEOUT_SLACK;

    Router::new()
        .route("/", get(index))
        .route("/chat/{id}", get(chat_page))
        .route("/chat/{id}/panel", get(panel_fragment))
        .route("/chat/{id}/submit", post(submit))
        .route("/chat/{id}/draft", post(update_draft))
        .route("/chat/{id}/focus", post(focus_input))
        .route("/chat/{id}/blur", post(blur_input))
        .route("/chat/{id}/suggestion", post(pick_suggestion))
        .route("/chat/{id}/clear", post(clear))
        .route("/api/chat/{id}/inbound", post(api_deliver_inbound))
        .route("/api/chat/{id}/transcript", get(api_transcript))
        .route("/api/chat/{id}", axum::routing::delete(api_delete_session))
        .route("/api/suggestions", get(api_suggestions))
        .nest_service("/static", ServeDir::new("static"))
        .layer(DefaultBodyLimit::max(1024 * 1024))
        .layer(axum::middleware::from_fn(
            move |req: Request, next: Next| async move {
                match tokio::time::timeout(request_timeout, next.run(req)).await {
                    Ok(res) => res,
                    Err(_) => (StatusCode::REQUEST_TIMEOUT, "Request timed out").into_response(),
                }
            },
        ))
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

// ─────────────────────────────────────────────────────────────────────────────
// Page and fragment handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Form body posted by the chat input.
#[derive(Debug, Deserialize)]
struct InputForm {
    #[serde(default)]
    input: String,
}

/// Form body posted by a suggestion button.
#[derive(Debug, Deserialize)]
struct SuggestionForm {
    message: String,
}

/// GET / - Start a fresh conversation.
async fn index() -> Redirect {
    Redirect::to(&format!("/chat/{}", uuid::Uuid::new_v4()))
}

/// GET /chat/:id - Full page.
async fn chat_page(State(state): State<AppState>, Path(id): Path<String>) -> Html<String> {
    let panel = state.panels.get_or_create(&id);
    let snapshot = panel.snapshot();
    let autofocus = panel.take_focus_request();
    let body = render(&state, &snapshot, autofocus);
    Html(ui::render_page("Chat", &body))
}

/// GET /chat/:id/panel - Panel fragment.
async fn panel_fragment(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, HandlerError> {
    let panel = lookup(&state, &id)?;
    Ok(Html(render(&state, &panel.snapshot(), false)))
}

/// POST /chat/:id/submit - Submit the draft and wait for the reply.
///
/// Action failures still answer with the panel; how they show up is decided
/// by the failure policy.
async fn submit(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<InputForm>,
) -> Result<Html<String>, HandlerError> {
    let panel = lookup(&state, &id)?;

    match panel.submit(&form.input).await {
        Ok(_) => {}
        Err(err) if err.is_action_failure() => {
            warn!(
                name: "chat.submit.handler_failed",
                session_id = %id,
                status = %err.status_code(),
                "Submission resolved with an error"
            );
        }
        Err(err) => return Err(into_handler_error(&err)),
    }

    Ok(Html(render(&state, &panel.snapshot(), false)))
}

/// POST /chat/:id/draft - Track the input value.
async fn update_draft(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<InputForm>,
) -> Result<Html<String>, HandlerError> {
    let panel = lookup(&state, &id)?;
    panel.set_draft(form.input);
    Ok(Html(suggestions_fragment(&state, &panel)))
}

/// POST /chat/:id/focus
async fn focus_input(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, HandlerError> {
    let panel = lookup(&state, &id)?;
    panel.focus_input();
    Ok(Html(suggestions_fragment(&state, &panel)))
}

/// POST /chat/:id/blur
async fn blur_input(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, HandlerError> {
    let panel = lookup(&state, &id)?;
    panel.blur_input();
    Ok(Html(suggestions_fragment(&state, &panel)))
}

/// POST /chat/:id/suggestion - Copy a suggestion into the draft.
async fn pick_suggestion(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Form(form): Form<SuggestionForm>,
) -> Result<Html<String>, HandlerError> {
    let panel = lookup(&state, &id)?;
    panel.pick_suggestion(form.message);
    Ok(Html(render(&state, &panel.snapshot(), true)))
}

/// POST /chat/:id/clear - Start a new conversation in place.
async fn clear(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Html<String>, HandlerError> {
    let panel = lookup(&state, &id)?;
    panel.clear();
    let snapshot = panel.snapshot();
    let autofocus = panel.take_focus_request();
    Ok(Html(render(&state, &snapshot, autofocus)))
}

// ─────────────────────────────────────────────────────────────────────────────
// JSON API handlers
// ─────────────────────────────────────────────────────────────────────────────

/// Response from the inbound API.
#[derive(Debug, Serialize, Deserialize)]
pub struct InboundResponse {
    /// Mode right after the entries were buffered, before the drain.
    pub mode_at_delivery: UiMode,
    /// Transcript length after the drain.
    pub transcript_len: usize,
}

/// POST /api/chat/:id/inbound - Deliver entries and drain them.
async fn api_deliver_inbound(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(entries): Json<Vec<InboundEntry>>,
) -> Result<Json<InboundResponse>, HandlerError> {
    let panel = lookup(&state, &id)?;

    let count = entries.len();
    let mode_at_delivery = panel.deliver(entries);
    let moved = panel.on_inbound_change();

    info!(
        name: "chat.inbound.delivered",
        session_id = %id,
        delivered = count,
        moved,
        "Inbound entries appended"
    );

    Ok(Json(InboundResponse {
        mode_at_delivery,
        transcript_len: panel.transcript().len(),
    }))
}

/// GET /api/chat/:id/transcript - Panel snapshot.
async fn api_transcript(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<PanelSnapshot>, HandlerError> {
    let panel = lookup(&state, &id)?;
    Ok(Json(panel.snapshot()))
}

/// DELETE /api/chat/:id
async fn api_delete_session(State(state): State<AppState>, Path(id): Path<String>) -> Response {
    match state.panels.remove(&id) {
        Some(_) => StatusCode::NO_CONTENT.into_response(),
        None => into_handler_error(&ChatError::SessionNotFound(id)).into_response(),
    }
}

/// GET /api/suggestions
async fn api_suggestions(State(state): State<AppState>) -> Json<Vec<Suggestion>> {
    Json(state.config.chat.suggestions.clone())
}

// ─────────────────────────────────────────────────────────────────────────────
// Helpers
// ─────────────────────────────────────────────────────────────────────────────

fn lookup(state: &AppState, id: &str) -> Result<ChatPanel, HandlerError> {
    state
        .panels
        .get(id)
        .ok_or_else(|| into_handler_error(&ChatError::SessionNotFound(id.to_string())))
}

fn into_handler_error(err: &ChatError) -> HandlerError {
    (err.status_code(), err.to_string())
}

fn render(state: &AppState, snapshot: &PanelSnapshot, autofocus: bool) -> String {
    render_panel(&PanelView {
        snapshot,
        suggestions: &state.config.chat.suggestions,
        placeholder: &state.config.chat.placeholder,
        autofocus,
    })
}

fn suggestions_fragment(state: &AppState, panel: &ChatPanel) -> String {
    let snapshot = panel.snapshot();
    render_suggestions(
        &snapshot.session_id,
        &state.config.chat.suggestions,
        snapshot.show_suggestions,
    )
}
