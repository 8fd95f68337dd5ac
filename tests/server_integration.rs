use async_trait::async_trait;
use axum::http::StatusCode;
use axum_test::TestServer;
use cogno_chat::AppState;
use cogno_chat::config::{AppConfig, Suggestion};
use cogno_chat::error::ChatError;
use cogno_chat::llm::{Message, MessageRole};
use cogno_chat::panel::{
    ActionReply, ChatAction, ConversationMirror, FailurePolicy, FormPayload, PanelSnapshot,
    Renderable, UiMode,
};
use cogno_chat::server::{InboundResponse, build_router};
use cogno_chat::session::PanelStore;
use serde_json::json;
use std::sync::Arc;
use tokio::sync::Notify;

/// Echoes the input back, or rejects inputs starting with "fail".
#[derive(Debug)]
struct ScriptedAction;

#[async_trait]
impl ChatAction for ScriptedAction {
    async fn submit(
        &self,
        _mirror: &ConversationMirror,
        payload: FormPayload,
    ) -> Result<ActionReply, ChatError> {
        if payload.input.starts_with("fail") {
            return Err(ChatError::Rejected("backend unavailable".to_string()));
        }
        let answer = format!("Echo: {}", payload.input);
        let turns = [
            Message::new(MessageRole::User, payload.input),
            Message::new(MessageRole::Assistant, answer.clone()),
        ];
        Ok(ActionReply::assistant(answer).with_turns(turns))
    }
}

/// Holds every submission until the test releases it.
#[derive(Debug, Default)]
struct GatedAction {
    started: Notify,
    release: Notify,
}

#[async_trait]
impl ChatAction for GatedAction {
    async fn submit(
        &self,
        _mirror: &ConversationMirror,
        payload: FormPayload,
    ) -> Result<ActionReply, ChatError> {
        self.started.notify_one();
        self.release.notified().await;
        let turns = [
            Message::new(MessageRole::User, payload.input),
            Message::new(MessageRole::Assistant, "old answer"),
        ];
        Ok(ActionReply::assistant("old answer").with_turns(turns))
    }
}

fn test_server(policy: FailurePolicy) -> (TestServer, PanelStore) {
    test_server_with(Arc::new(ScriptedAction), policy)
}

fn test_server_with(action: Arc<dyn ChatAction>, policy: FailurePolicy) -> (TestServer, PanelStore) {
    let config = AppConfig::load_from_args(["cogno-chat"]).expect("default config");
    let panels = PanelStore::new(action, policy, None);
    let state = AppState {
        panels: panels.clone(),
        config: Arc::new(config),
    };
    (TestServer::new(build_router(state)).unwrap(), panels)
}

async fn open(server: &TestServer, id: &str) {
    server.get(&format!("/chat/{id}")).await.assert_status_ok();
}

async fn snapshot(server: &TestServer, id: &str) -> PanelSnapshot {
    server
        .get(&format!("/api/chat/{id}/transcript"))
        .await
        .json()
}

#[tokio::test]
async fn test_index_redirects_to_new_session() {
    let (server, _) = test_server(FailurePolicy::Surface);

    let response = server.get("/").await;
    response.assert_status(StatusCode::SEE_OTHER);
    let location = response.header("location");
    assert!(location.to_str().unwrap().starts_with("/chat/"));
}

#[tokio::test]
async fn test_chat_page_renders_empty_panel() {
    let (server, panels) = test_server(FailurePolicy::Surface);

    let response = server.get("/chat/page-1").await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("<!DOCTYPE html>"));
    assert!(html.contains(r#"id="chat-panel""#));
    assert!(html.contains(r#"id="suggestions""#));
    assert!(html.contains("Ask a question..."));
    assert!(panels.get("page-1").is_some());
}

#[tokio::test]
async fn test_submit_appends_user_and_reply() {
    let (server, _) = test_server(FailurePolicy::Surface);
    open(&server, "a").await;

    let response = server
        .post("/chat/a/submit")
        .form(&[("input", "hello")])
        .await;
    response.assert_status_ok();
    let html = response.text();
    assert!(html.contains("hello"));
    assert!(html.contains("Echo: hello"));

    let snap = snapshot(&server, "a").await;
    assert_eq!(snap.transcript.len(), 2);
    assert_eq!(snap.transcript[0].component, Renderable::user("hello"));
    assert_eq!(snap.transcript[1].component, Renderable::assistant("Echo: hello"));
    assert_eq!(snap.transcript[1].reply_to, Some(snap.transcript[0].id));
    assert!(snap.draft.is_empty());
    assert_eq!(snap.mode, UiMode::Expanded);
}

#[tokio::test]
async fn test_submit_empty_draft_is_unprocessable() {
    let (server, _) = test_server(FailurePolicy::Surface);
    open(&server, "empty").await;

    server
        .post("/chat/empty/submit")
        .form(&[("input", "   ")])
        .await
        .assert_status(StatusCode::UNPROCESSABLE_ENTITY);

    assert!(snapshot(&server, "empty").await.transcript.is_empty());
}

#[tokio::test]
async fn test_rejection_surfaces_error_entry() {
    let (server, _) = test_server(FailurePolicy::Surface);
    open(&server, "err").await;

    let response = server
        .post("/chat/err/submit")
        .form(&[("input", "fail please")])
        .await;
    response.assert_status_ok();
    assert!(response.text().contains(r#"role="alert""#));

    let snap = snapshot(&server, "err").await;
    assert_eq!(snap.transcript.len(), 2);
    assert!(matches!(
        snap.transcript[1].component,
        Renderable::Error { .. }
    ));
}

#[tokio::test]
async fn test_silent_rejection_leaves_only_user_entry() {
    let (server, _) = test_server(FailurePolicy::Silent);
    open(&server, "d").await;

    server
        .post("/chat/d/submit")
        .form(&[("input", "fail")])
        .await
        .assert_status_ok();

    let snap = snapshot(&server, "d").await;
    assert_eq!(snap.transcript.len(), 1);
    assert_eq!(snap.transcript[0].component, Renderable::user("fail"));
    assert!(snap.draft.is_empty());
}

#[tokio::test]
async fn test_clear_resets_and_requests_focus_once() {
    let (server, panels) = test_server(FailurePolicy::Surface);
    open(&server, "b").await;
    server
        .post("/chat/b/submit")
        .form(&[("input", "hello")])
        .await
        .assert_status_ok();

    assert_eq!(panels.get("b").unwrap().mirror().len(), 2);

    let response = server.post("/chat/b/clear").await;
    response.assert_status_ok();
    assert!(response.text().contains(" autofocus"));

    let snap = snapshot(&server, "b").await;
    assert!(snap.transcript.is_empty());
    assert_eq!(snap.mode, UiMode::Expanded);
    assert!(panels.get("b").unwrap().mirror().is_empty());

    let again = server.get("/chat/b/panel").await.text();
    assert!(!again.contains(" autofocus"));
}

#[tokio::test]
async fn test_reply_landing_after_clear_stays_out_of_new_conversation() {
    let gate = Arc::new(GatedAction::default());
    let (server, panels) = test_server_with(Arc::clone(&gate) as Arc<dyn ChatAction>, FailurePolicy::Surface);
    open(&server, "late").await;

    let submit = async {
        server
            .post("/chat/late/submit")
            .form(&[("input", "old question")])
            .await
    };
    let clear_then_release = async {
        gate.started.notified().await;
        server.post("/chat/late/clear").await.assert_status_ok();
        gate.release.notify_one();
    };
    let (response, ()) = tokio::join!(submit, clear_then_release);
    response.assert_status_ok();

    let snap = snapshot(&server, "late").await;
    assert!(snap.transcript.is_empty());
    assert_eq!(snap.pending, 0);
    assert!(panels.get("late").unwrap().mirror().is_empty());
}

#[tokio::test]
async fn test_inbound_collapses_then_drains() {
    let (server, _) = test_server(FailurePolicy::Surface);
    open(&server, "c").await;

    let response = server
        .post("/api/chat/c/inbound")
        .json(&json!([
            { "component": { "kind": "assistant", "text": "pushed one" }, "is_generating": true },
            { "component": { "kind": "notice", "text": "pushed two" } }
        ]))
        .await;
    response.assert_status_ok();
    let body: InboundResponse = response.json();
    assert_eq!(body.mode_at_delivery, UiMode::Collapsed);
    assert_eq!(body.transcript_len, 2);

    let snap = snapshot(&server, "c").await;
    assert_eq!(snap.inbound_len, 0);
    assert_eq!(snap.mode, UiMode::Expanded);
    assert!(snap.transcript[0].is_generating);
    assert!(snap.transcript[0].id < snap.transcript[1].id);
}

#[tokio::test]
async fn test_draft_and_focus_toggle_suggestions() {
    let (server, _) = test_server(FailurePolicy::Surface);
    open(&server, "s").await;

    let typed = server
        .post("/chat/s/draft")
        .form(&[("input", "partial")])
        .await
        .text();
    assert!(typed.starts_with(r#"<div id="suggestions""#));
    assert!(typed.contains("invisible"));
    assert_eq!(snapshot(&server, "s").await.draft, "partial");

    let focused = server.post("/chat/s/focus").await.text();
    assert!(focused.contains("transition-all visible"));

    let blurred = server.post("/chat/s/blur").await.text();
    assert!(blurred.contains("transition-all invisible"));
}

#[tokio::test]
async fn test_pick_suggestion_fills_draft() {
    let (server, _) = test_server(FailurePolicy::Surface);
    open(&server, "p").await;

    let html = server
        .post("/chat/p/suggestion")
        .form(&[("message", "What is the meaning and purpose of life?")])
        .await
        .text();
    assert!(html.contains(r#"value="What is the meaning and purpose of life?""#));
    assert_eq!(
        snapshot(&server, "p").await.draft,
        "What is the meaning and purpose of life?"
    );
}

#[tokio::test]
async fn test_unknown_session_is_not_found() {
    let (server, _) = test_server(FailurePolicy::Surface);

    server
        .get("/api/chat/nope/transcript")
        .await
        .assert_status(StatusCode::NOT_FOUND);
    server
        .post("/chat/nope/submit")
        .form(&[("input", "hi")])
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_delete_session() {
    let (server, panels) = test_server(FailurePolicy::Surface);
    open(&server, "gone").await;

    server
        .delete("/api/chat/gone")
        .await
        .assert_status(StatusCode::NO_CONTENT);
    assert!(panels.get("gone").is_none());

    server
        .delete("/api/chat/gone")
        .await
        .assert_status(StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_suggestions_endpoint() {
    let (server, _) = test_server(FailurePolicy::Surface);

    let suggestions: Vec<Suggestion> = server.get("/api/suggestions").await.json();
    assert_eq!(suggestions.len(), 3);
}
