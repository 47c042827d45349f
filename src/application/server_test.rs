use std::sync::Arc;

use anyhow::Result;
use axum::body::Body;
use axum::http::Request;
use axum::http::StatusCode;
use axum::Router;
use serde_json::json;
use serde_json::Value;
use test_utils::persona_fixture;
use tower::ServiceExt;

use super::router;
use super::AppState;
use crate::domain::models::BackendResponse;
use crate::domain::models::Persona;
use crate::domain::models::TRANSPORT_FAILURE_TEXT;
use crate::domain::services::ConversationService;
use crate::domain::services::SessionStore;
use crate::infrastructure::backends::scripted::ScriptedBackend;

fn app(backend: ScriptedBackend) -> (Router, Arc<SessionStore>) {
    let store = Arc::new(SessionStore::new());
    let conversation = ConversationService::new(
        store.clone(),
        Arc::new(backend),
        Persona::new(persona_fixture(), "Bob"),
    );

    let state = AppState {
        conversation: Arc::new(conversation),
        model: "llama3:8b".to_string(),
        backend_url: "http://localhost:11434".to_string(),
    };

    return (router(state), store);
}

async fn send(app: Router, method: &str, uri: &str, body: &str) -> Result<(StatusCode, Value)> {
    let req = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))?;

    let res = app.oneshot(req).await?;
    let status = res.status();
    let bytes = axum::body::to_bytes(res.into_body(), usize::MAX).await?;
    let json = serde_json::from_slice::<Value>(&bytes)?;

    return Ok((status, json));
}

#[tokio::test]
async fn it_describes_the_service() -> Result<()> {
    let (app, _store) = app(ScriptedBackend::default());
    let (status, body) = send(app, "GET", "/", "").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "online");
    assert_eq!(body["version"], env!("CARGO_PKG_VERSION"));
    assert!(body["endpoints"]["/chat"].is_string());

    return Ok(());
}

#[tokio::test]
async fn it_reports_health() -> Result<()> {
    let (app, _store) = app(ScriptedBackend::default());
    let (status, body) = send(app, "GET", "/health", "").await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "status": "ok",
            "model": "llama3:8b",
            "backend_url": "http://localhost:11434"
        })
    );

    return Ok(());
}

#[tokio::test]
async fn it_chats_with_default_session() -> Result<()> {
    let (app, store) =
        app(ScriptedBackend::default().with_chat(ScriptedBackend::reply("Buen día.")));

    let (status, body) = send(app, "POST", "/chat", r#"{"message": "Hola"}"#).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "response": "Buen día.", "session_id": "default" })
    );
    assert_eq!(store.get_or_create("default").len(), 2);

    return Ok(());
}

#[tokio::test]
async fn it_chats_with_given_session() -> Result<()> {
    let (app, store) =
        app(ScriptedBackend::default().with_chat(ScriptedBackend::reply("Buen día.")));

    let (status, body) = send(
        app,
        "POST",
        "/chat",
        r#"{"message": "Hola", "session_id": "obra-42", "user_name": "Marta"}"#,
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], "obra-42");
    assert_eq!(store.get_or_create("obra-42").len(), 2);
    assert!(store.get_or_create("default").is_empty());

    return Ok(());
}

#[tokio::test]
async fn it_returns_sentinel_text_with_success_status() -> Result<()> {
    let (app, _store) =
        app(ScriptedBackend::default().with_chat(Ok(BackendResponse::TransportFailure)));

    let (status, body) = send(app, "POST", "/chat", r#"{"message": "Hola"}"#).await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["response"], TRANSPORT_FAILURE_TEXT);

    return Ok(());
}

#[tokio::test]
async fn it_rejects_chat_without_message() -> Result<()> {
    let (app, store) = app(ScriptedBackend::default());

    let (status, body) = send(app.clone(), "POST", "/chat", r#"{"session_id": "abc"}"#).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Se requiere un 'message' en el JSON");

    let (status, _body) = send(app, "POST", "/chat", "not json").await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(!store.contains("abc"));

    return Ok(());
}

#[tokio::test]
async fn it_defaults_mistyped_optional_fields() -> Result<()> {
    let (app, store) =
        app(ScriptedBackend::default().with_chat(ScriptedBackend::reply("Buen día.")));

    let (status, body) = send(
        app.clone(),
        "POST",
        "/chat",
        r#"{"message": "Hola", "session_id": 42, "user_name": ["Marta"]}"#,
    )
    .await?;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({ "response": "Buen día.", "session_id": "default" })
    );
    assert_eq!(store.get_or_create("default").len(), 2);

    let (status, body) = send(app, "POST", "/reset", r#"{"session_id": false}"#).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["session_id"], "default");

    return Ok(());
}

#[tokio::test]
async fn it_rejects_non_string_message() -> Result<()> {
    let (app, _store) = app(ScriptedBackend::default());

    let (status, body) = send(app, "POST", "/chat", r#"{"message": 7}"#).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Se requiere un 'message' en el JSON");

    return Ok(());
}

#[tokio::test]
async fn it_resets_sessions() -> Result<()> {
    let (app, store) =
        app(ScriptedBackend::default().with_chat(ScriptedBackend::reply("Buen día.")));

    let (_status, body) = send(app.clone(), "POST", "/reset", r#"{"session_id": "abc"}"#).await?;
    assert_eq!(
        body,
        json!({
            "message": "La sesión abc no existía, se ha creado una nueva",
            "session_id": "abc"
        })
    );

    send(
        app.clone(),
        "POST",
        "/chat",
        r#"{"message": "Hola", "session_id": "abc"}"#,
    )
    .await?;
    assert_eq!(store.get_or_create("abc").len(), 2);

    let (status, body) = send(app.clone(), "POST", "/reset", r#"{"session_id": "abc"}"#).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "Sesión abc reiniciada correctamente");
    assert!(store.get_or_create("abc").is_empty());

    let (_status, body) = send(app, "POST", "/reset", "").await?;
    assert_eq!(body["session_id"], "default");

    return Ok(());
}
