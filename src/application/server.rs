#[cfg(test)]
#[path = "server_test.rs"]
mod tests;

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::response::Response;
use axum::routing::get;
use axum::routing::post;
use axum::Json;
use axum::Router;
use serde_derive::Deserialize;
use serde_derive::Serialize;
use serde_json::Value;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

use crate::domain::services::ConversationService;
use crate::domain::services::ResetOutcome;
use crate::domain::services::DEFAULT_USER_NAME;

const DEFAULT_SESSION_ID: &str = "default";

#[derive(Clone)]
pub struct AppState {
    pub conversation: Arc<ConversationService>,
    pub model: String,
    pub backend_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ChatResponse {
    response: String,
    session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ResetResponse {
    message: String,
    session_id: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct ErrorResponse {
    error: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct HealthResponse {
    status: String,
    model: String,
    backend_url: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct HomeResponse {
    message: String,
    status: String,
    version: String,
    built_at: String,
    endpoints: BTreeMap<String, String>,
}

/// Reads request fields one at a time so a mistyped optional field falls back
/// to its default instead of discarding the whole body.
fn parse_body(body: &Bytes) -> Value {
    return serde_json::from_slice::<Value>(body).unwrap_or(Value::Null);
}

fn string_field(body: &Value, key: &str) -> Option<String> {
    return body
        .get(key)
        .and_then(|value| return value.as_str())
        .map(|value| return value.to_string());
}

async fn home() -> Json<HomeResponse> {
    let endpoints = BTreeMap::from([
        (
            "/chat".to_string(),
            "POST - Enviar mensaje y recibir respuesta (texto)".to_string(),
        ),
        (
            "/reset".to_string(),
            "POST - Reiniciar una sesión de conversación".to_string(),
        ),
        (
            "/health".to_string(),
            "GET - Verificar estado del servicio".to_string(),
        ),
    ]);

    return Json(HomeResponse {
        message: "API de Bob Gerente de Proyectos Financieros funcionando correctamente"
            .to_string(),
        status: "online".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        built_at: env!("VERGEN_BUILD_TIMESTAMP").to_string(),
        endpoints,
    });
}

async fn chat(State(state): State<AppState>, body: Bytes) -> Response {
    let req = parse_body(&body);
    let message = match string_field(&req, "message") {
        Some(message) => message,
        None => {
            let err = ErrorResponse {
                error: "Se requiere un 'message' en el JSON".to_string(),
            };
            return (StatusCode::BAD_REQUEST, Json(err)).into_response();
        }
    };

    let session_id = string_field(&req, "session_id")
        .unwrap_or_else(|| return DEFAULT_SESSION_ID.to_string());
    let user_name = string_field(&req, "user_name")
        .unwrap_or_else(|| return DEFAULT_USER_NAME.to_string());

    let exchange = state
        .conversation
        .send(&session_id, &user_name, &message)
        .await;

    return Json(ChatResponse {
        response: exchange.reply,
        session_id,
    })
    .into_response();
}

async fn reset(State(state): State<AppState>, body: Bytes) -> Json<ResetResponse> {
    let req = parse_body(&body);
    let session_id = string_field(&req, "session_id")
        .unwrap_or_else(|| return DEFAULT_SESSION_ID.to_string());

    let message = match state.conversation.reset(&session_id) {
        ResetOutcome::Cleared => format!("Sesión {session_id} reiniciada correctamente"),
        ResetOutcome::Created => {
            format!("La sesión {session_id} no existía, se ha creado una nueva")
        }
    };

    return Json(ResetResponse {
        message,
        session_id,
    });
}

async fn health(State(state): State<AppState>) -> Json<HealthResponse> {
    return Json(HealthResponse {
        status: "ok".to_string(),
        model: state.model.to_string(),
        backend_url: state.backend_url.to_string(),
    });
}

pub fn router(state: AppState) -> Router {
    return Router::new()
        .route("/", get(home))
        .route("/chat", post(chat))
        .route("/reset", post(reset))
        .route("/health", get(health))
        .layer(CorsLayer::permissive())
        .layer(TraceLayer::new_for_http())
        .with_state(state);
}
