use std::sync::Arc;

use axum::{
    Json,
    body::Bytes,
    extract::State,
    http::{HeaderMap, StatusCode},
    response::IntoResponse,
};
use serde_json::{Value, json};

use octoscore_core::{AuthKeys, status};
use octoscore_storage::ScoreStore;

use crate::dispatch::{self, RequestContext};

/// Shared handler state: the auth salts and the store backend.
#[derive(Clone)]
pub struct AppState {
    pub keys: Arc<AuthKeys>,
    pub store: Arc<dyn ScoreStore>,
}

pub async fn root() -> impl IntoResponse {
    let body = json!({
        "service": "OctoScore Server",
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION"),
    });
    (StatusCode::OK, Json(body))
}

pub async fn healthz(State(state): State<AppState>) -> impl IntoResponse {
    let body = json!({
        "status": "ok",
        "store": state.store.backend_name(),
    });
    (StatusCode::OK, Json(body))
}

/// The single API endpoint. The body is taken raw so that malformed JSON
/// maps to 400 in the shaped body instead of the framework rejection.
pub async fn method(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Bytes,
) -> impl IntoResponse {
    let request_id = headers
        .get("x-request-id")
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());
    let mut ctx = RequestContext::new(request_id);

    let (payload, code) = match serde_json::from_slice::<Value>(&body) {
        Ok(parsed) => {
            dispatch::dispatch(&state.keys, state.store.as_ref(), &parsed, &mut ctx).await
        }
        Err(e) => {
            tracing::info!(request_id = %ctx.request_id, error = %e, "unreadable request body");
            (Value::Null, status::BAD_REQUEST)
        }
    };

    tracing::info!(
        request_id = %ctx.request_id,
        code,
        has = ?ctx.has,
        nclients = ctx.nclients,
        "method request handled"
    );
    respond(payload, code)
}

pub async fn not_found() -> impl IntoResponse {
    respond(Value::Null, status::NOT_FOUND)
}

/// The HTTP status mirrors the code carried in the shaped body.
fn respond(payload: Value, code: u16) -> (StatusCode, Json<Value>) {
    let http = StatusCode::from_u16(code).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (http, Json(dispatch::shape_response(payload, code)))
}
