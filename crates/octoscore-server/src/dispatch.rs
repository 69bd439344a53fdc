//! Method dispatch: envelope validation, auth, and the per-method handlers.
//!
//! Handlers return a `(payload, code)` pair; the HTTP layer shapes it into
//! the response body. Error payloads are plain strings; an empty or absent
//! message falls back to the standard text for the code at shaping time.

use serde_json::{Map, Value, json};

use octoscore_core::{
    AuthKeys, ClientsInterestsArgs, MethodEnvelope, OnlineScoreArgs, check_auth, status,
};
use octoscore_storage::ScoreStore;

use crate::scoring;

/// Admin callers always score this, with no store touch.
const ADMIN_SCORE: f64 = 42.0;

/// Per-request side channel: the request id plus what the handlers saw,
/// logged with the outcome.
#[derive(Debug, Clone, Default)]
pub struct RequestContext {
    pub request_id: String,
    /// Filled argument field names recorded by the score handler.
    pub has: Vec<String>,
    /// Client id count recorded by the interests handler.
    pub nclients: usize,
}

impl RequestContext {
    pub fn new(request_id: impl Into<String>) -> Self {
        Self {
            request_id: request_id.into(),
            ..Self::default()
        }
    }
}

/// Validates, authenticates and routes a raw request body.
pub async fn dispatch(
    keys: &AuthKeys,
    store: &dyn ScoreStore,
    body: &Value,
    ctx: &mut RequestContext,
) -> (Value, u16) {
    let envelope = match MethodEnvelope::from_body(body) {
        Ok(envelope) => envelope,
        Err(failure) => return (json!(failure.to_string()), status::INVALID_REQUEST),
    };

    if !check_auth(keys, &envelope) {
        tracing::info!(request_id = %ctx.request_id, login = %envelope.login, "auth failed");
        return (Value::Null, status::FORBIDDEN);
    }

    match envelope.method.as_str() {
        "online_score" => online_score(&envelope, ctx, store).await,
        "clients_interests" => clients_interests(&envelope, ctx, store).await,
        other => (
            json!(format!("unknown method '{other}'")),
            status::INVALID_REQUEST,
        ),
    }
}

/// The `online_score` method: validated arguments in, `{"score": <f64>}` out.
async fn online_score(
    envelope: &MethodEnvelope,
    ctx: &mut RequestContext,
    store: &dyn ScoreStore,
) -> (Value, u16) {
    let args = match OnlineScoreArgs::from_arguments(&envelope.arguments) {
        Ok(args) => args,
        Err(failure) => return (json!(failure.to_string()), status::INVALID_REQUEST),
    };

    ctx.has = args.filled.clone();
    let score = if envelope.is_admin() {
        ADMIN_SCORE
    } else {
        scoring::get_score(store, &args).await
    };
    (json!({"score": score}), status::OK)
}

/// The `clients_interests` method: a map of stringified client id to its
/// interests list. The first store failure abandons the remaining ids.
async fn clients_interests(
    envelope: &MethodEnvelope,
    ctx: &mut RequestContext,
    store: &dyn ScoreStore,
) -> (Value, u16) {
    let args = match ClientsInterestsArgs::from_arguments(&envelope.arguments) {
        Ok(args) => args,
        Err(failure) => return (json!(failure.to_string()), status::INVALID_REQUEST),
    };

    ctx.nclients = args.client_ids.len();
    let mut interests = Map::new();
    for client_id in &args.client_ids {
        match scoring::get_interests(store, *client_id).await {
            Ok(list) => {
                interests.insert(client_id.to_string(), json!(list));
            }
            Err(err) => {
                tracing::error!(
                    request_id = %ctx.request_id,
                    client_id,
                    category = %err.category(),
                    "interests lookup failed"
                );
                return (json!(err.to_string()), status::INTERNAL_ERROR);
            }
        }
    }
    (Value::Object(interests), status::OK)
}

/// Renders a handler result into the response body.
///
/// Error codes carry the payload string under `error`, substituting the
/// standard text when the handler left no message.
pub fn shape_response(payload: Value, code: u16) -> Value {
    if status::is_error(code) {
        let message = match payload {
            Value::String(s) if !s.is_empty() => s,
            _ => status::error_text(code).unwrap_or("Unknown Error").to_string(),
        };
        json!({"error": message, "code": code})
    } else {
        json!({"response": payload, "code": code})
    }
}
