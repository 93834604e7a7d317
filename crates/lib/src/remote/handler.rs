//! Server side of the remote binding.
//!
//! [`handle_request`] maps a decoded request onto a [`Channels`] instance and
//! is independent of the HTTP framework; [`router`] mounts it on axum.

use std::sync::Arc;

use axum::{
    Json, Router,
    extract::{State, rejection::JsonRejection},
    http::StatusCode,
    routing::{get, post},
};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Value, json};

use super::protocol::{ErrorBody, Method, RemoteRequest};
use crate::channel::{Channels, GetQuery, ListQuery};

/// Handles one remote request and returns the HTTP status and JSON body.
///
/// When `expected_token` is set, a request carrying any other token is
/// rejected with 401 before it reaches the store.
pub async fn handle_request(
    channels: &Channels,
    request: RemoteRequest,
    expected_token: Option<&str>,
) -> (u16, Value) {
    let method = request.method;
    let path = request.path.clone();

    if expected_token.is_some_and(|expected| expected != request.token) {
        tracing::debug!(%method, path, "Rejected request with invalid token");
        return error_response(ErrorBody::new(401, "Unauthorized"));
    }

    match dispatch(channels, request).await {
        Ok(body) => {
            tracing::debug!(%method, path, "Handled remote request");
            (200, body)
        }
        Err(err) => {
            if err.code >= 500 {
                tracing::warn!(%method, path, code = err.code, message = %err.message, "Remote request failed");
            } else {
                tracing::debug!(%method, path, code = err.code, message = %err.message, "Remote request refused");
            }
            error_response(err)
        }
    }
}

async fn dispatch(channels: &Channels, request: RemoteRequest) -> Result<Value, ErrorBody> {
    let RemoteRequest {
        method, path, data, ..
    } = request;

    match method {
        Method::Put => encode(channels.put(&path, data).await?),
        Method::Get => {
            let query: Option<GetQuery> = decode_query(data)?;
            encode(channels.get(&path, query.as_ref()).await?)
        }
        Method::Del => encode(channels.del(&path).await?),
        Method::List => {
            let query: ListQuery = decode_query(data)?.unwrap_or_default();
            encode(channels.list(&path, &query).await?)
        }
    }
}

/// Decodes a query from request data. Null means no query.
fn decode_query<T: DeserializeOwned>(data: Value) -> Result<Option<T>, ErrorBody> {
    if data.is_null() {
        return Ok(None);
    }
    serde_json::from_value(data)
        .map(Some)
        .map_err(|e| ErrorBody::new(400, format!("Invalid query: {e}")))
}

fn encode(value: impl Serialize) -> Result<Value, ErrorBody> {
    serde_json::to_value(value).map_err(|e| ErrorBody::new(500, e.to_string()))
}

fn error_response(err: ErrorBody) -> (u16, Value) {
    (err.code, json!({ "code": err.code, "message": err.message }))
}

impl From<crate::Error> for ErrorBody {
    fn from(err: crate::Error) -> Self {
        ErrorBody::new(err.status_code(), err.to_string())
    }
}

#[derive(Clone)]
struct ServerState {
    channels: Channels,
    token: Option<Arc<str>>,
}

/// Builds the axum router serving `channels`.
///
/// - `POST /api/v0` accepts [`RemoteRequest`] bodies
/// - `GET /health` answers `{"status": "healthy"}`
///
/// With `token` set every request must carry exactly that token.
pub fn router(channels: Channels, token: Option<String>) -> Router {
    Router::new()
        .route("/api/v0", post(handle_api_request))
        .route("/health", get(handle_health))
        .with_state(ServerState {
            channels,
            token: token.map(Arc::from),
        })
}

/// Handler for POST /api/v0
async fn handle_api_request(
    State(state): State<ServerState>,
    payload: Result<Json<RemoteRequest>, JsonRejection>,
) -> (StatusCode, Json<Value>) {
    let (status, body) = match payload {
        Ok(Json(request)) => handle_request(&state.channels, request, state.token.as_deref()).await,
        Err(rejection) => error_response(ErrorBody::new(400, rejection.body_text())),
    };
    let status = StatusCode::from_u16(status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    (status, Json(body))
}

/// Handler for GET /health
async fn handle_health() -> Json<Value> {
    Json(json!({ "status": "healthy", "service": "channeldb" }))
}
