use axum::Json;
use axum::body::Bytes;
use axum::extract::State;
use axum::http::StatusCode;
use serde::Serialize;
use serde_json::{Value, json};
use tracing::{debug, error, warn};

use crate::http::{ProxyRequest, ProxyResult};
use crate::server::AppState;
use crate::sync::WorkspaceRemote;

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn api_error(status: StatusCode, message: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: message.into(),
        }),
    )
}

/// `POST /api/proxy`
pub async fn proxy(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<ProxyResult>, ApiError> {
    let request: ProxyRequest = serde_json::from_slice(&body)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e)))?;

    if request.url.as_deref().is_none_or(|u| u.trim().is_empty()) {
        return Err(api_error(
            StatusCode::BAD_REQUEST,
            "Missing required field: url",
        ));
    }

    debug!(
        "proxy {} {}",
        request.method_or_default(),
        request.url.as_deref().unwrap_or_default()
    );
    Ok(Json(state.proxy.execute(request).await))
}

/// `GET /api/workspace`
pub async fn get_workspace(State(state): State<AppState>) -> Json<Value> {
    let doc = WorkspaceRemote::read(&state.storage)
        .await
        .unwrap_or_else(|e| {
            warn!("Failed to read workspace, serving an empty one: {}", e);
            None
        });
    Json(doc.unwrap_or_else(|| json!({})))
}

/// `PUT /api/workspace`
pub async fn put_workspace(
    State(state): State<AppState>,
    body: Bytes,
) -> Result<Json<Value>, ApiError> {
    let doc: Value = serde_json::from_slice(&body)
        .map_err(|e| api_error(StatusCode::BAD_REQUEST, format!("Invalid JSON body: {}", e)))?;

    WorkspaceRemote::replace(&state.storage, &doc)
        .await
        .map_err(|e| {
            error!("Failed to write workspace: {}", e);
            api_error(StatusCode::INTERNAL_SERVER_ERROR, e.to_string())
        })?;
    Ok(Json(json!({ "ok": true })))
}

pub async fn not_found() -> ApiError {
    api_error(StatusCode::NOT_FOUND, "Not found")
}
