use axum::{extract::State, http::StatusCode, response::IntoResponse, Json};
use serde_json::json;

use crate::api_state::ApiState;

/// Readiness probe: returns 200 if the document store is reachable, else 503.
pub async fn ready(State(state): State<ApiState>) -> impl IntoResponse {
    match tokio::fs::metadata(state.store.root()).await {
        Ok(meta) if meta.is_dir() => (
            StatusCode::OK,
            Json(json!({
                "status": "ok",
                "checks": { "store": "ok" }
            })),
        ),
        Ok(_) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "checks": { "store": "fail" },
                "reason": "upload root is not a directory"
            })),
        ),
        Err(e) => (
            StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "status": "error",
                "checks": { "store": "fail" },
                "reason": e.to_string()
            })),
        ),
    }
}
