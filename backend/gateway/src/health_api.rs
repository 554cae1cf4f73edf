//! Liveness endpoint.

use axum::http::StatusCode;
use axum::Json;
use serde_json::{json, Value};

/// Handler for `GET /api/health`.
pub async fn get_health() -> (StatusCode, Json<Value>) {
    (StatusCode::OK, Json(json!({ "status": "ok" })))
}
