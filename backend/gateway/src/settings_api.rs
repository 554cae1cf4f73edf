//! API key settings endpoints.
//!
//! Keys are validated for shape, encrypted at rest, and never echoed
//! back; the status endpoint only reports which providers are
//! configured.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use stockscan_security::{is_valid_anthropic_key, is_valid_openai_key, UserKeys};

use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct SaveKeysRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
    pub openai_key: Option<String>,
    pub anthropic_key: Option<String>,
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "message": message })),
    )
}

/// Handler for `POST /api/settings/api-keys`.
pub async fn save_api_keys(
    State(state): State<AppState>,
    Json(req): Json<SaveKeysRequest>,
) -> (StatusCode, Json<Value>) {
    let Some(user_id) = req.user_id.as_deref().filter(|id| !id.is_empty()) else {
        return bad_request("User ID is required");
    };

    let openai_key = req.openai_key.filter(|k| !k.is_empty());
    if let Some(key) = &openai_key {
        if !is_valid_openai_key(key) {
            return bad_request("Invalid OpenAI API key format");
        }
    }

    let anthropic_key = req.anthropic_key.filter(|k| !k.is_empty());
    if let Some(key) = &anthropic_key {
        if !is_valid_anthropic_key(key) {
            return bad_request("Invalid Anthropic API key format");
        }
    }

    if openai_key.is_none() && anthropic_key.is_none() {
        return bad_request("At least one API key must be provided");
    }

    let keys = UserKeys {
        openai_key,
        anthropic_key,
    };
    match state.keys.save_user_keys(user_id, &keys).await {
        Ok(()) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "API keys saved successfully" })),
        ),
        Err(e) => {
            error!(error = %e, "Failed to save API keys");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Failed to save API keys" })),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct StatusParams {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Handler for `GET /api/settings/api-keys/status?userId=`.
pub async fn get_api_key_status(
    State(state): State<AppState>,
    Query(params): Query<StatusParams>,
) -> (StatusCode, Json<Value>) {
    let Some(user_id) = params.user_id.filter(|id| !id.is_empty()) else {
        return bad_request("User ID is required");
    };

    match state.keys.key_status(&user_id).await {
        Ok(status) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "openai_configured": status.openai,
                "anthropic_configured": status.anthropic
            })),
        ),
        Err(e) => {
            error!(error = %e, "Failed to read key status");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Internal server error" })),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct DeleteKeysRequest {
    #[serde(rename = "userId")]
    pub user_id: Option<String>,
}

/// Handler for `DELETE /api/settings/api-keys`.
pub async fn delete_api_keys(
    State(state): State<AppState>,
    Json(req): Json<DeleteKeysRequest>,
) -> (StatusCode, Json<Value>) {
    let Some(user_id) = req.user_id.filter(|id| !id.is_empty()) else {
        return bad_request("User ID is required");
    };

    match state.keys.delete_user_keys(&user_id).await {
        Ok(true) => (
            StatusCode::OK,
            Json(json!({ "success": true, "message": "API keys deleted successfully" })),
        ),
        Ok(false) => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "message": "API keys not found or failed to delete"
            })),
        ),
        Err(e) => {
            error!(error = %e, "Failed to delete API keys");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Internal server error" })),
            )
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::server::AppState;
    use std::sync::Arc;

    use stockscan_catalog::ProductStore;
    use stockscan_engines::EngineRegistry;
    use stockscan_orchestrator::Orchestrator;
    use stockscan_security::ApiKeyStore;
    use stockscan_warehouse::WarehouseStore;

    fn state(dir: &std::path::Path) -> AppState {
        let registry = Arc::new(EngineRegistry::new());
        AppState {
            orchestrator: Arc::new(Orchestrator::new(registry.clone())),
            registry,
            products: Arc::new(ProductStore::new(dir.join("products.json"))),
            keys: Arc::new(ApiKeyStore::new(
                dir.join("api_keys.json"),
                stockscan_security::generate_key(),
            )),
            warehouse: Arc::new(WarehouseStore::new(dir, dir.join("storage"))),
            storage_dir: dir.join("storage").display().to_string(),
        }
    }

    #[tokio::test]
    async fn test_save_then_status_then_delete() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());

        let (status, _) = save_api_keys(
            State(state.clone()),
            Json(SaveKeysRequest {
                user_id: Some("user-1".into()),
                openai_key: Some("sk-proj-abc123".into()),
                anthropic_key: None,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, body) = get_api_key_status(
            State(state.clone()),
            Query(StatusParams {
                user_id: Some("user-1".into()),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.0["openai_configured"], true);
        assert_eq!(body.0["anthropic_configured"], false);

        let (status, _) = delete_api_keys(
            State(state.clone()),
            Json(DeleteKeysRequest {
                user_id: Some("user-1".into()),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::OK);

        let (status, _) = delete_api_keys(
            State(state),
            Json(DeleteKeysRequest {
                user_id: Some("user-1".into()),
            }),
        )
        .await;
        assert_eq!(status, StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn test_key_format_rejections() {
        let dir = tempfile::tempdir().unwrap();
        let state = state(dir.path());

        let (status, body) = save_api_keys(
            State(state.clone()),
            Json(SaveKeysRequest {
                user_id: Some("user-1".into()),
                openai_key: Some("not-a-key".into()),
                anthropic_key: None,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0["message"], "Invalid OpenAI API key format");

        let (status, body) = save_api_keys(
            State(state),
            Json(SaveKeysRequest {
                user_id: Some("user-1".into()),
                openai_key: None,
                anthropic_key: None,
            }),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0["message"], "At least one API key must be provided");
    }
}
