//! OCR processing endpoint.
//!
//! `POST /api/ocr/process`: decode the image, resolve any per-user API
//! key for paid engines, run the orchestrator, then look the filtered
//! code up in the catalog. On a catalog miss the OCR fields are still
//! returned so the client can show what was read.

use axum::extract::State;
use axum::http::StatusCode;
use axum::Json;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::{error, warn};

use logging::redact_sensitive_data;
use stockscan_core::{EngineSelector, ScanError};

use crate::server::AppState;

#[derive(Debug, Deserialize)]
pub struct OcrProcessRequest {
    #[serde(default)]
    pub image: String,
    #[serde(default)]
    pub engine: Option<String>,
    #[serde(default, rename = "userId")]
    pub user_id: Option<String>,
}

fn bad_request(message: &str) -> (StatusCode, Json<Value>) {
    (
        StatusCode::BAD_REQUEST,
        Json(json!({ "success": false, "message": message })),
    )
}

/// Handler for `POST /api/ocr/process`.
pub async fn process_image(
    State(state): State<AppState>,
    Json(req): Json<OcrProcessRequest>,
) -> (StatusCode, Json<Value>) {
    if req.image.is_empty() {
        return bad_request("No image provided");
    }

    let engine_name = req.engine.as_deref().unwrap_or("tesseract");
    let Some(selector) = EngineSelector::parse(engine_name) else {
        return bad_request("Invalid OCR engine");
    };

    // Clients may send a bare base64 body or a full data URL.
    let b64 = req
        .image
        .split_once("base64,")
        .map(|(_, rest)| rest)
        .unwrap_or(&req.image);
    let Ok(image_bytes) = BASE64.decode(b64.trim()) else {
        return bad_request("Invalid base64 image data");
    };

    // Paid engines need the caller's stored key up front; an explicit
    // engine request never falls back to another engine.
    let api_key = if selector.is_paid() {
        let Some(user_id) = req.user_id.as_deref().filter(|id| !id.is_empty()) else {
            return bad_request("User ID is required for AI vision engines");
        };
        let keys = match state.keys.get_user_keys(user_id).await {
            Ok(keys) => keys.unwrap_or_default(),
            Err(e) => {
                error!(error = %e, "Failed to load user API keys");
                return (
                    StatusCode::INTERNAL_SERVER_ERROR,
                    Json(json!({ "success": false, "message": "Internal server error" })),
                );
            }
        };
        let key = match selector {
            EngineSelector::OpenaiVision => keys.openai_key,
            EngineSelector::ClaudeVision => keys.anthropic_key,
            _ => None,
        };
        match key {
            Some(key) => Some(key),
            None => {
                let message = match selector {
                    EngineSelector::OpenaiVision => {
                        "OpenAI API key not configured. Please configure it in settings."
                    }
                    _ => "Anthropic (Claude) API key not configured. Please configure it in settings.",
                };
                return bad_request(message);
            }
        }
    } else {
        None
    };

    let result = match state
        .orchestrator
        .process(selector, &image_bytes, api_key.as_deref())
        .await
    {
        Ok(result) => result,
        Err(ScanError::CredentialMissing(engine)) => {
            return bad_request(&format!("API key not configured for engine: {engine}"));
        }
        Err(ScanError::AllEnginesFailed(errors)) => {
            warn!(errors = %redact_sensitive_data(&errors), "All OCR engines failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "OCR processing failed" })),
            );
        }
        Err(e) => {
            error!(error = %e, "OCR orchestration error");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Internal server error" })),
            );
        }
    };

    let product = match state.products.get_by_code(&result.filtered_code).await {
        Ok(product) => product,
        Err(e) => {
            error!(error = %e, "Catalog lookup failed");
            return (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Internal server error" })),
            );
        }
    };

    match product {
        Some(product) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "ocr_result": result,
                "product": product
            })),
        ),
        None => (
            StatusCode::NOT_FOUND,
            Json(json!({
                "success": false,
                "ocr_result": result,
                "message": format!("Product not found with code: {}", result.filtered_code)
            })),
        ),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;

    use stockscan_catalog::ProductStore;
    use stockscan_engines::{EngineRegistry, MockEngine};
    use stockscan_orchestrator::Orchestrator;
    use stockscan_security::{ApiKeyStore, UserKeys};
    use stockscan_warehouse::WarehouseStore;

    fn state_with(engines: Vec<Arc<MockEngine>>, dir: &std::path::Path) -> AppState {
        let mut registry = EngineRegistry::new();
        for engine in engines {
            registry.register(engine);
        }
        let registry = Arc::new(registry);
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

    fn request(image: &str, engine: &str, user_id: Option<&str>) -> OcrProcessRequest {
        OcrProcessRequest {
            image: image.to_string(),
            engine: Some(engine.to_string()),
            user_id: user_id.map(str::to_string),
        }
    }

    #[tokio::test]
    async fn test_missing_image_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(vec![], dir.path());
        let (status, body) =
            process_image(State(state), Json(request("", "tesseract", None))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0["message"], "No image provided");
    }

    #[tokio::test]
    async fn test_unknown_engine_is_400() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(vec![], dir.path());
        let (status, body) =
            process_image(State(state), Json(request("aW1n", "gocr", None))).await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0["message"], "Invalid OCR engine");
    }

    #[tokio::test]
    async fn test_paid_engine_requires_user_and_key() {
        let dir = tempfile::tempdir().unwrap();
        let engine =
            Arc::new(MockEngine::succeeding("openai-vision", "ABC-1").with_required_key());
        let state = state_with(vec![engine], dir.path());

        let (status, body) = process_image(
            State(state.clone()),
            Json(request("aW1n", "openai-vision", None)),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body.0["message"], "User ID is required for AI vision engines");

        let (status, body) = process_image(
            State(state),
            Json(request("aW1n", "openai-vision", Some("user-1"))),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(
            body.0["message"],
            "OpenAI API key not configured. Please configure it in settings."
        );
    }

    #[tokio::test]
    async fn test_all_engines_failed_is_500_with_generic_message() {
        let dir = tempfile::tempdir().unwrap();
        let state = state_with(
            vec![
                Arc::new(MockEngine::failing("tesseract", "binary missing")),
                Arc::new(MockEngine::failing("easyocr", "script missing")),
            ],
            dir.path(),
        );

        let (status, body) =
            process_image(State(state), Json(request("aW1n", "both", None))).await;
        assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
        assert_eq!(body.0["message"], "OCR processing failed");
    }

    // End-to-end heuristic weakness: the vision engine reads the whole
    // line, the filter keeps the leading word, the catalog misses, and
    // the client still gets the raw OCR fields for debugging.
    #[tokio::test]
    async fn test_catalog_miss_returns_404_with_ocr_fields() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(
            MockEngine::succeeding("openai-vision", "Code: XY-9981 OK").with_required_key(),
        );
        let state = state_with(vec![engine], dir.path());
        std::fs::write(dir.path().join("products.json"), r#"{"products":[]}"#).unwrap();
        state
            .keys
            .save_user_keys(
                "user-1",
                &UserKeys {
                    openai_key: Some("sk-test".into()),
                    anthropic_key: None,
                },
            )
            .await
            .unwrap();

        let (status, body) = process_image(
            State(state),
            Json(request("aW1n", "openai-vision", Some("user-1"))),
        )
        .await;

        assert_eq!(status, StatusCode::NOT_FOUND);
        assert_eq!(body.0["ocr_result"]["raw_text"], "Code: XY-9981 OK");
        assert_eq!(body.0["ocr_result"]["filtered_code"], "Code");
        assert_eq!(body.0["message"], "Product not found with code: Code");
    }

    #[tokio::test]
    async fn test_catalog_hit_returns_product() {
        let dir = tempfile::tempdir().unwrap();
        let engine = Arc::new(MockEngine::succeeding("tesseract", "12345"));
        let state = state_with(vec![engine], dir.path());
        std::fs::write(
            dir.path().join("products.json"),
            r#"{"products":[{"code":"12345","name":"Tornillo M8x20","price":0.5,"stock":150,"locations":["Estantería A-3"]}]}"#,
        )
        .unwrap();

        let (status, body) =
            process_image(State(state), Json(request("aW1n", "tesseract", None))).await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body.0["success"], true);
        assert_eq!(body.0["product"]["name"], "Tornillo M8x20");
        assert_eq!(body.0["ocr_result"]["engine_used"], "tesseract");
    }
}
