//! Warehouse intake endpoints.
//!
//! Field names on this surface stay in Spanish (`referencia`,
//! `fabricante`, `cantidad`, `operario`, `imagenes`) to match the
//! ledger files and clients already in the field.

use axum::extract::{Query, State};
use axum::http::StatusCode;
use axum::Json;
use chrono::Utc;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use stockscan_warehouse::{NewEntry, WarehouseError};

use crate::server::AppState;

fn error_response(e: WarehouseError) -> (StatusCode, Json<Value>) {
    let status = match &e {
        WarehouseError::Invalid(_) => StatusCode::BAD_REQUEST,
        WarehouseError::Storage(_) => StatusCode::INTERNAL_SERVER_ERROR,
    };
    if status == StatusCode::INTERNAL_SERVER_ERROR {
        error!(error = %e, "Warehouse operation failed");
    }
    (status, Json(json!({ "success": false, "message": e.to_string() })))
}

/// Handler for `POST /api/warehouse/entry`.
pub async fn create_entry(
    State(state): State<AppState>,
    Json(body): Json<Value>,
) -> (StatusCode, Json<Value>) {
    let Ok(entry) = serde_json::from_value::<NewEntry>(body) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "Datos incompletos" })),
        );
    };

    match state.warehouse.create_entry(entry).await {
        Ok(created) => (
            StatusCode::CREATED,
            Json(json!({
                "success": true,
                "entry_id": created.entry_id,
                "message": "Entrada registrada correctamente",
                "images_saved": created.images_saved,
                "storage_path": created.storage_path,
                "timestamp": created.timestamp
            })),
        ),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct EntriesParams {
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

/// Handler for `GET /api/warehouse/entries?limit=&offset=`.
pub async fn get_entries(
    State(state): State<AppState>,
    Query(params): Query<EntriesParams>,
) -> (StatusCode, Json<Value>) {
    let limit = params.limit.unwrap_or(50);
    let offset = params.offset.unwrap_or(0);

    match state.warehouse.list_entries(limit, offset).await {
        Ok(page) => (StatusCode::OK, Json(json!(page))),
        Err(e) => error_response(e),
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckReferenceParams {
    #[serde(rename = "ref")]
    pub reference: Option<String>,
}

/// Handler for `GET /api/warehouse/check-reference?ref=`.
pub async fn check_reference(
    State(state): State<AppState>,
    Query(params): Query<CheckReferenceParams>,
) -> (StatusCode, Json<Value>) {
    let reference = params.reference.unwrap_or_default();
    match state.warehouse.check_reference(&reference).await {
        Ok(check) => (StatusCode::OK, Json(json!(check))),
        Err(e) => error_response(e),
    }
}

/// Handler for `GET /api/warehouse/manufacturers`.
pub async fn get_manufacturers(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    match state.warehouse.manufacturers().await {
        Ok(manufacturers) => (
            StatusCode::OK,
            Json(json!({ "manufacturers": manufacturers })),
        ),
        Err(e) => error_response(e),
    }
}

/// Handler for `GET /api/warehouse/health`.
///
/// Reports store counts and which OCR engines this deployment has
/// configured, so a field client can decide what to offer.
pub async fn get_health(State(state): State<AppState>) -> (StatusCode, Json<Value>) {
    let (entries_count, manufacturers_count) = match state.warehouse.stats().await {
        Ok(stats) => stats,
        Err(e) => {
            error!(error = %e, "Failed to read warehouse stats");
            (0, 0)
        }
    };

    let mut engines: Vec<Value> = state
        .registry
        .list()
        .into_iter()
        .map(|name| {
            let requires_key = state
                .registry
                .get(&name)
                .map(|e| e.requires_key())
                .unwrap_or(false);
            json!({ "name": name, "requires_key": requires_key })
        })
        .collect();
    engines.sort_by_key(|e| e["name"].as_str().unwrap_or_default().to_string());

    (
        StatusCode::OK,
        Json(json!({
            "status": "ok",
            "timestamp": Utc::now().to_rfc3339(),
            "version": env!("CARGO_PKG_VERSION"),
            "storage_path": state.storage_dir,
            "entries_count": entries_count,
            "manufacturers_count": manufacturers_count,
            "ocr_engines": engines
        })),
    )
}
