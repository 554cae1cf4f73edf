//! Product catalog endpoints.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use tracing::error;

use crate::server::AppState;

/// Handler for `GET /api/products/{code}`.
pub async fn get_product(
    State(state): State<AppState>,
    Path(code): Path<String>,
) -> (StatusCode, Json<Value>) {
    match state.products.get_by_code(&code).await {
        Ok(Some(product)) => (StatusCode::OK, Json(json!(product))),
        Ok(None) => (
            StatusCode::NOT_FOUND,
            Json(json!({ "success": false, "message": "Product not found" })),
        ),
        Err(e) => {
            error!(error = %e, "Catalog read failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Internal server error" })),
            )
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct SearchParams {
    pub q: Option<String>,
}

/// Handler for `GET /api/products/search?q=query`.
pub async fn search_products(
    State(state): State<AppState>,
    Query(params): Query<SearchParams>,
) -> (StatusCode, Json<Value>) {
    let Some(query) = params.q.filter(|q| !q.is_empty()) else {
        return (
            StatusCode::BAD_REQUEST,
            Json(json!({ "success": false, "message": "Search query is required" })),
        );
    };

    match state.products.search(&query).await {
        Ok(products) => (
            StatusCode::OK,
            Json(json!({
                "success": true,
                "count": products.len(),
                "products": products
            })),
        ),
        Err(e) => {
            error!(error = %e, "Catalog search failed");
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(json!({ "success": false, "message": "Internal server error" })),
            )
        }
    }
}
