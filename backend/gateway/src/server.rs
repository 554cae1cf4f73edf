//! Main HTTP Gateway Server.
//!
//! Wires config → engine registry → orchestrator → routes.

use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use axum::routing::{get, post};
use axum::Router;
use tokio::net::TcpListener;
use tower_http::cors::CorsLayer;
use tracing::{info, warn};

use stockscan_catalog::ProductStore;
use stockscan_config::StockScanConfig;
use stockscan_engines::{
    ClaudeVisionEngine, EasyOcrEngine, EngineRegistry, OpenAiVisionEngine, TesseractEngine,
};
use stockscan_orchestrator::Orchestrator;
use stockscan_security::ApiKeyStore;
use stockscan_warehouse::WarehouseStore;

use crate::{health_api, ocr_api, products_api, settings_api, warehouse_api};

/// Application state shared across routes.
#[derive(Clone)]
pub struct AppState {
    pub orchestrator: Arc<Orchestrator>,
    pub registry: Arc<EngineRegistry>,
    pub products: Arc<ProductStore>,
    pub keys: Arc<ApiKeyStore>,
    pub warehouse: Arc<WarehouseStore>,
    pub storage_dir: String,
}

/// Build the engine registry declared by the config.
fn build_registry(config: &StockScanConfig) -> EngineRegistry {
    let mut registry = EngineRegistry::new();

    if config.engines.tesseract.enabled {
        registry.register(Arc::new(TesseractEngine::new(
            &config.engines.tesseract.binary,
            &config.engines.tesseract.languages,
        )));
    }
    if config.engines.easyocr.enabled {
        registry.register(Arc::new(EasyOcrEngine::new(
            &config.engines.easyocr.python_bin,
            &config.engines.easyocr.script,
        )));
    }
    if config.engines.openai_vision.enabled {
        let engine = if config.engines.openai_vision.model.is_empty() {
            OpenAiVisionEngine::default()
        } else {
            OpenAiVisionEngine::new(&config.engines.openai_vision.model)
        };
        registry.register(Arc::new(engine));
    }
    if config.engines.claude_vision.enabled {
        let engine = if config.engines.claude_vision.model.is_empty() {
            ClaudeVisionEngine::default()
        } else {
            ClaudeVisionEngine::new(&config.engines.claude_vision.model)
        };
        registry.register(Arc::new(engine));
    }

    registry
}

/// Assemble the shared state from a prepared config.
pub fn build_state(config: &StockScanConfig) -> Result<AppState> {
    let registry = Arc::new(build_registry(config));
    info!(engines = ?registry.list(), "Configured OCR engines");

    let encryption_key = if config.security.encryption_key.is_empty() {
        // Stored keys will not survive a restart without a configured
        // key; fine for development, loud for anything else.
        warn!("No encryption key configured; generating an ephemeral one");
        stockscan_security::generate_key()
    } else {
        config.security.encryption_key.clone()
    };

    let data_dir = std::path::PathBuf::from(&config.storage.data_dir);

    Ok(AppState {
        orchestrator: Arc::new(Orchestrator::new(registry.clone())),
        registry,
        products: Arc::new(ProductStore::new(data_dir.join("products.json"))),
        keys: Arc::new(ApiKeyStore::new(
            data_dir.join("api_keys.json"),
            encryption_key,
        )),
        warehouse: Arc::new(WarehouseStore::new(&data_dir, &config.storage.image_dir)),
        storage_dir: config.storage.image_dir.clone(),
    })
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .route("/api/ocr/process", post(ocr_api::process_image))
        .route("/api/products/search", get(products_api::search_products))
        .route("/api/products/:code", get(products_api::get_product))
        .route(
            "/api/settings/api-keys",
            post(settings_api::save_api_keys).delete(settings_api::delete_api_keys),
        )
        .route(
            "/api/settings/api-keys/status",
            get(settings_api::get_api_key_status),
        )
        .route("/api/warehouse/entry", post(warehouse_api::create_entry))
        .route("/api/warehouse/entries", get(warehouse_api::get_entries))
        .route(
            "/api/warehouse/check-reference",
            get(warehouse_api::check_reference),
        )
        .route(
            "/api/warehouse/manufacturers",
            get(warehouse_api::get_manufacturers),
        )
        .route("/api/warehouse/health", get(warehouse_api::get_health))
        .route("/api/health", get(health_api::get_health))
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// Start the Axum HTTP server.
pub async fn start_server(addr: SocketAddr, state: AppState) -> Result<()> {
    let app = router(state);

    info!("Gateway HTTP server listening on {}", addr);
    let listener = TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
