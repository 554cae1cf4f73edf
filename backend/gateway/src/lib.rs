//! `stockscan-gateway` — HTTP surface of the StockScan backend.
//!
//! Routes inbound JSON requests to the orchestrator, catalog, key
//! store and warehouse ledger, and maps their outcomes onto the wire
//! contract (400 bad input, 404 not found, 500 engine/internal
//! failure, always `{ success, message }` on errors).

pub mod health_api;
pub mod ocr_api;
pub mod products_api;
pub mod server;
pub mod settings_api;
pub mod warehouse_api;

pub use server::{build_state, router, start_server, AppState};
