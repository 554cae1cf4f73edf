//! `stockscan-core` — shared types for the StockScan runtime.
//!
//! Holds the data model exchanged between the gateway, orchestrator and
//! engine adapters, the `OcrEngine` trait every recognition backend
//! implements, the candidate-code filter, and the error taxonomy.

pub mod error;
pub mod filter;
pub mod traits;
pub mod types;

pub use error::{EngineError, ScanError};
pub use filter::{filter_code, NO_CODE_SENTINEL};
pub use traits::OcrEngine;
pub use types::{EngineSelector, FilteredResult, Product, RawRecognition};
