//! Structured logging for the StockScan backend.
//!
//! Console + rolling-file tracing setup and a redaction helper for
//! scrubbing API keys out of free-form engine error text.

pub mod logger;
pub mod redact;

pub use logger::init_logger;
pub use redact::redact_sensitive_data;
