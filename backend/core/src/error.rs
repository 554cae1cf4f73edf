use thiserror::Error;

/// Top-level error type for the StockScan runtime.
#[derive(Debug, Error)]
pub enum ScanError {
    #[error("invalid input: {0}")]
    InvalidInput(String),

    #[error("API key not configured for engine: {0}")]
    CredentialMissing(String),

    #[error("all OCR engines failed: {0}")]
    AllEnginesFailed(String),

    #[error("product not found with code: {0}")]
    ProductNotFound(String),

    #[error("storage error: {0}")]
    StorageError(String),

    #[error("configuration error: {0}")]
    ConfigError(String),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

/// Failure of a single engine invocation.
///
/// The orchestrator swallows these and converts them into a
/// try-next-engine signal; an individual `EngineError` never crosses
/// the orchestrator boundary on its own.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error("engine not available: {0}")]
    Unavailable(String),

    #[error("invocation failed: {0}")]
    Invocation(String),

    #[error("engine timed out after {0}s")]
    Timeout(u64),

    #[error("remote API error (HTTP {status}): {message}")]
    RemoteApi { status: u16, message: String },

    #[error("malformed engine response: {0}")]
    MalformedResponse(String),
}
