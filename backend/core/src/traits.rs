use async_trait::async_trait;

use crate::error::EngineError;
use crate::types::RawRecognition;

/// Trait for all OCR/vision recognition backends.
///
/// Engines are registered by name at startup and invoked by the
/// orchestrator in priority order. Every failure mode (binary missing,
/// non-zero exit, network error, non-200 status, malformed body) must
/// surface as an `EngineError` — engines never panic.
#[async_trait]
pub trait OcrEngine: Send + Sync {
    /// Wire name of the engine (e.g., "tesseract").
    fn name(&self) -> &'static str;

    /// True when the engine needs a caller-supplied API key.
    fn requires_key(&self) -> bool {
        false
    }

    /// Run recognition over raw image bytes and return the raw text.
    async fn recognize(
        &self,
        image: &[u8],
        api_key: Option<&str>,
    ) -> Result<RawRecognition, EngineError>;
}
