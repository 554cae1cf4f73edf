//! Tesseract engine adapter.
//!
//! Stages the image to a temp directory, runs the `tesseract` binary
//! with an explicit argument array (no shell), and reads the `.txt`
//! result file. The temp directory is removed on every exit path via
//! RAII.

use std::time::Duration;

use async_trait::async_trait;
use tokio::process::Command;
use tracing::{debug, warn};

use stockscan_core::{EngineError, OcrEngine, RawRecognition};

/// Bound on a single subprocess invocation.
const SUBPROCESS_TIMEOUT_SECS: u64 = 30;

pub struct TesseractEngine {
    binary: String,
    /// Tesseract language spec, e.g. "spa+eng".
    languages: String,
}

impl TesseractEngine {
    pub fn new(binary: impl Into<String>, languages: impl Into<String>) -> Self {
        Self {
            binary: binary.into(),
            languages: languages.into(),
        }
    }

    /// Probe for the binary before attempting recognition, so a missing
    /// install fails fast with a descriptive error instead of timing out.
    pub async fn check_available(&self) -> Result<(), EngineError> {
        let probe = Command::new(&self.binary).arg("--version").output().await;
        match probe {
            Ok(out) if out.status.success() => Ok(()),
            Ok(out) => Err(EngineError::Unavailable(format!(
                "{} --version exited with {}",
                self.binary, out.status
            ))),
            Err(e) => Err(EngineError::Unavailable(format!(
                "tesseract binary not found ({}): {e}",
                self.binary
            ))),
        }
    }
}

impl Default for TesseractEngine {
    fn default() -> Self {
        Self::new("tesseract", "spa+eng")
    }
}

#[async_trait]
impl OcrEngine for TesseractEngine {
    fn name(&self) -> &'static str {
        "tesseract"
    }

    async fn recognize(
        &self,
        image: &[u8],
        _api_key: Option<&str>,
    ) -> Result<RawRecognition, EngineError> {
        self.check_available().await?;

        // Scoped to this call: dropped (and deleted) on every exit path.
        let dir = tempfile::Builder::new()
            .prefix("stockscan-ocr-")
            .tempdir()
            .map_err(|e| EngineError::Invocation(format!("failed to create temp dir: {e}")))?;

        let image_path = dir.path().join("label.jpg");
        tokio::fs::write(&image_path, image)
            .await
            .map_err(|e| EngineError::Invocation(format!("failed to stage temp image: {e}")))?;

        let out_base = dir.path().join("result");
        debug!(binary = %self.binary, languages = %self.languages, "Running tesseract");

        let run = Command::new(&self.binary)
            .arg(&image_path)
            .arg(&out_base)
            .arg("-l")
            .arg(&self.languages)
            .output();

        let output = tokio::time::timeout(Duration::from_secs(SUBPROCESS_TIMEOUT_SECS), run)
            .await
            .map_err(|_| EngineError::Timeout(SUBPROCESS_TIMEOUT_SECS))?
            .map_err(|e| EngineError::Invocation(format!("failed to spawn tesseract: {e}")))?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            warn!(status = %output.status, "tesseract exited with error");
            return Err(EngineError::Invocation(format!(
                "tesseract exited with {}: {}",
                output.status,
                stderr.trim()
            )));
        }

        let result_file = out_base.with_extension("txt");
        let raw_text = tokio::fs::read_to_string(&result_file)
            .await
            .map_err(|_| {
                EngineError::MalformedResponse("tesseract produced no result file".into())
            })?;

        Ok(RawRecognition {
            raw_text: raw_text.trim().to_string(),
            engine_used: self.name().to_string(),
        })
    }
}
