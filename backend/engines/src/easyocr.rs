//! EasyOCR engine adapter.
//!
//! Invokes `scripts/easyocr_process.py` through the configured Python
//! interpreter and parses the single JSON object the script prints to
//! stdout: `{"success": bool, "raw_text": string, "error": string?}`.

use std::path::PathBuf;
use std::time::Duration;

use async_trait::async_trait;
use serde::Deserialize;
use tokio::process::Command;
use tracing::debug;

use stockscan_core::{EngineError, OcrEngine, RawRecognition};

const SUBPROCESS_TIMEOUT_SECS: u64 = 30;

pub struct EasyOcrEngine {
    python_bin: String,
    script_path: PathBuf,
}

/// Wire format of the worker script's stdout.
#[derive(Deserialize)]
struct ScriptResponse {
    success: bool,
    #[serde(default)]
    raw_text: String,
    #[serde(default)]
    error: Option<String>,
}

impl EasyOcrEngine {
    pub fn new(python_bin: impl Into<String>, script_path: impl Into<PathBuf>) -> Self {
        Self {
            python_bin: python_bin.into(),
            script_path: script_path.into(),
        }
    }

    /// Fail fast when the worker script or the interpreter is missing.
    pub async fn check_available(&self) -> Result<(), EngineError> {
        if !self.script_path.exists() {
            return Err(EngineError::Unavailable(format!(
                "EasyOCR script not found: {}",
                self.script_path.display()
            )));
        }
        let probe = Command::new(&self.python_bin).arg("--version").output().await;
        match probe {
            Ok(out) if out.status.success() => Ok(()),
            _ => Err(EngineError::Unavailable(format!(
                "python interpreter not found: {}",
                self.python_bin
            ))),
        }
    }
}

#[async_trait]
impl OcrEngine for EasyOcrEngine {
    fn name(&self) -> &'static str {
        "easyocr"
    }

    async fn recognize(
        &self,
        image: &[u8],
        _api_key: Option<&str>,
    ) -> Result<RawRecognition, EngineError> {
        self.check_available().await?;

        let dir = tempfile::Builder::new()
            .prefix("stockscan-ocr-")
            .tempdir()
            .map_err(|e| EngineError::Invocation(format!("failed to create temp dir: {e}")))?;

        let image_path = dir.path().join("label.jpg");
        tokio::fs::write(&image_path, image)
            .await
            .map_err(|e| EngineError::Invocation(format!("failed to stage temp image: {e}")))?;

        debug!(script = %self.script_path.display(), "Running EasyOCR worker");

        let run = Command::new(&self.python_bin)
            .arg(&self.script_path)
            .arg(&image_path)
            .output();

        let output = tokio::time::timeout(Duration::from_secs(SUBPROCESS_TIMEOUT_SECS), run)
            .await
            .map_err(|_| EngineError::Timeout(SUBPROCESS_TIMEOUT_SECS))?
            .map_err(|e| EngineError::Invocation(format!("failed to spawn python: {e}")))?;

        if !output.status.success() {
            return Err(EngineError::Invocation(format!(
                "EasyOCR worker exited with {}",
                output.status
            )));
        }

        let response: ScriptResponse = serde_json::from_slice(&output.stdout).map_err(|e| {
            EngineError::MalformedResponse(format!("invalid JSON from EasyOCR worker: {e}"))
        })?;

        if !response.success {
            return Err(EngineError::Invocation(
                response.error.unwrap_or_else(|| "EasyOCR worker reported failure".into()),
            ));
        }

        Ok(RawRecognition {
            raw_text: response.raw_text.trim().to_string(),
            engine_used: self.name().to_string(),
        })
    }
}
