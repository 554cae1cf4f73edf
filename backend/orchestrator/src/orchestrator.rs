use std::sync::Arc;

use tracing::{info, warn};

use stockscan_core::{filter_code, EngineSelector, FilteredResult, ScanError};
use stockscan_engines::EngineRegistry;

/// Engine priority, highest first. Paid vision engines outrank local
/// engines; among the locals the tesseract binary outranks the easyocr
/// script. The orchestrator consults this list instead of encoding the
/// ordering in control flow.
pub const ENGINE_PRIORITY: [&str; 4] = ["openai-vision", "claude-vision", "tesseract", "easyocr"];

/// Names of the free local engines, in priority order.
fn local_engines() -> impl Iterator<Item = &'static str> {
    ENGINE_PRIORITY
        .into_iter()
        .filter(|name| matches!(*name, "tesseract" | "easyocr"))
}

/// Per-call engine orchestration. Holds only the registry; each
/// `process` call runs start to finish with no shared mutable state.
pub struct Orchestrator {
    registry: Arc<EngineRegistry>,
}

impl Orchestrator {
    pub fn new(registry: Arc<EngineRegistry>) -> Self {
        Self { registry }
    }

    /// Ordered engine names to attempt for a selector.
    fn attempt_order(selector: EngineSelector) -> Vec<&'static str> {
        match selector {
            EngineSelector::Both => local_engines().collect(),
            EngineSelector::Tesseract => vec!["tesseract"],
            EngineSelector::Easyocr => vec!["easyocr"],
            EngineSelector::OpenaiVision => vec!["openai-vision"],
            EngineSelector::ClaudeVision => vec!["claude-vision"],
        }
    }

    /// Run recognition for one request.
    ///
    /// Engines are attempted sequentially in priority order with no
    /// retries. The first engine-level success wins, even when its
    /// filtered code is empty — empty means "successful OCR, no code
    /// found", which is distinct from an engine failure. When every
    /// attempted engine fails, the aggregate carries one collected
    /// message per attempt.
    ///
    /// An explicitly requested paid engine with no caller-supplied key
    /// fails immediately; there is never a silent fallback to another
    /// engine in that case.
    pub async fn process(
        &self,
        selector: EngineSelector,
        image: &[u8],
        api_key: Option<&str>,
    ) -> Result<FilteredResult, ScanError> {
        let order = Self::attempt_order(selector);
        let mut failures: Vec<String> = Vec::new();

        for name in order {
            let Some(engine) = self.registry.get(name) else {
                warn!(engine = name, "Engine not configured, skipping");
                failures.push(format!("{name}: not configured"));
                continue;
            };

            if engine.requires_key() && api_key.map_or(true, str::is_empty) {
                return Err(ScanError::CredentialMissing(name.to_string()));
            }

            match engine.recognize(image, api_key).await {
                Ok(raw) => {
                    let filtered_code = filter_code(&raw.raw_text);
                    info!(
                        engine = name,
                        filtered_code = %filtered_code,
                        "Engine succeeded"
                    );
                    return Ok(FilteredResult {
                        raw_text: raw.raw_text,
                        filtered_code,
                        engine_used: raw.engine_used,
                    });
                }
                Err(e) => {
                    warn!(engine = name, error = %e, "Engine failed, trying next in priority");
                    failures.push(format!("{name}: {e}"));
                }
            }
        }

        Err(ScanError::AllEnginesFailed(failures.join("; ")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use stockscan_engines::MockEngine;

    fn registry_of(engines: Vec<Arc<MockEngine>>) -> Arc<EngineRegistry> {
        let mut registry = EngineRegistry::new();
        for engine in engines {
            registry.register(engine);
        }
        Arc::new(registry)
    }

    #[tokio::test]
    async fn test_both_tries_tesseract_before_easyocr() {
        let tesseract = Arc::new(MockEngine::failing("tesseract", "binary missing"));
        let easyocr = Arc::new(MockEngine::succeeding("easyocr", "REF-442"));
        let orchestrator =
            Orchestrator::new(registry_of(vec![tesseract.clone(), easyocr.clone()]));

        let result = orchestrator
            .process(EngineSelector::Both, b"img", None)
            .await
            .unwrap();

        assert_eq!(result.engine_used, "easyocr");
        assert_eq!(result.filtered_code, "REF-442");
        assert_eq!(tesseract.calls(), 1);
        assert_eq!(easyocr.calls(), 1);
    }

    #[tokio::test]
    async fn test_first_success_wins_even_with_empty_code() {
        // Tesseract "succeeds" but its text filters down to nothing.
        // The orchestrator must return that empty result and must not
        // consult the second engine.
        let tesseract = Arc::new(MockEngine::succeeding("tesseract", "!!! ???"));
        let easyocr = Arc::new(MockEngine::succeeding("easyocr", "REAL-CODE"));
        let orchestrator =
            Orchestrator::new(registry_of(vec![tesseract.clone(), easyocr.clone()]));

        let result = orchestrator
            .process(EngineSelector::Both, b"img", None)
            .await
            .unwrap();

        assert_eq!(result.engine_used, "tesseract");
        assert_eq!(result.filtered_code, "");
        assert_eq!(easyocr.calls(), 0);
    }

    #[tokio::test]
    async fn test_all_failures_aggregate_per_engine_messages() {
        let tesseract = Arc::new(MockEngine::failing("tesseract", "exit code 1"));
        let easyocr = Arc::new(MockEngine::failing("easyocr", "script not found"));
        let orchestrator = Orchestrator::new(registry_of(vec![tesseract, easyocr]));

        let err = orchestrator
            .process(EngineSelector::Both, b"img", None)
            .await
            .unwrap_err();

        match err {
            ScanError::AllEnginesFailed(msg) => {
                assert!(msg.contains("tesseract"));
                assert!(msg.contains("exit code 1"));
                assert!(msg.contains("easyocr"));
                assert!(msg.contains("script not found"));
            }
            other => panic!("expected AllEnginesFailed, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_paid_engine_without_key_fails_without_fallback() {
        let vision = Arc::new(
            MockEngine::succeeding("openai-vision", "WOULD-WIN").with_required_key(),
        );
        let orchestrator = Orchestrator::new(registry_of(vec![vision.clone()]));

        let err = orchestrator
            .process(EngineSelector::OpenaiVision, b"img", None)
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::CredentialMissing(name) if name == "openai-vision"));
        assert_eq!(vision.calls(), 0);
    }

    #[tokio::test]
    async fn test_sentinel_from_vision_engine_yields_empty_code() {
        let vision = Arc::new(
            MockEngine::succeeding("openai-vision", "NO_CODE_FOUND").with_required_key(),
        );
        let orchestrator = Orchestrator::new(registry_of(vec![vision]));

        let result = orchestrator
            .process(EngineSelector::OpenaiVision, b"img", Some("sk-test"))
            .await
            .unwrap();

        assert_eq!(result.filtered_code, "");
        assert_eq!(result.raw_text, "NO_CODE_FOUND");
    }

    #[tokio::test]
    async fn test_unconfigured_single_engine_reports_aggregate_failure() {
        let orchestrator = Orchestrator::new(registry_of(vec![]));

        let err = orchestrator
            .process(EngineSelector::Tesseract, b"img", None)
            .await
            .unwrap_err();

        assert!(matches!(err, ScanError::AllEnginesFailed(msg) if msg.contains("tesseract")));
    }

    #[test]
    fn test_priority_list_is_vision_first() {
        assert_eq!(
            ENGINE_PRIORITY,
            ["openai-vision", "claude-vision", "tesseract", "easyocr"]
        );
        assert_eq!(
            Orchestrator::attempt_order(EngineSelector::Both),
            vec!["tesseract", "easyocr"]
        );
    }
}
