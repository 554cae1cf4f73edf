//! Scriptable in-memory engine for orchestrator and gateway tests.

use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;

use stockscan_core::{EngineError, OcrEngine, RawRecognition};

enum Outcome {
    Text(String),
    Fail(String),
}

/// Engine that returns a canned success or failure and counts how many
/// times it was invoked.
pub struct MockEngine {
    name: &'static str,
    requires_key: bool,
    outcome: Outcome,
    calls: AtomicUsize,
}

impl MockEngine {
    /// Engine that always succeeds with the given raw text.
    pub fn succeeding(name: &'static str, raw_text: impl Into<String>) -> Self {
        Self {
            name,
            requires_key: false,
            outcome: Outcome::Text(raw_text.into()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Engine that always fails with the given message.
    pub fn failing(name: &'static str, message: impl Into<String>) -> Self {
        Self {
            name,
            requires_key: false,
            outcome: Outcome::Fail(message.into()),
            calls: AtomicUsize::new(0),
        }
    }

    pub fn with_required_key(mut self) -> Self {
        self.requires_key = true;
        self
    }

    /// Number of `recognize` invocations so far.
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl OcrEngine for MockEngine {
    fn name(&self) -> &'static str {
        self.name
    }

    fn requires_key(&self) -> bool {
        self.requires_key
    }

    async fn recognize(
        &self,
        _image: &[u8],
        _api_key: Option<&str>,
    ) -> Result<RawRecognition, EngineError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.outcome {
            Outcome::Text(text) => Ok(RawRecognition {
                raw_text: text.clone(),
                engine_used: self.name.to_string(),
            }),
            Outcome::Fail(message) => Err(EngineError::Invocation(message.clone())),
        }
    }
}
