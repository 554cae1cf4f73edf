//! Hosted vision-model engine adapters (OpenAI and Anthropic).
//!
//! Both POST the base64 image with a code-extraction instruction and a
//! bounded timeout. The prompt contract asks for the bare alphanumeric
//! code, or `NO_CODE_FOUND` when the label carries none; the filter
//! checks that sentinel case-insensitively downstream.

use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine as _;
use reqwest::Client;
use tracing::debug;

use stockscan_core::{EngineError, OcrEngine, RawRecognition};

/// Instruction sent alongside the image to both vision models.
const EXTRACTION_PROMPT: &str = "Analyze this product label image and extract ONLY the product \
     code or number. Return only the alphanumeric code, nothing else. If you cannot find a code, \
     return 'NO_CODE_FOUND'.";

const REQUEST_TIMEOUT_SECS: u64 = 30;

fn http_client() -> Client {
    Client::builder()
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .build()
        .unwrap_or_default()
}

fn require_key(api_key: Option<&str>, engine: &str) -> Result<String, EngineError> {
    match api_key {
        Some(key) if !key.is_empty() => Ok(key.to_string()),
        _ => Err(EngineError::Unavailable(format!(
            "{engine} requires an API key"
        ))),
    }
}

/// Pull a human-readable message out of a provider error body, falling
/// back to the HTTP status when the body is not the expected JSON.
fn api_error_message(status: u16, body: &str) -> String {
    serde_json::from_str::<serde_json::Value>(body)
        .ok()
        .and_then(|v| v["error"]["message"].as_str().map(str::to_string))
        .unwrap_or_else(|| format!("HTTP {status}"))
}

// ---------------------------------------------------------------------------
// OpenAI
// ---------------------------------------------------------------------------

pub struct OpenAiVisionEngine {
    client: Client,
    model: String,
    base_url: String,
}

impl OpenAiVisionEngine {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            model: model.into(),
            base_url: "https://api.openai.com/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl Default for OpenAiVisionEngine {
    fn default() -> Self {
        Self::new("gpt-4o")
    }
}

#[async_trait]
impl OcrEngine for OpenAiVisionEngine {
    fn name(&self) -> &'static str {
        "openai-vision"
    }

    fn requires_key(&self) -> bool {
        true
    }

    async fn recognize(
        &self,
        image: &[u8],
        api_key: Option<&str>,
    ) -> Result<RawRecognition, EngineError> {
        let key = require_key(api_key, self.name())?;
        let b64 = BASE64.encode(image);

        let body = serde_json::json!({
            "model": self.model,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "text", "text": EXTRACTION_PROMPT },
                    { "type": "image_url",
                      "image_url": { "url": format!("data:image/jpeg;base64,{b64}") } }
                ]
            }],
            "max_tokens": 100
        });

        debug!(model = %self.model, "Sending image to OpenAI vision");
        let resp = self
            .client
            .post(format!("{}/chat/completions", self.base_url))
            .bearer_auth(key)
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::Invocation(format!("OpenAI request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(EngineError::RemoteApi {
                status: status.as_u16(),
                message: api_error_message(status.as_u16(), &text),
            });
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| EngineError::MalformedResponse(format!("invalid OpenAI JSON: {e}")))?;

        let raw_text = json["choices"][0]["message"]["content"]
            .as_str()
            .ok_or_else(|| {
                EngineError::MalformedResponse("OpenAI response missing content".into())
            })?
            .trim()
            .to_string();

        Ok(RawRecognition {
            raw_text,
            engine_used: self.name().to_string(),
        })
    }
}

// ---------------------------------------------------------------------------
// Anthropic
// ---------------------------------------------------------------------------

pub struct ClaudeVisionEngine {
    client: Client,
    model: String,
    base_url: String,
}

impl ClaudeVisionEngine {
    pub fn new(model: impl Into<String>) -> Self {
        Self {
            client: http_client(),
            model: model.into(),
            base_url: "https://api.anthropic.com/v1".to_string(),
        }
    }

    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into();
        self
    }
}

impl Default for ClaudeVisionEngine {
    fn default() -> Self {
        Self::new("claude-3-5-sonnet-latest")
    }
}

#[async_trait]
impl OcrEngine for ClaudeVisionEngine {
    fn name(&self) -> &'static str {
        "claude-vision"
    }

    fn requires_key(&self) -> bool {
        true
    }

    async fn recognize(
        &self,
        image: &[u8],
        api_key: Option<&str>,
    ) -> Result<RawRecognition, EngineError> {
        let key = require_key(api_key, self.name())?;
        let b64 = BASE64.encode(image);

        let body = serde_json::json!({
            "model": self.model,
            "max_tokens": 100,
            "messages": [{
                "role": "user",
                "content": [
                    { "type": "image",
                      "source": { "type": "base64", "media_type": "image/jpeg", "data": b64 } },
                    { "type": "text", "text": EXTRACTION_PROMPT }
                ]
            }]
        });

        debug!(model = %self.model, "Sending image to Claude vision");
        let resp = self
            .client
            .post(format!("{}/messages", self.base_url))
            .header("x-api-key", key)
            .header("anthropic-version", "2023-06-01")
            .json(&body)
            .send()
            .await
            .map_err(|e| EngineError::Invocation(format!("Anthropic request failed: {e}")))?;

        let status = resp.status();
        if !status.is_success() {
            let text = resp.text().await.unwrap_or_default();
            return Err(EngineError::RemoteApi {
                status: status.as_u16(),
                message: api_error_message(status.as_u16(), &text),
            });
        }

        let json: serde_json::Value = resp
            .json()
            .await
            .map_err(|e| EngineError::MalformedResponse(format!("invalid Anthropic JSON: {e}")))?;

        let raw_text = json["content"][0]["text"]
            .as_str()
            .ok_or_else(|| {
                EngineError::MalformedResponse("Anthropic response missing text content".into())
            })?
            .trim()
            .to_string();

        Ok(RawRecognition {
            raw_text,
            engine_used: self.name().to_string(),
        })
    }
}
