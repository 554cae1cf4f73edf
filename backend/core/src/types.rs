//! Data model shared across the StockScan crates.

use serde::{Deserialize, Serialize};

/// Raw output of a single engine invocation. Ephemeral — produced by
/// one `recognize` call and consumed by the orchestrator.
#[derive(Debug, Clone)]
pub struct RawRecognition {
    pub raw_text: String,
    pub engine_used: String,
}

/// Raw text plus the normalized candidate code derived from it.
///
/// `filtered_code` is either empty ("no code found") or restricted to
/// `[A-Za-z0-9_-]+`; consumers must treat empty as no code.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilteredResult {
    pub raw_text: String,
    pub filtered_code: String,
    pub engine_used: String,
}

/// Engine selector accepted on the wire.
///
/// `Both` means "try every configured free local engine" in priority
/// order; the vision variants name exactly one paid remote engine and
/// require a caller-supplied API key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum EngineSelector {
    Tesseract,
    Easyocr,
    Both,
    OpenaiVision,
    ClaudeVision,
}

impl EngineSelector {
    /// Wire name of the selector.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Tesseract => "tesseract",
            Self::Easyocr => "easyocr",
            Self::Both => "both",
            Self::OpenaiVision => "openai-vision",
            Self::ClaudeVision => "claude-vision",
        }
    }

    /// Parse a wire selector string.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "tesseract" => Some(Self::Tesseract),
            "easyocr" => Some(Self::Easyocr),
            "both" => Some(Self::Both),
            "openai-vision" => Some(Self::OpenaiVision),
            "claude-vision" => Some(Self::ClaudeVision),
            _ => None,
        }
    }

    /// True for the paid remote vision engines.
    pub fn is_paid(&self) -> bool {
        matches!(self, Self::OpenaiVision | Self::ClaudeVision)
    }
}

/// One record of the flat product catalog.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Product {
    pub code: String,
    pub name: String,
    #[serde(default)]
    pub description: String,
    pub price: f64,
    pub stock: i64,
    #[serde(default)]
    pub locations: Vec<String>,
    #[serde(default)]
    pub supplier: String,
    #[serde(default)]
    pub category: String,
}
