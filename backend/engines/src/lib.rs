//! `stockscan-engines` — OCR/vision engine adapters.
//!
//! One adapter per recognition backend, all behind the
//! [`stockscan_core::OcrEngine`] trait:
//! - `TesseractEngine`: local `tesseract` binary via subprocess
//! - `EasyOcrEngine`: local Python script via subprocess, JSON on stdout
//! - `OpenAiVisionEngine` / `ClaudeVisionEngine`: hosted vision models
//!   over HTTPS with a code-extraction prompt
//!
//! Adapters are looked up by wire name through the [`EngineRegistry`]
//! built at startup.

pub mod easyocr;
pub mod mock;
pub mod registry;
pub mod tesseract;
pub mod vision;

pub use easyocr::EasyOcrEngine;
pub use mock::MockEngine;
pub use registry::EngineRegistry;
pub use tesseract::TesseractEngine;
pub use vision::{ClaudeVisionEngine, OpenAiVisionEngine};
