//! `stockscan-orchestrator` — per-request engine orchestration.
//!
//! Resolves an [`EngineSelector`] into an ordered list of engine
//! attempts, invokes each adapter until one succeeds, and applies the
//! code filter to the winning raw text. No state survives a call.

pub mod orchestrator;

pub use orchestrator::{Orchestrator, ENGINE_PRIORITY};
