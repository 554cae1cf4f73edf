//! `stockscan-config` — runtime configuration.
//!
//! Typed YAML schema, `${ENV_VAR}` substitution, and defaults applied
//! when the file is absent.

pub mod env;
pub mod io;
pub mod schema;

pub use env::resolve_env_vars;
pub use io::{config_dir, config_file_path, load_config};
pub use schema::StockScanConfig;

use anyhow::Result;
use std::path::Path;

/// Load a config file, substitute env vars, and fall back to defaults
/// for anything unspecified. Main runtime entry point.
pub async fn load_and_prepare(path: &Path) -> Result<StockScanConfig> {
    let raw_config = io::load_config(path).await?;

    let mut value = serde_json::to_value(&raw_config)?;
    value = env::resolve_env_vars(&value)?;

    let config: StockScanConfig = serde_json::from_value(value)?;
    Ok(config)
}
