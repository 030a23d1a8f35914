//! CLI command implementations

pub mod check;
pub mod config;
pub mod parse;
pub mod resolve;
pub mod version;

use anyhow::{Context, Result};
use tagwatch_core::{ConfigLoader, RuntimeConfig};

use crate::cli::GlobalOpts;

/// Load the layered configuration, honoring `--config`
pub fn load_config(global: &GlobalOpts) -> Result<RuntimeConfig> {
    let loader = ConfigLoader::for_path(global.config.as_deref())?;
    loader
        .load()
        .with_context(|| format!("Failed to load configuration from {}", loader.config_path()))
}
