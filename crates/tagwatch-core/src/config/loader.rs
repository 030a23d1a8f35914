//! Layered configuration loader
//!
//! Loads configuration from multiple sources with the following precedence (low to high):
//! 1. Built-in defaults
//! 2. Config file (~/.tagwatch/config.yaml, or an explicit path)
//! 3. Environment variables (TAGWATCH_* prefix)
//! 4. CLI flags (handled by caller)

use super::types::RuntimeConfig;
use crate::error::{Error, Result};
use camino::{Utf8Path, Utf8PathBuf};
use std::env;
use std::fs;
use tracing::debug;

/// Name of the config file inside the config directory
pub const CONFIG_FILE_NAME: &str = "config.yaml";

/// Configuration loader
pub struct ConfigLoader {
    /// Config file to read
    config_path: Utf8PathBuf,
    /// Whether a missing file is an error
    required: bool,
}

impl ConfigLoader {
    /// Loader for the standard location (~/.tagwatch/config.yaml); the file is optional
    pub fn new() -> Result<Self> {
        let home = dirs::home_dir()
            .ok_or_else(|| Error::invalid_config("Could not determine home directory"))?;
        let home = Utf8PathBuf::from_path_buf(home)
            .map_err(|p| Error::invalid_config(format!("Non UTF-8 home directory: {:?}", p)))?;

        Ok(Self::with_dir(home.join(".tagwatch")))
    }

    /// Loader for a custom config directory; the file is optional
    pub fn with_dir(config_dir: Utf8PathBuf) -> Self {
        Self {
            config_path: config_dir.join(CONFIG_FILE_NAME),
            required: false,
        }
    }

    /// Loader for an explicit config file, which must exist
    pub fn with_file(path: Utf8PathBuf) -> Self {
        Self {
            config_path: path,
            required: true,
        }
    }

    /// Loader honoring an optional `--config` flag
    pub fn for_path(path: Option<&Utf8Path>) -> Result<Self> {
        match path {
            Some(p) => Ok(Self::with_file(p.to_path_buf())),
            None => Self::new(),
        }
    }

    /// Path of the config file this loader reads
    pub fn config_path(&self) -> &Utf8Path {
        &self.config_path
    }

    /// Load the runtime configuration with layered precedence
    pub fn load(&self) -> Result<RuntimeConfig> {
        let config = if self.config_path.exists() {
            debug!("Loading configuration from {}", self.config_path);
            self.load_yaml_file(&self.config_path)?
        } else if self.required {
            return Err(Error::config_not_found(self.config_path.as_str()));
        } else {
            RuntimeConfig::default()
        };

        apply_env_overrides(config)
    }

    fn load_yaml_file(&self, path: &Utf8Path) -> Result<RuntimeConfig> {
        let content = fs::read_to_string(path)?;
        if content.trim().is_empty() {
            return Ok(RuntimeConfig::default());
        }
        serde_yaml_ng::from_str(&content)
            .map_err(|e| Error::invalid_config(format!("Failed to parse {}: {}", path, e)))
    }
}

/// Apply TAGWATCH_* environment variable overrides
fn apply_env_overrides(mut config: RuntimeConfig) -> Result<RuntimeConfig> {
    if let Ok(val) = env::var("TAGWATCH_REQUEST_TIMEOUT_SECS") {
        config.network.request_timeout_secs = val.parse().map_err(|_| {
            Error::invalid_config("TAGWATCH_REQUEST_TIMEOUT_SECS must be a valid number")
        })?;
    }

    if let Ok(val) = env::var("TAGWATCH_CONCURRENCY") {
        config.scan.concurrency = val
            .parse()
            .map_err(|_| Error::invalid_config("TAGWATCH_CONCURRENCY must be a valid number"))?;
    }

    if let Ok(val) = env::var("TAGWATCH_DOCKER_TIMEOUT_SECS") {
        config.scan.docker_timeout_secs = val.parse().map_err(|_| {
            Error::invalid_config("TAGWATCH_DOCKER_TIMEOUT_SECS must be a valid number")
        })?;
    }

    if let Ok(val) = env::var("TAGWATCH_COMPOSE_DIR") {
        config.scan.compose_dir = val;
    }

    if let Ok(val) = env::var("TAGWATCH_DOCKER_BIN") {
        config.scan.docker_bin = val;
    }

    if let Ok(val) = env::var("TAGWATCH_USER_AGENT") {
        config.network.user_agent = val;
    }

    Ok(config)
}
