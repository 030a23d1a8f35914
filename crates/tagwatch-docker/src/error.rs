//! Error types for the local engine adapters

use std::path::PathBuf;
use thiserror::Error;

/// Result type alias for engine operations
pub type Result<T> = std::result::Result<T, EngineError>;

/// Failures talking to the local container engine
#[derive(Error, Debug)]
pub enum EngineError {
    /// The docker binary is not on PATH
    #[error("{bin} not found in PATH. Is Docker installed?")]
    DockerNotFound { bin: String },

    /// The command could not be started
    #[error("failed to run {command}: {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// The command exited unsuccessfully
    #[error("{command} failed: {stderr}")]
    CommandFailed { command: String, stderr: String },

    /// The command printed something we could not parse
    #[error("unexpected output from {command}: {message}")]
    ParseOutput { command: String, message: String },

    /// A compose file could not be read
    #[error("Could not read {}: {source}", path.display())]
    ComposeRead {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// A compose file is not valid YAML
    #[error("Could not parse {}: {source}", path.display())]
    ComposeParse {
        path: PathBuf,
        #[source]
        source: serde_yaml_ng::Error,
    },
}
