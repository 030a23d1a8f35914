//! Runtime configuration types
//!
//! These types control network timeouts, scan behavior and which endpoints
//! each registry family is reached at.

use serde::{Deserialize, Serialize};
use std::time::Duration;
use tagwatch_image::{RegistryEndpoints, RegistrySettings};

/// Complete runtime configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RuntimeConfig {
    /// Network and HTTP configuration
    #[serde(default)]
    pub network: NetworkConfig,

    /// Scan behavior
    #[serde(default)]
    pub scan: ScanConfig,

    /// Registry endpoint overrides
    #[serde(default)]
    pub registries: RegistryEndpoints,
}

impl RuntimeConfig {
    /// Settings for the registry client
    pub fn registry_settings(&self) -> RegistrySettings {
        RegistrySettings {
            timeout: self.network.request_timeout(),
            user_agent: self.network.user_agent.clone(),
            endpoints: self.registries.clone(),
        }
    }
}

/// Network and HTTP configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct NetworkConfig {
    /// Timeout applied to every registry request, in seconds
    #[serde(default = "default_request_timeout")]
    pub request_timeout_secs: u64,

    /// User agent string for HTTP requests
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            request_timeout_secs: default_request_timeout(),
            user_agent: default_user_agent(),
        }
    }
}

impl NetworkConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }
}

fn default_request_timeout() -> u64 {
    10
}
fn default_user_agent() -> String {
    format!(
        "tagwatch/{} ({}; {})",
        env!("CARGO_PKG_VERSION"),
        std::env::consts::OS,
        std::env::consts::ARCH
    )
}

/// Scan behavior
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct ScanConfig {
    /// Maximum number of containers checked at once
    #[serde(default = "default_concurrency")]
    pub concurrency: usize,

    /// Directory searched recursively for compose files
    #[serde(default = "default_compose_dir")]
    pub compose_dir: String,

    /// Docker CLI binary
    #[serde(default = "default_docker_bin")]
    pub docker_bin: String,

    /// Time allowed for each docker invocation, in seconds
    #[serde(default = "default_docker_timeout")]
    pub docker_timeout_secs: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            concurrency: default_concurrency(),
            compose_dir: default_compose_dir(),
            docker_bin: default_docker_bin(),
            docker_timeout_secs: default_docker_timeout(),
        }
    }
}

impl ScanConfig {
    /// Concurrency bound, never below one
    pub fn effective_concurrency(&self) -> usize {
        self.concurrency.max(1)
    }

    pub fn docker_timeout(&self) -> Duration {
        Duration::from_secs(self.docker_timeout_secs)
    }
}

fn default_concurrency() -> usize {
    4
}
fn default_compose_dir() -> String {
    "/opt/stacks/".to_string()
}
fn default_docker_bin() -> String {
    "docker".to_string()
}
fn default_docker_timeout() -> u64 {
    30
}
