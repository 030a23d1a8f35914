//! Docker CLI adapter

use crate::error::{EngineError, Result};
use crate::traits::{ContainerEnumerator, LocalDigestProvider, RunningContainer};
use async_trait::async_trait;
use serde::Deserialize;
use std::path::PathBuf;
use std::time::Duration;
use tagwatch_image::DigestValue;
use tokio::process::Command;
use tracing::{debug, trace};

/// Time allowed for a single docker invocation
pub const DEFAULT_COMMAND_TIMEOUT: Duration = Duration::from_secs(30);

/// Reads containers and image digests through the `docker` command
#[derive(Debug, Clone)]
pub struct DockerCli {
    bin: PathBuf,
    timeout: Duration,
}

/// One line of `docker ps --format '{{json .}}'`
#[derive(Debug, Deserialize)]
struct PsLine {
    #[serde(rename = "Names")]
    names: String,
    #[serde(rename = "Image")]
    image: String,
    #[serde(rename = "ID", default)]
    id: String,
    #[serde(rename = "CreatedAt", default)]
    created_at: String,
}

impl DockerCli {
    /// Locate `bin` (e.g. "docker") on PATH
    pub fn new(bin: &str) -> Result<Self> {
        let path = which::which(bin).map_err(|_| EngineError::DockerNotFound {
            bin: bin.to_string(),
        })?;
        debug!("Using docker at {:?}", path);
        Ok(Self::with_binary(path))
    }

    /// Use the binary at `path` without looking it up
    pub fn with_binary(path: impl Into<PathBuf>) -> Self {
        Self {
            bin: path.into(),
            timeout: DEFAULT_COMMAND_TIMEOUT,
        }
    }

    /// Kill any docker invocation that runs longer than `timeout`
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Run docker with `args`; `Ok(None)` when it exits non-zero
    async fn run(&self, args: &[&str]) -> Result<Option<String>> {
        let command = format!("docker {}", args.join(" "));
        trace!("Running: {}", command);

        let mut cmd = Command::new(&self.bin);
        cmd.args(args).kill_on_drop(true);

        let output = tokio::time::timeout(self.timeout, cmd.output())
            .await
            .map_err(|_| EngineError::CommandFailed {
                command: command.clone(),
                stderr: format!("timed out after {:?}", self.timeout),
            })?
            .map_err(|source| EngineError::Spawn {
                command: command.clone(),
                source,
            })?;

        if output.status.success() {
            Ok(Some(String::from_utf8_lossy(&output.stdout).into_owned()))
        } else {
            trace!(
                "{} exited with {}: {}",
                command,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
            Ok(None)
        }
    }
}

#[async_trait]
impl ContainerEnumerator for DockerCli {
    async fn list_running(&self) -> Result<Vec<RunningContainer>> {
        let args = ["ps", "--format", "{{json .}}"];
        let stdout = self
            .run(&args)
            .await?
            .ok_or_else(|| EngineError::CommandFailed {
                command: "docker ps".to_string(),
                stderr: "non-zero exit status".to_string(),
            })?;

        let containers = parse_ps_output(&stdout)?;
        debug!("Found {} running container(s)", containers.len());
        Ok(containers)
    }
}

#[async_trait]
impl LocalDigestProvider for DockerCli {
    async fn local_digest(&self, image: &str) -> Result<Option<DigestValue>> {
        let repo_digests = self
            .run(&["image", "inspect", image, "--format", "{{json .RepoDigests}}"])
            .await?;

        let Some(repo_digests) = repo_digests else {
            debug!("Image {} is not present locally", image);
            return Ok(None);
        };

        if let Some(digest) = parse_repo_digests(&repo_digests) {
            return Ok(Some(digest));
        }

        // Never pushed or pulled by digest: fall back to the image ID
        let id = self
            .run(&["image", "inspect", image, "--format", "{{.Id}}"])
            .await?;
        Ok(id.as_deref().and_then(parse_image_id))
    }
}

/// Parse `docker ps --format '{{json .}}'`: one JSON object per line
pub fn parse_ps_output(stdout: &str) -> Result<Vec<RunningContainer>> {
    stdout
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty())
        .map(|line| {
            let ps: PsLine =
                serde_json::from_str(line).map_err(|e| EngineError::ParseOutput {
                    command: "docker ps".to_string(),
                    message: e.to_string(),
                })?;
            Ok(RunningContainer {
                name: ps.names,
                image: ps.image,
                id: ps.id,
                created: ps.created_at,
            })
        })
        .collect()
}

/// First `repo@sha256:...` entry of a RepoDigests JSON array, digest part only
pub fn parse_repo_digests(stdout: &str) -> Option<DigestValue> {
    let digests: Option<Vec<String>> = serde_json::from_str(stdout.trim()).ok()?;
    digests?
        .iter()
        .find(|entry| entry.contains("@sha256:"))
        .and_then(|entry| entry.split_once('@'))
        .map(|(_, digest)| DigestValue::new(digest))
}

/// Image ID such as `sha256:...`
pub fn parse_image_id(stdout: &str) -> Option<DigestValue> {
    let id = stdout.trim();
    id.contains("sha256:").then(|| DigestValue::new(id))
}
