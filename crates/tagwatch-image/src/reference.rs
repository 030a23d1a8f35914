use regex::Regex;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::LazyLock;

/// Registry used when a reference names no host
pub const DEFAULT_REGISTRY: &str = "docker.io";

/// Tag used when a reference carries none
pub const DEFAULT_TAG: &str = "latest";

/// Namespace Docker Hub gives to official images
const OFFICIAL_NAMESPACE: &str = "library";

/// Host names that all mean Docker Hub
pub const DOCKER_HUB_ALIASES: &[&str] = &[
    "docker.io",
    "index.docker.io",
    "registry-1.docker.io",
    "registry.hub.docker.com",
];

/// `host:port` with a purely numeric port, or a bracketed IPv6 host with an optional port
static HOST_PORT_RE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^(\[[0-9A-Fa-f:.]+\](:\d+)?|[^:/\[\]]+:\d+)$").expect("host:port regex is valid")
});

/// Container image reference split into registry, repository and tag
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ImageReference {
    /// Registry hostname, possibly with a port (e.g., "ghcr.io", "registry.local:5000")
    pub registry: String,
    /// Repository path without tag (e.g., "library/nginx", "org/app")
    pub repository: String,
    /// Tag (e.g., "v3.0.0"), "latest" when the input had none
    pub tag: String,
}

impl ImageReference {
    /// Parse an image reference string like "ghcr.io/org/app:v2".
    ///
    /// Never fails: anything that does not name a registry host falls back to
    /// Docker Hub, and a missing tag becomes "latest".
    pub fn parse(raw: &str) -> Self {
        let raw = raw.trim();

        // A digest pin says nothing about the tag we should track
        let without_digest = match raw.find('@') {
            Some(idx) => &raw[..idx],
            None => raw,
        };

        let segments: Vec<&str> = without_digest.split('/').collect();

        let (registry, path) = if segments.len() >= 2 && is_registry_host(segments[0]) {
            (segments[0].to_string(), segments[1..].join("/"))
        } else {
            (DEFAULT_REGISTRY.to_string(), without_digest.to_string())
        };

        let (mut repository, tag) = split_tag(&path);

        if is_docker_hub(&registry) && !repository.contains('/') {
            repository = format!("{}/{}", OFFICIAL_NAMESPACE, repository);
        }

        Self {
            registry,
            repository,
            tag,
        }
    }

    /// Scope string a pull token is requested for
    pub fn pull_scope(&self) -> String {
        pull_scope(&self.repository)
    }
}

impl fmt::Display for ImageReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}:{}", self.registry, self.repository, self.tag)
    }
}

/// `repository:<repo>:pull`
pub fn pull_scope(repository: &str) -> String {
    format!("repository:{}:pull", repository)
}

/// Whether the first path segment of a reference names a registry host.
///
/// A host has a dot (`ghcr.io`), an explicit numeric port (`registry:5000`),
/// IPv6 brackets (`[::1]:5000`) or is `localhost`.
pub fn is_registry_host(segment: &str) -> bool {
    segment.contains('.') || segment == "localhost" || HOST_PORT_RE.is_match(segment)
}

/// Whether `registry` is one of the Docker Hub host names
pub fn is_docker_hub(registry: &str) -> bool {
    DOCKER_HUB_ALIASES.contains(&registry)
}

/// Split the tag off the last path segment only, so a port colon earlier in
/// the path is never taken for a tag.
fn split_tag(path: &str) -> (String, String) {
    let (head, last) = match path.rfind('/') {
        Some(idx) => (&path[..=idx], &path[idx + 1..]),
        None => ("", path),
    };

    match last.rsplit_once(':') {
        Some((name, tag)) if !tag.is_empty() => (format!("{}{}", head, name), tag.to_string()),
        Some((name, _)) => (format!("{}{}", head, name), DEFAULT_TAG.to_string()),
        None => (path.to_string(), DEFAULT_TAG.to_string()),
    }
}
