//! Registry families, endpoint layout and the shared HTTP client

use crate::error::{RegistryError, Result};
use crate::reference::{is_docker_hub, pull_scope, ImageReference};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;
use tracing::debug;

/// Per-request timeout used for every registry call
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

/// Redirects followed for a single registry request
pub const MAX_REDIRECTS: usize = 10;

/// GitHub Container Registry host
pub const GHCR_HOST: &str = "ghcr.io";

/// Docker Hub manifest media type
pub const DOCKER_MANIFEST_V2: &str = "application/vnd.docker.distribution.manifest.v2+json";
/// OCI image manifest media type
pub const OCI_MANIFEST_V1: &str = "application/vnd.oci.image.manifest.v1+json";
/// OCI image index media type
pub const OCI_INDEX_V1: &str = "application/vnd.oci.image.index.v1+json";

/// Header carrying the registry's canonical manifest digest
pub const DIGEST_HEADER: &str = "Docker-Content-Digest";

/// The closed set of registry conventions we know how to talk to
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case", tag = "family", content = "host")]
pub enum RegistryFamily {
    /// Docker Hub (auth.docker.io tokens, HEAD against the hub API)
    DockerHub,
    /// GitHub Container Registry
    Ghcr,
    /// Any other OCI distribution registry, addressed by host
    GenericOci(String),
}

impl RegistryFamily {
    /// Pick the family for a registry host
    pub fn classify(registry: &str) -> Self {
        if registry == GHCR_HOST {
            Self::Ghcr
        } else if is_docker_hub(registry) {
            Self::DockerHub
        } else {
            Self::GenericOci(registry.to_string())
        }
    }

    /// Family for a parsed reference
    pub fn of(reference: &ImageReference) -> Self {
        Self::classify(&reference.registry)
    }

    /// Short display name
    pub fn name(&self) -> &'static str {
        match self {
            Self::DockerHub => "docker-hub",
            Self::Ghcr => "ghcr",
            Self::GenericOci(_) => "generic-oci",
        }
    }
}

impl fmt::Display for RegistryFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::GenericOci(host) => write!(f, "generic-oci ({})", host),
            other => f.write_str(other.name()),
        }
    }
}

/// Base URLs for each family.
///
/// Defaults are the public endpoints; overriding them points a family at a
/// mirror or a test server.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct RegistryEndpoints {
    /// Docker Hub token endpoint
    #[serde(default = "default_docker_hub_auth_url")]
    pub docker_hub_auth_url: String,

    /// Docker Hub registry API root (manifests live under `<root>/<repo>/manifests/<tag>`)
    #[serde(default = "default_docker_hub_api_url")]
    pub docker_hub_api_url: String,

    /// GHCR base URL
    #[serde(default = "default_ghcr_url")]
    pub ghcr_url: String,

    /// Scheme used to address generic registries by host
    #[serde(default = "default_generic_scheme")]
    pub generic_scheme: String,
}

impl Default for RegistryEndpoints {
    fn default() -> Self {
        Self {
            docker_hub_auth_url: default_docker_hub_auth_url(),
            docker_hub_api_url: default_docker_hub_api_url(),
            ghcr_url: default_ghcr_url(),
            generic_scheme: default_generic_scheme(),
        }
    }
}

fn default_docker_hub_auth_url() -> String {
    "https://auth.docker.io/token".to_string()
}
fn default_docker_hub_api_url() -> String {
    "https://registry.hub.docker.com/v2".to_string()
}
fn default_ghcr_url() -> String {
    "https://ghcr.io".to_string()
}
fn default_generic_scheme() -> String {
    "https".to_string()
}

impl RegistryEndpoints {
    /// Candidate token URLs for `repository`, in the order they are tried
    pub fn token_urls(&self, family: &RegistryFamily, repository: &str) -> Vec<String> {
        let scope = pull_scope(repository);
        match family {
            RegistryFamily::DockerHub => vec![format!(
                "{}?service=registry.docker.io&scope={}",
                self.docker_hub_auth_url, scope
            )],
            RegistryFamily::Ghcr => vec![format!("{}/token?scope={}", self.ghcr_url, scope)],
            RegistryFamily::GenericOci(host) => vec![
                format!("{}://{}/token?scope={}", self.generic_scheme, host, scope),
                format!("{}://auth.{}/token?scope={}", self.generic_scheme, host, scope),
            ],
        }
    }

    /// Manifest URL for `repository:tag`
    pub fn manifest_url(&self, family: &RegistryFamily, repository: &str, tag: &str) -> String {
        match family {
            RegistryFamily::DockerHub => format!(
                "{}/{}/manifests/{}",
                self.docker_hub_api_url, repository, tag
            ),
            RegistryFamily::Ghcr => format!("{}/v2/{}/manifests/{}", self.ghcr_url, repository, tag),
            RegistryFamily::GenericOci(host) => format!(
                "{}://{}/v2/{}/manifests/{}",
                self.generic_scheme, host, repository, tag
            ),
        }
    }

    /// `Accept` header value for a family's manifest request.
    ///
    /// GHCR and generic registries must be offered every manifest kind they
    /// may serve for a tag.
    pub fn accept(&self, family: &RegistryFamily) -> String {
        match family {
            RegistryFamily::DockerHub => DOCKER_MANIFEST_V2.to_string(),
            RegistryFamily::Ghcr => [OCI_MANIFEST_V1, DOCKER_MANIFEST_V2, OCI_INDEX_V1].join(","),
            RegistryFamily::GenericOci(_) => {
                [DOCKER_MANIFEST_V2, OCI_MANIFEST_V1, OCI_INDEX_V1].join(",")
            }
        }
    }
}

/// Settings for building a [`RegistryClient`]
#[derive(Debug, Clone)]
pub struct RegistrySettings {
    pub timeout: Duration,
    pub user_agent: String,
    pub endpoints: RegistryEndpoints,
}

impl Default for RegistrySettings {
    fn default() -> Self {
        Self {
            timeout: DEFAULT_TIMEOUT,
            user_agent: format!("tagwatch/{}", env!("CARGO_PKG_VERSION")),
            endpoints: RegistryEndpoints::default(),
        }
    }
}

/// Client for token and manifest requests against any registry family.
///
/// Holds no per-check state; tokens are requested fresh for every lookup.
#[derive(Debug, Clone)]
pub struct RegistryClient {
    pub(crate) http: reqwest::Client,
    pub(crate) endpoints: RegistryEndpoints,
    timeout: Duration,
}

impl RegistryClient {
    /// Create a client against the public endpoints
    pub fn new() -> Result<Self> {
        Self::with_settings(RegistrySettings::default())
    }

    /// Create a client from explicit settings
    pub fn with_settings(settings: RegistrySettings) -> Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(settings.user_agent)
            .timeout(settings.timeout)
            .redirect(reqwest::redirect::Policy::limited(MAX_REDIRECTS))
            .build()
            .map_err(|e| RegistryError::ClientBuild(e.to_string()))?;

        debug!(
            "Registry client ready (timeout {}s)",
            settings.timeout.as_secs()
        );

        Ok(Self {
            http,
            endpoints: settings.endpoints,
            timeout: settings.timeout,
        })
    }

    pub fn endpoints(&self) -> &RegistryEndpoints {
        &self.endpoints
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_classify() {
        assert_eq!(RegistryFamily::classify("ghcr.io"), RegistryFamily::Ghcr);
        assert_eq!(RegistryFamily::classify("docker.io"), RegistryFamily::DockerHub);
        assert_eq!(
            RegistryFamily::classify("index.docker.io"),
            RegistryFamily::DockerHub
        );
        assert_eq!(
            RegistryFamily::classify("quay.io"),
            RegistryFamily::GenericOci("quay.io".to_string())
        );
    }

    #[test]
    fn test_default_token_urls_match_public_endpoints() {
        let e = RegistryEndpoints::default();
        assert_eq!(
            e.token_urls(&RegistryFamily::DockerHub, "library/nginx"),
            vec!["https://auth.docker.io/token?service=registry.docker.io&scope=repository:library/nginx:pull"]
        );
        assert_eq!(
            e.token_urls(&RegistryFamily::Ghcr, "org/app"),
            vec!["https://ghcr.io/token?scope=repository:org/app:pull"]
        );
        assert_eq!(
            e.token_urls(&RegistryFamily::GenericOci("quay.io".into()), "a/b"),
            vec![
                "https://quay.io/token?scope=repository:a/b:pull",
                "https://auth.quay.io/token?scope=repository:a/b:pull",
            ]
        );
    }

    #[test]
    fn test_default_manifest_urls() {
        let e = RegistryEndpoints::default();
        assert_eq!(
            e.manifest_url(&RegistryFamily::DockerHub, "library/nginx", "latest"),
            "https://registry.hub.docker.com/v2/library/nginx/manifests/latest"
        );
        assert_eq!(
            e.manifest_url(&RegistryFamily::Ghcr, "org/app", "v2"),
            "https://ghcr.io/v2/org/app/manifests/v2"
        );
        assert_eq!(
            e.manifest_url(
                &RegistryFamily::GenericOci("registry.local:5000".into()),
                "app",
                "1"
            ),
            "https://registry.local:5000/v2/app/manifests/1"
        );
    }

    #[test]
    fn test_accept_lists() {
        let e = RegistryEndpoints::default();
        assert_eq!(e.accept(&RegistryFamily::DockerHub), DOCKER_MANIFEST_V2);
        let ghcr = e.accept(&RegistryFamily::Ghcr);
        for media in [OCI_MANIFEST_V1, DOCKER_MANIFEST_V2, OCI_INDEX_V1] {
            assert!(ghcr.contains(media));
        }
    }

    #[test]
    fn test_endpoints_deserialize_with_partial_overrides() {
        let e: RegistryEndpoints =
            serde_json::from_str(r#"{"ghcr-url": "http://127.0.0.1:9000"}"#).unwrap();
        assert_eq!(e.ghcr_url, "http://127.0.0.1:9000");
        assert_eq!(e.docker_hub_auth_url, "https://auth.docker.io/token");
    }

    #[tokio::test]
    async fn test_client_creation() {
        let client = RegistryClient::new().unwrap();
        assert_eq!(client.timeout(), DEFAULT_TIMEOUT);
        assert_eq!(client.endpoints(), &RegistryEndpoints::default());
    }
}
