//! Remote manifest digest resolution
//!
//! Docker Hub is asked with HEAD and must answer with the digest header.
//! GHCR and generic registries are asked with GET; the digest header wins
//! when present, otherwise the manifest bytes are hashed.

use crate::auth::AuthToken;
use crate::digest::{DigestSource, DigestValue, ResolvedDigest};
use crate::error::{RegistryError, Result};
use crate::reference::ImageReference;
use crate::registry::{RegistryClient, RegistryFamily, DIGEST_HEADER};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, AUTHORIZATION};
use reqwest::{Method, Response, StatusCode};
use tracing::{debug, warn};

impl RegistryClient {
    /// Resolve the current digest of `reference` on its registry: obtain a
    /// token for the family, then fetch the manifest digest with it.
    pub async fn lookup(&self, reference: &ImageReference) -> Result<ResolvedDigest> {
        let family = RegistryFamily::of(reference);
        let token = self.obtain_token(&family, &reference.repository).await;
        self.resolve_digest(&family, &reference.repository, &reference.tag, token.as_ref())
            .await
    }

    /// Fetch the manifest digest for `repository:tag`
    pub async fn resolve_digest(
        &self,
        family: &RegistryFamily,
        repository: &str,
        tag: &str,
        token: Option<&AuthToken>,
    ) -> Result<ResolvedDigest> {
        match family {
            RegistryFamily::DockerHub => self.docker_hub_digest(repository, tag, token).await,
            RegistryFamily::Ghcr | RegistryFamily::GenericOci(_) => {
                self.manifest_digest(family, repository, tag, token).await
            }
        }
    }

    /// HEAD against the hub API. The hub refuses anonymous manifest requests,
    /// so no token means no request.
    async fn docker_hub_digest(
        &self,
        repository: &str,
        tag: &str,
        token: Option<&AuthToken>,
    ) -> Result<ResolvedDigest> {
        let family = RegistryFamily::DockerHub;
        let token = token.ok_or_else(|| RegistryError::AuthRequired {
            repository: repository.to_string(),
        })?;

        let url = self.endpoints.manifest_url(&family, repository, tag);
        let response = self
            .send_manifest_request(Method::HEAD, &url, &family, Some(token))
            .await?;

        match header_digest(&response) {
            Some(digest) => Ok(ResolvedDigest {
                digest,
                source: DigestSource::Header,
            }),
            None => Err(RegistryError::MissingDigestHeader { url }),
        }
    }

    /// GET for GHCR and generic registries, falling back to hashing the body
    async fn manifest_digest(
        &self,
        family: &RegistryFamily,
        repository: &str,
        tag: &str,
        token: Option<&AuthToken>,
    ) -> Result<ResolvedDigest> {
        let url = self.endpoints.manifest_url(family, repository, tag);
        let response = self
            .send_manifest_request(Method::GET, &url, family, token)
            .await?;

        if let Some(digest) = header_digest(&response) {
            return Ok(ResolvedDigest {
                digest,
                source: DigestSource::Header,
            });
        }

        let body = response
            .bytes()
            .await
            .map_err(|e| RegistryError::from_reqwest(&url, e))?;

        warn!(
            "{} sent no {} header, hashing {} manifest bytes instead",
            url,
            DIGEST_HEADER,
            body.len()
        );

        Ok(ResolvedDigest {
            digest: DigestValue::sha256_of(&body),
            source: DigestSource::Computed,
        })
    }

    async fn send_manifest_request(
        &self,
        method: Method,
        url: &str,
        family: &RegistryFamily,
        token: Option<&AuthToken>,
    ) -> Result<Response> {
        debug!("{} manifest: {}", method, url);

        let mut headers = HeaderMap::new();
        headers.insert(
            ACCEPT,
            HeaderValue::from_str(&self.endpoints.accept(family))
                .map_err(|e| RegistryError::InvalidHeader(e.to_string()))?,
        );
        if let Some(token) = token {
            headers.insert(
                AUTHORIZATION,
                HeaderValue::from_str(&token.bearer())
                    .map_err(|e| RegistryError::InvalidHeader(e.to_string()))?,
            );
        }

        let response = self
            .http
            .request(method, url)
            .headers(headers)
            .send()
            .await
            .map_err(|e| RegistryError::from_reqwest(url, e))?;

        if response.status() != StatusCode::OK {
            return Err(RegistryError::Status {
                url: url.to_string(),
                status: response.status().as_u16(),
            });
        }

        Ok(response)
    }
}

/// Non-empty `Docker-Content-Digest` header, verbatim
fn header_digest(response: &Response) -> Option<DigestValue> {
    response
        .headers()
        .get(DIGEST_HEADER)
        .and_then(|v| v.to_str().ok())
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(DigestValue::from)
}
