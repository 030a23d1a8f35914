//! Common test infrastructure for tagwatch-check tests

#![allow(dead_code)]

use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;
use tagwatch_check::RemoteDigestLookup;
use tagwatch_docker::LocalDigestProvider;
use tagwatch_image::{
    DigestValue, ImageReference, RegistryClient, RegistryEndpoints, RegistryFamily,
    RegistrySettings, ResolvedDigest,
};
use wiremock::MockServer;

pub const DIGEST_A: &str = "sha256:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const DIGEST_1: &str = "sha256:1111111111111111111111111111111111111111111111111111111111111111";
pub const DIGEST_2: &str = "sha256:2222222222222222222222222222222222222222222222222222222222222222";
pub const TOKEN: &str = "test-token";

/// Local image store keyed by the image string a container runs
#[derive(Default)]
pub struct FakeLocal {
    digests: HashMap<String, DigestValue>,
}

impl FakeLocal {
    pub fn with(mut self, image: &str, digest: &str) -> Self {
        self.digests.insert(image.to_string(), DigestValue::new(digest));
        self
    }
}

#[async_trait]
impl LocalDigestProvider for FakeLocal {
    async fn local_digest(&self, image: &str) -> tagwatch_docker::Result<Option<DigestValue>> {
        Ok(self.digests.get(image).cloned())
    }
}

/// Registry client whose Docker Hub and GHCR endpoints point at `server`
pub fn client_for(server: &MockServer, timeout: Duration) -> RegistryClient {
    RegistryClient::with_settings(RegistrySettings {
        timeout,
        user_agent: "tagwatch-tests".to_string(),
        endpoints: RegistryEndpoints {
            docker_hub_auth_url: format!("{}/token", server.uri()),
            docker_hub_api_url: format!("{}/v2", server.uri()),
            ghcr_url: server.uri(),
            generic_scheme: "http".to_string(),
        },
    })
    .expect("client builds")
}

/// Sends every lookup to one generic registry host regardless of the
/// reference's own registry, so a private host name can be served locally.
pub struct PinnedRegistry {
    pub client: RegistryClient,
    pub address: String,
}

#[async_trait]
impl RemoteDigestLookup for PinnedRegistry {
    async fn remote_digest(
        &self,
        reference: &ImageReference,
    ) -> tagwatch_image::Result<ResolvedDigest> {
        let family = RegistryFamily::GenericOci(self.address.clone());
        let token = self
            .client
            .obtain_token(&family, &reference.repository)
            .await;
        self.client
            .resolve_digest(&family, &reference.repository, &reference.tag, token.as_ref())
            .await
    }
}
