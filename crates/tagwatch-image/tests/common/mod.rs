//! Common test infrastructure for tagwatch-image tests
//!
//! Points every registry family at a single wiremock server.

#![allow(dead_code)]

use std::time::Duration;
use tagwatch_image::{ImageReference, RegistryClient, RegistryEndpoints, RegistrySettings};
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

pub const DIGEST_A: &str = "sha256:aaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaaa";
pub const DIGEST_B: &str = "sha256:bbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbbb";
pub const TOKEN: &str = "test-token";

pub const MANIFEST_BODY: &str = r#"{"schemaVersion":2,"mediaType":"application/vnd.oci.image.index.v1+json","manifests":[]}"#;

/// Endpoints routing Docker Hub, GHCR and generic hosts to `server`
pub fn endpoints_for(server: &MockServer) -> RegistryEndpoints {
    RegistryEndpoints {
        docker_hub_auth_url: format!("{}/token", server.uri()),
        docker_hub_api_url: format!("{}/v2", server.uri()),
        ghcr_url: server.uri(),
        generic_scheme: "http".to_string(),
    }
}

/// Client with a short timeout against `server`
pub fn client_for(server: &MockServer) -> RegistryClient {
    client_with_timeout(server, Duration::from_secs(2))
}

pub fn client_with_timeout(server: &MockServer, timeout: Duration) -> RegistryClient {
    RegistryClient::with_settings(RegistrySettings {
        timeout,
        user_agent: "tagwatch-tests".to_string(),
        endpoints: endpoints_for(server),
    })
    .expect("client builds")
}

/// Reference to `repo:tag` on the mock server treated as a generic registry
pub fn generic_reference(server: &MockServer, repo_and_tag: &str) -> ImageReference {
    ImageReference::parse(&format!("{}/{}", server.address(), repo_and_tag))
}

/// Token endpoint answering for `scope`
pub async fn mock_token(server: &MockServer, scope: &str, token: &str) {
    Mock::given(method("GET"))
        .and(path("/token"))
        .and(query_param("scope", scope))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({ "token": token })))
        .mount(server)
        .await;
}

/// Manifest GET answering with a digest header and a body
pub async fn mock_manifest_with_header(server: &MockServer, manifest_path: &str, digest: &str) {
    Mock::given(method("GET"))
        .and(path(manifest_path))
        .respond_with(
            ResponseTemplate::new(200)
                .insert_header("Docker-Content-Digest", digest)
                .set_body_string(MANIFEST_BODY),
        )
        .mount(server)
        .await;
}

/// Manifest GET that only succeeds with the expected bearer token
pub async fn mock_authed_manifest(
    server: &MockServer,
    manifest_path: &str,
    token: &str,
    digest: &str,
) {
    Mock::given(method("GET"))
        .and(path(manifest_path))
        .and(header("authorization", format!("Bearer {}", token).as_str()))
        .respond_with(ResponseTemplate::new(200).insert_header("Docker-Content-Digest", digest))
        .mount(server)
        .await;
}
