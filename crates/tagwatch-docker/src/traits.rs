//! Collaborator traits consumed by the update check

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tagwatch_image::DigestValue;

/// A running container and the image reference it was started from
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RunningContainer {
    pub name: String,
    pub image: String,
    #[serde(default)]
    pub id: String,
    #[serde(default)]
    pub created: String,
}

impl RunningContainer {
    pub fn new(name: impl Into<String>, image: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            image: image.into(),
            id: String::new(),
            created: String::new(),
        }
    }
}

/// Lists the containers currently running
#[async_trait]
pub trait ContainerEnumerator: Send + Sync {
    async fn list_running(&self) -> Result<Vec<RunningContainer>>;
}

/// Looks up the digest of an image already pulled locally.
///
/// Prefers the registry digest the image was pulled under, falling back to
/// the local image ID. `Ok(None)` means the image is not present locally.
#[async_trait]
pub trait LocalDigestProvider: Send + Sync {
    async fn local_digest(&self, image: &str) -> Result<Option<DigestValue>>;
}
