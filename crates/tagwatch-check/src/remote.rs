//! Remote digest lookup seam

use async_trait::async_trait;
use tagwatch_image::{ImageReference, RegistryClient, ResolvedDigest};

/// Resolves the digest a registry currently serves for a reference
#[async_trait]
pub trait RemoteDigestLookup: Send + Sync {
    async fn remote_digest(
        &self,
        reference: &ImageReference,
    ) -> tagwatch_image::Result<ResolvedDigest>;
}

#[async_trait]
impl RemoteDigestLookup for RegistryClient {
    async fn remote_digest(
        &self,
        reference: &ImageReference,
    ) -> tagwatch_image::Result<ResolvedDigest> {
        self.lookup(reference).await
    }
}
