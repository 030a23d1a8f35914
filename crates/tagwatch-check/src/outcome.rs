//! Per-container check outcome

use serde::{Deserialize, Serialize};
use tagwatch_image::{DigestSource, DigestValue, UpdateStatus};

/// Result of checking one running container
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CheckOutcome {
    pub container_name: String,
    /// Image string as the container was started
    pub image: String,
    /// Normalized `registry/repository:tag`
    pub image_reference: String,
    pub local_digest: Option<DigestValue>,
    pub remote_digest: Option<DigestValue>,
    pub status: UpdateStatus,
    /// Why the check could not be verified
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Underlying error text behind the reason
    #[serde(skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub digest_source: Option<DigestSource>,
}

impl CheckOutcome {
    pub fn has_update(&self) -> bool {
        self.status == UpdateStatus::UpdateAvailable
    }

    /// Remote digest was hashed from the manifest body rather than read from a header
    pub fn is_low_confidence(&self) -> bool {
        self.digest_source == Some(DigestSource::Computed)
    }
}
