//! Local vs. remote digest comparison

use crate::digest::DigestValue;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Result of comparing a local digest with the registry's
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum UpdateStatus {
    /// Local and remote digests are identical
    UpToDate,
    /// The registry serves different content under the tag
    UpdateAvailable,
    /// One of the digests is missing
    Unverifiable,
}

impl fmt::Display for UpdateStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UpToDate => f.write_str("Up to date"),
            Self::UpdateAvailable => f.write_str("Update available"),
            Self::Unverifiable => f.write_str("Could not check"),
        }
    }
}

/// Status plus the reason when it could not be verified
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Verdict {
    pub status: UpdateStatus,
    pub reason: Option<String>,
}

/// Reason given when the image has never been pulled locally
pub const NO_LOCAL_DIGEST: &str = "no local digest";

/// Reason given when the registry produced no digest
pub fn unreachable_reason(registry: &str) -> String {
    format!("registry unreachable: {}", registry)
}

/// Compare digests by exact string equality.
///
/// No normalization of any kind: case, algorithm prefix and length must all
/// match, and any difference counts as an update.
pub fn compare(
    local: Option<&DigestValue>,
    remote: Option<&DigestValue>,
    registry: &str,
) -> Verdict {
    match (local, remote) {
        (None, _) => Verdict {
            status: UpdateStatus::Unverifiable,
            reason: Some(NO_LOCAL_DIGEST.to_string()),
        },
        (Some(_), None) => Verdict {
            status: UpdateStatus::Unverifiable,
            reason: Some(unreachable_reason(registry)),
        },
        (Some(local), Some(remote)) if local.as_str() == remote.as_str() => Verdict {
            status: UpdateStatus::UpToDate,
            reason: None,
        },
        (Some(_), Some(_)) => Verdict {
            status: UpdateStatus::UpdateAvailable,
            reason: None,
        },
    }
}
