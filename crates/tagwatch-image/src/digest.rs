//! Content digests as opaque identifiers

use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::fmt;

/// A content digest such as `sha256:<64 hex chars>`.
///
/// Opaque and case-sensitive: never parsed, normalized or truncated. Two
/// values are the same digest only if the strings are byte-identical.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DigestValue(String);

impl DigestValue {
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// `sha256:<hex>` over the exact bytes given
    pub fn sha256_of(bytes: &[u8]) -> Self {
        let mut hasher = Sha256::new();
        hasher.update(bytes);
        Self(format!("sha256:{}", hex::encode(hasher.finalize())))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for DigestValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<String> for DigestValue {
    fn from(value: String) -> Self {
        Self(value)
    }
}

impl From<&str> for DigestValue {
    fn from(value: &str) -> Self {
        Self(value.to_string())
    }
}

/// Where a remote digest came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum DigestSource {
    /// The registry's own `Docker-Content-Digest` header
    Header,
    /// SHA-256 of the manifest bytes we received. Only matches the registry's
    /// digest if it served the exact bytes it hashed, so treat as best effort.
    Computed,
}

impl DigestSource {
    /// Whether the digest came from the registry itself
    pub fn is_authoritative(self) -> bool {
        matches!(self, Self::Header)
    }
}

impl fmt::Display for DigestSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Header => f.write_str("header"),
            Self::Computed => f.write_str("computed"),
        }
    }
}

/// Remote digest plus its provenance
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResolvedDigest {
    pub digest: DigestValue,
    pub source: DigestSource,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sha256_of_empty_body() {
        assert_eq!(
            DigestValue::sha256_of(b"").as_str(),
            "sha256:e3b0c44298fc1c149afbf4c8996fb92427ae41e4649b934ca495991b7852b855"
        );
    }

    #[test]
    fn test_case_sensitive_equality() {
        let lower = DigestValue::new("sha256:abcdef");
        let upper = DigestValue::new("sha256:ABCDEF");
        assert_ne!(lower, upper);
    }

    #[test]
    fn test_serializes_as_plain_string() {
        let d = DigestValue::new("sha256:1234");
        assert_eq!(serde_json::to_string(&d).unwrap(), "\"sha256:1234\"");
        assert!(!DigestSource::Computed.is_authoritative());
    }
}
