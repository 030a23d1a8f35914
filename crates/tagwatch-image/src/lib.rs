//! Registry digest resolution for tagwatch
//!
//! This crate provides:
//! - Parsing image references into registry, repository and tag
//! - Anonymous pull-token requests for Docker Hub, GHCR and generic OCI registries
//! - Remote manifest digest lookup with per-family content negotiation
//! - Exact comparison of local and remote digests
//!
//! # Example
//!
//! ```no_run
//! use tagwatch_image::{compare, DigestValue, ImageReference, RegistryClient};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RegistryClient::new()?;
//!     let reference = ImageReference::parse("ghcr.io/org/app:v2");
//!
//!     let remote = client.lookup(&reference).await.ok().map(|r| r.digest);
//!     let local = Some(DigestValue::new("sha256:1111"));
//!
//!     let verdict = compare(local.as_ref(), remote.as_ref(), &reference.registry);
//!     println!("{}: {}", reference, verdict.status);
//!     Ok(())
//! }
//! ```

pub mod auth;
pub mod compare;
pub mod digest;
pub mod error;
pub mod reference;
pub mod registry;
mod resolver;

pub use auth::{AuthToken, FallbackChain};
pub use compare::{compare, UpdateStatus, Verdict};
pub use digest::{DigestSource, DigestValue, ResolvedDigest};
pub use error::{RegistryError, Result};
pub use reference::ImageReference;
pub use registry::{RegistryClient, RegistryEndpoints, RegistryFamily, RegistrySettings};

/// Version of the tagwatch-image crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
