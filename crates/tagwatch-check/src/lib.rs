//! Update check orchestration for tagwatch
//!
//! Drives every running container through reference parsing, remote digest
//! lookup, local digest lookup and comparison, with a bounded number of
//! checks in flight. The collected outcomes form a [`ScanReport`] that can be
//! rendered for humans or machines.
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use tagwatch_check::{OutputFormat, ScanReport, ScanReporter, UpdateChecker};
//! use tagwatch_docker::{ContainerEnumerator, DockerCli};
//! use tagwatch_image::RegistryClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let docker = Arc::new(DockerCli::new("docker")?);
//!     let checker = UpdateChecker::new(Arc::new(RegistryClient::new()?), docker.clone());
//!
//!     let outcomes = checker.check_all(docker.list_running().await?).await;
//!     let report = ScanReport::new(outcomes, None);
//!
//!     println!("{}", ScanReporter::default().format(&report, OutputFormat::Human));
//!     std::process::exit(report.exit_code());
//! }
//! ```

mod checker;
mod outcome;
mod remote;
mod report;
mod reporter;

pub use checker::{UpdateChecker, DEFAULT_CONCURRENCY};
pub use outcome::CheckOutcome;
pub use remote::RemoteDigestLookup;
pub use report::{ScanReport, ScanSummary};
pub use reporter::{OutputFormat, ScanReporter};
