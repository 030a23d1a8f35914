//! Local container engine adapters for tagwatch
//!
//! The update check needs three things from the local machine: the running
//! containers, the digest each one's image was pulled at, and (for the
//! report) the images declared in compose files. This crate reads them from
//! the `docker` CLI and the filesystem behind small traits, so the check
//! itself can run against in-memory fakes.

pub mod compose;
pub mod docker;
pub mod error;
pub mod traits;

pub use compose::{discover_compose_files, ComposeFile, ComposeInventory, COMPOSE_FILE_NAMES};
pub use docker::DockerCli;
pub use error::{EngineError, Result};
pub use traits::{ContainerEnumerator, LocalDigestProvider, RunningContainer};
