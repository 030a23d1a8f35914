//! Configuration loading and management

mod loader;
mod types;

pub use loader::ConfigLoader;
pub use types::{NetworkConfig, RuntimeConfig, ScanConfig};
