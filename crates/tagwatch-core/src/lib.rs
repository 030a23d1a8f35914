//! # tagwatch-core
//!
//! Core library for tagwatch providing:
//! - Runtime configuration types (timeouts, scan settings, registry endpoints)
//! - Layered configuration loading (defaults, config file, environment)
//! - The shared error type

pub mod config;
pub mod error;

pub use config::{ConfigLoader, NetworkConfig, RuntimeConfig, ScanConfig};
pub use error::{Error, Result};
