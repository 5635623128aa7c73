//! Configuration management system for driftsync
//!
//! This crate provides the configuration layer for driftsync, supporting
//! multiple configuration formats (YAML, TOML, JSON), validation, and
//! environment variable overrides.
//!
//! # Features
//!
//! - **Multiple formats**: Support for YAML, TOML and JSON configuration files
//! - **Validation**: Type-safe configuration with range and value checks
//! - **Environment overrides**: Override configuration values with environment variables
//! - **Defaults**: Sensible default values for all configuration options
//!
//! # Examples
//!
//! ```rust
//! use driftsync_config::{Config, ConfigBuilder};
//!
//! let config = ConfigBuilder::new()
//!     .add_defaults()
//!     .add_env_prefix("DRIFTSYNC")
//!     .build()
//!     .expect("Failed to load configuration");
//!
//! println!("Timestamp tolerance: {}s", config.compare.mtime_tolerance_secs);
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

use driftsync_types::{DuplicatePolicy, RelocatedPolicy};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

pub mod builder;
pub mod error;
pub mod loader;

pub use builder::ConfigBuilder;
pub use error::{ConfigError, ConfigResult};
pub use loader::ConfigLoader;

/// Main configuration structure for driftsync
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Config {
    /// Directory scanning configuration
    pub scan: ScanConfig,
    /// Tree comparison configuration
    pub compare: CompareConfig,
    /// Destination update configuration
    pub update: UpdateConfig,
    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            scan: ScanConfig::default(),
            compare: CompareConfig::default(),
            update: UpdateConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

/// Directory scanning configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScanConfig {
    /// Follow symbolic links while walking directory trees
    pub follow_symlinks: bool,
    /// Number of indexed files between scan progress notifications
    pub progress_every: u64,
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            follow_symlinks: true,
            progress_every: 1000,
        }
    }
}

/// Tree comparison configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CompareConfig {
    /// Timestamp tolerance in seconds when matching modification times
    pub mtime_tolerance_secs: u64,
    /// Resolve duplicate and relocated content by fingerprinting
    pub deep_scan: bool,
    /// Path the comparison report is written to
    pub report_file: PathBuf,
}

impl Default for CompareConfig {
    fn default() -> Self {
        Self {
            mtime_tolerance_secs: 2,
            deep_scan: false,
            report_file: PathBuf::from("scan-report.json"),
        }
    }
}

/// Destination update configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UpdateConfig {
    /// Policy for files whose content already exists elsewhere
    pub duplicate_policy: DuplicatePolicy,
    /// Policy for files that moved within the destination
    pub relocated_policy: RelocatedPolicy,
    /// Preserve source modification times on copied files
    pub preserve_mtime: bool,
    /// Number of concurrent copy operations (0 = auto-detect)
    pub jobs: usize,
    /// Path the update journal is appended to
    pub journal_file: PathBuf,
}

impl Default for UpdateConfig {
    fn default() -> Self {
        Self {
            duplicate_policy: DuplicatePolicy::default(),
            relocated_policy: RelocatedPolicy::default(),
            preserve_mtime: true,
            jobs: 0,
            journal_file: PathBuf::from("update-journal.jsonl"),
        }
    }
}

/// Logging configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    /// Log level
    pub level: String,
    /// Enable colored output
    pub colored_output: bool,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            colored_output: true,
        }
    }
}
