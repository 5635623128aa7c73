//! Unified test utilities for driftsync integration tests
//!
//! This module provides common utilities used across all test files
//! to ensure consistency and reduce code duplication.

use std::fs;
use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};
use tempfile::TempDir;

/// Paired source, destination and output directories for sync scenarios
pub struct SyncFixture {
    /// Tree files are taken from
    pub source: TempDir,
    /// Tree being brought up to date
    pub destination: TempDir,
    /// Directory reports and journals land in
    pub output: TempDir,
}

impl SyncFixture {
    /// Create three fresh temporary directories
    pub fn new() -> Self {
        Self {
            source: TempDir::new().expect("Failed to create source dir"),
            destination: TempDir::new().expect("Failed to create destination dir"),
            output: TempDir::new().expect("Failed to create output dir"),
        }
    }

    /// Root of the source tree
    pub fn source_path(&self) -> &Path {
        self.source.path()
    }

    /// Root of the destination tree
    pub fn destination_path(&self) -> &Path {
        self.destination.path()
    }

    /// Root of the output directory
    pub fn output_path(&self) -> &Path {
        self.output.path()
    }

    /// Write a file under the source tree, creating parent directories
    pub fn write_source(&self, relative: &str, contents: &[u8]) -> PathBuf {
        write_file(self.source.path(), relative, contents)
    }

    /// Write a file under the destination tree, creating parent directories
    pub fn write_destination(&self, relative: &str, contents: &[u8]) -> PathBuf {
        write_file(self.destination.path(), relative, contents)
    }
}

impl Default for SyncFixture {
    fn default() -> Self {
        Self::new()
    }
}

/// Write a file below `root`, creating parent directories as needed
pub fn write_file(root: &Path, relative: &str, contents: &[u8]) -> PathBuf {
    let path = root.join(relative);
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).expect("Failed to create parent directories");
    }
    fs::write(&path, contents).expect("Failed to write test file");
    path
}

/// Pin a file's modification time to an exact instant
pub fn set_mtime(path: &Path, time: SystemTime) {
    filetime::set_file_mtime(path, filetime::FileTime::from_system_time(time))
        .expect("Failed to set modification time");
}

/// A timestamp the given number of hours in the past
///
/// Far enough from "now" to sit outside any comparison tolerance.
pub fn hours_ago(hours: u64) -> SystemTime {
    SystemTime::now() - Duration::from_secs(hours * 3600)
}

/// Deterministic pseudo-random content for fixture files
pub fn generate_content(size: usize, seed: u64) -> Vec<u8> {
    use std::collections::hash_map::DefaultHasher;
    use std::hash::{Hash, Hasher};

    let mut content = Vec::with_capacity(size);
    let mut hasher = DefaultHasher::new();
    seed.hash(&mut hasher);

    for i in 0..size {
        i.hash(&mut hasher);
        content.push((hasher.finish() % 256) as u8);
    }
    content
}
