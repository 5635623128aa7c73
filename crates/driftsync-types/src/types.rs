//! Core data types shared across driftsync crates

use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;
use std::time::{Duration, SystemTime};

/// Metadata snapshot of one regular file inside a scanned tree
///
/// Records are keyed by their root-relative path, normalized to `/`
/// separators on every platform so that indexes built on different
/// operating systems stay comparable.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FileRecord {
    /// Path relative to the scanned root, using `/` separators
    pub relative: String,
    /// Absolute path of the file on disk
    pub absolute: PathBuf,
    /// File size in bytes
    pub size: u64,
    /// Last modification time
    pub modified: SystemTime,
    /// Content fingerprint as a hex digest, computed lazily
    pub fingerprint: Option<String>,
}

impl FileRecord {
    /// Create a new file record without a fingerprint
    pub fn new<R: Into<String>, A: Into<PathBuf>>(
        relative: R,
        absolute: A,
        size: u64,
        modified: SystemTime,
    ) -> Self {
        Self {
            relative: relative.into(),
            absolute: absolute.into(),
            size,
            modified,
            fingerprint: None,
        }
    }

    /// Attach a content fingerprint to this record
    pub fn with_fingerprint<S: Into<String>>(mut self, fingerprint: S) -> Self {
        self.fingerprint = Some(fingerprint.into());
        self
    }

    /// Final component of the relative path
    pub fn file_name(&self) -> &str {
        self.relative
            .rsplit('/')
            .next()
            .unwrap_or(self.relative.as_str())
    }

    /// Check whether two records agree on size and modification time
    ///
    /// Sizes must match exactly. Modification times may differ by up to
    /// `tolerance` in either direction, which absorbs the coarse
    /// timestamp granularity of FAT-family filesystems.
    pub fn metadata_matches(&self, other: &FileRecord, tolerance: Duration) -> bool {
        if self.size != other.size {
            return false;
        }
        let delta = match self.modified.duration_since(other.modified) {
            Ok(forward) => forward,
            Err(err) => err.duration(),
        };
        delta <= tolerance
    }

    /// Check whether this record was modified strictly after `other`,
    /// ignoring differences within `tolerance`
    pub fn is_newer_than(&self, other: &FileRecord, tolerance: Duration) -> bool {
        match self.modified.duration_since(other.modified) {
            Ok(forward) => forward > tolerance,
            Err(_) => false,
        }
    }
}

/// Non-fatal problem recorded while scanning a directory tree
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ScanWarning {
    /// Path the problem was encountered at, if known
    pub path: Option<PathBuf>,
    /// Human-readable description of the problem
    pub message: String,
}

impl ScanWarning {
    /// Create a warning tied to a specific path
    pub fn at_path<P: Into<PathBuf>, S: Into<String>>(path: P, message: S) -> Self {
        Self {
            path: Some(path.into()),
            message: message.into(),
        }
    }

    /// Create a warning with no associated path
    pub fn general<S: Into<String>>(message: S) -> Self {
        Self {
            path: None,
            message: message.into(),
        }
    }
}

impl fmt::Display for ScanWarning {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.path {
            Some(path) => write!(f, "{}: {}", path.display(), self.message),
            None => write!(f, "{}", self.message),
        }
    }
}

/// How the update phase treats files whose content already exists
/// elsewhere in the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum DuplicatePolicy {
    /// Copy the file to its source-relative location anyway
    CopyAnyway,
    /// Leave the existing copy alone and skip the transfer
    Skip,
    /// Defer the decision to an interactive confirmation
    #[default]
    AskEachTime,
}

impl fmt::Display for DuplicatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DuplicatePolicy::CopyAnyway => write!(f, "copy-anyway"),
            DuplicatePolicy::Skip => write!(f, "skip"),
            DuplicatePolicy::AskEachTime => write!(f, "ask-each-time"),
        }
    }
}

/// How the update phase treats files that moved within the destination
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "kebab-case")]
pub enum RelocatedPolicy {
    /// Keep the relocated copy where it is and skip the transfer
    #[default]
    Skip,
    /// Copy to an alternate name beside the source-relative location
    CopyToAlternate,
}

impl fmt::Display for RelocatedPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RelocatedPolicy::Skip => write!(f, "skip"),
            RelocatedPolicy::CopyToAlternate => write!(f, "copy-to-alternate"),
        }
    }
}
