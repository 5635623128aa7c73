//! Comparison report types
//!
//! A [`ComparisonReport`] is the durable outcome of comparing a source
//! tree against a destination tree. Every source file lands in exactly
//! one of its categories, and the report is what both the update
//! planner and the persisted JSON document are built from.

use chrono::{DateTime, Utc};
use driftsync_types::{FileRecord, ScanWarning};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::path::PathBuf;

/// A file present in both trees whose metadata no longer matches
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ModifiedPair {
    /// Record on the source side
    pub source: FileRecord,
    /// Record on the destination side
    pub destination: FileRecord,
    /// Whether the source copy is strictly newer than the destination
    pub source_newer: bool,
}

/// A new source file whose content already exists at a path the source
/// no longer has
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RelocatedPair {
    /// Source record, carrying its fingerprint
    pub record: FileRecord,
    /// Destination-relative path the content currently lives at
    pub old_relative: String,
    /// Shared content fingerprint
    pub fingerprint: String,
}

/// A new source file whose content also exists at a path the source
/// still has
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DuplicateMatch {
    /// Source record, carrying its fingerprint
    pub record: FileRecord,
    /// Destination-relative path holding identical content
    pub existing_relative: String,
    /// Shared content fingerprint
    pub fingerprint: String,
}

/// Outcome of comparing a source tree against a destination tree
///
/// Category lists are sorted by relative path, so two comparisons of
/// the same trees serialize to identical documents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    /// Root of the source tree
    pub source_root: PathBuf,
    /// Root of the destination tree
    pub destination_root: PathBuf,
    /// When the comparison was performed
    pub scanned_at: DateTime<Utc>,
    /// Whether duplicate resolution ran on this report
    pub deep_scan: bool,
    /// Source files absent from the destination
    pub new: Vec<FileRecord>,
    /// Files present in both trees with differing metadata
    pub modified: Vec<ModifiedPair>,
    /// Destination files absent from the source
    pub missing: Vec<FileRecord>,
    /// Relative paths present in both trees with matching metadata
    pub unchanged: Vec<String>,
    /// New files whose content matched a missing destination file
    pub relocated: Vec<RelocatedPair>,
    /// New files whose content exists elsewhere in the destination
    pub duplicates: Vec<DuplicateMatch>,
    /// Warnings collected while scanning the source tree
    pub source_warnings: Vec<ScanWarning>,
    /// Warnings collected while scanning the destination tree
    pub destination_warnings: Vec<ScanWarning>,
}

impl ComparisonReport {
    /// Create an empty report for a pair of roots
    pub fn new<S: Into<PathBuf>, D: Into<PathBuf>>(source_root: S, destination_root: D) -> Self {
        Self {
            source_root: source_root.into(),
            destination_root: destination_root.into(),
            scanned_at: Utc::now(),
            deep_scan: false,
            new: Vec::new(),
            modified: Vec::new(),
            missing: Vec::new(),
            unchanged: Vec::new(),
            relocated: Vec::new(),
            duplicates: Vec::new(),
            source_warnings: Vec::new(),
            destination_warnings: Vec::new(),
        }
    }

    /// Total number of source files covered by the report
    pub fn total_source_files(&self) -> usize {
        self.new.len()
            + self.modified.len()
            + self.unchanged.len()
            + self.relocated.len()
            + self.duplicates.len()
    }

    /// Check whether the destination already matches the source
    pub fn is_clean(&self) -> bool {
        self.new.is_empty()
            && self.modified.is_empty()
            && self.relocated.is_empty()
            && self.duplicates.is_empty()
    }

    /// Count summary for display
    pub fn summary(&self) -> ReportSummary {
        ReportSummary {
            new: self.new.len(),
            modified: self.modified.len(),
            missing: self.missing.len(),
            unchanged: self.unchanged.len(),
            relocated: self.relocated.len(),
            duplicates: self.duplicates.len(),
            warnings: self.source_warnings.len() + self.destination_warnings.len(),
        }
    }
}

/// Per-category counts of a comparison report
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ReportSummary {
    /// Number of new files
    pub new: usize,
    /// Number of modified files
    pub modified: usize,
    /// Number of missing files
    pub missing: usize,
    /// Number of unchanged files
    pub unchanged: usize,
    /// Number of relocated files
    pub relocated: usize,
    /// Number of duplicate files
    pub duplicates: usize,
    /// Number of scan warnings
    pub warnings: usize,
}

impl fmt::Display for ReportSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} new, {} modified, {} missing, {} unchanged, {} relocated, {} duplicates, {} warnings",
            self.new,
            self.modified,
            self.missing,
            self.unchanged,
            self.relocated,
            self.duplicates,
            self.warnings
        )
    }
}
