//! Tree comparison engine
//!
//! The engine partitions every source file into new, modified or
//! unchanged by comparing metadata against the destination index, and
//! collects destination-only files as missing. With deep scan enabled
//! it then refines the new files through the duplicate resolver.

use crate::report::{ComparisonReport, ModifiedPair};
use crate::resolver::DuplicateResolver;
use driftsync_scan::{Fingerprinter, TreeIndex};
use std::time::Duration;
use tracing::{debug, info};

/// Default timestamp tolerance when matching modification times
pub const DEFAULT_MTIME_TOLERANCE: Duration = Duration::from_secs(2);

/// Options controlling tree comparison
#[derive(Debug, Clone)]
pub struct CompareOptions {
    /// Timestamp tolerance for metadata matching
    pub mtime_tolerance: Duration,
    /// Resolve duplicate and relocated content by fingerprinting
    pub deep_scan: bool,
    /// Concurrent fingerprint computations (0 = auto-detect)
    pub hash_concurrency: usize,
}

impl Default for CompareOptions {
    fn default() -> Self {
        Self {
            mtime_tolerance: DEFAULT_MTIME_TOLERANCE,
            deep_scan: false,
            hash_concurrency: 0,
        }
    }
}

/// Engine that partitions two tree indexes into report categories
#[derive(Debug, Clone)]
pub struct CompareEngine {
    options: CompareOptions,
}

impl CompareEngine {
    /// Create an engine with the given options
    pub fn new(options: CompareOptions) -> Self {
        Self { options }
    }

    /// Create an engine with default options
    pub fn with_defaults() -> Self {
        Self::new(CompareOptions::default())
    }

    /// Compare a source tree against a destination tree
    ///
    /// The comparison itself never fails; per-file problems were already
    /// turned into warnings during scanning, and fingerprint failures
    /// leave the affected files in their metadata-derived category.
    pub async fn compare(&self, source: &TreeIndex, destination: &TreeIndex) -> ComparisonReport {
        let mut report = self.partition(source, destination);

        if self.options.deep_scan {
            let fingerprinter = if self.options.hash_concurrency == 0 {
                Fingerprinter::with_defaults()
            } else {
                Fingerprinter::new(self.options.hash_concurrency)
            };
            DuplicateResolver::new(&fingerprinter)
                .resolve(&mut report, destination)
                .await;
        }

        info!("Comparison finished: {}", report.summary());
        report
    }

    /// Metadata-only partition of the two indexes
    fn partition(&self, source: &TreeIndex, destination: &TreeIndex) -> ComparisonReport {
        let tolerance = self.options.mtime_tolerance;
        let mut report = ComparisonReport::new(&source.root, &destination.root);
        report.source_warnings = source.warnings.clone();
        report.destination_warnings = destination.warnings.clone();

        for relative in source.sorted_relatives() {
            let Some(record) = source.get(relative) else {
                continue;
            };
            match destination.get(relative) {
                None => report.new.push(record.clone()),
                Some(dest_record) => {
                    if record.metadata_matches(dest_record, tolerance) {
                        report.unchanged.push(relative.to_string());
                    } else {
                        debug!(
                            "Modified: '{}' ({} -> {} bytes)",
                            relative, dest_record.size, record.size
                        );
                        report.modified.push(ModifiedPair {
                            source: record.clone(),
                            destination: dest_record.clone(),
                            source_newer: record.is_newer_than(dest_record, tolerance),
                        });
                    }
                }
            }
        }

        for relative in destination.sorted_relatives() {
            if !source.contains(relative) {
                if let Some(record) = destination.get(relative) {
                    report.missing.push(record.clone());
                }
            }
        }

        report
    }
}
