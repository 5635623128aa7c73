//! Comparison report persistence
//!
//! Reports are written as pretty-printed JSON so they stay inspectable
//! with ordinary tools between the scan and update phases.

use crate::report::ComparisonReport;
use driftsync_types::{Error, Result};
use std::path::{Path, PathBuf};
use tracing::info;

/// File name used for reports saved into an output directory
pub const REPORT_FILE_NAME: &str = "scan-report.json";

/// Saves and loads comparison reports as JSON documents
pub struct ReportStore;

impl ReportStore {
    /// Serialize a report to pretty-printed JSON at `path`
    ///
    /// Parent directories are created as needed and an existing report
    /// at the same path is replaced.
    pub async fn save<P: AsRef<Path>>(report: &ComparisonReport, path: P) -> Result<()> {
        let path = path.as_ref();
        let json = serde_json::to_string_pretty(report)
            .map_err(|e| Error::persistence(format!("Failed to serialize report: {}", e)))?;

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    Error::persistence(format!(
                        "Failed to create report directory '{}': {}",
                        parent.display(),
                        e
                    ))
                })?;
            }
        }

        tokio::fs::write(path, json).await.map_err(|e| {
            Error::persistence(format!(
                "Failed to write report '{}': {}",
                path.display(),
                e
            ))
        })?;

        info!("Report saved to '{}'", path.display());
        Ok(())
    }

    /// Save a report under its standard name inside `dir`
    ///
    /// Returns the path the report was written to.
    pub async fn save_in<P: AsRef<Path>>(report: &ComparisonReport, dir: P) -> Result<PathBuf> {
        let path = dir.as_ref().join(REPORT_FILE_NAME);
        Self::save(report, &path).await?;
        Ok(path)
    }

    /// Load a report previously written by [`ReportStore::save`]
    pub async fn load<P: AsRef<Path>>(path: P) -> Result<ComparisonReport> {
        let path = path.as_ref();
        let json = tokio::fs::read_to_string(path).await.map_err(|e| {
            Error::persistence(format!("Failed to read report '{}': {}", path.display(), e))
        })?;

        serde_json::from_str(&json).map_err(|e| {
            Error::persistence(format!(
                "Failed to parse report '{}': {}",
                path.display(),
                e
            ))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{DuplicateMatch, ModifiedPair, RelocatedPair};
    use driftsync_types::{ErrorKind, FileRecord, ScanWarning};
    use std::time::SystemTime;
    use tempfile::TempDir;

    fn record(relative: &str) -> FileRecord {
        FileRecord::new(relative, format!("/src/{relative}"), 16, SystemTime::now())
    }

    fn populated_report() -> ComparisonReport {
        let mut report = ComparisonReport::new("/src", "/dst");
        report.deep_scan = true;
        report.new.push(record("fresh.txt"));
        report.modified.push(ModifiedPair {
            source: record("changed.txt"),
            destination: record("changed.txt"),
            source_newer: true,
        });
        report.missing.push(record("gone.txt"));
        report.unchanged.push("same.txt".to_string());
        report.relocated.push(RelocatedPair {
            record: record("moved.bin").with_fingerprint("aa11"),
            old_relative: "old/moved.bin".to_string(),
            fingerprint: "aa11".to_string(),
        });
        report.duplicates.push(DuplicateMatch {
            record: record("dup.bin").with_fingerprint("bb22"),
            existing_relative: "kept/dup.bin".to_string(),
            fingerprint: "bb22".to_string(),
        });
        report
            .source_warnings
            .push(ScanWarning::at_path("/src/locked", "permission denied"));
        report
    }

    #[tokio::test]
    async fn test_save_and_load_round_trip() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("scan-report.json");

        let original = populated_report();
        ReportStore::save(&original, &path).await.unwrap();
        let loaded = ReportStore::load(&path).await.unwrap();

        assert_eq!(original, loaded);
    }

    #[tokio::test]
    async fn test_save_creates_parent_directories() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/report.json");

        ReportStore::save(&populated_report(), &path).await.unwrap();
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_save_in_uses_standard_name() {
        let temp = TempDir::new().unwrap();
        let path = ReportStore::save_in(&populated_report(), temp.path())
            .await
            .unwrap();

        assert_eq!(path, temp.path().join(REPORT_FILE_NAME));
        assert!(path.exists());
    }

    #[tokio::test]
    async fn test_save_replaces_existing_report() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("report.json");

        let mut first = populated_report();
        ReportStore::save(&first, &path).await.unwrap();

        first.new.clear();
        ReportStore::save(&first, &path).await.unwrap();

        let loaded = ReportStore::load(&path).await.unwrap();
        assert!(loaded.new.is_empty());
    }

    #[tokio::test]
    async fn test_load_missing_report_fails() {
        let temp = TempDir::new().unwrap();
        let result = ReportStore::load(temp.path().join("absent.json")).await;
        assert!(matches!(
            result.map_err(|e| e.kind()),
            Err(ErrorKind::Persistence)
        ));
    }

    #[tokio::test]
    async fn test_load_corrupt_report_fails() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("corrupt.json");
        tokio::fs::write(&path, b"{ not json").await.unwrap();

        let result = ReportStore::load(&path).await;
        assert!(matches!(
            result.map_err(|e| e.kind()),
            Err(ErrorKind::Persistence)
        ));
    }
}
