//! Tree comparison for driftsync
//!
//! This crate partitions a scanned source tree against a destination
//! tree, optionally resolves duplicate and relocated content by
//! fingerprint, and persists the outcome. It provides:
//!
//! - **Comparison engine**: metadata-based partition into new, modified,
//!   unchanged and missing, with a configurable timestamp tolerance
//! - **Duplicate resolver**: content-based refinement of new files into
//!   relocations and duplicates
//! - **Report store**: JSON persistence of comparison reports between
//!   the scan and update phases
//!
//! # Examples
//!
//! ```rust
//! use driftsync_diff::{CompareEngine, CompareOptions, ReportStore};
//! use driftsync_scan::TreeScanner;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scanner = TreeScanner::with_defaults();
//! let (source, destination) = scanner.scan_pair("/data/source", "/data/backup").await?;
//!
//! let engine = CompareEngine::new(CompareOptions::default());
//! let report = engine.compare(&source, &destination).await;
//! let path = ReportStore::save_in(&report, "/data/backup-state").await?;
//! println!("Report written to {}", path.display());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod engine;
pub mod report;
pub mod resolver;
pub mod store;

pub use engine::{CompareEngine, CompareOptions, DEFAULT_MTIME_TOLERANCE};
pub use report::{ComparisonReport, DuplicateMatch, ModifiedPair, RelocatedPair, ReportSummary};
pub use resolver::DuplicateResolver;
pub use store::{ReportStore, REPORT_FILE_NAME};
