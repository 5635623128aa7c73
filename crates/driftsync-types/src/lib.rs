//! Core type system and error handling for driftsync
//!
//! This crate provides the foundational types, error handling, and shared
//! data structures used throughout the driftsync ecosystem. It includes:
//!
//! - **File records**: metadata snapshots of scanned files keyed by
//!   normalized relative paths
//! - **Policies**: how duplicate and relocated content is handled
//!   during updates
//! - **Error handling**: phase-level failures with a structured kind
//! - **Traits**: observer and cancellation seams shared by the scan
//!   and update phases
//!
//! # Examples
//!
//! ```rust
//! use driftsync_types::{Error, FileRecord, Result};
//! use std::time::SystemTime;
//!
//! fn example_record() -> Result<FileRecord> {
//!     let record = FileRecord::new(
//!         "docs/readme.md",
//!         "/source/docs/readme.md",
//!         1024,
//!         SystemTime::now(),
//!     );
//!     if record.relative.is_empty() {
//!         return Err(Error::scan("empty relative path"));
//!     }
//!     Ok(record)
//! }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod error;
pub mod result;
pub mod traits;
pub mod types;

// Re-export commonly used types
pub use error::{Error, ErrorKind};
pub use result::Result;
pub use traits::{Cancellable, ExecutionObserver, ScanObserver};
pub use types::{DuplicatePolicy, FileRecord, RelocatedPolicy, ScanWarning};
