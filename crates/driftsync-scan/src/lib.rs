//! Directory tree scanning and content fingerprinting for driftsync
//!
//! This crate walks directory trees and turns them into comparable
//! snapshots:
//!
//! - **Tree scanning**: walk a root directory and build a [`TreeIndex`]
//!   of every regular file, keyed by normalized relative path
//! - **Fingerprinting**: lazy BLAKE3 content digests with bounded
//!   concurrency, used to match files by content rather than by path
//!
//! Scanning is resilient: unreadable entries are collected as warnings
//! on the index instead of failing the walk.
//!
//! # Examples
//!
//! ```rust
//! use driftsync_scan::{ScanOptions, TreeScanner};
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let scanner = TreeScanner::new(ScanOptions::default());
//! let index = scanner.scan("/data/source").await?;
//! println!("Indexed {} files", index.len());
//! # Ok(())
//! # }
//! ```

#![deny(missing_docs)]
#![warn(clippy::all, clippy::pedantic, clippy::nursery)]
#![allow(clippy::module_name_repetitions)]

pub mod fingerprint;
pub mod index;
pub mod scanner;

pub use fingerprint::{hash_file, hash_file_blocking, Fingerprinter};
pub use index::TreeIndex;
pub use scanner::{ScanOptions, TreeScanner};
