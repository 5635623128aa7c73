//! driftsync integration testing suite
//!
//! This crate provides cross-crate integration tests for driftsync, together
//! with the shared fixtures the test files build their directory trees with.

#![warn(missing_docs)]
#![warn(clippy::all)]

/// Unified test utilities
///
/// This module provides common utilities used across all test files
/// to ensure consistency and reduce code duplication.
pub mod test_utils;
