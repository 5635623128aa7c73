//! Error types for driftsync operations
//!
//! Errors in this crate describe phase-level failures: a scan that cannot
//! start, a report that cannot be persisted, an update run that was
//! cancelled. Per-file problems encountered while walking or copying are
//! deliberately *not* errors; they are recorded as warnings or journal
//! entries so one unreadable file never aborts a whole run.

use std::path::PathBuf;
use thiserror::Error;

/// Main error type for driftsync operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O operation failed
    #[error("I/O error: {message}")]
    Io {
        /// Error message describing the I/O failure
        message: String,
    },

    /// A root directory does not exist or is not a directory
    #[error("Root not found: {path}")]
    RootNotFound {
        /// Path that was expected to be a directory
        path: PathBuf,
    },

    /// Directory scan could not be started or completed
    #[error("Scan error: {message}")]
    Scan {
        /// Error message describing the scan failure
        message: String,
    },

    /// Configuration is invalid or could not be loaded
    #[error("Configuration error: {message}")]
    Config {
        /// Error message describing the configuration problem
        message: String,
    },

    /// Persisted report could not be written or read back
    #[error("Persistence error: {message}")]
    Persistence {
        /// Error message describing the persistence failure
        message: String,
    },

    /// Operation was cancelled before it completed
    #[error("Operation cancelled")]
    Cancelled,

    /// Generic error with custom message
    #[error("{message}")]
    Other {
        /// Custom error message
        message: String,
    },
}

impl Error {
    /// Create a new I/O error
    pub fn io<S: Into<String>>(message: S) -> Self {
        Error::Io {
            message: message.into(),
        }
    }

    /// Create a new root-not-found error
    pub fn root_not_found<P: Into<PathBuf>>(path: P) -> Self {
        Error::RootNotFound { path: path.into() }
    }

    /// Create a new scan error
    pub fn scan<S: Into<String>>(message: S) -> Self {
        Error::Scan {
            message: message.into(),
        }
    }

    /// Create a new configuration error
    pub fn config<S: Into<String>>(message: S) -> Self {
        Error::Config {
            message: message.into(),
        }
    }

    /// Create a new persistence error
    pub fn persistence<S: Into<String>>(message: S) -> Self {
        Error::Persistence {
            message: message.into(),
        }
    }

    /// Create a new generic error
    pub fn other<S: Into<String>>(message: S) -> Self {
        Error::Other {
            message: message.into(),
        }
    }

    /// Get the error kind for programmatic handling
    pub fn kind(&self) -> ErrorKind {
        match self {
            Error::Io { .. } => ErrorKind::Io,
            Error::RootNotFound { .. } => ErrorKind::RootNotFound,
            Error::Scan { .. } => ErrorKind::Scan,
            Error::Config { .. } => ErrorKind::Config,
            Error::Persistence { .. } => ErrorKind::Persistence,
            Error::Cancelled => ErrorKind::Cancelled,
            Error::Other { .. } => ErrorKind::Other,
        }
    }

    /// Check whether the operation can be retried after this error
    ///
    /// Cancellation and configuration problems are terminal; transient
    /// I/O and persistence failures may succeed on a later attempt.
    pub fn is_recoverable(&self) -> bool {
        match self {
            Error::Io { .. } | Error::Persistence { .. } => true,
            Error::RootNotFound { .. }
            | Error::Scan { .. }
            | Error::Config { .. }
            | Error::Cancelled
            | Error::Other { .. } => false,
        }
    }
}

/// Error kind enumeration for programmatic error handling
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    /// I/O operation failed
    Io,
    /// Root directory missing
    RootNotFound,
    /// Directory scan failed
    Scan,
    /// Configuration invalid
    Config,
    /// Report persistence failed
    Persistence,
    /// Operation cancelled
    Cancelled,
    /// Other error
    Other,
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Error::Io {
            message: err.to_string(),
        }
    }
}
