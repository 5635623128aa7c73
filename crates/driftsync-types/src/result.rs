//! Result type alias for driftsync operations

use crate::error::Error;

/// Result type alias used throughout driftsync
pub type Result<T> = std::result::Result<T, Error>;
