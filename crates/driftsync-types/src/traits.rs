//! Trait definitions for cross-crate callbacks

/// Observer notified while a tree scan discovers files
pub trait ScanObserver: Send + Sync {
    /// Called periodically with the running total of indexed files
    fn files_indexed(&self, total: u64);
}

/// Observer notified as update actions finish
pub trait ExecutionObserver: Send + Sync {
    /// Called after each action completes, with progress counts
    fn action_finished(&self, completed: u64, total: u64);
}

/// Cooperative cancellation for long-running operations
///
/// Cancellation takes effect between unit steps. An in-flight file copy
/// is always allowed to finish so the destination never holds a
/// half-written file.
pub trait Cancellable {
    /// Request cancellation
    fn cancel(&self);

    /// Check whether cancellation has been requested
    fn is_cancelled(&self) -> bool;
}
