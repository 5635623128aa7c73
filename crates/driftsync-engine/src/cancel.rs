//! Cooperative cancellation for update runs

use driftsync_types::Cancellable;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// Shared flag requesting cancellation of a running update
///
/// Clones share the same flag, so a token handed to a signal handler or
/// UI thread stops the executor it was created for. The executor checks
/// the token between actions only; a copy already in flight completes.
#[derive(Debug, Clone, Default)]
pub struct CancellationToken {
    flag: Arc<AtomicBool>,
}

impl CancellationToken {
    /// Create a token in the not-cancelled state
    pub fn new() -> Self {
        Self {
            flag: Arc::new(AtomicBool::new(false)),
        }
    }
}

impl Cancellable for CancellationToken {
    fn cancel(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}
