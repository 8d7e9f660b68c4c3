//! Progress reporting and cooperative cancellation.
//!
//! Long-running operations (index sync, full reconciliation, batch
//! population) never block a UI thread because there is no UI thread here:
//! they report progress through a callback and check a shared flag at safe
//! points. Cancellation is cooperative and may lag by one unit of work.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

/// A single progress report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Progress {
    /// Human-readable label, e.g. the family currently being processed.
    pub message: String,
    /// Total number of items, when known.
    pub total: usize,
    /// Number of items processed so far.
    pub processed: usize,
}

impl Progress {
    pub fn new(message: impl Into<String>, total: usize, processed: usize) -> Self {
        Self {
            message: message.into(),
            total,
            processed,
        }
    }
}

/// Shared flag allowing a caller to request early termination.
///
/// Clones observe the same flag.
#[derive(Debug, Clone, Default)]
pub struct CancelToken {
    flag: Arc<AtomicBool>,
}

impl CancelToken {
    pub fn new() -> Self {
        Self::default()
    }

    /// Request cancellation. Takes effect at the next check point.
    pub fn cancel(&self) {
        self.flag.store(true, Ordering::Relaxed);
    }

    pub fn is_cancelled(&self) -> bool {
        self.flag.load(Ordering::Relaxed)
    }
}
