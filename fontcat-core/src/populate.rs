//! Incremental catalog traversal for long-running consumers.
//!
//! Large installs make one-shot iteration too coarse for anything
//! interactive, so [`BatchPopulator`] hands out families a fixed batch at a
//! time and lets the caller interleave its own work between steps.

use std::collections::VecDeque;

use crate::catalog::Catalog;
use crate::family::Family;
use crate::progress::CancelToken;

pub const DEFAULT_BATCH_SIZE: usize = 100;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Step {
    /// More families remain; call `step` again.
    Continue,
    /// The snapshot has been fully visited or the run was cancelled.
    Done,
}

/// Walks a snapshot of the catalog's family names batch by batch.
///
/// The snapshot is taken at construction, so families added or removed
/// afterwards do not disturb an in-flight run. Cancellation is only
/// observed between batches.
pub struct BatchPopulator {
    queue: VecDeque<String>,
    batch_size: usize,
    cancel: CancelToken,
}

impl BatchPopulator {
    pub fn new(catalog: &Catalog) -> Self {
        Self {
            queue: catalog
                .family_names()
                .into_iter()
                .map(str::to_string)
                .collect(),
            batch_size: DEFAULT_BATCH_SIZE,
            cancel: CancelToken::new(),
        }
    }

    pub fn with_batch_size(mut self, batch_size: usize) -> Self {
        self.batch_size = batch_size.max(1);
        self
    }

    /// Shared token; cancelling it ends the run at the next step boundary.
    pub fn cancel_token(&self) -> CancelToken {
        self.cancel.clone()
    }

    pub fn remaining(&self) -> usize {
        self.queue.len()
    }

    /// Visit up to one batch of families. Names that no longer resolve in
    /// `catalog` are skipped without counting as visits.
    pub fn step(&mut self, catalog: &Catalog, visit: &mut dyn FnMut(&Family)) -> Step {
        if self.cancel.is_cancelled() {
            self.queue.clear();
            return Step::Done;
        }
        for _ in 0..self.batch_size {
            let name = match self.queue.pop_front() {
                Some(name) => name,
                None => break,
            };
            if let Some(family) = catalog.family(&name) {
                visit(family);
            }
        }
        if self.queue.is_empty() {
            Step::Done
        } else {
            Step::Continue
        }
    }
}
