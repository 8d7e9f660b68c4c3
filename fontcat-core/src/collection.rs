//! User collections and built-in categories.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

/// A named grouping of font families.
///
/// Built-in categories (All, System, User, Orphans) are `Collection`s with
/// `builtin` set; they cannot be removed through the catalog API.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Collection {
    pub name: String,
    pub families: BTreeSet<String>,
    pub builtin: bool,
    pub comment: Option<String>,
    /// Derived: true iff at least one member family is enabled. Stale after
    /// any membership or family-state change until recomputed through
    /// [`Collection::refresh_enabled`].
    pub enabled: bool,
}

impl Collection {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            families: BTreeSet::new(),
            builtin: false,
            comment: None,
            enabled: true,
        }
    }

    pub fn builtin(name: impl Into<String>, comment: impl Into<String>) -> Self {
        let mut collection = Self::new(name);
        collection.builtin = true;
        collection.comment = Some(comment.into());
        collection
    }

    pub fn add<I>(&mut self, families: I)
    where
        I: IntoIterator,
        I::Item: Into<String>,
    {
        self.families.extend(families.into_iter().map(Into::into));
    }

    pub fn remove(&mut self, family: &str) {
        self.families.remove(family);
    }

    pub fn contains(&self, family: &str) -> bool {
        self.families.contains(family)
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }

    /// Recompute `enabled` by OR-reduction over member families.
    /// `is_enabled` reports the live state of a family; members unknown to
    /// the caller count as disabled.
    pub fn refresh_enabled<F>(&mut self, is_enabled: F)
    where
        F: Fn(&str) -> bool,
    {
        self.enabled = self.families.iter().any(|family| is_enabled(family));
    }
}
