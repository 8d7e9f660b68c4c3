//! Persistent file index: one row per font file/style.
//!
//! A narrow, fixed-schema table with simple predicate queries, persisted as
//! a versioned JSON envelope. An on-disk file that fails to parse or carries
//! the wrong schema version is deleted and the index starts empty; callers
//! rebuild it through [`FileIndex::sync`]. That path is self-healing and is
//! never reported as an error.

use std::collections::BTreeSet;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::error::Result;
use crate::family::Owner;
use crate::progress::{CancelToken, Progress};
use crate::scan::FileScanner;

/// Bumped whenever `FontFileRecord` changes shape.
pub const SCHEMA_VERSION: u32 = 1;

/// One indexed font file/style.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FontFileRecord {
    pub family: String,
    pub style: String,
    pub filepath: PathBuf,
    pub filetype: String,
    pub filesize: u64,
    pub postscript_name: Option<String>,
    /// Layout description string; the join key against enumerated faces.
    pub description: String,
    pub owner: Owner,
    pub foundry: String,
}

#[derive(Debug, Serialize, Deserialize)]
struct IndexFile {
    schema: u32,
    rows: Vec<FontFileRecord>,
}

/// Row predicates: plain equality plus a LIKE-style substring match.
#[derive(Debug, Clone, PartialEq)]
pub enum Predicate {
    FamilyEq(String),
    OwnerEq(Owner),
    FamilyLike(String),
}

impl Predicate {
    pub fn matches(&self, row: &FontFileRecord) -> bool {
        match self {
            Predicate::FamilyEq(family) => row.family == *family,
            Predicate::OwnerEq(owner) => row.owner == *owner,
            Predicate::FamilyLike(fragment) => row.family.contains(fragment.as_str()),
        }
    }
}

/// The font-file table.
pub struct FileIndex {
    path: PathBuf,
    rows: Vec<FontFileRecord>,
}

impl FileIndex {
    /// Open the index at `path`, healing schema mismatches by starting over.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let rows = match Self::read_rows(&path) {
            Ok(rows) => rows,
            Err(reason) => {
                warn!(path = %path.display(), %reason, "discarding unusable font index");
                if path.exists() {
                    fs::remove_file(&path)?;
                }
                Vec::new()
            }
        };
        Ok(Self { path, rows })
    }

    fn read_rows(path: &Path) -> std::result::Result<Vec<FontFileRecord>, String> {
        if !path.exists() {
            return Ok(Vec::new());
        }
        let raw = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let file: IndexFile = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
        if file.schema != SCHEMA_VERSION {
            return Err(format!(
                "schema version {} != expected {}",
                file.schema, SCHEMA_VERSION
            ));
        }
        Ok(file.rows)
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Rows matching `predicate`; all rows when `None`.
    pub fn get(&self, predicate: Option<&Predicate>) -> Vec<&FontFileRecord> {
        self.rows
            .iter()
            .filter(|row| predicate.map_or(true, |p| p.matches(row)))
            .collect()
    }

    /// Distinct family names across all rows.
    pub fn families(&self) -> BTreeSet<String> {
        self.rows.iter().map(|row| row.family.clone()).collect()
    }

    /// Distinct family names owned by the system.
    pub fn system_families(&self) -> BTreeSet<String> {
        self.rows
            .iter()
            .filter(|row| row.owner == Owner::System)
            .map(|row| row.family.clone())
            .collect()
    }

    pub fn insert(&mut self, row: FontFileRecord) {
        self.rows.push(row);
    }

    /// Delete all rows matching `predicate`.
    pub fn remove(&mut self, predicate: &Predicate) {
        self.rows.retain(|row| !predicate.matches(row));
    }

    /// Rescan through `scanner` and replace the table contents wholesale.
    ///
    /// The existing rows are kept untouched if the scan fails or is
    /// cancelled. On success the new table is persisted immediately.
    pub fn sync(
        &mut self,
        scanner: &dyn FileScanner,
        label: &str,
        progress: &mut dyn FnMut(&Progress),
        cancel: &CancelToken,
    ) -> Result<usize> {
        let rows = scanner.scan(label, progress, cancel)?;
        debug!(rows = rows.len(), "font index rebuilt");
        self.rows = rows;
        self.save()?;
        Ok(self.rows.len())
    }

    /// Persist the current table.
    pub fn save(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = IndexFile {
            schema: SCHEMA_VERSION,
            rows: self.rows.clone(),
        };
        fs::write(&self.path, serde_json::to_string(&file)?)?;
        Ok(())
    }
}
