//! Persistent object cache of computed family descriptors.
//!
//! Keyed by family name and versioned cache-wide. On open the whole file is
//! probed by deserializing it; a version mismatch or any deserialization
//! failure invalidates the cache wholesale. Partial corruption is not
//! recoverable per-entry: reconciliation simply rebuilds every family from
//! the index, which is the safe, slow path.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::error::Result;
use crate::family::Family;

/// Bumped whenever the serialized `Family` shape changes.
pub const CACHE_VERSION: u32 = 1;

#[derive(Debug, Serialize, Deserialize)]
struct CacheFile {
    version: u32,
    families: BTreeMap<String, Family>,
}

/// Key→value store of previously computed families.
pub struct ObjectCache {
    path: PathBuf,
    families: BTreeMap<String, Family>,
}

impl ObjectCache {
    /// Open the cache at `path`. Stale or unreadable contents are discarded
    /// wholesale and an empty cache is returned; this is not an error.
    pub fn open(path: impl Into<PathBuf>) -> Result<Self> {
        let path = path.into();
        let families = match Self::read_entries(&path) {
            Ok(families) => families,
            Err(reason) => {
                warn!(path = %path.display(), %reason, "invalidating stale family cache");
                if path.exists() {
                    fs::remove_file(&path)?;
                }
                BTreeMap::new()
            }
        };
        Ok(Self { path, families })
    }

    fn read_entries(path: &Path) -> std::result::Result<BTreeMap<String, Family>, String> {
        if !path.exists() {
            return Ok(BTreeMap::new());
        }
        let raw = fs::read_to_string(path).map_err(|e| e.to_string())?;
        let file: CacheFile = serde_json::from_str(&raw).map_err(|e| e.to_string())?;
        if file.version != CACHE_VERSION {
            return Err(format!(
                "cache version {} != expected {}",
                file.version, CACHE_VERSION
            ));
        }
        Ok(file.families)
    }

    pub fn has(&self, name: &str) -> bool {
        self.families.contains_key(name)
    }

    pub fn get(&self, name: &str) -> Option<&Family> {
        self.families.get(name)
    }

    pub fn put(&mut self, family: Family) {
        self.families.insert(family.name.clone(), family);
    }

    /// Drop every entry and delete the backing file.
    pub fn invalidate(&mut self) -> Result<()> {
        self.families.clear();
        if self.path.exists() {
            fs::remove_file(&self.path)?;
        }
        Ok(())
    }

    /// Persist the current entries.
    pub fn flush(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let file = CacheFile {
            version: CACHE_VERSION,
            families: self.families.clone(),
        };
        fs::write(&self.path, serde_json::to_string(&file)?)?;
        Ok(())
    }

    pub fn len(&self) -> usize {
        self.families.len()
    }

    pub fn is_empty(&self) -> bool {
        self.families.is_empty()
    }
}
