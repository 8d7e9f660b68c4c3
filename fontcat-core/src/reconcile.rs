//! Reconciliation: fold the live family list, the file index, and the
//! object cache into one consistent [`Catalog`].
//!
//! A family only makes it into the catalog when the layout stack reports it
//! AND the index has at least heard of it; everything derived (categories,
//! collections, enablement) is rebuilt on top of that intersection.

use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::blacklist::BlacklistFile;
use crate::cache::ObjectCache;
use crate::catalog::Catalog;
use crate::enumerate::{is_alias_family, FamilyEnumerator};
use crate::error::Result;
use crate::family::{Family, FileDetails, Owner};
use crate::index::{FileIndex, Predicate};
use crate::progress::{CancelToken, Progress};
use crate::store::CollectionStore;
use crate::CatalogError;

/// Where the engine keeps its state files, all under one base directory.
#[derive(Debug, Clone)]
pub struct Locations {
    base: PathBuf,
}

impl Locations {
    pub fn new(base: impl Into<PathBuf>) -> Self {
        Self { base: base.into() }
    }

    pub fn base(&self) -> &Path {
        &self.base
    }

    pub fn index_path(&self) -> PathBuf {
        self.base.join("fonts-index.json")
    }

    pub fn cache_path(&self) -> PathBuf {
        self.base.join("families.cache")
    }

    pub fn collections_path(&self) -> PathBuf {
        self.base.join("collections.xml")
    }

    pub fn legacy_collections_path(&self) -> PathBuf {
        self.base.join("fontgroups.xml")
    }

    pub fn blacklist_path(&self) -> PathBuf {
        self.base.join("rejects.conf")
    }
}

/// Build the catalog from all three sources.
///
/// Progress is reported once per processed family; the cancel token is also
/// checked per family. On cancellation nothing has been written except cache
/// entries for families already processed, which the next run reuses.
pub fn reconcile(
    enumerator: &dyn FamilyEnumerator,
    locations: &Locations,
    progress: &mut dyn FnMut(&Progress),
    cancel: &CancelToken,
) -> Result<Catalog> {
    let index = FileIndex::open(locations.index_path())?;
    let mut cache = ObjectCache::open(locations.cache_path())?;
    let blacklist = BlacklistFile::new(locations.blacklist_path());

    // Rejected families are invisible to the layout stack, so the reject
    // file is moved aside for the duration of the enumeration.
    blacklist.park()?;
    let enumerated = enumerator.list_families();
    blacklist.restore()?;
    let enumerated = enumerated?;

    let indexed = index.families();
    let system = index.system_families();
    let rejected = blacklist.load();

    let available: Vec<_> = enumerated
        .into_iter()
        .filter(|family| !is_alias_family(&family.name))
        .filter(|family| indexed.contains(&family.name))
        .collect();
    debug!(
        available = available.len(),
        indexed = indexed.len(),
        "family sources intersected"
    );

    let total = available.len();
    let mut families = Vec::with_capacity(total);
    for (done, listed) in available.into_iter().enumerate() {
        if cancel.is_cancelled() {
            return Err(CatalogError::Cancelled);
        }

        let mut family = match cache.get(&listed.name) {
            Some(cached) => cached.clone(),
            None => {
                let built = build_family(&listed.name, &listed.faces, &index, &system);
                cache.put(built.clone());
                built
            }
        };
        family.faces = listed.faces;
        family.enabled = !rejected.contains(&family.name);
        families.push(family);

        progress(&Progress::new("Loading font families", total, done + 1));
    }

    cache.flush()?;
    info!(families = families.len(), "catalog reconciled");

    let store = CollectionStore::new(locations.collections_path())
        .with_legacy(locations.legacy_collections_path());
    let loaded = store.load();

    let mut catalog = Catalog::new(families);
    catalog.adopt_collections(loaded);
    catalog.attach_store(store);
    catalog.attach_blacklist(blacklist);
    Ok(catalog)
}

fn build_family(
    name: &str,
    faces: &[crate::family::FaceDescriptor],
    index: &FileIndex,
    system: &BTreeSet<String>,
) -> Family {
    let owner = if system.contains(name) {
        Owner::System
    } else {
        Owner::User
    };
    let mut family = Family::new(name, owner);

    let predicate = Predicate::FamilyEq(name.to_string());
    let rows = index.get(Some(&predicate));
    for face in faces {
        // The layout description string is the join key between a live face
        // and its indexed file. Faces without a row stay style-less.
        if let Some(row) = rows.iter().find(|row| row.description == face.description) {
            family.styles.insert(
                face.name.clone(),
                FileDetails {
                    filepath: row.filepath.clone(),
                    filetype: row.filetype.clone(),
                    filesize: row.filesize,
                    postscript_name: row.postscript_name.clone(),
                },
            );
        }
    }
    family
}
