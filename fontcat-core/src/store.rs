//! Persistent storage for user collections.
//!
//! The primary file is element-per-collection XML. Saves keep the previous
//! file as `.bak` so an interrupted write never loses the last good copy,
//! and loads fall back to that copy when the primary is gone. A read-only
//! legacy format (`fontgroups.xml`, shared with other font tools) is merged
//! in at load time but never written.

use std::fs;
use std::path::{Path, PathBuf};

use chrono::Local;
use tracing::warn;

use crate::collection::Collection;
use crate::error::{CatalogError, Result};
use crate::xml;

#[derive(Debug, Clone)]
pub struct CollectionStore {
    path: PathBuf,
    legacy_path: Option<PathBuf>,
}

impl CollectionStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            legacy_path: None,
        }
    }

    /// Also merge collections from a legacy `fontgroups.xml` at load time.
    pub fn with_legacy(mut self, path: impl Into<PathBuf>) -> Self {
        self.legacy_path = Some(path.into());
        self
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn backup_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }

    /// Load collections in document order. A missing primary promotes the
    /// backup; an unparseable file is discarded with a warning.
    pub fn load(&self) -> Vec<Collection> {
        if !self.path.exists() {
            let backup = self.backup_path();
            if backup.exists() {
                if let Err(err) = fs::rename(&backup, &self.path) {
                    warn!(file = %self.path.display(), %err, "could not promote backup");
                }
            }
        }

        let mut collections = match fs::read_to_string(&self.path) {
            Ok(text) => match parse_collections(&text) {
                Ok(parsed) => parsed,
                Err(reason) => {
                    warn!(file = %self.path.display(), reason, "discarding unreadable collections");
                    Vec::new()
                }
            },
            Err(_) => Vec::new(),
        };

        if let Some(legacy) = &self.legacy_path {
            if let Ok(text) = fs::read_to_string(legacy) {
                for group in parse_legacy_groups(&text) {
                    if collections.iter().any(|c| c.name == group.name) {
                        continue;
                    }
                    collections.push(group);
                }
            }
        }

        collections
    }

    /// Write all collections out, preserving the given order.
    pub fn save<'a, I>(&self, collections: I) -> Result<()>
    where
        I: IntoIterator<Item = &'a Collection>,
    {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;

        let backup = self.backup_path();
        let had_previous = self.path.exists();
        if had_previous {
            fs::rename(&self.path, &backup)?;
        }

        match fs::write(&self.path, render_collections(collections)) {
            Ok(()) => Ok(()),
            Err(err) => {
                let _ = fs::remove_file(&self.path);
                if had_previous {
                    if let Err(restore_err) = fs::rename(&backup, &self.path) {
                        warn!(file = %self.path.display(), %restore_err, "could not restore backup");
                    }
                }
                Err(CatalogError::Persistence {
                    file: self.path.clone(),
                    reason: err.to_string(),
                })
            }
        }
    }
}

fn render_collections<'a, I>(collections: I) -> String
where
    I: IntoIterator<Item = &'a Collection>,
{
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\" encoding=\"UTF-8\"?>\n");
    out.push_str("<fontmanager>\n");
    for collection in collections {
        out.push_str(&format!(
            "  <fontcollection name=\"{}\" comment=\"{}\">\n",
            xml::escape(&collection.name),
            xml::escape(collection.comment.as_deref().unwrap_or(""))
        ));
        for family in &collection.families {
            out.push_str("    <pattern>\n");
            out.push_str("      <patelt name=\"family\">\n");
            out.push_str(&format!(
                "        <string>{}</string>\n",
                xml::escape(family)
            ));
            out.push_str("      </patelt>\n");
            out.push_str("    </pattern>\n");
        }
        out.push_str("  </fontcollection>\n");
    }
    out.push_str("</fontmanager>\n");
    out
}

fn parse_collections(text: &str) -> std::result::Result<Vec<Collection>, &'static str> {
    let mut collections = Vec::new();
    let mut current: Option<Collection> = None;

    for line in text.lines() {
        let line = line.trim();
        if line.starts_with("<fontcollection") {
            if current.is_some() {
                return Err("nested fontcollection element");
            }
            let name = attribute(line, "name").ok_or("fontcollection without a name")?;
            let mut collection = Collection::new(&name);
            collection.comment = attribute(line, "comment").filter(|c| !c.is_empty());
            current = Some(collection);
        } else if line == "</fontcollection>" {
            match current.take() {
                Some(done) => collections.push(done),
                None => return Err("stray closing fontcollection"),
            }
        } else if let Some(rest) = line.strip_prefix("<string>") {
            if let Some(inner) = rest.strip_suffix("</string>") {
                match current.as_mut() {
                    Some(collection) => {
                        collection.families.insert(xml::unescape(inner));
                    }
                    None => return Err("family entry outside a collection"),
                }
            }
        }
    }

    if current.is_some() {
        return Err("unterminated fontcollection element");
    }
    Ok(collections)
}

fn parse_legacy_groups(text: &str) -> Vec<Collection> {
    let mut groups = Vec::new();
    let mut current: Option<Collection> = None;
    let imported = format!("Created on {}", Local::now().format("%A, %B %d, %Y"));

    for line in text.lines() {
        let line = line.trim();
        if line.starts_with("<group") {
            if let Some(name) = attribute(line, "name") {
                let mut collection = Collection::new(&name);
                collection.comment = Some(imported.clone());
                current = Some(collection);
            }
        } else if line == "</group>" {
            if let Some(done) = current.take() {
                groups.push(done);
            }
        } else if let Some(rest) = line.strip_prefix("<family>") {
            if let Some(inner) = rest.strip_suffix("</family>") {
                if let Some(collection) = current.as_mut() {
                    collection.families.insert(xml::unescape(inner));
                }
            }
        }
    }

    groups
}

fn attribute(line: &str, key: &str) -> Option<String> {
    let marker = format!("{key}=\"");
    let start = line.find(&marker)? + marker.len();
    let end = line[start..].find('"')? + start;
    Some(xml::unescape(&line[start..end]))
}
