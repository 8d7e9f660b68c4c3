//! The disabled-family list, stored as a fontconfig `rejectfont` file.
//!
//! The file doubles as live configuration for the layout stack, so writes
//! are atomic and the reconciler can park it aside while enumerating (a
//! parked list lets every installed family show up in the scan).

use std::collections::BTreeSet;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use tracing::warn;

use crate::error::{CatalogError, Result};
use crate::xml;

/// Handle on the reject file and its parked sibling (`<file>.bak`).
#[derive(Debug, Clone)]
pub struct BlacklistFile {
    path: PathBuf,
}

impl BlacklistFile {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn parked_path(&self) -> PathBuf {
        let mut name = self.path.as_os_str().to_os_string();
        name.push(".bak");
        PathBuf::from(name)
    }

    /// Family names currently rejected. Missing file means an empty list;
    /// a parked sibling is consulted when the primary is absent.
    pub fn load(&self) -> BTreeSet<String> {
        let text = match fs::read_to_string(&self.path) {
            Ok(text) => text,
            Err(_) => match fs::read_to_string(self.parked_path()) {
                Ok(text) => text,
                Err(_) => return BTreeSet::new(),
            },
        };
        parse_rejects(&text)
    }

    /// Atomically replace the reject file with `names`.
    pub fn save(&self, names: &BTreeSet<String>) -> Result<()> {
        let parent = self.path.parent().unwrap_or_else(|| Path::new("."));
        fs::create_dir_all(parent)?;
        let mut tmp = NamedTempFile::new_in(parent)?;
        tmp.write_all(render_rejects(names).as_bytes())?;
        tmp.persist(&self.path)
            .map_err(|err| CatalogError::Persistence {
                file: self.path.clone(),
                reason: err.error.to_string(),
            })?;
        Ok(())
    }

    /// Move the reject file aside so a rescan sees rejected families too.
    pub fn park(&self) -> Result<()> {
        if self.path.exists() {
            fs::rename(&self.path, self.parked_path())?;
        }
        Ok(())
    }

    /// Undo [`park`](Self::park). Missing parked file is fine; the list
    /// may simply have been empty.
    pub fn restore(&self) -> Result<()> {
        let parked = self.parked_path();
        if parked.exists() {
            if let Err(err) = fs::rename(&parked, &self.path) {
                warn!(file = %self.path.display(), %err, "could not restore reject file");
                return Err(err.into());
            }
        }
        Ok(())
    }
}

fn render_rejects(names: &BTreeSet<String>) -> String {
    let mut out = String::new();
    out.push_str("<?xml version=\"1.0\"?>\n");
    out.push_str("<!DOCTYPE fontconfig SYSTEM \"fonts.dtd\">\n");
    out.push_str("<fontconfig>\n  <selectfont>\n    <rejectfont>\n");
    for name in names {
        out.push_str("      <pattern>\n");
        out.push_str("        <patelt name=\"family\">\n");
        out.push_str(&format!(
            "          <string>{}</string>\n",
            xml::escape(name)
        ));
        out.push_str("        </patelt>\n");
        out.push_str("      </pattern>\n");
    }
    out.push_str("    </rejectfont>\n  </selectfont>\n</fontconfig>\n");
    out
}

fn parse_rejects(text: &str) -> BTreeSet<String> {
    let mut names = BTreeSet::new();
    for line in text.lines() {
        let line = line.trim();
        if let Some(rest) = line.strip_prefix("<string>") {
            if let Some(inner) = rest.strip_suffix("</string>") {
                names.insert(xml::unescape(inner));
            }
        }
    }
    names
}
