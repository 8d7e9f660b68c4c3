//! Filesystem scanning: the collaborator that populates the file index.
//!
//! The reconciliation engine only depends on the [`FileScanner`] trait; the
//! shipped implementation walks configured font directories and reads
//! metadata out of each font's `name` table.

use std::collections::BTreeMap;

use crate::enumerate::EnumeratedFamily;
use crate::error::Result;
use crate::family::FaceDescriptor;
use crate::index::FontFileRecord;
use crate::progress::{CancelToken, Progress};

/// Produces the full row set for the file index.
pub trait FileScanner {
    /// Scan and return one row per recognized font file/style. `label` is
    /// the progress message to report; cancellation aborts the scan with
    /// [`crate::CatalogError::Cancelled`] and leaves no partial output.
    fn scan(
        &self,
        label: &str,
        progress: &mut dyn FnMut(&Progress),
        cancel: &CancelToken,
    ) -> Result<Vec<FontFileRecord>>;
}

/// Fixed row set, for tests and offline use.
#[derive(Debug, Clone, Default)]
pub struct StaticScanner {
    rows: Vec<FontFileRecord>,
}

impl StaticScanner {
    pub fn new(rows: Vec<FontFileRecord>) -> Self {
        Self { rows }
    }
}

impl FileScanner for StaticScanner {
    fn scan(
        &self,
        label: &str,
        progress: &mut dyn FnMut(&Progress),
        cancel: &CancelToken,
    ) -> Result<Vec<FontFileRecord>> {
        if cancel.is_cancelled() {
            return Err(crate::CatalogError::Cancelled);
        }
        progress(&Progress::new(label, self.rows.len(), self.rows.len()));
        Ok(self.rows.clone())
    }
}

/// Group index rows into enumerated families (one face per style row).
pub fn families_from_rows(rows: &[FontFileRecord]) -> Vec<EnumeratedFamily> {
    let mut grouped: BTreeMap<String, Vec<FaceDescriptor>> = BTreeMap::new();
    for row in rows {
        let faces = grouped.entry(row.family.clone()).or_default();
        if !faces.iter().any(|face| face.name == row.style) {
            faces.push(FaceDescriptor {
                name: row.style.clone(),
                description: row.description.clone(),
            });
        }
    }
    grouped
        .into_iter()
        .map(|(name, faces)| EnumeratedFamily { name, faces })
        .collect()
}

#[cfg(feature = "fontations")]
pub use fontations::FontDirScanner;

#[cfg(feature = "fontations")]
mod fontations {
    use std::fs;
    use std::path::{Path, PathBuf};

    use read_fonts::tables::name::NameId;
    use read_fonts::{FontRef, TableProvider};
    use tracing::warn;
    use walkdir::WalkDir;

    use super::{families_from_rows, FileScanner};
    use crate::enumerate::{EnumeratedFamily, FamilyEnumerator};
    use crate::error::Result;
    use crate::family::Owner;
    use crate::index::FontFileRecord;
    use crate::progress::{CancelToken, Progress};
    use crate::CatalogError;

    /// Recursive directory scanner backed by `read-fonts`.
    #[derive(Debug, Clone)]
    pub struct FontDirScanner {
        roots: Vec<PathBuf>,
        home: Option<PathBuf>,
        follow_symlinks: bool,
    }

    impl FontDirScanner {
        pub fn new<I, P>(roots: I) -> Self
        where
            I: IntoIterator<Item = P>,
            P: Into<PathBuf>,
        {
            Self {
                roots: roots.into_iter().map(Into::into).collect(),
                home: std::env::var_os("HOME").map(PathBuf::from),
                follow_symlinks: false,
            }
        }

        /// Paths under `home` are classified as user-owned.
        pub fn with_home(mut self, home: impl Into<PathBuf>) -> Self {
            self.home = Some(home.into());
            self
        }

        pub fn follow_symlinks(mut self, follow: bool) -> Self {
            self.follow_symlinks = follow;
            self
        }

        fn candidate_files(&self) -> Vec<PathBuf> {
            let mut found = Vec::new();
            for root in &self.roots {
                if !root.exists() {
                    continue;
                }
                for entry in WalkDir::new(root)
                    .follow_links(self.follow_symlinks)
                    .into_iter()
                    .filter_map(|e| e.ok())
                {
                    if entry.file_type().is_file() && is_font(entry.path()) {
                        found.push(entry.path().to_path_buf());
                    }
                }
            }
            found.sort();
            found
        }

        fn owner_of(&self, path: &Path) -> Owner {
            match &self.home {
                Some(home) if path.starts_with(home) => Owner::User,
                _ => Owner::System,
            }
        }

        fn rows_for_file(&self, path: &Path) -> Result<Vec<FontFileRecord>> {
            let data = fs::read(path)?;
            let filesize = data.len() as u64;
            let filetype = filetype_of(path);
            let owner = self.owner_of(path);
            let mut rows = Vec::new();

            for font in FontRef::fonts(&data) {
                let font = match font {
                    Ok(font) => font,
                    Err(err) => {
                        warn!(path = %path.display(), %err, "skipping unreadable face");
                        continue;
                    }
                };
                let family = match name_entry(
                    &font,
                    &[NameId::TYPOGRAPHIC_FAMILY_NAME, NameId::FAMILY_NAME],
                ) {
                    Some(family) => family,
                    None => {
                        warn!(path = %path.display(), "face without a family name");
                        continue;
                    }
                };
                let style = name_entry(
                    &font,
                    &[NameId::TYPOGRAPHIC_SUBFAMILY_NAME, NameId::SUBFAMILY_NAME],
                )
                .unwrap_or_else(|| "Regular".to_string());
                let postscript_name = name_entry(&font, &[NameId::POSTSCRIPT_NAME]);
                let description = format!("{family} {style}");

                rows.push(FontFileRecord {
                    family,
                    style,
                    filepath: path.to_path_buf(),
                    filetype: filetype.clone(),
                    filesize,
                    postscript_name,
                    description,
                    owner,
                    foundry: foundry_of(&font),
                });
            }

            Ok(rows)
        }
    }

    impl FileScanner for FontDirScanner {
        fn scan(
            &self,
            label: &str,
            progress: &mut dyn FnMut(&Progress),
            cancel: &CancelToken,
        ) -> Result<Vec<FontFileRecord>> {
            let files = self.candidate_files();
            let mut rows = Vec::new();
            for (done, path) in files.iter().enumerate() {
                if cancel.is_cancelled() {
                    return Err(CatalogError::Cancelled);
                }
                match self.rows_for_file(path) {
                    Ok(mut file_rows) => rows.append(&mut file_rows),
                    Err(err) => {
                        warn!(path = %path.display(), %err, "skipping unreadable file");
                    }
                }
                progress(&Progress::new(label, files.len(), done + 1));
            }
            Ok(rows)
        }
    }

    impl FamilyEnumerator for FontDirScanner {
        fn list_families(&self) -> Result<Vec<EnumeratedFamily>> {
            let rows = self.scan("Listing font families", &mut |_| {}, &CancelToken::new())?;
            Ok(families_from_rows(&rows))
        }
    }

    fn is_font(path: &Path) -> bool {
        let ext = match path.extension().and_then(|e| e.to_str()) {
            Some(ext) => ext.to_ascii_lowercase(),
            None => return false,
        };
        matches!(ext.as_str(), "ttf" | "otf" | "ttc" | "otc")
    }

    fn filetype_of(path: &Path) -> String {
        let ext = path
            .extension()
            .and_then(|e| e.to_str())
            .map(str::to_ascii_lowercase)
            .unwrap_or_default();
        match ext.as_str() {
            "ttf" | "ttc" => "TrueType".to_string(),
            "otf" | "otc" => "CFF".to_string(),
            other => other.to_uppercase(),
        }
    }

    fn name_entry(font: &FontRef, wanted: &[NameId]) -> Option<String> {
        let name_table = font.name().ok()?;
        let data = name_table.string_data();
        for id in wanted {
            for record in name_table.name_record() {
                if !record.is_unicode() || record.name_id() != *id {
                    continue;
                }
                if let Ok(entry) = record.string(data) {
                    let rendered = entry.to_string();
                    if !rendered.trim().is_empty() {
                        return Some(rendered.trim().to_string());
                    }
                }
            }
        }
        None
    }

    fn foundry_of(font: &FontRef) -> String {
        let vendor = match font.os2() {
            Ok(table) => {
                let tag = table.ach_vend_id();
                String::from_utf8_lossy(&tag.to_be_bytes()).trim().to_string()
            }
            Err(_) => String::new(),
        };
        if vendor.is_empty() {
            return "unknown".to_string();
        }
        if vendor.len() < 4 {
            vendor.to_uppercase()
        } else {
            let mut chars = vendor.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().collect::<String>() + chars.as_str(),
                None => "unknown".to_string(),
            }
        }
    }
}
