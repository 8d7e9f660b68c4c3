//! Family, face and file-detail types.

use std::collections::BTreeMap;
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

/// Who installed the files backing a family.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Owner {
    System,
    User,
}

/// Details about the file backing one style, read from the file index.
/// Immutable once constructed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FileDetails {
    pub filepath: PathBuf,
    pub filetype: String,
    pub filesize: u64,
    /// `None` when PostScript name extraction failed during indexing.
    pub postscript_name: Option<String>,
}

/// One face as reported by the layout-engine enumerator.
///
/// The `description` string is the join key against the file index: a face
/// matches the index row carrying the identical description.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FaceDescriptor {
    pub name: String,
    pub description: String,
}

/// A named group of related font faces, with per-style file details for
/// every face that has a matching index row.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Family {
    pub name: String,
    pub owner: Owner,
    pub enabled: bool,
    /// Enumerator handles for preview/describe operations. Not owned data:
    /// never serialized, reattached after every cache load.
    #[serde(skip)]
    pub faces: Vec<FaceDescriptor>,
    /// Style name to file details. Every key is a face name the enumerator
    /// reported for this family; faces without a matching file row are
    /// simply absent.
    pub styles: BTreeMap<String, FileDetails>,
}

impl Family {
    pub fn new(name: impl Into<String>, owner: Owner) -> Self {
        Self {
            name: name.into(),
            owner,
            enabled: true,
            faces: Vec::new(),
            styles: BTreeMap::new(),
        }
    }

    /// Number of styles with a backing file.
    pub fn style_count(&self) -> usize {
        self.styles.len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_families_start_enabled() {
        let family = Family::new("DejaVu Sans", Owner::System);
        assert!(family.enabled);
        assert_eq!(family.style_count(), 0);
    }

    #[test]
    fn faces_are_not_serialized() {
        let mut family = Family::new("DejaVu Sans", Owner::User);
        family.faces.push(FaceDescriptor {
            name: "Book".into(),
            description: "DejaVu Sans Book".into(),
        });
        let json = serde_json::to_string(&family).unwrap();
        let back: Family = serde_json::from_str(&json).unwrap();
        assert!(back.faces.is_empty());
        assert_eq!(back.name, family.name);
        assert_eq!(back.owner, Owner::User);
    }

    #[test]
    fn owner_serializes_as_plain_string() {
        assert_eq!(serde_json::to_string(&Owner::System).unwrap(), "\"System\"");
        assert_eq!(serde_json::to_string(&Owner::User).unwrap(), "\"User\"");
    }
}
