//! Family enumeration from the text-layout subsystem.
//!
//! The layout engine is an external collaborator: the engine only consumes
//! its "list all families" output through the [`FamilyEnumerator`] trait.
//! A filesystem-backed implementation lives in [`crate::scan`]; tests use
//! [`StaticEnumerator`].

use crate::error::Result;
use crate::family::FaceDescriptor;

/// Generic alias names the layout engine reports but which are never
/// indexed and never cataloged.
pub const ALIAS_FAMILIES: [&str; 3] = ["Monospace", "Sans", "Serif"];

/// One family as reported by the layout engine.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EnumeratedFamily {
    pub name: String,
    pub faces: Vec<FaceDescriptor>,
}

/// The layout engine's "list all families" call.
pub trait FamilyEnumerator {
    fn list_families(&self) -> Result<Vec<EnumeratedFamily>>;
}

/// Fixed in-memory enumeration, for tests and offline use.
#[derive(Debug, Clone, Default)]
pub struct StaticEnumerator {
    families: Vec<EnumeratedFamily>,
}

impl StaticEnumerator {
    pub fn new(families: Vec<EnumeratedFamily>) -> Self {
        Self { families }
    }
}

impl FamilyEnumerator for StaticEnumerator {
    fn list_families(&self) -> Result<Vec<EnumeratedFamily>> {
        Ok(self.families.clone())
    }
}

/// True for the generic alias families ("Sans", "Serif", "Monospace").
pub fn is_alias_family(name: &str) -> bool {
    ALIAS_FAMILIES.contains(&name)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn aliases_are_recognized() {
        assert!(is_alias_family("Sans"));
        assert!(is_alias_family("Monospace"));
        assert!(!is_alias_family("DejaVu Sans"));
    }

    #[test]
    fn static_enumerator_returns_its_families() {
        let source = StaticEnumerator::new(vec![EnumeratedFamily {
            name: "DejaVu Sans".into(),
            faces: vec![FaceDescriptor {
                name: "Book".into(),
                description: "DejaVu Sans Book".into(),
            }],
        }]);
        let families = source.list_families().unwrap();
        assert_eq!(families.len(), 1);
        assert_eq!(families[0].faces[0].name, "Book");
    }
}
