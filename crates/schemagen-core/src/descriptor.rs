//! # Type Descriptors
//!
//! A [`TypeDescriptor`] ties one input schema file to the canonical type
//! identifier it produces. A [`TypeSet`] is the ordered collection for a
//! whole run and is the only place the uniqueness invariant is checked.
//!
//! ## Invariants
//!
//! - One descriptor per input schema file.
//! - Canonical names are non-empty and unique across the set.
//! - Module file stems (`canonical.to_lowercase()`) are unique as well,
//!   since per-type artifacts are named after them.
//! - Order is the discovery order of the loader and is never re-sorted.

use std::collections::HashMap;

use serde_json::Value;

use crate::error::SchemagenError;
use crate::naming::{canonicalize, module_file_stem, schema_stem};

/// One input schema and the type identifier derived from its file name.
#[derive(Debug, Clone, PartialEq)]
pub struct TypeDescriptor {
    /// File name the schema was read from (e.g. `user-profile.schema.json`).
    pub source_file_name: String,
    /// Canonical type identifier (e.g. `UserProfile`).
    pub canonical_name: String,
    /// The schema as loaded, before reference resolution.
    pub schema: Value,
}

impl TypeDescriptor {
    /// Build a descriptor, canonicalizing the file name.
    pub fn new(source_file_name: impl Into<String>, schema: Value) -> Self {
        let source_file_name = source_file_name.into();
        let canonical_name = canonicalize(&source_file_name);
        Self {
            source_file_name,
            canonical_name,
            schema,
        }
    }

    /// Schema file stem, which is also the key of this type in a bundle.
    pub fn stem(&self) -> &str {
        schema_stem(&self.source_file_name)
    }

    /// Lower-cased stem of the per-type artifact files.
    pub fn module_file_stem(&self) -> String {
        module_file_stem(&self.canonical_name)
    }
}

/// Ordered set of type descriptors with unique canonical names.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TypeSet {
    descriptors: Vec<TypeDescriptor>,
}

impl TypeSet {
    /// Build a set, preserving the given order.
    ///
    /// # Errors
    ///
    /// - [`SchemagenError::EmptyCanonicalName`] if a file name canonicalizes
    ///   to the empty string.
    /// - [`SchemagenError::DuplicateCanonicalName`] if two descriptors share a
    ///   canonical name or a module file stem.
    pub fn new(descriptors: Vec<TypeDescriptor>) -> Result<Self, SchemagenError> {
        Self::check_unique(&descriptors)?;
        Ok(Self { descriptors })
    }

    fn check_unique(descriptors: &[TypeDescriptor]) -> Result<(), SchemagenError> {
        let mut by_name: HashMap<&str, &str> = HashMap::new();
        let mut by_file_stem: HashMap<String, &str> = HashMap::new();

        for descriptor in descriptors {
            let file = descriptor.source_file_name.as_str();
            if descriptor.canonical_name.is_empty() {
                return Err(SchemagenError::EmptyCanonicalName {
                    file: file.to_string(),
                });
            }

            if let Some(first) = by_name.insert(descriptor.canonical_name.as_str(), file) {
                return Err(SchemagenError::DuplicateCanonicalName {
                    name: descriptor.canonical_name.clone(),
                    first: first.to_string(),
                    second: file.to_string(),
                });
            }

            let file_stem = descriptor.module_file_stem();
            if let Some(first) = by_file_stem.insert(file_stem.clone(), file) {
                return Err(SchemagenError::DuplicateCanonicalName {
                    name: file_stem,
                    first: first.to_string(),
                    second: file.to_string(),
                });
            }
        }
        Ok(())
    }

    /// Number of types.
    pub fn len(&self) -> usize {
        self.descriptors.len()
    }

    /// Returns `true` if the set holds no types.
    pub fn is_empty(&self) -> bool {
        self.descriptors.is_empty()
    }

    /// Iterate in discovery order.
    pub fn iter(&self) -> std::slice::Iter<'_, TypeDescriptor> {
        self.descriptors.iter()
    }

    /// Descriptors as a slice, in discovery order.
    pub fn as_slice(&self) -> &[TypeDescriptor] {
        &self.descriptors
    }

    /// Canonical names in discovery order.
    pub fn canonical_names(&self) -> Vec<&str> {
        self.descriptors
            .iter()
            .map(|d| d.canonical_name.as_str())
            .collect()
    }

    /// Look up the descriptor whose bundle key (file stem) is `stem`.
    pub fn by_stem(&self, stem: &str) -> Option<&TypeDescriptor> {
        self.descriptors.iter().find(|d| d.stem() == stem)
    }
}

impl<'a> IntoIterator for &'a TypeSet {
    type Item = &'a TypeDescriptor;
    type IntoIter = std::slice::Iter<'a, TypeDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn descriptor(file: &str) -> TypeDescriptor {
        TypeDescriptor::new(file, json!({"type": "object"}))
    }

    #[test]
    fn descriptor_derives_names() {
        let d = descriptor("user-profile.schema.json");
        assert_eq!(d.canonical_name, "UserProfile");
        assert_eq!(d.stem(), "user-profile");
        assert_eq!(d.module_file_stem(), "userprofile");
    }

    #[test]
    fn set_preserves_input_order() {
        let set = TypeSet::new(vec![
            descriptor("zeta.schema.json"),
            descriptor("alpha.schema.json"),
        ])
        .unwrap();
        assert_eq!(set.canonical_names(), vec!["Zeta", "Alpha"]);
        assert_eq!(set.by_stem("alpha").unwrap().canonical_name, "Alpha");
    }

    #[test]
    fn duplicate_canonical_names_are_rejected() {
        let err = TypeSet::new(vec![
            descriptor("user-profile.schema.json"),
            descriptor("user_profile.schema.json"),
        ])
        .unwrap_err();
        match err {
            SchemagenError::DuplicateCanonicalName { name, first, second } => {
                assert_eq!(name, "UserProfile");
                assert_eq!(first, "user-profile.schema.json");
                assert_eq!(second, "user_profile.schema.json");
            }
            other => panic!("expected DuplicateCanonicalName, got {other}"),
        }
    }

    #[test]
    fn module_file_collisions_are_rejected() {
        let err = TypeSet::new(vec![
            descriptor("user-profile.schema.json"),
            descriptor("userprofile.schema.json"),
        ])
        .unwrap_err();
        assert!(
            matches!(err, SchemagenError::DuplicateCanonicalName { ref name, .. } if name == "userprofile"),
            "got {err}"
        );
    }

    #[test]
    fn empty_canonical_name_is_rejected() {
        let err = TypeSet::new(vec![descriptor("---___.schema.json")]).unwrap_err();
        assert!(matches!(err, SchemagenError::EmptyCanonicalName { .. }));
    }

    #[test]
    fn empty_set_is_allowed() {
        let set = TypeSet::new(Vec::new()).unwrap();
        assert!(set.is_empty());
        assert_eq!(set.len(), 0);
    }
}
