//! # Type Emitter
//!
//! Compiles JSON Schema into serde-derived Rust types in three steps:
//! lowering into an IR ([`ir`]), naming nested items, and rendering
//! ([`render`]).
//!
//! ## Mapping
//!
//! | Schema | Rust |
//! |---|---|
//! | object with `properties` | `struct`; optional fields are `Option<T>` |
//! | `additionalProperties: false` | `#[serde(deny_unknown_fields)]` |
//! | object without `properties` | `BTreeMap<String, T>` or `serde_json::Map` |
//! | `enum` of strings | `enum` with `#[serde(rename)]` variants |
//! | `oneOf` / `anyOf` | `#[serde(untagged)]` enum, or `Option<T>` with `null` |
//! | `allOf` | merged schema |
//! | `string` / `integer` / `number` / `boolean` / `null` | `String` / `i64` / `f64` / `bool` / `()` |
//! | `integer` with `minimum >= 0` or `exclusiveMinimum > -1` | `u64` |
//! | `array` | `Vec<T>` |
//! | anything else | `serde_json::Value` |
//!
//! Nested inline objects, enums and unions become named items called
//! `<Parent><Field>`; collisions are numbered.
//!
//! ## Modes
//!
//! - [`emit_type_module`]: one module per dereferenced schema.
//! - [`emit_bundled_types`]: one module for a whole bundle. Local pointers
//!   become named types and recursive containment is boxed.

pub mod ir;
pub mod lower;
pub mod render;

use schemagen_core::{module_file_stem, GeneratedArtifact};
use schemagen_schema::BundledSchema;
use serde_json::Value;

use crate::ident::type_ident;
use crate::layout::{type_module_path, BUNDLED_TYPES_PATH};
use ir::Item;
use lower::Lowerer;

/// Items for one dereferenced schema; the first named item is the root type.
pub fn lower_type_module(canonical_name: &str, schema: &Value) -> Vec<Item> {
    let mut lowerer = Lowerer::standalone();
    lowerer.lower_root(schema, &type_ident(canonical_name));
    lowerer.finish()
}

/// `src/types/<stem>.rs` for one dereferenced schema.
pub fn emit_type_module(canonical_name: &str, schema: &Value) -> GeneratedArtifact {
    let items = lower_type_module(canonical_name, schema);
    GeneratedArtifact::new(
        type_module_path(&module_file_stem(canonical_name)),
        render::render_module(&items),
    )
}

/// Items for every member of a bundle, in bundle order.
pub fn lower_bundle(bundle: &BundledSchema) -> Vec<Item> {
    let mut lowerer = Lowerer::for_document(&bundle.document);
    let pointers: Vec<String> = bundle
        .members
        .iter()
        .map(|member| {
            let pointer = member.location();
            lowerer.bind(&pointer, &type_ident(&member.canonical_name()));
            pointer
        })
        .collect();
    for pointer in &pointers {
        lowerer.lower_pointer(pointer);
    }
    lowerer.finish()
}

/// `src/types.rs` defining every type of a bundle.
pub fn emit_bundled_types(bundle: &BundledSchema) -> GeneratedArtifact {
    GeneratedArtifact::new(BUNDLED_TYPES_PATH, render::render_module(&lower_bundle(bundle)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use schemagen_schema::BundleMember;
    use serde_json::json;

    #[test]
    fn per_type_module_path_and_root_type() {
        let artifact = emit_type_module(
            "UserProfile",
            &json!({
                "type": "object",
                "properties": {"displayName": {"type": "string"}},
                "required": ["displayName"]
            }),
        );
        assert_eq!(artifact.relative_path, "src/types/userprofile.rs");
        assert!(artifact.source_text.starts_with("// @generated by schemagen\n"));
        assert!(artifact.source_text.contains("pub struct UserProfile {"));
        assert!(artifact.source_text.contains("#[serde(rename = \"displayName\")]"));
        assert!(artifact.source_text.contains("pub display_name: String,"));
    }

    #[test]
    fn emission_is_deterministic() {
        let schema = json!({
            "type": "object",
            "properties": {
                "b": {"type": "object", "properties": {"x": {"enum": ["p", "q"]}}},
                "a": {"oneOf": [{"type": "string"}, {"type": "integer"}]}
            }
        });
        let first = emit_type_module("Thing", &schema);
        for _ in 0..5 {
            assert_eq!(emit_type_module("Thing", &schema), first);
        }
    }

    #[test]
    fn digit_leading_names_are_sanitized() {
        let artifact = emit_type_module("2userProfile", &json!({"type": "object", "properties": {}}));
        assert_eq!(artifact.relative_path, "src/types/2userprofile.rs");
        assert!(artifact.source_text.contains("pub struct _2userProfile {"));
    }

    #[test]
    fn bundled_types_link_members() {
        let bundle = BundledSchema {
            document: json!({
                "$schema": "https://json-schema.org/draft/2020-12/schema",
                "$defs": {
                    "address": {
                        "type": "object",
                        "properties": {"street": {"type": "string"}},
                        "required": ["street"]
                    },
                    "person": {
                        "type": "object",
                        "properties": {
                            "home": {"$ref": "#/$defs/address"},
                            "friends": {"type": "array", "items": {"$ref": "#/$defs/person"}}
                        }
                    }
                }
            }),
            members: vec![
                BundleMember { key: "address".into(), file_name: "address.schema.json".into() },
                BundleMember { key: "person".into(), file_name: "person.schema.json".into() },
            ],
        };
        let artifact = emit_bundled_types(&bundle);
        assert_eq!(artifact.relative_path, "src/types.rs");
        let text = &artifact.source_text;
        assert_eq!(text.matches("pub struct Address {").count(), 1);
        assert!(text.contains("pub struct Person {"));
        assert!(text.contains("pub home: Option<Address>,"));
        assert!(text.contains("pub friends: Option<Vec<Box<Person>>>,"));
        assert!(text.find("pub struct Address").unwrap() < text.find("pub struct Person").unwrap());
    }
}
