//! # Bundling
//!
//! Merges a whole schema directory into one document:
//!
//! ```json
//! {
//!   "$schema": "https://json-schema.org/draft/2020-12/schema",
//!   "$defs": {
//!     "address": { ... },
//!     "person": { "properties": { "home": { "$ref": "#/$defs/address" } } }
//!   }
//! }
//! ```
//!
//! Each input document lives under its file stem. References between
//! members, and local references inside a member, are rewritten into
//! pointers into the bundle instead of being expanded, so cycles between
//! schemas survive as pointer cycles.
//!
//! ## Files outside the member set
//!
//! A referenced file that is not a member is inlined at the first place it
//! is referenced (members in file-name order, keys in document order).
//! That location is recorded before descending, so later references, and
//! references from inside the inlined content back to itself, become
//! pointers to it.
//!
//! ## Dialect
//!
//! Member roots lose `$schema` and `$id`: the wrapper declares the dialect,
//! and a nested `$id` would re-base every `#/$defs/...` pointer below it.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use schemagen_core::{canonicalize_stem, schema_stem, ResolveError, SchemagenError};
use serde_json::{Map, Value};

use crate::loader::{SchemaDocument, SchemaLoader};
use crate::reference::{
    child_kind, document_key, escape_pointer_token, pointer_fragment, ChildKind, DocumentCache,
    RefTarget,
};

/// Dialect declared by every bundle.
pub const DRAFT_2020_12: &str = "https://json-schema.org/draft/2020-12/schema";

/// Root keywords removed from every inlined document.
const STRIPPED_ROOT_KEYWORDS: [&str; 2] = ["$schema", "$id"];

/// One input file of a bundle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BundleMember {
    /// Key under `$defs` (the schema file stem).
    pub key: String,
    /// Source file name.
    pub file_name: String,
}

impl BundleMember {
    /// Type identifier for this member.
    pub fn canonical_name(&self) -> String {
        canonicalize_stem(&self.key)
    }

    /// JSON pointer to this member's definition inside the bundle.
    pub fn location(&self) -> String {
        format!("/$defs/{}", escape_pointer_token(&self.key))
    }

    /// Local pointer to this member, usable as a `$ref` inside the bundle.
    pub fn pointer(&self) -> String {
        pointer_fragment(&self.location())
    }
}

/// A merged schema document plus the members it was built from.
#[derive(Debug, Clone, PartialEq)]
pub struct BundledSchema {
    /// The bundle itself.
    pub document: Value,
    /// Members in bundle order (file-name order).
    pub members: Vec<BundleMember>,
}

impl BundledSchema {
    /// The `$defs` mapping of the bundle.
    pub fn definitions(&self) -> Option<&Map<String, Value>> {
        self.document.get("$defs").and_then(Value::as_object)
    }

    /// Schema of the member stored under `key`.
    pub fn member_schema(&self, key: &str) -> Option<&Value> {
        self.definitions().and_then(|defs| defs.get(key))
    }

    /// Number of members.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// Returns `true` if the bundle has no members.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }
}

/// Bundle every schema of `dir`.
///
/// # Errors
///
/// Loader errors, and [`SchemagenError::ReferenceResolution`] for
/// unresolvable references.
pub fn bundle_directory(dir: &Path) -> Result<BundledSchema, SchemagenError> {
    let documents = SchemaLoader::new(dir).load()?;
    bundle_documents(&documents)
}

/// Bundle loaded documents. Input order does not matter; members are
/// processed in file-name order.
///
/// # Errors
///
/// [`SchemagenError::ReferenceResolution`] naming the member whose
/// reference could not be resolved.
pub fn bundle_documents(documents: &[SchemaDocument]) -> Result<BundledSchema, SchemagenError> {
    let mut sorted: Vec<&SchemaDocument> = documents.iter().collect();
    sorted.sort_by(|a, b| a.file_name.cmp(&b.file_name));

    let mut bundler = Bundler::default();
    let mut members = Vec::with_capacity(sorted.len());
    let mut roots = Vec::with_capacity(sorted.len());
    for document in &sorted {
        let key = schema_stem(&document.file_name).to_string();
        let location = format!("/$defs/{}", escape_pointer_token(&key));
        let doc_key = bundler.cache.seed(&document.path, document.value.clone());
        bundler.sites.insert((doc_key.clone(), String::new()), location.clone());
        members.push(BundleMember {
            key,
            file_name: document.file_name.clone(),
        });
        roots.push((doc_key, location));
    }

    let mut defs = Map::with_capacity(sorted.len());
    for ((document, member), (doc_key, location)) in sorted.iter().zip(&members).zip(&roots) {
        let rewritten = bundler
            .rewrite(&strip_root(&document.value), doc_key, location)
            .map_err(|source| SchemagenError::ReferenceResolution {
                file: document.file_name.clone(),
                source,
            })?;
        defs.insert(member.key.clone(), rewritten);
    }

    let mut wrapper = Map::new();
    wrapper.insert("$schema".to_string(), Value::String(DRAFT_2020_12.to_string()));
    wrapper.insert("$defs".to_string(), Value::Object(defs));

    tracing::info!(members = members.len(), "bundled schemas");
    Ok(BundledSchema {
        document: Value::Object(wrapper),
        members,
    })
}

fn strip_root(value: &Value) -> Value {
    match value {
        Value::Object(map) => {
            let mut map = map.clone();
            for keyword in STRIPPED_ROOT_KEYWORDS {
                map.remove(keyword);
            }
            Value::Object(map)
        }
        other => other.clone(),
    }
}

#[derive(Default)]
struct Bundler {
    cache: DocumentCache,
    /// Bundle location of every (document, pointer) already placed.
    sites: HashMap<(PathBuf, String), String>,
}

impl Bundler {
    /// Bundle location of `pointer` in `doc`, if it or an ancestor of it is
    /// already placed.
    fn site_of(&self, doc: &Path, pointer: &str) -> Option<String> {
        let mut prefix = pointer;
        loop {
            if let Some(location) = self.sites.get(&(doc.to_path_buf(), prefix.to_string())) {
                return Some(format!("{location}{}", &pointer[prefix.len()..]));
            }
            if prefix.is_empty() {
                return None;
            }
            prefix = match prefix.rfind('/') {
                Some(cut) => &prefix[..cut],
                None => "",
            };
        }
    }

    /// Rewrite a schema node of document `doc` that will sit at `here`.
    fn rewrite(&mut self, node: &Value, doc: &Path, here: &str) -> Result<Value, ResolveError> {
        match node {
            Value::Object(map) => match map.get("$ref") {
                Some(Value::String(reference)) => self.rewrite_ref(reference, map, doc, here),
                _ => self.rewrite_entries(map, doc, here).map(Value::Object),
            },
            Value::Array(items) => items
                .iter()
                .enumerate()
                .map(|(i, item)| self.rewrite(item, doc, &format!("{here}/{i}")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            scalar => Ok(scalar.clone()),
        }
    }

    fn rewrite_entries(
        &mut self,
        map: &Map<String, Value>,
        doc: &Path,
        here: &str,
    ) -> Result<Map<String, Value>, ResolveError> {
        let mut out = Map::with_capacity(map.len());
        for (key, child) in map {
            let child_here = format!("{here}/{}", escape_pointer_token(key));
            let rewritten = match (child_kind(key), child) {
                (ChildKind::Data, _) => child.clone(),
                (ChildKind::NamedSchemas, Value::Object(named)) => {
                    let mut rewritten_named = Map::with_capacity(named.len());
                    for (name, schema) in named {
                        let named_here = format!("{child_here}/{}", escape_pointer_token(name));
                        rewritten_named.insert(name.clone(), self.rewrite(schema, doc, &named_here)?);
                    }
                    Value::Object(rewritten_named)
                }
                _ => self.rewrite(child, doc, &child_here)?,
            };
            out.insert(key.clone(), rewritten);
        }
        Ok(out)
    }

    fn rewrite_ref(
        &mut self,
        reference: &str,
        node: &Map<String, Value>,
        doc: &Path,
        here: &str,
    ) -> Result<Value, ResolveError> {
        let target = RefTarget::parse(reference)?;
        let target_doc = match &target.file {
            None => doc.to_path_buf(),
            Some(file) => document_key(&self.cache.locate(reference, doc, file)?),
        };

        if let Some(location) = self.site_of(&target_doc, &target.pointer) {
            let mut out = Map::with_capacity(node.len());
            for (key, child) in node {
                if key == "$ref" {
                    out.insert(key.clone(), Value::String(pointer_fragment(&location)));
                } else {
                    let mut single = Map::new();
                    single.insert(key.clone(), child.clone());
                    out.extend(self.rewrite_entries(&single, doc, here)?);
                }
            }
            return Ok(Value::Object(out));
        }

        // First reference to content outside the member set: inline it here.
        let (_, resolved) = self.cache.resolve(reference, doc, &target)?;
        let resolved = if target.pointer.is_empty() {
            strip_root(&resolved)
        } else {
            resolved
        };
        tracing::debug!(reference, location = here, "inlining external schema");

        let mut siblings = node.clone();
        siblings.remove("$ref");
        if siblings.is_empty() {
            self.sites
                .insert((target_doc.clone(), target.pointer.clone()), here.to_string());
            return self.rewrite(&resolved, &target_doc, here);
        }

        let inline_here = format!("{here}/allOf/0");
        self.sites
            .insert((target_doc.clone(), target.pointer.clone()), inline_here.clone());
        let inlined = self.rewrite(&resolved, &target_doc, &inline_here)?;
        let siblings = self.rewrite_entries(&siblings, doc, &format!("{here}/allOf/1"))?;

        let mut wrapper = Map::new();
        wrapper.insert(
            "allOf".to_string(),
            Value::Array(vec![inlined, Value::Object(siblings)]),
        );
        Ok(Value::Object(wrapper))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use std::fs;

    fn write(dir: &Path, name: &str, value: &Value) {
        fs::write(dir.join(name), serde_json::to_string_pretty(value).unwrap()).unwrap();
    }

    fn document(dir: &Path, name: &str, value: Value) -> SchemaDocument {
        write(dir, name, &value);
        SchemaDocument::new(dir.join(name), value)
    }

    #[test]
    fn one_definition_per_member_in_name_order() {
        let tmp = tempfile::tempdir().unwrap();
        let documents = vec![
            document(tmp.path(), "zeta.schema.json", json!({"type": "string"})),
            document(tmp.path(), "alpha.schema.json", json!({"type": "integer"})),
            document(tmp.path(), "mid-point.schema.json", json!({"type": "boolean"})),
        ];
        let bundle = bundle_documents(&documents).unwrap();

        assert_eq!(bundle.document["$schema"], DRAFT_2020_12);
        let keys: Vec<&String> = bundle.definitions().unwrap().keys().collect();
        assert_eq!(keys, vec!["alpha", "mid-point", "zeta"]);
        assert_eq!(bundle.len(), 3);
        assert_eq!(bundle.members[1].canonical_name(), "MidPoint");
        assert_eq!(bundle.members[1].pointer(), "#/$defs/mid-point");
    }

    #[test]
    fn member_references_become_local_pointers() {
        let tmp = tempfile::tempdir().unwrap();
        let documents = vec![
            document(
                tmp.path(),
                "address.schema.json",
                json!({
                    "$schema": DRAFT_2020_12,
                    "$id": "https://example.com/address.schema.json",
                    "type": "object",
                    "properties": {"zip": {"$ref": "#/$defs/Zip"}},
                    "$defs": {"Zip": {"type": "string"}}
                }),
            ),
            document(
                tmp.path(),
                "person.schema.json",
                json!({
                    "type": "object",
                    "properties": {
                        "home": {"$ref": "address.schema.json"},
                        "zip": {"$ref": "./address.schema.json#/$defs/Zip", "description": "Postal code"}
                    }
                }),
            ),
        ];
        let bundle = bundle_documents(&documents).unwrap();

        let address = bundle.member_schema("address").unwrap();
        assert!(address.get("$schema").is_none());
        assert!(address.get("$id").is_none());
        assert_eq!(address["properties"]["zip"]["$ref"], "#/$defs/address/$defs/Zip");

        let person = bundle.member_schema("person").unwrap();
        assert_eq!(person["properties"]["home"], json!({"$ref": "#/$defs/address"}));
        assert_eq!(
            person["properties"]["zip"],
            json!({"$ref": "#/$defs/address/$defs/Zip", "description": "Postal code"})
        );
    }

    #[test]
    fn pointers_with_spaces_are_percent_encoded() {
        let tmp = tempfile::tempdir().unwrap();
        let documents = vec![
            document(
                tmp.path(),
                "my file.schema.json",
                json!({
                    "type": "object",
                    "properties": {"zip": {"$ref": "#/$defs/Postal%20Code"}},
                    "$defs": {"Postal Code": {"type": "string"}}
                }),
            ),
            document(
                tmp.path(),
                "other.schema.json",
                json!({"properties": {"mine": {"$ref": "my%20file.schema.json"}}}),
            ),
        ];
        let bundle = bundle_documents(&documents).unwrap();

        let member = &bundle.members[0];
        assert_eq!(member.key, "my file");
        assert_eq!(member.location(), "/$defs/my file");
        assert_eq!(member.pointer(), "#/$defs/my%20file");
        assert!(bundle.document.pointer(&member.location()).is_some());

        let mine = bundle.member_schema("my file").unwrap();
        assert_eq!(mine["properties"]["zip"]["$ref"], "#/$defs/my%20file/$defs/Postal%20Code");
        let other = bundle.member_schema("other").unwrap();
        assert_eq!(other["properties"]["mine"]["$ref"], "#/$defs/my%20file");

        let mut root = bundle.document.clone();
        root["$ref"] = json!(bundle.members[1].pointer());
        let validator = jsonschema::validator_for(&root).unwrap();
        assert!(validator.is_valid(&json!({"mine": {"zip": "12345"}})));
        assert!(!validator.is_valid(&json!({"mine": {"zip": 12345}})));
    }

    #[test]
    fn cycles_between_members_survive() {
        let tmp = tempfile::tempdir().unwrap();
        let documents = vec![
            document(
                tmp.path(),
                "a.schema.json",
                json!({"properties": {"b": {"$ref": "b.schema.json"}}}),
            ),
            document(
                tmp.path(),
                "b.schema.json",
                json!({"properties": {"a": {"$ref": "a.schema.json"}}}),
            ),
        ];
        let bundle = bundle_documents(&documents).unwrap();
        assert_eq!(bundle.member_schema("a").unwrap()["properties"]["b"]["$ref"], "#/$defs/b");
        assert_eq!(bundle.member_schema("b").unwrap()["properties"]["a"]["$ref"], "#/$defs/a");
    }

    #[test]
    fn output_is_independent_of_input_order() {
        let tmp = tempfile::tempdir().unwrap();
        let a = document(tmp.path(), "a.schema.json", json!({"$ref": "b.schema.json"}));
        let b = document(tmp.path(), "b.schema.json", json!({"type": "string"}));
        let c = document(tmp.path(), "c.schema.json", json!({"items": {"$ref": "a.schema.json"}}));

        let forward = bundle_documents(&[a.clone(), b.clone(), c.clone()]).unwrap();
        let backward = bundle_documents(&[c, b, a]).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(
            serde_json::to_string(&forward.document).unwrap(),
            serde_json::to_string(&backward.document).unwrap()
        );
    }

    #[test]
    fn non_member_files_are_inlined_once() {
        let tmp = tempfile::tempdir().unwrap();
        write(
            tmp.path(),
            "common.json",
            &json!({"$id": "common", "type": "object", "properties": {"self": {"$ref": "#"}}}),
        );
        let documents = vec![document(
            tmp.path(),
            "order.schema.json",
            json!({
                "properties": {
                    "billing": {"$ref": "common.json"},
                    "shipping": {"$ref": "common.json"}
                }
            }),
        )];
        let bundle = bundle_documents(&documents).unwrap();
        let order = bundle.member_schema("order").unwrap();

        let billing = &order["properties"]["billing"];
        assert_eq!(billing["type"], "object");
        assert!(billing.get("$id").is_none());
        assert_eq!(
            billing["properties"]["self"]["$ref"],
            "#/$defs/order/properties/billing"
        );
        assert_eq!(
            order["properties"]["shipping"],
            json!({"$ref": "#/$defs/order/properties/billing"})
        );
    }

    #[test]
    fn inlined_file_with_siblings_uses_all_of() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "name.json", &json!({"type": "string"}));
        let documents = vec![document(
            tmp.path(),
            "person.schema.json",
            json!({
                "properties": {
                    "first": {"$ref": "name.json", "minLength": 1},
                    "last": {"$ref": "name.json"}
                }
            }),
        )];
        let bundle = bundle_documents(&documents).unwrap();
        let person = bundle.member_schema("person").unwrap();
        assert_eq!(
            person["properties"]["first"],
            json!({"allOf": [{"type": "string"}, {"minLength": 1}]})
        );
        assert_eq!(
            person["properties"]["last"]["$ref"],
            "#/$defs/person/properties/first/allOf/0"
        );
    }

    #[test]
    fn missing_reference_names_the_member() {
        let tmp = tempfile::tempdir().unwrap();
        let documents = vec![document(
            tmp.path(),
            "person.schema.json",
            json!({"properties": {"home": {"$ref": "absent.schema.json"}}}),
        )];
        let err = bundle_documents(&documents).unwrap_err();
        assert_eq!(err.schema_file(), Some("person.schema.json"));
        assert!(matches!(
            err,
            SchemagenError::ReferenceResolution {
                source: ResolveError::MissingFile { .. },
                ..
            }
        ));
    }

    #[test]
    fn directory_bundle_loads_and_sorts() {
        let tmp = tempfile::tempdir().unwrap();
        write(tmp.path(), "b.schema.json", &json!({"type": "string"}));
        write(tmp.path(), "a.schema.json", &json!({"$ref": "b.schema.json"}));
        let bundle = bundle_directory(tmp.path()).unwrap();
        assert_eq!(bundle.members[0].file_name, "a.schema.json");
        assert_eq!(bundle.member_schema("a").unwrap(), &json!({"$ref": "#/$defs/b"}));
    }
}
