//! # Full Dereferencing
//!
//! Replaces every `$ref` in a schema with an expanded copy of its target,
//! recursively, so the result is self-contained and can be embedded in a
//! generated module without any resolver at runtime.
//!
//! ## Sibling keywords
//!
//! Keywords next to a `$ref` are kept. When the target is an object they
//! are merged over it (the sibling wins on a key clash); otherwise the node
//! becomes `{"allOf": [target, siblings]}`.
//!
//! A whole document inlined at a reference site loses its `$schema` and
//! `$id`; the enclosing schema already declares both.
//!
//! ## Termination
//!
//! The expander keeps a stack of the `(document, pointer)` targets it is
//! currently inside. Re-entering one of them means the expansion would
//! never finish, and [`ResolveError::Cycle`] is returned with the chain of
//! targets that closes the loop. A target referenced twice on *different*
//! branches is fine and is simply expanded twice.

use std::path::{Path, PathBuf};

use schemagen_core::{ResolveError, SchemagenError};
use serde_json::{Map, Value};

use crate::loader::SchemaDocument;
use crate::reference::{child_kind, document_key, target_label, ChildKind, DocumentCache, RefTarget};

/// Dereference the schema stored at `path`.
///
/// # Errors
///
/// Any [`ResolveError`]; the file itself failing to load is reported as
/// [`ResolveError::UnreadableFile`].
pub fn dereference_file(path: &Path) -> Result<Value, ResolveError> {
    let mut cache = DocumentCache::new();
    let key = document_key(path);
    let root = cache.get(&path.display().to_string(), &key)?.clone();
    Dereferencer::new(&mut cache).expand(&root, &key)
}

/// Dereference an in-memory schema. Relative file references resolve
/// against the directory of `base_path`; local references resolve against
/// `value` itself.
///
/// # Errors
///
/// Any [`ResolveError`].
pub fn dereference_value(value: &Value, base_path: &Path) -> Result<Value, ResolveError> {
    let mut cache = DocumentCache::new();
    let key = cache.seed(base_path, value.clone());
    Dereferencer::new(&mut cache).expand(value, &key)
}

/// Dereference a loaded document, attributing failures to its file.
///
/// # Errors
///
/// [`SchemagenError::ReferenceResolution`].
pub fn dereference_document(document: &SchemaDocument) -> Result<Value, SchemagenError> {
    let resolved = dereference_value(&document.value, &document.path).map_err(|source| {
        SchemagenError::ReferenceResolution {
            file: document.file_name.clone(),
            source,
        }
    })?;
    tracing::debug!(file = %document.file_name, "dereferenced");
    Ok(resolved)
}

/// Returns `true` if a `$ref` keyword remains anywhere in a schema position
/// of `value`.
pub fn contains_ref(value: &Value) -> bool {
    match value {
        Value::Object(map) => map.iter().any(|(key, child)| {
            if key == "$ref" && child.is_string() {
                return true;
            }
            match child_kind(key) {
                ChildKind::Data => false,
                ChildKind::NamedSchemas => match child {
                    Value::Object(named) => named.values().any(contains_ref),
                    other => contains_ref(other),
                },
                ChildKind::Schema => contains_ref(child),
            }
        }),
        Value::Array(items) => items.iter().any(contains_ref),
        _ => false,
    }
}

/// Resource keywords dropped from a whole document when it is inlined; a
/// nested `$id` would re-base every reference below it.
const INLINED_ROOT_KEYWORDS: [&str; 2] = ["$schema", "$id"];

struct Dereferencer<'a> {
    cache: &'a mut DocumentCache,
    /// Targets currently being expanded, outermost first.
    stack: Vec<(PathBuf, String)>,
}

impl<'a> Dereferencer<'a> {
    fn new(cache: &'a mut DocumentCache) -> Self {
        Self {
            cache,
            stack: Vec::new(),
        }
    }

    /// Expand a schema node that lives in document `doc`.
    fn expand(&mut self, node: &Value, doc: &Path) -> Result<Value, ResolveError> {
        match node {
            Value::Object(map) => match map.get("$ref") {
                Some(Value::String(reference)) => self.expand_ref(reference, map, doc),
                _ => self.expand_entries(map, doc).map(Value::Object),
            },
            Value::Array(items) => items
                .iter()
                .map(|item| self.expand(item, doc))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            scalar => Ok(scalar.clone()),
        }
    }

    fn expand_entries(
        &mut self,
        map: &Map<String, Value>,
        doc: &Path,
    ) -> Result<Map<String, Value>, ResolveError> {
        let mut out = Map::with_capacity(map.len());
        for (key, child) in map {
            let expanded = match (child_kind(key), child) {
                (ChildKind::Data, _) => child.clone(),
                (ChildKind::NamedSchemas, Value::Object(named)) => {
                    let mut expanded_named = Map::with_capacity(named.len());
                    for (name, schema) in named {
                        expanded_named.insert(name.clone(), self.expand(schema, doc)?);
                    }
                    Value::Object(expanded_named)
                }
                _ => self.expand(child, doc)?,
            };
            out.insert(key.clone(), expanded);
        }
        Ok(out)
    }

    fn expand_ref(
        &mut self,
        reference: &str,
        node: &Map<String, Value>,
        doc: &Path,
    ) -> Result<Value, ResolveError> {
        let target = RefTarget::parse(reference)?;
        let (target_doc, resolved) = self.cache.resolve(reference, doc, &target)?;

        let frame = (target_doc.clone(), target.pointer.clone());
        if let Some(start) = self.stack.iter().position(|f| f == &frame) {
            let mut chain: Vec<String> = self.stack[start..]
                .iter()
                .map(|(key, pointer)| target_label(key, pointer))
                .collect();
            chain.push(target_label(&frame.0, &frame.1));
            return Err(ResolveError::Cycle { chain });
        }

        self.stack.push(frame);
        let expanded = self.expand(&resolved, &target_doc);
        self.stack.pop();
        let mut expanded = expanded?;
        if target.pointer.is_empty() {
            if let Value::Object(root) = &mut expanded {
                for keyword in INLINED_ROOT_KEYWORDS {
                    root.remove(keyword);
                }
            }
        }

        let mut siblings = node.clone();
        siblings.remove("$ref");
        if siblings.is_empty() {
            return Ok(expanded);
        }
        let siblings = self.expand_entries(&siblings, doc)?;

        Ok(match expanded {
            Value::Object(mut merged) => {
                merged.extend(siblings);
                Value::Object(merged)
            }
            other => {
                let mut wrapper = Map::new();
                wrapper.insert(
                    "allOf".to_string(),
                    Value::Array(vec![other, Value::Object(siblings)]),
                );
                Value::Object(wrapper)
            }
        })
    }
}
