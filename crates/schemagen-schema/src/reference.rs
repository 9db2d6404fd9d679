//! # `$ref` Parsing and Document Access
//!
//! Shared plumbing for both resolution modes: splitting a `$ref` string into
//! a file part and a JSON pointer, locating referenced files on disk, and
//! classifying schema keywords so walkers know which children are schemas.
//!
//! ## Supported references
//!
//! - `#` and `#/json/pointer`: local to the containing document.
//! - `other.schema.json`, `./dir/other.json#/json/pointer`: relative to the
//!   directory of the containing document.
//!
//! Remote URIs (`http://`, `https://`, `urn:`) and plain-name fragments
//! (`#anchor`) are rejected; the generator performs no network I/O.

use std::collections::HashMap;
use std::path::{Path, PathBuf};

use schemagen_core::ResolveError;
use serde_json::Value;

/// Keywords whose values are instance data, never subschemas. Walkers copy
/// them verbatim and never look for `$ref` inside.
pub const DATA_KEYWORDS: [&str; 4] = ["const", "enum", "default", "examples"];

/// Keywords whose values map arbitrary names to subschemas.
pub const NAMED_SCHEMA_KEYWORDS: [&str; 6] = [
    "properties",
    "patternProperties",
    "$defs",
    "definitions",
    "dependentSchemas",
    "dependencies",
];

/// How a walker should treat the value stored under a schema keyword.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChildKind {
    /// Instance data; copy as-is.
    Data,
    /// Name → subschema map.
    NamedSchemas,
    /// A subschema, an array of subschemas, or an annotation.
    Schema,
}

/// Classify the value stored under `keyword` in a schema object.
pub fn child_kind(keyword: &str) -> ChildKind {
    if DATA_KEYWORDS.contains(&keyword) {
        ChildKind::Data
    } else if NAMED_SCHEMA_KEYWORDS.contains(&keyword) {
        ChildKind::NamedSchemas
    } else {
        ChildKind::Schema
    }
}

/// A parsed `$ref` value.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RefTarget {
    /// Relative file part, or `None` for a local reference.
    pub file: Option<String>,
    /// JSON pointer (RFC 6901 escaped, percent-decoded). Empty for the
    /// document root.
    pub pointer: String,
}

impl RefTarget {
    /// Parse a `$ref` string.
    ///
    /// # Errors
    ///
    /// [`ResolveError::Unsupported`] for remote URIs and anchor fragments.
    pub fn parse(reference: &str) -> Result<Self, ResolveError> {
        if reference.contains("://") || reference.starts_with("urn:") {
            return Err(ResolveError::Unsupported {
                reference: reference.to_string(),
                reason: "remote references are not fetched".to_string(),
            });
        }

        let (file_part, fragment) = match reference.split_once('#') {
            Some((file, fragment)) => (file, fragment),
            None => (reference, ""),
        };

        if !fragment.is_empty() && !fragment.starts_with('/') {
            return Err(ResolveError::Unsupported {
                reference: reference.to_string(),
                reason: "only JSON pointer fragments are supported".to_string(),
            });
        }

        let file = if file_part.is_empty() {
            None
        } else {
            Some(percent_decode(file_part))
        };

        Ok(Self {
            file,
            pointer: percent_decode(fragment),
        })
    }

    /// Returns `true` for references into the containing document.
    pub fn is_local(&self) -> bool {
        self.file.is_none()
    }
}

/// Escape one reference token for use inside a JSON pointer.
pub fn escape_pointer_token(token: &str) -> String {
    token.replace('~', "~0").replace('/', "~1")
}

/// `$ref` value for a JSON pointer into the containing document.
///
/// Bytes outside the URI fragment character set are percent-encoded, `%`
/// included, so [`RefTarget::parse`] recovers `pointer` exactly.
pub fn pointer_fragment(pointer: &str) -> String {
    let mut out = String::with_capacity(pointer.len() + 1);
    out.push('#');
    for byte in pointer.bytes() {
        if is_fragment_byte(byte) {
            out.push(char::from(byte));
        } else {
            out.push_str(&format!("%{byte:02X}"));
        }
    }
    out
}

fn is_fragment_byte(byte: u8) -> bool {
    byte.is_ascii_alphanumeric() || b"-._~!$&'()*+,;=:@/?".contains(&byte)
}

/// Decode `%XX` escapes. Invalid escapes are kept literally.
pub fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        if bytes[i] == b'%' && i + 2 < bytes.len() {
            let hex = std::str::from_utf8(&bytes[i + 1..i + 3])
                .ok()
                .and_then(|h| u8::from_str_radix(h, 16).ok());
            if let Some(byte) = hex {
                out.push(byte);
                i += 3;
                continue;
            }
        }
        out.push(bytes[i]);
        i += 1;
    }
    String::from_utf8_lossy(&out).into_owned()
}

/// Cache of parsed documents keyed by canonical filesystem path.
///
/// Documents already in memory (the loaded input set, or the value being
/// dereferenced) are seeded so they are never re-read from disk.
#[derive(Debug, Default)]
pub struct DocumentCache {
    documents: HashMap<PathBuf, Value>,
}

impl DocumentCache {
    /// Create an empty cache.
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an in-memory document under `path`; returns its key.
    pub fn seed(&mut self, path: &Path, value: Value) -> PathBuf {
        let key = document_key(path);
        self.documents.insert(key.clone(), value);
        key
    }

    /// Resolve the file part of a reference relative to the document `from`.
    ///
    /// # Errors
    ///
    /// [`ResolveError::MissingFile`] if the path exists neither on disk nor
    /// in the cache.
    pub fn locate(&self, reference: &str, from: &Path, file: &str) -> Result<PathBuf, ResolveError> {
        let base = from.parent().unwrap_or_else(|| Path::new(""));
        let joined = base.join(file);
        if let Ok(canonical) = std::fs::canonicalize(&joined) {
            return Ok(canonical);
        }
        if self.documents.contains_key(&joined) {
            return Ok(joined);
        }
        Err(ResolveError::MissingFile {
            reference: reference.to_string(),
            path: joined,
        })
    }

    /// Fetch a document, reading and parsing it on first access.
    ///
    /// # Errors
    ///
    /// [`ResolveError::UnreadableFile`] if the file cannot be read or is not
    /// valid JSON.
    pub fn get(&mut self, reference: &str, key: &Path) -> Result<&Value, ResolveError> {
        if !self.documents.contains_key(key) {
            let value = read_json(key).map_err(|reason| ResolveError::UnreadableFile {
                reference: reference.to_string(),
                path: key.to_path_buf(),
                reason,
            })?;
            tracing::debug!(path = %key.display(), "loaded referenced schema");
            self.documents.insert(key.to_path_buf(), value);
        }
        self.documents
            .get(key)
            .ok_or_else(|| ResolveError::MissingFile {
                reference: reference.to_string(),
                path: key.to_path_buf(),
            })
    }

    /// Fetch the subtree addressed by `target`, as seen from document `from`.
    ///
    /// Returns the key of the target document and a copy of the subtree.
    pub fn resolve(
        &mut self,
        reference: &str,
        from: &Path,
        target: &RefTarget,
    ) -> Result<(PathBuf, Value), ResolveError> {
        let key = match &target.file {
            None => from.to_path_buf(),
            Some(file) => self.locate(reference, from, file)?,
        };
        let document = self.get(reference, &key)?;
        let node = document
            .pointer(&target.pointer)
            .cloned()
            .ok_or_else(|| ResolveError::PointerNotFound {
                reference: reference.to_string(),
                pointer: target.pointer.clone(),
            })?;
        Ok((key, node))
    }
}

/// Stable identity of a document path: canonical when the file exists.
pub fn document_key(path: &Path) -> PathBuf {
    std::fs::canonicalize(path).unwrap_or_else(|_| path.to_path_buf())
}

fn read_json(path: &Path) -> Result<Value, String> {
    let content = std::fs::read_to_string(path).map_err(|e| e.to_string())?;
    serde_json::from_str(&content).map_err(|e| e.to_string())
}

/// Short label for a reference target, used in cycle reports.
pub fn target_label(key: &Path, pointer: &str) -> String {
    let file = key
        .file_name()
        .map(|f| f.to_string_lossy().into_owned())
        .unwrap_or_default();
    format!("{file}#{pointer}")
}
