//! # Schema Loader
//!
//! Enumerates `*.schema.json` files in one directory (non-recursive),
//! parses each into a [`SchemaDocument`], and returns them in file-name
//! order so every downstream stage sees a stable input order.
//!
//! Files are never re-read after loading; reference resolution seeds its
//! document cache from the loaded set.

use std::path::{Path, PathBuf};

use schemagen_core::{is_schema_file_name, SchemagenError, TypeDescriptor, TypeSet};
use serde_json::Value;

/// One parsed input schema.
#[derive(Debug, Clone, PartialEq)]
pub struct SchemaDocument {
    /// Bare file name (e.g. `person.schema.json`).
    pub file_name: String,
    /// Full path the document was read from.
    pub path: PathBuf,
    /// Parsed JSON tree, keys in document order.
    pub value: Value,
}

impl SchemaDocument {
    /// Wrap an already-parsed document.
    pub fn new(path: impl Into<PathBuf>, value: Value) -> Self {
        let path = path.into();
        let file_name = path
            .file_name()
            .map(|f| f.to_string_lossy().into_owned())
            .unwrap_or_default();
        Self {
            file_name,
            path,
            value,
        }
    }
}

/// Loads every schema of a directory.
#[derive(Debug, Clone)]
pub struct SchemaLoader {
    dir: PathBuf,
    exclude: Vec<String>,
}

impl SchemaLoader {
    /// Loader for `dir`.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            exclude: Vec::new(),
        }
    }

    /// Skip the file called `file_name` even if it matches the convention.
    pub fn exclude(mut self, file_name: impl Into<String>) -> Self {
        self.exclude.push(file_name.into());
        self
    }

    /// The directory being scanned.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Matching file paths, sorted by file name.
    ///
    /// # Errors
    ///
    /// [`SchemagenError::Io`] if the directory cannot be listed.
    pub fn discover(&self) -> Result<Vec<PathBuf>, SchemagenError> {
        let io_err = |source| SchemagenError::Io {
            path: self.dir.clone(),
            source,
        };

        let mut found: Vec<(String, PathBuf)> = Vec::new();
        for entry in std::fs::read_dir(&self.dir).map_err(io_err)? {
            let entry = entry.map_err(io_err)?;
            let path = entry.path();
            if !path.is_file() {
                continue;
            }
            let Some(name) = entry.file_name().to_str().map(str::to_string) else {
                tracing::warn!(path = %path.display(), "skipping file with non UTF-8 name");
                continue;
            };
            if !is_schema_file_name(&name) {
                continue;
            }
            if self.exclude.iter().any(|e| e == &name) {
                tracing::debug!(file = %name, "excluded");
                continue;
            }
            found.push((name, path));
        }

        found.sort_by(|a, b| a.0.cmp(&b.0));
        Ok(found.into_iter().map(|(_, path)| path).collect())
    }

    /// Read and parse every matching file.
    ///
    /// # Errors
    ///
    /// - [`SchemagenError::NoSchemasFound`] if nothing matches.
    /// - [`SchemagenError::SchemaParse`] for malformed JSON.
    /// - [`SchemagenError::Io`] for unreadable files.
    pub fn load(&self) -> Result<Vec<SchemaDocument>, SchemagenError> {
        let paths = self.discover()?;
        if paths.is_empty() {
            return Err(SchemagenError::NoSchemasFound {
                dir: self.dir.clone(),
            });
        }

        let mut documents = Vec::with_capacity(paths.len());
        for path in paths {
            let document = load_document(&path)?;
            tracing::debug!(file = %document.file_name, "loaded schema");
            documents.push(document);
        }
        tracing::info!(
            dir = %self.dir.display(),
            count = documents.len(),
            "schemas loaded"
        );
        Ok(documents)
    }
}

/// Read and parse one schema file.
///
/// # Errors
///
/// [`SchemagenError::Io`] or [`SchemagenError::SchemaParse`].
pub fn load_document(path: &Path) -> Result<SchemaDocument, SchemagenError> {
    let content = std::fs::read_to_string(path).map_err(|source| SchemagenError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let document = SchemaDocument::new(path, Value::Null);
    let value = serde_json::from_str(&content).map_err(|source| SchemagenError::SchemaParse {
        file: document.file_name.clone(),
        source,
    })?;
    Ok(SchemaDocument { value, ..document })
}

/// Build the type set for a loaded document list, keeping its order.
///
/// # Errors
///
/// Propagates the uniqueness checks of [`TypeSet::new`].
pub fn type_set(documents: &[SchemaDocument]) -> Result<TypeSet, SchemagenError> {
    TypeSet::new(
        documents
            .iter()
            .map(|d| TypeDescriptor::new(d.file_name.clone(), d.value.clone()))
            .collect(),
    )
}
