//! # Error Types - Generation Error Taxonomy
//!
//! Every way a generation run can abort. All errors use `thiserror` for
//! derive-based `Display` and `Error` implementations.
//!
//! ## Design
//!
//! - Errors are fail-fast and whole-run: the first error stops the pipeline
//!   before any further artifact is produced.
//! - Every variant names the schema file (or path) that caused it.
//! - Validation failures raised by *generated* parsers are not errors here;
//!   the emitted code returns them as data.

use std::path::PathBuf;

use thiserror::Error;

/// Top-level error type for a schemagen run.
#[derive(Error, Debug)]
pub enum SchemagenError {
    /// The input directory contains no `*.schema.json` file.
    #[error("no schema files found in {}", dir.display())]
    NoSchemasFound {
        /// Directory that was scanned.
        dir: PathBuf,
    },

    /// A schema file is not well-formed JSON.
    #[error("failed to parse schema {file}: {source}")]
    SchemaParse {
        /// Schema file name.
        file: String,
        /// Underlying JSON error (carries line and column).
        #[source]
        source: serde_json::Error,
    },

    /// A `$ref` could not be resolved.
    #[error("failed to resolve references in {file}: {source}")]
    ReferenceResolution {
        /// Schema file whose resolution failed.
        file: String,
        /// What went wrong.
        #[source]
        source: ResolveError,
    },

    /// Two distinct schema files map to the same type identifier or to the
    /// same generated module file.
    #[error("schema files {first} and {second} both map to type name {name}")]
    DuplicateCanonicalName {
        /// The colliding identifier (or module file stem).
        name: String,
        /// File that claimed the name first.
        first: String,
        /// File that collided with it.
        second: String,
    },

    /// The file stem canonicalizes to the empty string.
    #[error("schema file {file} does not yield a type name")]
    EmptyCanonicalName {
        /// Offending schema file name.
        file: String,
    },

    /// The resolved schema is rejected by the validation engine the
    /// generated parsers use.
    #[error("schema {file} cannot be compiled into a validator: {reason}")]
    InvalidSchema {
        /// Schema file name.
        file: String,
        /// Reason reported by the engine.
        reason: String,
    },

    /// A generated artifact could not be written.
    #[error("failed to write {}: {source}", path.display())]
    Emission {
        /// Destination path.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// I/O error while enumerating or reading the input directory.
    #[error("io error on {}: {source}", path.display())]
    Io {
        /// Path being accessed.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
}

impl SchemagenError {
    /// Name of the schema file this error is attributed to, if any.
    pub fn schema_file(&self) -> Option<&str> {
        match self {
            Self::SchemaParse { file, .. }
            | Self::ReferenceResolution { file, .. }
            | Self::EmptyCanonicalName { file }
            | Self::InvalidSchema { file, .. } => Some(file),
            Self::DuplicateCanonicalName { second, .. } => Some(second),
            Self::NoSchemasFound { .. } | Self::Emission { .. } | Self::Io { .. } => None,
        }
    }
}

/// Error while resolving a `$ref` pointer.
#[derive(Error, Debug)]
pub enum ResolveError {
    /// The referenced file does not exist.
    #[error("reference {reference} points to missing file {}", path.display())]
    MissingFile {
        /// The `$ref` string as written.
        reference: String,
        /// Resolved filesystem path.
        path: PathBuf,
    },

    /// The referenced file exists but cannot be read or parsed.
    #[error("reference {reference} points to unreadable file {}: {reason}", path.display())]
    UnreadableFile {
        /// The `$ref` string as written.
        reference: String,
        /// Resolved filesystem path.
        path: PathBuf,
        /// I/O or JSON error text.
        reason: String,
    },

    /// The JSON pointer does not address any node of the target document.
    #[error("reference {reference}: pointer {pointer} not found")]
    PointerNotFound {
        /// The `$ref` string as written.
        reference: String,
        /// Decoded pointer.
        pointer: String,
    },

    /// Expanding the reference would not terminate.
    #[error("reference cycle: {}", chain.join(" -> "))]
    Cycle {
        /// References from the first re-entered one back to itself.
        chain: Vec<String>,
    },

    /// Remote URIs and anchor fragments are not resolved.
    #[error("unsupported reference {reference}: {reason}")]
    Unsupported {
        /// The `$ref` string as written.
        reference: String,
        /// Why it is unsupported.
        reason: String,
    },
}
