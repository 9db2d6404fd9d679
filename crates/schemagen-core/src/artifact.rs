//! # Generated Artifacts
//!
//! The unit every emitter produces. Paths are relative to the output
//! package root and always use `/` separators, so artifact lists compare
//! equal across platforms.

use std::fmt;

/// One emitted file: where it goes and what it contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GeneratedArtifact {
    /// Path relative to the package root (e.g. `src/types/person.rs`).
    pub relative_path: String,
    /// Complete file content.
    pub source_text: String,
}

impl GeneratedArtifact {
    /// Create an artifact.
    pub fn new(relative_path: impl Into<String>, source_text: impl Into<String>) -> Self {
        Self {
            relative_path: relative_path.into(),
            source_text: source_text.into(),
        }
    }
}

impl fmt::Display for GeneratedArtifact {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} ({} bytes)", self.relative_path, self.source_text.len())
    }
}
