//! # Configuration File
//!
//! Optional YAML file passed with `--config`. Every key is optional;
//! explicit command-line flags override the file.
//!
//! ```yaml
//! output: generated/rust
//! package_name: person-schemas
//! package_version: 1.0.0
//! layout: bundled
//! exclude:
//!   - bundled.schema.json
//! ```

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use serde::Deserialize;

/// Contents of a `--config` file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct GenerateConfig {
    /// Root of the generated package.
    pub output: Option<PathBuf>,
    pub package_name: Option<String>,
    pub package_version: Option<String>,
    /// `per-type` or `bundled`.
    pub layout: Option<String>,
    /// Schema file names to skip.
    pub exclude: Vec<String>,
}

impl GenerateConfig {
    /// Parse a configuration document.
    pub fn from_yaml(text: &str) -> Result<Self> {
        // An empty file is an empty mapping, not an error.
        if text.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(text).context("parsing configuration YAML")
    }

    /// Read and parse the configuration file at `path`.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)
            .with_context(|| format!("reading configuration file: {}", path.display()))?;
        Self::from_yaml(&text).with_context(|| format!("in {}", path.display()))
    }
}
