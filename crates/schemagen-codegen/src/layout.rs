//! # Package Layout
//!
//! Where every artifact lives inside the generated package.
//!
//! ## Per-type
//!
//! ```text
//! Cargo.toml
//! README.md
//! schemas/<stem>.json
//! src/lib.rs
//! src/parsing_types.rs
//! src/types/mod.rs
//! src/types/<stem>.rs
//! src/parsers/mod.rs
//! src/parsers/<stem>.rs
//! ```
//!
//! ## Bundled
//!
//! ```text
//! Cargo.toml
//! README.md
//! schemas/bundled.json
//! src/lib.rs
//! src/parsing_types.rs
//! src/types.rs
//! src/parser.rs
//! ```
//!
//! `<stem>` is the lower-cased canonical type name.

use std::fmt;
use std::str::FromStr;

pub const CARGO_MANIFEST_PATH: &str = "Cargo.toml";
pub const README_PATH: &str = "README.md";
pub const LIB_PATH: &str = "src/lib.rs";
pub const PARSING_TYPES_PATH: &str = "src/parsing_types.rs";
pub const TYPES_MOD_PATH: &str = "src/types/mod.rs";
pub const PARSERS_MOD_PATH: &str = "src/parsers/mod.rs";
pub const BUNDLED_TYPES_PATH: &str = "src/types.rs";
pub const BUNDLED_PARSER_PATH: &str = "src/parser.rs";
pub const BUNDLED_SCHEMA_PATH: &str = "schemas/bundled.json";

/// Per-type type module for the file stem `stem`.
pub fn type_module_path(stem: &str) -> String {
    format!("src/types/{stem}.rs")
}

/// Per-type parser module for the file stem `stem`.
pub fn parser_module_path(stem: &str) -> String {
    format!("src/parsers/{stem}.rs")
}

/// Dereferenced schema copy for the file stem `stem`.
pub fn schema_copy_path(stem: &str) -> String {
    format!("schemas/{stem}.json")
}

/// How the generated package is organised.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum Layout {
    /// One type module and one parser module per schema, each embedding
    /// the fully dereferenced schema.
    #[default]
    PerType,
    /// One module with every type and one aggregate parser over the
    /// bundled schema, with validators compiled lazily per type.
    Bundled,
}

impl Layout {
    /// Name used on the command line and in config files.
    pub fn as_str(self) -> &'static str {
        match self {
            Layout::PerType => "per-type",
            Layout::Bundled => "bundled",
        }
    }
}

impl fmt::Display for Layout {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Layout {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "per-type" => Ok(Layout::PerType),
            "bundled" => Ok(Layout::Bundled),
            other => Err(format!("unknown layout {other:?}, expected per-type or bundled")),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn layout_names_round_trip() {
        for layout in [Layout::PerType, Layout::Bundled] {
            assert_eq!(layout.as_str().parse::<Layout>().unwrap(), layout);
        }
        assert!("flat".parse::<Layout>().is_err());
        assert_eq!(Layout::default(), Layout::PerType);
    }

    #[test]
    fn per_type_paths() {
        assert_eq!(type_module_path("userprofile"), "src/types/userprofile.rs");
        assert_eq!(parser_module_path("userprofile"), "src/parsers/userprofile.rs");
        assert_eq!(schema_copy_path("userprofile"), "schemas/userprofile.json");
    }
}
