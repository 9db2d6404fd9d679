//! # Manifest Assembler
//!
//! Emits the module tree that ties a generated package together:
//! `src/lib.rs`, plus `src/types/mod.rs` and `src/parsers/mod.rs` in the
//! per-type layout.
//!
//! Re-exports follow input order. Only root types are re-exported from
//! per-type modules; nested items stay reachable through their module.
//! With no entries the package still compiles and exports the shared
//! result types.

use schemagen_core::{module_file_stem, GeneratedArtifact};

use crate::ident::{type_ident, ModuleName};
use crate::layout::{Layout, LIB_PATH, PARSERS_MOD_PATH, TYPES_MOD_PATH};
use crate::parser::parse_fn_name;
use crate::writer::CodeWriter;

/// One generated type as the manifest sees it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ManifestEntry {
    /// Canonical name the type was derived from.
    pub canonical_name: String,
    /// Rust type name.
    pub type_name: String,
    /// Per-type module holding the type and its parser.
    pub module: ModuleName,
    /// Per-type parse function.
    pub parse_fn: String,
}

impl ManifestEntry {
    /// Entry for the schema with canonical name `canonical_name`.
    pub fn new(canonical_name: &str) -> Self {
        Self {
            canonical_name: canonical_name.to_string(),
            type_name: type_ident(canonical_name),
            module: ModuleName::new(&module_file_stem(canonical_name)),
            parse_fn: parse_fn_name(canonical_name),
        }
    }
}

/// The module-tree artifacts for `entries` in `layout`.
pub fn assemble_manifest(layout: Layout, entries: &[ManifestEntry]) -> Vec<GeneratedArtifact> {
    match layout {
        Layout::PerType => assemble_per_type(entries),
        Layout::Bundled => vec![bundled_lib(entries)],
    }
}

fn assemble_per_type(entries: &[ManifestEntry]) -> Vec<GeneratedArtifact> {
    if entries.is_empty() {
        return vec![empty_lib()];
    }

    let mut lib = CodeWriter::generated();
    lib.line("pub mod parsers;");
    lib.line("pub mod parsing_types;");
    lib.line("pub mod types;");
    lib.blank();
    lib.line("pub use parsing_types::{ParsingError, ParsingResult};");
    for entry in entries {
        lib.line(format!("pub use types::{};", entry.type_name));
    }
    for entry in entries {
        lib.line(format!("pub use parsers::{};", entry.parse_fn));
    }

    vec![
        GeneratedArtifact::new(LIB_PATH, lib.into_string()),
        GeneratedArtifact::new(
            TYPES_MOD_PATH,
            module_index(entries, |entry| entry.type_name.as_str()),
        ),
        GeneratedArtifact::new(
            PARSERS_MOD_PATH,
            module_index(entries, |entry| entry.parse_fn.as_str()),
        ),
    ]
}

/// `mod.rs` declaring one module per entry and re-exporting `export` from it.
fn module_index(entries: &[ManifestEntry], export: impl Fn(&ManifestEntry) -> &str) -> String {
    let mut w = CodeWriter::generated();
    for entry in entries {
        w.line(entry.module.declaration());
    }
    w.blank();
    for entry in entries {
        w.line(format!("pub use {}::{};", entry.module.ident, export(entry)));
    }
    w.into_string()
}

fn bundled_lib(entries: &[ManifestEntry]) -> GeneratedArtifact {
    if entries.is_empty() {
        return empty_lib();
    }

    let mut lib = CodeWriter::generated();
    lib.line("pub mod parser;");
    lib.line("pub mod parsing_types;");
    lib.line("pub mod types;");
    lib.blank();
    lib.line("pub use parser::{parse, shared_cache, ParseAs, TypeKey, ValidatorCache};");
    lib.line("pub use parsing_types::{ParsingError, ParsingResult};");
    let names: Vec<&str> = entries.iter().map(|e| e.type_name.as_str()).collect();
    lib.line(format!("pub use types::{{{}}};", names.join(", ")));
    GeneratedArtifact::new(LIB_PATH, lib.into_string())
}

fn empty_lib() -> GeneratedArtifact {
    let mut lib = CodeWriter::generated();
    lib.line("pub mod parsing_types;");
    lib.blank();
    lib.line("pub use parsing_types::{ParsingError, ParsingResult};");
    GeneratedArtifact::new(LIB_PATH, lib.into_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn entries(names: &[&str]) -> Vec<ManifestEntry> {
        names.iter().map(|name| ManifestEntry::new(name)).collect()
    }

    #[test]
    fn entry_names() {
        let entry = ManifestEntry::new("UserProfile");
        assert_eq!(entry.type_name, "UserProfile");
        assert_eq!(entry.module.ident, "userprofile");
        assert_eq!(entry.parse_fn, "parse_user_profile");
    }

    #[test]
    fn per_type_tree() {
        let artifacts = assemble_manifest(Layout::PerType, &entries(&["Person", "Address"]));
        let paths: Vec<&str> = artifacts.iter().map(|a| a.relative_path.as_str()).collect();
        assert_eq!(paths, ["src/lib.rs", "src/types/mod.rs", "src/parsers/mod.rs"]);
        assert_eq!(
            artifacts[0].source_text,
            "// @generated by schemagen\n\n\
             pub mod parsers;\npub mod parsing_types;\npub mod types;\n\n\
             pub use parsing_types::{ParsingError, ParsingResult};\n\
             pub use types::Person;\npub use types::Address;\n\
             pub use parsers::parse_person;\npub use parsers::parse_address;\n"
        );
        assert_eq!(
            artifacts[1].source_text,
            "// @generated by schemagen\n\n\
             pub mod person;\npub mod address;\n\n\
             pub use person::Person;\npub use address::Address;\n"
        );
    }

    #[test]
    fn digit_leading_modules_get_a_path_attribute() {
        let artifacts = assemble_manifest(Layout::PerType, &entries(&["2userProfile"]));
        assert!(artifacts[2]
            .source_text
            .contains("#[path = \"2userprofile.rs\"]\npub mod _2userprofile;\n"));
        assert!(artifacts[2]
            .source_text
            .contains("pub use _2userprofile::parse_2user_profile;"));
    }

    #[test]
    fn bundled_lib_reexports_the_aggregate_parser() {
        let artifacts = assemble_manifest(Layout::Bundled, &entries(&["Address", "Person"]));
        assert_eq!(artifacts.len(), 1);
        let text = &artifacts[0].source_text;
        assert!(text.contains("pub mod parser;\n"));
        assert!(text.contains("pub use parser::{parse, shared_cache, ParseAs, TypeKey, ValidatorCache};"));
        assert!(text.contains("pub use types::{Address, Person};"));
    }

    #[test]
    fn no_entries_still_exports_result_types() {
        for layout in [Layout::PerType, Layout::Bundled] {
            let artifacts = assemble_manifest(layout, &[]);
            assert_eq!(artifacts.len(), 1);
            assert_eq!(
                artifacts[0].source_text,
                "// @generated by schemagen\n\npub mod parsing_types;\n\n\
                 pub use parsing_types::{ParsingError, ParsingResult};\n"
            );
        }
    }
}
