//! # Package Files
//!
//! The non-source artifacts of a generated package: its `Cargo.toml`, a
//! README listing what it exports, and copies of the schemas its parsers
//! embed.

use schemagen_core::{module_file_stem, GeneratedArtifact};
use schemagen_schema::BundledSchema;
use serde_json::Value;

use crate::layout::{
    schema_copy_path, Layout, BUNDLED_SCHEMA_PATH, CARGO_MANIFEST_PATH, README_PATH,
};
use crate::manifest::ManifestEntry;

/// Dependency versions the generated code is written against.
const GENERATED_DEPENDENCIES: &str = r#"jsonschema = "0.28"
serde = { version = "1", features = ["derive"] }
serde_json = "1"
"#;

/// `Cargo.toml` of the generated package.
pub fn emit_cargo_manifest(package_name: &str, package_version: &str) -> GeneratedArtifact {
    let text = format!(
        "# @generated by schemagen\n\n\
         [package]\n\
         name = {}\n\
         version = {}\n\
         edition = \"2021\"\n\
         publish = false\n\n\
         [dependencies]\n\
         {GENERATED_DEPENDENCIES}",
        toml_string(package_name),
        toml_string(package_version),
    );
    GeneratedArtifact::new(CARGO_MANIFEST_PATH, text)
}

/// Basic TOML string: quotes and backslashes escaped.
fn toml_string(value: &str) -> String {
    format!("\"{}\"", value.replace('\\', "\\\\").replace('"', "\\\""))
}

/// `README.md` listing every generated type and how to parse it.
pub fn emit_readme(
    package_name: &str,
    layout: Layout,
    entries: &[ManifestEntry],
) -> GeneratedArtifact {
    let crate_name = package_name.replace('-', "_");
    let mut text = format!(
        "# {package_name}\n\n\
         Rust types and validating parsers generated by schemagen from JSON Schema.\n\
         Do not edit by hand; regenerate instead.\n\n\
         Layout: `{layout}`.\n\n\
         ## Types\n\n"
    );

    if entries.is_empty() {
        text.push_str("No schemas were found.\n");
        return GeneratedArtifact::new(README_PATH, text);
    }

    text.push_str("| Type | Schema | Parse with |\n|---|---|---|\n");
    for entry in entries {
        let parse = match layout {
            Layout::PerType => format!("`{}(&value)`", entry.parse_fn),
            Layout::Bundled => format!("`parse::<{}>(&value)`", entry.type_name),
        };
        text.push_str(&format!(
            "| `{}` | `{}` | {parse} |\n",
            entry.type_name, entry.canonical_name
        ));
    }

    let first = &entries[0];
    let (import, call) = match layout {
        Layout::PerType => (
            format!("{}, {}", first.parse_fn, first.type_name),
            format!("{}(&value)", first.parse_fn),
        ),
        Layout::Bundled => (
            format!("parse, {}", first.type_name),
            format!("parse::<{}>(&value)", first.type_name),
        ),
    };
    text.push_str(&format!(
        "\n## Usage\n\n\
         ```rust,ignore\n\
         use {crate_name}::{{{import}, ParsingResult}};\n\n\
         let result: ParsingResult<{ty}> = {call};\n\
         match result {{\n    \
             ParsingResult::Success {{ data }} => println!(\"{{data:?}}\"),\n    \
             ParsingResult::Failure {{ errors }} => {{\n        \
                 for error in errors {{\n            \
                     eprintln!(\"{{error}}\");\n        \
                 }}\n    \
             }}\n\
         }}\n\
         ```\n",
        ty = first.type_name,
    ));
    GeneratedArtifact::new(README_PATH, text)
}

/// `schemas/<stem>.json`: the dereferenced schema without `$schema`.
pub fn emit_schema_copy(canonical_name: &str, schema: &Value) -> GeneratedArtifact {
    let mut copy = schema.clone();
    if let Value::Object(map) = &mut copy {
        map.remove("$schema");
    }
    GeneratedArtifact::new(
        schema_copy_path(&module_file_stem(canonical_name)),
        format!("{copy:#}\n"),
    )
}

/// `schemas/bundled.json`: the bundle exactly as the aggregate parser
/// embeds it.
pub fn emit_bundled_schema(bundle: &BundledSchema) -> GeneratedArtifact {
    GeneratedArtifact::new(BUNDLED_SCHEMA_PATH, format!("{:#}\n", bundle.document))
}
