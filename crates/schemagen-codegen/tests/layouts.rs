//! Whole-run behaviour of both package layouts through the public API.

use std::fs;

use schemagen_codegen::{generate, plan, GenerateOptions, Layout};
use schemagen_core::{ResolveError, SchemagenError};
use tempfile::TempDir;

fn write_schemas(files: &[(&str, &str)]) -> TempDir {
    let dir = TempDir::new().unwrap();
    for (name, content) in files {
        fs::write(dir.path().join(name), content).unwrap();
    }
    dir
}

const NODE: &str = r#"{
    "type": "object",
    "properties": {
        "value": {"type": "integer"},
        "children": {"type": "array", "items": {"$ref": "node.schema.json"}}
    },
    "required": ["value"]
}"#;

#[test]
fn recursive_schema_needs_the_bundled_layout() {
    let dir = write_schemas(&[("node.schema.json", NODE)]);

    let per_type = plan(&GenerateOptions::new(dir.path())).unwrap_err();
    match per_type {
        SchemagenError::ReferenceResolution { file, source } => {
            assert_eq!(file, "node.schema.json");
            assert!(matches!(source, ResolveError::Cycle { .. }));
        }
        other => panic!("unexpected error: {other}"),
    }

    let bundled = plan(&GenerateOptions::new(dir.path()).with_layout(Layout::Bundled)).unwrap();
    let types = bundled
        .artifacts
        .iter()
        .find(|a| a.relative_path == "src/types.rs")
        .unwrap();
    assert!(types.source_text.contains("pub children: Option<Vec<Box<Node>>>,"));
}

#[test]
fn hyphenated_names_flow_through_every_artifact() {
    let dir = write_schemas(&[(
        "user-profile.schema.json",
        r#"{"type": "object", "properties": {"displayName": {"type": "string"}}}"#,
    )]);
    let out = TempDir::new().unwrap();
    let report = generate(&GenerateOptions::new(dir.path()).with_output_dir(out.path())).unwrap();
    assert_eq!(report.type_names, ["UserProfile"]);

    let lib = fs::read_to_string(out.path().join("src/lib.rs")).unwrap();
    assert!(lib.contains("pub use types::UserProfile;"));
    assert!(lib.contains("pub use parsers::parse_user_profile;"));
    assert!(out.path().join("src/types/userprofile.rs").is_file());
    assert!(out.path().join("src/parsers/userprofile.rs").is_file());
    assert!(out.path().join("schemas/userprofile.json").is_file());
}

#[test]
fn regenerating_overwrites_with_identical_bytes() {
    let dir = write_schemas(&[("node.schema.json", NODE)]);
    let out = TempDir::new().unwrap();
    let options = GenerateOptions::new(dir.path())
        .with_output_dir(out.path())
        .with_layout(Layout::Bundled);

    let report = generate(&options).unwrap();
    let first: Vec<String> = report
        .files
        .iter()
        .map(|f| fs::read_to_string(out.path().join(f)).unwrap())
        .collect();
    generate(&options).unwrap();
    let second: Vec<String> = report
        .files
        .iter()
        .map(|f| fs::read_to_string(out.path().join(f)).unwrap())
        .collect();
    assert_eq!(first, second);
}
