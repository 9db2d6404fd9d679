//! # Generation Pipeline
//!
//! Drives one run end to end: load the schema directory, build the type
//! set, resolve references, emit every artifact in memory, and only then
//! write the package to disk.
//!
//! ## Ordering
//!
//! Per-type resolution and emission run in parallel with `rayon`. Results
//! are gathered back in input order, so the artifact list (and the first
//! reported error) does not depend on scheduling.
//!
//! ## Failure
//!
//! Fail-fast and whole-run: [`plan`] either returns every artifact or an
//! error, and [`generate`] writes nothing unless planning succeeded.

use std::fs;
use std::path::{Path, PathBuf};

use rayon::prelude::*;
use schemagen_core::{GeneratedArtifact, SchemagenError, TypeDescriptor};
use schemagen_schema::{
    bundle_documents, dereference_document, type_set, BundledSchema, SchemaLoader,
};
use serde_json::Value;

use crate::layout::Layout;
use crate::manifest::{assemble_manifest, ManifestEntry};
use crate::package::{
    emit_bundled_schema, emit_cargo_manifest, emit_readme, emit_schema_copy,
};
use crate::parser::{emit_bundled_parser, emit_parser_module};
use crate::result_types::emit_result_types;
use crate::types::{emit_bundled_types, emit_type_module};

pub const DEFAULT_OUTPUT_DIR: &str = "generated/rust";
pub const DEFAULT_PACKAGE_NAME: &str = "schemas";
pub const DEFAULT_PACKAGE_VERSION: &str = "0.1.0";

/// Inputs of one generation run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerateOptions {
    /// Directory scanned (non-recursively) for `*.schema.json` files.
    pub schemas_dir: PathBuf,
    /// Root of the generated package.
    pub output_dir: PathBuf,
    pub layout: Layout,
    pub package_name: String,
    pub package_version: String,
    /// Schema file names to skip.
    pub exclude: Vec<String>,
}

impl GenerateOptions {
    /// Options with default output directory, package metadata and layout.
    pub fn new(schemas_dir: impl Into<PathBuf>) -> Self {
        Self {
            schemas_dir: schemas_dir.into(),
            output_dir: PathBuf::from(DEFAULT_OUTPUT_DIR),
            layout: Layout::default(),
            package_name: DEFAULT_PACKAGE_NAME.to_string(),
            package_version: DEFAULT_PACKAGE_VERSION.to_string(),
            exclude: Vec::new(),
        }
    }

    pub fn with_output_dir(mut self, output_dir: impl Into<PathBuf>) -> Self {
        self.output_dir = output_dir.into();
        self
    }

    pub fn with_layout(mut self, layout: Layout) -> Self {
        self.layout = layout;
        self
    }

    pub fn with_package_name(mut self, name: impl Into<String>) -> Self {
        self.package_name = name.into();
        self
    }

    pub fn with_package_version(mut self, version: impl Into<String>) -> Self {
        self.package_version = version.into();
        self
    }

    pub fn with_exclude(mut self, file_name: impl Into<String>) -> Self {
        self.exclude.push(file_name.into());
        self
    }
}

/// Everything a run will write, computed without touching the output
/// directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationPlan {
    pub layout: Layout,
    /// Generated type names, in input order.
    pub type_names: Vec<String>,
    /// Artifacts in write order.
    pub artifacts: Vec<GeneratedArtifact>,
}

/// Summary of a completed run.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GenerationReport {
    pub output_dir: PathBuf,
    pub layout: Layout,
    pub type_names: Vec<String>,
    /// Written paths, relative to `output_dir`.
    pub files: Vec<String>,
}

/// Load, resolve and emit everything for `options` in memory.
pub fn plan(options: &GenerateOptions) -> Result<GenerationPlan, SchemagenError> {
    let loader = options
        .exclude
        .iter()
        .fold(SchemaLoader::new(&options.schemas_dir), |loader, name| {
            loader.exclude(name.clone())
        });
    let documents = loader.load()?;
    let types = type_set(&documents)?;
    tracing::info!(
        count = types.len(),
        layout = %options.layout,
        "planning generated package"
    );

    let mut artifacts = vec![
        emit_cargo_manifest(&options.package_name, &options.package_version),
        emit_result_types(),
    ];
    let entries: Vec<ManifestEntry> = types
        .iter()
        .map(|descriptor| ManifestEntry::new(&descriptor.canonical_name))
        .collect();

    match options.layout {
        Layout::PerType => {
            let per_type: Vec<Result<Vec<GeneratedArtifact>, SchemagenError>> = documents
                .par_iter()
                .zip(types.as_slice().par_iter())
                .map(|(document, descriptor)| {
                    let resolved = dereference_document(document)?;
                    emit_per_type(descriptor, &resolved)
                })
                .collect();
            for result in per_type {
                artifacts.extend(result?);
            }
        }
        Layout::Bundled => {
            let bundle = bundle_documents(&documents)?;
            check_bundle_compiles(&bundle)?;
            artifacts.push(emit_bundled_types(&bundle));
            artifacts.push(emit_bundled_parser(&bundle));
            artifacts.push(emit_bundled_schema(&bundle));
        }
    }

    artifacts.extend(assemble_manifest(options.layout, &entries));
    artifacts.push(emit_readme(&options.package_name, options.layout, &entries));

    Ok(GenerationPlan {
        layout: options.layout,
        type_names: entries.into_iter().map(|entry| entry.type_name).collect(),
        artifacts,
    })
}

/// Type module, parser module and schema copy for one resolved schema.
fn emit_per_type(
    descriptor: &TypeDescriptor,
    resolved: &Value,
) -> Result<Vec<GeneratedArtifact>, SchemagenError> {
    check_compiles(&descriptor.source_file_name, resolved)?;
    let name = &descriptor.canonical_name;
    tracing::debug!(file = %descriptor.source_file_name, r#type = %name, "emitting type");
    Ok(vec![
        emit_type_module(name, resolved),
        emit_parser_module(name, resolved),
        emit_schema_copy(name, resolved),
    ])
}

/// Reject schemas the emitted parsers could not compile.
fn check_compiles(file: &str, schema: &Value) -> Result<(), SchemagenError> {
    jsonschema::validator_for(schema)
        .map(|_| ())
        .map_err(|error| SchemagenError::InvalidSchema {
            file: file.to_string(),
            reason: error.to_string(),
        })
}

/// Every member must compile the way the aggregate parser compiles it: the
/// whole bundle with a root `$ref` to the member.
///
/// Members are meta-validated on their own first. The bundle is one
/// document, so a single malformed member would otherwise fail the compile
/// of every member and be reported against the wrong file.
fn check_bundle_compiles(bundle: &BundledSchema) -> Result<(), SchemagenError> {
    let checks: Vec<Result<(), SchemagenError>> = bundle
        .members
        .par_iter()
        .map(|member| {
            if let Some(definition) = bundle.member_schema(&member.key) {
                jsonschema::meta::validate(definition).map_err(|error| {
                    SchemagenError::InvalidSchema {
                        file: member.file_name.clone(),
                        reason: error.to_string(),
                    }
                })?;
            }
            Ok(())
        })
        .collect();
    checks.into_iter().collect::<Result<(), _>>()?;

    let checks: Vec<Result<(), SchemagenError>> = bundle
        .members
        .par_iter()
        .map(|member| {
            let mut schema = bundle.document.clone();
            if let Value::Object(root) = &mut schema {
                root.insert("$ref".to_string(), Value::String(member.pointer()));
            }
            check_compiles(&member.file_name, &schema)
        })
        .collect();
    checks.into_iter().collect()
}

/// Write `artifacts` under `out_dir`, creating directories as needed.
/// Returns the number of files written.
pub fn write_artifacts(
    out_dir: &Path,
    artifacts: &[GeneratedArtifact],
) -> Result<usize, SchemagenError> {
    for artifact in artifacts {
        let path = out_dir.join(&artifact.relative_path);
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).map_err(|source| SchemagenError::Emission {
                path: parent.to_path_buf(),
                source,
            })?;
        }
        fs::write(&path, &artifact.source_text)
            .map_err(|source| SchemagenError::Emission { path: path.clone(), source })?;
        tracing::debug!(path = %path.display(), "wrote artifact");
    }
    Ok(artifacts.len())
}

/// Plan, then write. Nothing is written if planning fails.
pub fn generate(options: &GenerateOptions) -> Result<GenerationReport, SchemagenError> {
    let plan = plan(options)?;
    let written = write_artifacts(&options.output_dir, &plan.artifacts)?;
    tracing::info!(
        files = written,
        output = %options.output_dir.display(),
        "generated package"
    );
    Ok(GenerationReport {
        output_dir: options.output_dir.clone(),
        layout: plan.layout,
        type_names: plan.type_names,
        files: plan
            .artifacts
            .into_iter()
            .map(|artifact| artifact.relative_path)
            .collect(),
    })
}
