//! # schemagen-codegen - Rust Package Emission
//!
//! Turns resolved JSON Schemas into the source of a standalone Rust
//! package: serde-derived types, `jsonschema`-backed validating parsers,
//! the shared result types, the module tree and the package manifest.
//!
//! ## Emitters
//!
//! - [`types`]: schema → IR → `struct`/`enum`/alias definitions.
//! - [`parser`]: per-type parsers with an embedded dereferenced schema, or
//!   one aggregate parser over a bundle with a lazy `ValidatorCache`.
//! - [`result_types`]: `ParsingError` and `ParsingResult<T>`.
//! - [`manifest`]: `lib.rs` and the per-type `mod.rs` files.
//! - [`package`]: `Cargo.toml`, `README.md` and schema copies.
//!
//! Every emitter is a pure function returning
//! [`GeneratedArtifact`](schemagen_core::GeneratedArtifact)s; equal inputs
//! give byte-identical output. Emitted source files start with
//! `// @generated by schemagen` and carry no inner attributes, so they can
//! be `include!`d.
//!
//! ## Pipeline
//!
//! [`generate`] plans the whole package in memory ([`plan`]) and writes it
//! only when every schema resolved and compiled ([`write_artifacts`]).
//!
//! ## Crate Policy
//!
//! - Depends on `schemagen-core` and `schemagen-schema` internally.
//! - Every schema is compiled with the same `jsonschema` engine the emitted
//!   code uses before anything is written.

pub mod ident;
pub mod layout;
pub mod manifest;
pub mod package;
pub mod parser;
pub mod pipeline;
pub mod result_types;
pub mod types;
pub mod writer;

pub use layout::Layout;
pub use manifest::{assemble_manifest, ManifestEntry};
pub use package::{emit_bundled_schema, emit_cargo_manifest, emit_readme, emit_schema_copy};
pub use parser::{emit_bundled_parser, emit_parser_module, parse_fn_name};
pub use pipeline::{
    generate, plan, write_artifacts, GenerateOptions, GenerationPlan, GenerationReport,
    DEFAULT_OUTPUT_DIR, DEFAULT_PACKAGE_NAME, DEFAULT_PACKAGE_VERSION,
};
pub use result_types::emit_result_types;
pub use types::{emit_bundled_types, emit_type_module};
