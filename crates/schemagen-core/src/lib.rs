//! # schemagen-core - Foundational Types for schemagen
//!
//! This crate is the leaf of the schemagen workspace. It defines the pieces
//! every later pipeline stage agrees on:
//!
//! 1. **Schema file naming.** The `*.schema.json` convention and the
//!    filename → canonical type identifier algorithm ([`canonicalize`]).
//!
//! 2. **Type descriptors.** One [`TypeDescriptor`] per input schema file;
//!    [`TypeSet`] enforces that canonical names (and the module file names
//!    derived from them) are unique across a run.
//!
//! 3. **Generated artifacts.** [`GeneratedArtifact`] is the unit every
//!    emitter produces: a relative path plus the full source text.
//!
//! 4. **The error taxonomy.** [`SchemagenError`] covers every way a
//!    generation run can abort; reference resolution failures are detailed
//!    by [`ResolveError`].
//!
//! ## Crate Policy
//!
//! - No dependencies on other `schemagen-*` crates.
//! - No `panic!()` or `.unwrap()` outside tests.
//! - No filesystem access; loading lives in `schemagen-schema`.

pub mod artifact;
pub mod descriptor;
pub mod error;
pub mod naming;

// Re-export primary types for ergonomic imports.
pub use artifact::GeneratedArtifact;
pub use descriptor::{TypeDescriptor, TypeSet};
pub use error::{ResolveError, SchemagenError};
pub use naming::{
    canonicalize, canonicalize_stem, is_schema_file_name, module_file_stem, schema_stem,
    SCHEMA_FILE_SUFFIX,
};
