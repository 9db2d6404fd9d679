//! # schemagen-schema - Schema Loading & Reference Resolution
//!
//! Reads a directory of `*.schema.json` files and resolves their `$ref`
//! pointers in one of two modes.
//!
//! ## Loading (`loader`)
//!
//! [`SchemaLoader`] lists a directory (non-recursive), keeps files that
//! follow the `<stem>.schema.json` convention, and parses them in file-name
//! order. An empty match set is [`SchemagenError::NoSchemasFound`].
//!
//! ## Dereference mode (`deref`)
//!
//! [`dereference_file`] / [`dereference_value`] inline every reference so a
//! single schema becomes self-contained. Cycles cannot be represented in an
//! expanded tree and are reported as [`ResolveError::Cycle`].
//!
//! ## Bundle mode (`bundle`)
//!
//! [`bundle_documents`] merges a whole directory into one document keyed by
//! file stem, keeping cross-schema references as local pointers. Cycles
//! between schemas are allowed.
//!
//! The two modes share only the reference parsing and document cache in
//! `reference`; they have different termination rules and are tested
//! separately.
//!
//! ## Crate Policy
//!
//! - Depends only on `schemagen-core` internally.
//! - No network access: remote references are rejected.
//! - Schema trees are plain `serde_json::Value`s with document key order.
//!
//! [`SchemagenError::NoSchemasFound`]: schemagen_core::SchemagenError::NoSchemasFound
//! [`ResolveError::Cycle`]: schemagen_core::ResolveError::Cycle

pub mod bundle;
pub mod deref;
pub mod loader;
pub mod reference;

pub use bundle::{bundle_directory, bundle_documents, BundleMember, BundledSchema, DRAFT_2020_12};
pub use deref::{contains_ref, dereference_document, dereference_file, dereference_value};
pub use loader::{load_document, type_set, SchemaDocument, SchemaLoader};
pub use reference::RefTarget;
