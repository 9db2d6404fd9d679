//! # schemagen-cli - Command-Line Interface
//!
//! The `schemagen` binary: turns a directory of JSON Schemas into a Rust
//! package of serde types and validating parsers.
//!
//! ## Subcommands
//!
//! - `generate` - resolve, emit and write the package
//!
//! ## Crate Policy
//!
//! - Argument parsing and configuration live here; generation itself is
//!   delegated to `schemagen-codegen`.
//! - Errors are `anyhow` with context; the binary logs them and exits 1.

pub mod config;
pub mod generate;
