//! # Parser Emitter
//!
//! Emits the validating parsers of a generated package. A parser validates
//! an untyped `serde_json::Value` against the embedded schema with
//! `jsonschema` and, when the value is valid, deserializes it into the
//! generated type. Rejections come back as `ParsingResult::Failure` with
//! every validation error; nothing panics.
//!
//! ## Per-type
//!
//! `src/parsers/<stem>.rs` embeds the fully dereferenced schema as a
//! string constant and exposes `parse_<type>(&Value)`. The validator is
//! compiled on first use and kept in a `OnceLock`.
//!
//! ## Bundled
//!
//! `src/parser.rs` embeds the bundled document once and exposes:
//!
//! - `TypeKey`, one variant per member;
//! - `ParseAs`, implemented by every member type with a nominal
//!   definition;
//! - `ValidatorCache`, holding one lazily compiled validator per key;
//! - `parse::<T>(&Value)`, backed by a process-wide cache.
//!
//! Each validator is compiled from the whole bundle with a root `$ref` to
//! its member, so cross-member references resolve inside one document.

use schemagen_core::{module_file_stem, GeneratedArtifact};
use schemagen_schema::BundledSchema;
use serde_json::Value;

use crate::ident::{fn_ident, raw_string_literal, string_literal, type_ident, ModuleName};
use crate::layout::{parser_module_path, BUNDLED_PARSER_PATH};
use crate::types::ir::ItemKind;
use crate::types::lower_bundle;
use crate::writer::CodeWriter;

/// Name of the parse function generated for `canonical_name`.
pub fn parse_fn_name(canonical_name: &str) -> String {
    format!("parse_{}", fn_ident(canonical_name).trim_start_matches('_'))
}

/// Name of the schema constant generated for `canonical_name`.
pub fn schema_const_name(canonical_name: &str) -> String {
    format!(
        "{}_SCHEMA",
        fn_ident(canonical_name).trim_start_matches('_').to_uppercase()
    )
}

/// `src/parsers/<stem>.rs` for one dereferenced schema.
pub fn emit_parser_module(canonical_name: &str, schema: &Value) -> GeneratedArtifact {
    let type_name = type_ident(canonical_name);
    let stem = module_file_stem(canonical_name);
    let module = ModuleName::new(&stem);
    let constant = schema_const_name(canonical_name);

    let mut w = CodeWriter::generated();
    w.line("use std::sync::OnceLock;");
    w.blank();
    w.line("use serde_json::Value;");
    w.blank();
    w.line("use crate::parsing_types::{parse_compiled, CompiledSchema, ParsingResult};");
    w.line(format!("use crate::types::{}::{type_name};", module.ident));
    w.blank();
    w.doc(&format!(
        "JSON Schema of [`{type_name}`] with every reference inlined."
    ));
    w.line(format!(
        "pub const {constant}: &str = {};",
        raw_string_literal(&format!("{schema:#}"))
    ));
    w.blank();
    w.open("fn validator() -> &'static Result<CompiledSchema, String> {");
    w.line("static VALIDATOR: OnceLock<Result<CompiledSchema, String>> = OnceLock::new();");
    w.open("VALIDATOR.get_or_init(|| {");
    w.line(format!("serde_json::from_str({constant})"));
    w.line("    .map_err(|e| e.to_string())");
    w.line("    .and_then(CompiledSchema::new)");
    w.close("})");
    w.close("}");
    w.blank();
    w.doc(&format!(
        "Validate `data` against the `{canonical_name}` schema and deserialize it.\n\n\
         Invalid data yields [`ParsingResult::Failure`] listing every violation."
    ));
    w.open(format!(
        "pub fn {}(data: &Value) -> ParsingResult<{type_name}> {{",
        parse_fn_name(canonical_name)
    ));
    w.line("parse_compiled(validator(), data)");
    w.close("}");

    GeneratedArtifact::new(parser_module_path(&stem), w.into_string())
}

/// One bundle member as seen by the aggregate parser.
struct KeyedMember {
    variant: String,
    schema_key: String,
    schema_ref: String,
    parse_as: bool,
}

fn keyed_members(bundle: &BundledSchema) -> Vec<KeyedMember> {
    let items = lower_bundle(bundle);
    bundle
        .members
        .iter()
        .map(|member| {
            let variant = type_ident(&member.canonical_name());
            let parse_as = items
                .iter()
                .any(|item| item.name == variant && !matches!(item.kind, ItemKind::Alias(_)));
            KeyedMember {
                variant,
                schema_key: member.key.clone(),
                schema_ref: member.pointer(),
                parse_as,
            }
        })
        .collect()
}

/// `src/parser.rs` for a bundle.
pub fn emit_bundled_parser(bundle: &BundledSchema) -> GeneratedArtifact {
    let members = keyed_members(bundle);
    let nominal: Vec<&str> = members
        .iter()
        .filter(|m| m.parse_as)
        .map(|m| m.variant.as_str())
        .collect();

    let mut w = CodeWriter::generated();
    w.line("use std::sync::OnceLock;");
    w.blank();
    w.line("use serde::de::DeserializeOwned;");
    w.line("use serde_json::Value;");
    w.blank();
    w.line(
        "use crate::parsing_types::{parse_compiled, validate_compiled, CompiledSchema, ParsingError, ParsingResult};",
    );
    match nominal.as_slice() {
        [] => {}
        [single] => {
            w.line(format!("use crate::types::{single};"));
        }
        many => {
            w.line(format!("use crate::types::{{{}}};", many.join(", ")));
        }
    }
    w.blank();
    w.doc("Every schema of the package under `$defs`, keyed by file stem.");
    w.line(format!(
        "pub const BUNDLED_SCHEMA: &str = {};",
        raw_string_literal(&format!("{:#}", bundle.document))
    ));
    w.blank();

    write_type_key(&mut w, &members);
    w.blank();

    w.doc("Generated types that [`ValidatorCache::parse`] can produce.");
    w.open("pub trait ParseAs: DeserializeOwned {");
    w.doc("Key of the type's schema.");
    w.line("const KEY: TypeKey;");
    w.close("}");
    for member in members.iter().filter(|m| m.parse_as) {
        w.blank();
        w.open(format!("impl ParseAs for {} {{", member.variant));
        w.line(format!("const KEY: TypeKey = TypeKey::{};", member.variant));
        w.close("}");
    }
    w.blank();

    w.line(BUNDLE_LOADERS.trim_start());
    w.blank();
    write_validator_cache(&mut w, members.len());

    GeneratedArtifact::new(BUNDLED_PARSER_PATH, w.into_string())
}

fn write_type_key(w: &mut CodeWriter, members: &[KeyedMember]) {
    w.doc("A generated type of the bundle.");
    w.line("#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]");
    w.open("pub enum TypeKey {");
    for member in members {
        w.line(format!("{},", member.variant));
    }
    w.close("}");
    w.blank();

    let all: Vec<String> = members
        .iter()
        .map(|m| format!("TypeKey::{}", m.variant))
        .collect();
    w.open("impl TypeKey {");
    w.doc("Every key, in bundle order.");
    w.line(format!(
        "pub const ALL: [TypeKey; {}] = [{}];",
        members.len(),
        all.join(", ")
    ));
    w.blank();
    write_key_match(w, "Name of the generated type.", "pub fn type_name", members, |m| {
        string_literal(&m.variant)
    });
    w.blank();
    write_key_match(w, "Key of the schema under `$defs`.", "pub fn schema_key", members, |m| {
        string_literal(&m.schema_key)
    });
    w.blank();
    write_key_match(w, "`$ref` to the schema inside the bundle.", "pub fn schema_ref", members, |m| {
        string_literal(&m.schema_ref)
    });
    w.blank();
    w.open("fn index(self) -> usize {");
    w.open("match self {");
    for (i, member) in members.iter().enumerate() {
        w.line(format!("TypeKey::{} => {i},", member.variant));
    }
    w.close("}");
    w.close("}");
    w.close("}");
}

fn write_key_match(
    w: &mut CodeWriter,
    doc: &str,
    signature: &str,
    members: &[KeyedMember],
    value: impl Fn(&KeyedMember) -> String,
) {
    w.doc(doc);
    w.open(format!("{signature}(self) -> &'static str {{"));
    w.open("match self {");
    for member in members {
        w.line(format!("TypeKey::{} => {},", member.variant, value(member)));
    }
    w.close("}");
    w.close("}");
}

const BUNDLE_LOADERS: &str = r#"
fn bundle() -> &'static Result<Value, String> {
    static BUNDLE: OnceLock<Result<Value, String>> = OnceLock::new();
    BUNDLE.get_or_init(|| serde_json::from_str(BUNDLED_SCHEMA).map_err(|e| e.to_string()))
}

fn compile(key: TypeKey) -> Result<CompiledSchema, String> {
    let mut schema = bundle().clone()?;
    if let Value::Object(root) = &mut schema {
        root.insert("$ref".to_string(), Value::String(key.schema_ref().to_string()));
    }
    CompiledSchema::new(schema)
}"#;

fn write_validator_cache(w: &mut CodeWriter, len: usize) {
    w.doc(
        "Validators compiled on first use, one per [`TypeKey`].\n\n\
         Construction compiles nothing. The first request for a key compiles its\n\
         validator exactly once, even under concurrent first use.",
    );
    w.open("pub struct ValidatorCache {");
    w.line(format!(
        "slots: [OnceLock<Result<CompiledSchema, String>>; {len}],"
    ));
    w.close("}");
    w.blank();
    w.line(VALIDATOR_CACHE_IMPL.trim_start());
}

const VALIDATOR_CACHE_IMPL: &str = r#"
impl ValidatorCache {
    /// Cache with nothing compiled.
    pub fn new() -> Self {
        Self {
            slots: std::array::from_fn(|_| OnceLock::new()),
        }
    }

    /// Returns `true` once the validator for `key` has been compiled.
    pub fn is_compiled(&self, key: TypeKey) -> bool {
        self.slots[key.index()].get().is_some()
    }

    /// Number of validators compiled so far.
    pub fn compiled_count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.get().is_some()).count()
    }

    fn validator(&self, key: TypeKey) -> &Result<CompiledSchema, String> {
        self.slots[key.index()].get_or_init(|| compile(key))
    }

    /// Validate `data` against the schema of `key`; empty when valid.
    pub fn validate(&self, key: TypeKey, data: &Value) -> Vec<ParsingError> {
        validate_compiled(self.validator(key), data)
    }

    /// Validate `data` and deserialize it as `T`.
    pub fn parse<T: ParseAs>(&self, data: &Value) -> ParsingResult<T> {
        parse_compiled(self.validator(T::KEY), data)
    }
}

impl Default for ValidatorCache {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Debug for ValidatorCache {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let compiled: Vec<TypeKey> = TypeKey::ALL
            .into_iter()
            .filter(|key| self.is_compiled(*key))
            .collect();
        f.debug_struct("ValidatorCache")
            .field("compiled", &compiled)
            .finish()
    }
}

/// Cache behind [`parse`], shared by the whole process.
pub fn shared_cache() -> &'static ValidatorCache {
    static SHARED: OnceLock<ValidatorCache> = OnceLock::new();
    SHARED.get_or_init(ValidatorCache::new)
}

/// Validate `data` and deserialize it as `T`, using [`shared_cache`].
pub fn parse<T: ParseAs>(data: &Value) -> ParsingResult<T> {
    shared_cache().parse(data)
}"#;
