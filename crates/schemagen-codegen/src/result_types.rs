//! # Result-Types Emitter
//!
//! Emits `src/parsing_types.rs`: the error and result shapes every
//! generated parser returns, plus the crate-internal helpers that turn
//! `jsonschema` errors into `ParsingError` values.
//!
//! The module does not depend on any schema and is identical in every
//! generated package.
//!
//! ## Emitted API
//!
//! - `ParsingError { instance_path, schema_path, keyword, params, message }`
//!   (serialized in camelCase).
//! - `ParsingResult<T>`: `Success { data }` or `Failure { errors }`, with
//!   `is_success`, `data`, `errors` and `into_result`.
//! - `CompiledSchema`, `collect_errors`, `parse_compiled` and
//!   `validate_compiled`, visible to the parser modules only.

use schemagen_core::GeneratedArtifact;

use crate::layout::PARSING_TYPES_PATH;
use crate::writer::GENERATED_HEADER;

const PARSING_TYPES_BODY: &str = r##"
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// One reason a value was rejected.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ParsingError {
    /// JSON pointer to the rejected location in the input.
    pub instance_path: String,
    /// Location of the violated keyword in the schema. `$ref` tokens mark
    /// the references followed to reach it.
    pub schema_path: String,
    /// The violated keyword, e.g. `required` or `type`.
    pub keyword: String,
    /// Keyword-specific parameters: the keyword's value in the schema.
    pub params: Map<String, Value>,
    /// Human-readable description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl std::fmt::Display for ParsingError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let location = if self.instance_path.is_empty() {
            "/"
        } else {
            self.instance_path.as_str()
        };
        match &self.message {
            Some(message) => write!(f, "{location}: {message}"),
            None => write!(f, "{location}: {} violated", self.keyword),
        }
    }
}

impl std::error::Error for ParsingError {}

/// Outcome of parsing an untyped value into a generated type.
#[derive(Debug, Clone, PartialEq)]
pub enum ParsingResult<T> {
    /// The value is valid and was deserialized.
    Success { data: T },
    /// The value was rejected.
    Failure { errors: Vec<ParsingError> },
}

impl<T> ParsingResult<T> {
    /// Returns `true` for [`ParsingResult::Success`].
    pub fn is_success(&self) -> bool {
        matches!(self, ParsingResult::Success { .. })
    }

    /// The parsed value, if any.
    pub fn data(&self) -> Option<&T> {
        match self {
            ParsingResult::Success { data } => Some(data),
            ParsingResult::Failure { .. } => None,
        }
    }

    /// The rejection reasons; empty on success.
    pub fn errors(&self) -> &[ParsingError] {
        match self {
            ParsingResult::Success { .. } => &[],
            ParsingResult::Failure { errors } => errors,
        }
    }

    /// Convert into a standard `Result`.
    pub fn into_result(self) -> Result<T, Vec<ParsingError>> {
        match self {
            ParsingResult::Success { data } => Ok(data),
            ParsingResult::Failure { errors } => Err(errors),
        }
    }
}

/// A schema and the validator compiled from it.
pub(crate) struct CompiledSchema {
    schema: Value,
    validator: jsonschema::Validator,
}

#[allow(dead_code)]
impl CompiledSchema {
    pub(crate) fn new(schema: Value) -> Result<Self, String> {
        let validator = jsonschema::validator_for(&schema).map_err(|e| e.to_string())?;
        Ok(Self { schema, validator })
    }

    pub(crate) fn validate(&self, data: &Value) -> Vec<ParsingError> {
        collect_errors(&self.validator, &self.schema, data)
    }

    pub(crate) fn parse<T: DeserializeOwned>(&self, data: &Value) -> ParsingResult<T> {
        let errors = self.validate(data);
        if !errors.is_empty() {
            return ParsingResult::Failure { errors };
        }
        match serde_json::from_value(data.clone()) {
            Ok(data) => ParsingResult::Success { data },
            Err(e) => ParsingResult::Failure {
                errors: vec![internal_error("deserialize", e.to_string())],
            },
        }
    }
}

/// Parse with a validator whose compilation may have failed.
#[allow(dead_code)]
pub(crate) fn parse_compiled<T: DeserializeOwned>(
    compiled: &Result<CompiledSchema, String>,
    data: &Value,
) -> ParsingResult<T> {
    match compiled {
        Ok(compiled) => compiled.parse(data),
        Err(reason) => ParsingResult::Failure {
            errors: vec![internal_error("schema", reason.clone())],
        },
    }
}

/// Validate with a validator whose compilation may have failed.
#[allow(dead_code)]
pub(crate) fn validate_compiled(
    compiled: &Result<CompiledSchema, String>,
    data: &Value,
) -> Vec<ParsingError> {
    match compiled {
        Ok(compiled) => compiled.validate(data),
        Err(reason) => vec![internal_error("schema", reason.clone())],
    }
}

/// Every validation error for `data`, in the order the engine reports them.
pub(crate) fn collect_errors(
    validator: &jsonschema::Validator,
    schema: &Value,
    data: &Value,
) -> Vec<ParsingError> {
    validator
        .iter_errors(data)
        .map(|error| {
            let schema_path = error.schema_path.to_string();
            let keyword = last_token(&schema_path);
            let mut params = Map::new();
            params.insert(
                keyword.clone(),
                keyword_value(schema, &schema_path).cloned().unwrap_or(Value::Null),
            );
            ParsingError {
                instance_path: error.instance_path.to_string(),
                schema_path,
                keyword,
                params,
                message: Some(error.to_string()),
            }
        })
        .collect()
}

/// Schema value at a keyword location. The location runs through `$ref`
/// keywords rather than the document, so each `$ref` hop jumps to its
/// local target.
fn keyword_value<'a>(schema: &'a Value, location: &str) -> Option<&'a Value> {
    let mut node = schema;
    let mut tokens = location.split('/').skip(1).peekable();
    while let Some(token) = tokens.next() {
        let token = token.replace("~1", "/").replace("~0", "~");
        if token == "$ref" && tokens.peek().is_some() {
            let fragment = node.get("$ref")?.as_str()?.strip_prefix('#')?;
            node = schema.pointer(&percent_decode(fragment))?;
            continue;
        }
        node = match node {
            Value::Object(map) => map.get(&token)?,
            Value::Array(items) => items.get(token.parse::<usize>().ok()?)?,
            _ => return None,
        };
    }
    Some(node)
}

fn percent_decode(input: &str) -> String {
    let bytes = input.as_bytes();
    let mut out = Vec::with_capacity(bytes.len());
    let mut i = 0;
    while i < bytes.len() {
        let escaped = bytes
            .get(i + 1..i + 3)
            .filter(|_| bytes[i] == b'%')
            .and_then(|hex| std::str::from_utf8(hex).ok())
            .and_then(|hex| u8::from_str_radix(hex, 16).ok());
        match escaped {
            Some(byte) => {
                out.push(byte);
                i += 3;
            }
            None => {
                out.push(bytes[i]);
                i += 1;
            }
        }
    }
    String::from_utf8_lossy(&out).into_owned()
}

fn last_token(pointer: &str) -> String {
    pointer
        .rsplit('/')
        .next()
        .unwrap_or_default()
        .replace("~1", "/")
        .replace("~0", "~")
}

fn internal_error(keyword: &str, message: String) -> ParsingError {
    ParsingError {
        instance_path: String::new(),
        schema_path: String::new(),
        keyword: keyword.to_string(),
        params: Map::new(),
        message: Some(message),
    }
}
"##;

/// `src/parsing_types.rs`.
pub fn emit_result_types() -> GeneratedArtifact {
    GeneratedArtifact::new(
        PARSING_TYPES_PATH,
        format!("{GENERATED_HEADER}\n{PARSING_TYPES_BODY}"),
    )
}
