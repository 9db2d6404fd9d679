//! # Rust Identifiers and Literals
//!
//! Turns arbitrary JSON names (property names, enum values, file stems)
//! into identifiers that are valid in emitted Rust source, and renders
//! string data as Rust literals.

use std::collections::HashSet;

/// Strict and reserved keywords of Rust 2021.
const KEYWORDS: [&str; 52] = [
    "abstract", "as", "async", "await", "become", "box", "break", "const", "continue", "crate",
    "do", "dyn", "else", "enum", "extern", "false", "final", "fn", "for", "if", "impl", "in",
    "let", "loop", "macro", "match", "mod", "move", "mut", "override", "priv", "pub", "ref",
    "return", "self", "Self", "static", "struct", "super", "trait", "true", "try", "type",
    "typeof", "union", "unsafe", "unsized", "use", "virtual", "where", "while", "yield",
];

/// Type names emitted code refers to unqualified, or declares itself. A
/// generated type with one of these names would clash with it.
const RESERVED_TYPE_NAMES: [&str; 18] = [
    "Box",
    "CompiledSchema",
    "Deserialize",
    "Err",
    "None",
    "Ok",
    "Option",
    "ParseAs",
    "ParsingError",
    "ParsingResult",
    "Result",
    "Serialize",
    "Some",
    "String",
    "TypeKey",
    "ValidatorCache",
    "Value",
    "Vec",
];

/// Returns `true` if `word` is a Rust keyword.
pub fn is_keyword(word: &str) -> bool {
    KEYWORDS.contains(&word)
}

/// Returns `true` if `word` can be used as-is as an identifier.
pub fn is_identifier(word: &str) -> bool {
    let mut chars = word.chars();
    let valid_start = match chars.next() {
        Some(c) => c == '_' || c.is_alphabetic(),
        None => false,
    };
    valid_start && chars.all(|c| c == '_' || c.is_alphanumeric()) && word != "_" && !is_keyword(word)
}

/// Replace characters that cannot appear in an identifier and fix up the
/// start. Keywords get a trailing `_`.
fn sanitize(word: &str, empty: &str) -> String {
    let mut out: String = word
        .chars()
        .map(|c| if c == '_' || c.is_alphanumeric() { c } else { '_' })
        .collect();
    if out.is_empty() || out.chars().all(|c| c == '_') {
        return empty.to_string();
    }
    if out.starts_with(|c: char| c.is_numeric()) {
        out.insert(0, '_');
    }
    if is_keyword(&out) {
        out.push('_');
    }
    out
}

/// Identifier for a generated type.
///
/// Canonical names are used verbatim when possible: `UserProfile` stays
/// `UserProfile`, `2userProfile` becomes `_2userProfile`.
pub fn type_ident(name: &str) -> String {
    let mut ident = sanitize(name, "Unnamed");
    if RESERVED_TYPE_NAMES.contains(&ident.as_str()) {
        ident.push('_');
    }
    ident
}

/// Words of `name`, split on non-alphanumerics and on case boundaries.
fn words(name: &str) -> Vec<String> {
    let chars: Vec<char> = name.chars().collect();
    let mut words = Vec::new();
    let mut current = String::new();
    for (i, &c) in chars.iter().enumerate() {
        if !c.is_alphanumeric() {
            if !current.is_empty() {
                words.push(std::mem::take(&mut current));
            }
            continue;
        }
        if let Some(prev) = current.chars().last() {
            let next_is_lower = chars.get(i + 1).is_some_and(|n| n.is_lowercase());
            let boundary = c.is_uppercase()
                && (prev.is_lowercase() || prev.is_numeric() || (prev.is_uppercase() && next_is_lower));
            if boundary {
                words.push(std::mem::take(&mut current));
            }
        }
        current.push(c);
    }
    if !current.is_empty() {
        words.push(current);
    }
    words
}

/// `snake_case` form of a name: `firstName` → `first_name`,
/// `UserAPI` → `user_api`.
pub fn to_snake_case(name: &str) -> String {
    words(name)
        .iter()
        .map(|w| w.to_lowercase())
        .collect::<Vec<_>>()
        .join("_")
}

/// `PascalCase` form of a name: `home-address` → `HomeAddress`.
pub fn to_pascal_case(name: &str) -> String {
    words(name)
        .iter()
        .map(|w| {
            let mut chars = w.chars();
            match chars.next() {
                Some(first) => first.to_uppercase().chain(chars).collect::<String>(),
                None => String::new(),
            }
        })
        .collect()
}

/// Identifier for a struct field holding the JSON property `name`.
pub fn field_ident(name: &str) -> String {
    sanitize(&to_snake_case(name), "field")
}

/// Identifier for an enum variant holding the JSON string `value`.
pub fn variant_ident(value: &str) -> String {
    let pascal = to_pascal_case(value);
    if pascal.is_empty() {
        return "Empty".to_string();
    }
    if pascal.starts_with(|c: char| c.is_numeric()) {
        return format!("V{pascal}");
    }
    sanitize(&pascal, "Empty")
}

/// Identifier for a generated function or constant derived from a type name.
pub fn fn_ident(type_name: &str) -> String {
    sanitize(&to_snake_case(type_name), "unnamed")
}

/// A module declaration for a generated file.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ModuleName {
    /// Identifier used in `mod` and `use` items.
    pub ident: String,
    /// File stem on disk.
    pub file_stem: String,
}

impl ModuleName {
    /// Module for the file `<file_stem>.rs`.
    pub fn new(file_stem: &str) -> Self {
        Self {
            ident: sanitize(file_stem, "module"),
            file_stem: file_stem.to_string(),
        }
    }

    /// Returns `true` when the identifier differs from the file stem and
    /// the declaration needs a `#[path]` attribute.
    pub fn needs_path(&self) -> bool {
        self.ident != self.file_stem
    }

    /// `pub mod` declaration, with `#[path]` when needed.
    pub fn declaration(&self) -> String {
        if self.needs_path() {
            format!("#[path = \"{}.rs\"]\npub mod {};", self.file_stem, self.ident)
        } else {
            format!("pub mod {};", self.ident)
        }
    }
}

/// Hands out identifiers that are unique within one scope by appending
/// `2`, `3`, ... on collision.
#[derive(Debug, Default)]
pub struct NameScope {
    taken: HashSet<String>,
}

impl NameScope {
    /// Empty scope.
    pub fn new() -> Self {
        Self::default()
    }

    /// Mark `name` as used without checking.
    pub fn reserve(&mut self, name: &str) {
        self.taken.insert(name.to_string());
    }

    /// Returns `true` if `name` is already used.
    pub fn contains(&self, name: &str) -> bool {
        self.taken.contains(name)
    }

    /// Claim `candidate`, or the first free numbered variant of it.
    pub fn claim(&mut self, candidate: &str) -> String {
        let mut name = candidate.to_string();
        let mut n = 2;
        while self.taken.contains(&name) {
            name = format!("{candidate}{n}");
            n += 1;
        }
        self.taken.insert(name.clone());
        name
    }
}

/// Render `text` as a raw string literal, with enough `#`s that no
/// sequence inside the text terminates it.
pub fn raw_string_literal(text: &str) -> String {
    let mut longest = 0;
    let mut run: Option<usize> = None;
    for c in text.chars() {
        run = match (c, run) {
            ('"', _) => Some(0),
            ('#', Some(n)) => Some(n + 1),
            _ => None,
        };
        if let Some(n) = run {
            longest = longest.max(n);
        }
    }
    let hashes = "#".repeat(longest + 1);
    format!("r{hashes}\"{text}\"{hashes}")
}

/// Render `text` as an ordinary escaped string literal.
pub fn string_literal(text: &str) -> String {
    format!("{text:?}")
}
