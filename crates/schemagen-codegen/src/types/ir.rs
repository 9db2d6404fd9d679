//! Intermediate representation between a JSON Schema and Rust source.

/// Rust type of a value position.
#[derive(Debug, Clone, PartialEq)]
pub enum Ty {
    /// Anything: `serde_json::Value`.
    Any,
    /// JSON `null`: `()`.
    Unit,
    Bool,
    /// `i64`.
    Integer,
    /// `u64`, for integers bounded below by zero.
    Unsigned,
    /// `f64`.
    Number,
    String,
    /// `Vec<T>`.
    Array(Box<Ty>),
    /// `BTreeMap<String, T>` for objects with schema-valued
    /// `additionalProperties` and no declared properties.
    Map(Box<Ty>),
    /// Free-form object: `serde_json::Map<String, Value>`.
    Object,
    Option(Box<Ty>),
    /// A generated item, by name.
    Named(String),
    /// Indirection for recursive containment.
    Boxed(Box<Ty>),
}

impl Ty {
    /// Wrap in `Option` unless already optional.
    pub fn optional(self) -> Ty {
        match self {
            Ty::Option(_) => self,
            other => Ty::Option(Box::new(other)),
        }
    }

    /// Rust source for this type.
    pub fn render(&self) -> String {
        match self {
            Ty::Any => "serde_json::Value".to_string(),
            Ty::Unit => "()".to_string(),
            Ty::Bool => "bool".to_string(),
            Ty::Integer => "i64".to_string(),
            Ty::Unsigned => "u64".to_string(),
            Ty::Number => "f64".to_string(),
            Ty::String => "String".to_string(),
            Ty::Array(item) => format!("Vec<{}>", item.render()),
            Ty::Map(value) => format!("std::collections::BTreeMap<String, {}>", value.render()),
            Ty::Object => "serde_json::Map<String, serde_json::Value>".to_string(),
            Ty::Option(inner) => format!("Option<{}>", inner.render()),
            Ty::Named(name) => name.clone(),
            Ty::Boxed(inner) => format!("Box<{}>", inner.render()),
        }
    }

    /// Short word describing the type, used to name union variants.
    pub fn variant_name(&self) -> String {
        match self {
            Ty::Any => "Value".to_string(),
            Ty::Unit => "Null".to_string(),
            Ty::Bool => "Bool".to_string(),
            Ty::Integer | Ty::Unsigned => "Integer".to_string(),
            Ty::Number => "Number".to_string(),
            Ty::String => "String".to_string(),
            Ty::Array(_) => "Array".to_string(),
            Ty::Map(_) | Ty::Object => "Object".to_string(),
            Ty::Option(inner) | Ty::Boxed(inner) => inner.variant_name(),
            Ty::Named(name) => name.clone(),
        }
    }
}

/// A struct field.
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Property name in JSON.
    pub json_name: String,
    /// Rust identifier.
    pub ident: String,
    pub ty: Ty,
    pub required: bool,
    pub doc: Option<String>,
}

/// A string enum variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Variant {
    pub ident: String,
    /// The JSON string it stands for.
    pub value: String,
}

/// Shape of a generated item.
#[derive(Debug, Clone, PartialEq)]
pub enum ItemKind {
    Struct {
        fields: Vec<Field>,
        /// `additionalProperties: false`.
        deny_unknown_fields: bool,
        /// Flattened catch-all field for schema-valued
        /// `additionalProperties`: (identifier, value type).
        extra: Option<(String, Ty)>,
    },
    StringEnum {
        variants: Vec<Variant>,
    },
    /// Untagged union: (variant identifier, payload).
    Union {
        variants: Vec<(String, Ty)>,
    },
    Alias(Ty),
}

/// A named top-level definition in an emitted module.
#[derive(Debug, Clone, PartialEq)]
pub struct Item {
    pub name: String,
    pub doc: Option<String>,
    pub kind: ItemKind,
}

impl Item {
    /// Returns `true` if the rendered item uses serde derives.
    pub fn uses_serde(&self) -> bool {
        !matches!(self.kind, ItemKind::Alias(_))
    }
}
