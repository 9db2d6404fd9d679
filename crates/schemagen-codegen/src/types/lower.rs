//! Lowering of JSON Schema nodes into [`Item`]s.
//!
//! Items are collected in pre-order: an item takes its slot before its
//! nested items are lowered, so a struct is emitted ahead of the types of
//! its fields.

use std::collections::{HashMap, HashSet};

use schemagen_schema::reference::{percent_decode, pointer_fragment};
use serde_json::{Map, Value};

use super::ir::{Field, Item, ItemKind, Ty, Variant};
use crate::ident::{field_ident, to_pascal_case, type_ident, variant_ident, NameScope};

/// Bound on `$ref` hops followed while merging `allOf` arms.
const MAX_MERGE_DEPTH: usize = 32;

/// Name for the item a schema node lowers to.
#[derive(Debug, Clone)]
enum Name {
    /// Reserved in advance; used verbatim.
    Exact(String),
    /// Candidate, made unique when claimed.
    Hint(String),
}

impl Name {
    fn base(&self) -> &str {
        match self {
            Name::Exact(name) | Name::Hint(name) => name,
        }
    }

    fn child(&self, suffix: &str) -> Name {
        Name::Hint(format!("{}{suffix}", self.base()))
    }

    /// Name for the payload of an `Option` wrapping this node. An exact
    /// name stays with the node itself (as an alias), so the payload needs
    /// its own.
    fn inner(&self) -> Name {
        match self {
            Name::Exact(name) => Name::Hint(format!("{name}Inner")),
            Name::Hint(_) => self.clone(),
        }
    }
}

/// Schema → item lowering for one emitted module.
pub struct Lowerer<'a> {
    /// Document that local references point into; `None` for dereferenced
    /// schemas.
    root: Option<&'a Value>,
    scope: NameScope,
    items: Vec<Option<Item>>,
    /// Item name per referenced JSON pointer.
    named: HashMap<String, String>,
    in_progress: HashSet<String>,
    done: HashSet<String>,
}

impl<'a> Lowerer<'a> {
    /// Lowerer for a self-contained schema. Any `$ref` left in it lowers to
    /// `serde_json::Value`.
    pub fn standalone() -> Self {
        Self {
            root: None,
            scope: NameScope::new(),
            items: Vec::new(),
            named: HashMap::new(),
            in_progress: HashSet::new(),
            done: HashSet::new(),
        }
    }

    /// Lowerer whose local references resolve against `root`.
    pub fn for_document(root: &'a Value) -> Self {
        Self {
            root: Some(root),
            ..Self::standalone()
        }
    }

    /// Give the subschema at `pointer` the item name `name`.
    pub fn bind(&mut self, pointer: &str, name: &str) {
        self.scope.reserve(name);
        self.named.insert(pointer.to_string(), name.to_string());
    }

    /// Lower `schema` into an item called exactly `name`.
    pub fn lower_root(&mut self, schema: &Value, name: &str) -> Ty {
        self.scope.reserve(name);
        self.lower_named(schema, name.to_string())
    }

    /// Lower the subschema at `pointer` of the root document, once.
    pub fn lower_pointer(&mut self, pointer: &str) -> Ty {
        self.lower_ref(&pointer_fragment(pointer))
    }

    /// Items in emission order.
    pub fn finish(self) -> Vec<Item> {
        self.items.into_iter().flatten().collect()
    }

    fn open_slot(&mut self) -> usize {
        self.items.push(None);
        self.items.len() - 1
    }

    fn fill(&mut self, slot: usize, item: Item) {
        self.items[slot] = Some(item);
    }

    fn claim(&mut self, name: &Name) -> String {
        match name {
            Name::Exact(name) => name.clone(),
            Name::Hint(hint) => self.scope.claim(&type_ident(hint)),
        }
    }

    fn lower_named(&mut self, schema: &Value, name: String) -> Ty {
        let slot = self.open_slot();
        let ty = self.lower(schema, &Name::Exact(name.clone()));
        let named = Ty::Named(name.clone());
        if ty != named {
            self.fill(
                slot,
                Item {
                    name,
                    doc: description(schema),
                    kind: ItemKind::Alias(ty),
                },
            );
        }
        named
    }

    fn lower(&mut self, schema: &Value, name: &Name) -> Ty {
        let Value::Object(map) = schema else {
            return Ty::Any;
        };

        if let Some(Value::String(reference)) = map.get("$ref") {
            return self.lower_ref(reference);
        }
        if let Some(constant) = map.get("const") {
            return json_kind(constant);
        }
        if let Some(Value::Array(values)) = map.get("enum") {
            return self.lower_enum(values, map, name);
        }
        if let Some(Value::Array(arms)) = map.get("allOf") {
            return self.lower_all_of(map, arms, name);
        }
        if !map.contains_key("properties") {
            for keyword in ["oneOf", "anyOf"] {
                if let Some(Value::Array(arms)) = map.get(keyword) {
                    return self.lower_union(map, arms, name);
                }
            }
        }

        match map.get("type") {
            Some(Value::String(kind)) => self.lower_kind(kind, map, name),
            Some(Value::Array(kinds)) => self.lower_kinds(kinds, map, name),
            _ if map.contains_key("properties") || map.contains_key("additionalProperties") => {
                self.lower_object(map, name)
            }
            _ if map.contains_key("items") => self.lower_kind("array", map, name),
            _ => Ty::Any,
        }
    }

    fn lower_ref(&mut self, reference: &str) -> Ty {
        let (Some(root), Some(fragment)) = (self.root, reference.strip_prefix('#')) else {
            return Ty::Any;
        };
        let pointer = percent_decode(fragment);
        let pointer = pointer.as_str();
        let Some(target) = root.pointer(pointer) else {
            return Ty::Any;
        };

        let name = match self.named.get(pointer) {
            Some(name) => name.clone(),
            None => {
                let name = self.scope.claim(&type_ident(&hint_from_pointer(pointer)));
                self.named.insert(pointer.to_string(), name.clone());
                name
            }
        };
        if self.in_progress.contains(pointer) {
            return Ty::Boxed(Box::new(Ty::Named(name)));
        }
        if self.done.contains(pointer) {
            return Ty::Named(name);
        }

        self.in_progress.insert(pointer.to_string());
        let ty = self.lower_named(target, name);
        self.in_progress.remove(pointer);
        self.done.insert(pointer.to_string());
        ty
    }

    fn lower_kind(&mut self, kind: &str, map: &Map<String, Value>, name: &Name) -> Ty {
        match kind {
            "string" => Ty::String,
            "integer" if is_non_negative(map) => Ty::Unsigned,
            "integer" => Ty::Integer,
            "number" => Ty::Number,
            "boolean" => Ty::Bool,
            "null" => Ty::Unit,
            "array" => match map.get("items") {
                Some(items @ (Value::Object(_) | Value::Bool(_))) => {
                    Ty::Array(Box::new(self.lower(items, &name.child("Item"))))
                }
                _ => Ty::Array(Box::new(Ty::Any)),
            },
            "object" => self.lower_object(map, name),
            _ => Ty::Any,
        }
    }

    fn lower_kinds(&mut self, kinds: &[Value], map: &Map<String, Value>, name: &Name) -> Ty {
        let mut nullable = false;
        let mut rest = Vec::new();
        for kind in kinds.iter().filter_map(Value::as_str) {
            if kind == "null" {
                nullable = true;
            } else if !rest.contains(&kind) {
                rest.push(kind);
            }
        }

        match (rest.as_slice(), nullable) {
            ([], true) => Ty::Unit,
            ([], false) => Ty::Any,
            ([kind], false) => self.lower_kind(kind, map, name),
            ([kind], true) => self.lower_kind(kind, map, &name.inner()).optional(),
            (kinds, nullable) => {
                let union_name = if nullable { name.inner() } else { name.clone() };
                let item_name = self.claim(&union_name);
                let slot = self.open_slot();
                let mut idents = NameScope::new();
                let mut variants = Vec::new();
                for (i, kind) in kinds.iter().enumerate() {
                    let hint = Name::Hint(format!("{item_name}Variant{}", i + 1));
                    let ty = self.lower_kind(kind, map, &hint);
                    variants.push((idents.claim(&variant_ident(&ty.variant_name())), ty));
                }
                self.fill(
                    slot,
                    Item {
                        name: item_name.clone(),
                        doc: description_of(map),
                        kind: ItemKind::Union { variants },
                    },
                );
                let ty = Ty::Named(item_name);
                if nullable {
                    ty.optional()
                } else {
                    ty
                }
            }
        }
    }

    fn lower_enum(&mut self, values: &[Value], map: &Map<String, Value>, name: &Name) -> Ty {
        let mut nullable = false;
        let mut strings: Vec<&str> = Vec::new();
        for value in values {
            match value {
                Value::String(s) if !strings.contains(&s.as_str()) => strings.push(s),
                Value::String(_) => {}
                Value::Null => nullable = true,
                _ => return Ty::Any,
            }
        }
        if strings.is_empty() {
            return if nullable { Ty::Unit } else { Ty::Any };
        }

        let item_name = self.claim(&if nullable { name.inner() } else { name.clone() });
        let mut idents = NameScope::new();
        let variants = strings
            .iter()
            .map(|value| Variant {
                ident: idents.claim(&variant_ident(value)),
                value: value.to_string(),
            })
            .collect();
        let slot = self.open_slot();
        self.fill(
            slot,
            Item {
                name: item_name.clone(),
                doc: description_of(map),
                kind: ItemKind::StringEnum { variants },
            },
        );

        let ty = Ty::Named(item_name);
        if nullable {
            ty.optional()
        } else {
            ty
        }
    }

    fn lower_all_of(&mut self, map: &Map<String, Value>, arms: &[Value], name: &Name) -> Ty {
        let mut merged = map.clone();
        merged.remove("allOf");
        for arm in arms {
            match self.flatten(arm, 0) {
                Some(arm) => merge_schema(&mut merged, arm),
                None => return Ty::Any,
            }
        }
        self.lower(&Value::Object(merged), name)
    }

    /// An `allOf` arm as one plain schema object: references followed and
    /// nested `allOf`s merged in. `None` if the arm cannot be merged.
    fn flatten(&self, arm: &Value, depth: usize) -> Option<Map<String, Value>> {
        if depth > MAX_MERGE_DEPTH {
            return None;
        }
        match arm {
            Value::Bool(true) => Some(Map::new()),
            Value::Object(map) => {
                let mut out = map.clone();
                if let Some(Value::String(reference)) = out.remove("$ref") {
                    let pointer = percent_decode(reference.strip_prefix('#')?);
                    let target = self.root?.pointer(&pointer)?;
                    merge_schema(&mut out, self.flatten(target, depth + 1)?);
                }
                if let Some(Value::Array(nested)) = out.remove("allOf") {
                    for arm in &nested {
                        merge_schema(&mut out, self.flatten(arm, depth + 1)?);
                    }
                }
                Some(out)
            }
            _ => None,
        }
    }

    fn lower_union(&mut self, map: &Map<String, Value>, arms: &[Value], name: &Name) -> Ty {
        let nullable = arms.iter().any(is_null_schema);
        let rest: Vec<&Value> = arms.iter().filter(|arm| !is_null_schema(arm)).collect();

        match (rest.as_slice(), nullable) {
            ([], true) => Ty::Unit,
            ([], false) => Ty::Any,
            ([arm], false) => self.lower(arm, name),
            ([arm], true) => self.lower(arm, &name.inner()).optional(),
            (arms, nullable) => {
                let union_name = if nullable { name.inner() } else { name.clone() };
                let item_name = self.claim(&union_name);
                let slot = self.open_slot();
                let mut idents = NameScope::new();
                let mut variants = Vec::new();
                for (i, arm) in arms.iter().enumerate() {
                    let hint = Name::Hint(format!("{item_name}Variant{}", i + 1));
                    let ty = self.lower(arm, &hint);
                    variants.push((idents.claim(&variant_ident(&ty.variant_name())), ty));
                }
                self.fill(
                    slot,
                    Item {
                        name: item_name.clone(),
                        doc: description_of(map),
                        kind: ItemKind::Union { variants },
                    },
                );
                let ty = Ty::Named(item_name);
                if nullable {
                    ty.optional()
                } else {
                    ty
                }
            }
        }
    }

    fn lower_object(&mut self, map: &Map<String, Value>, name: &Name) -> Ty {
        let additional = map.get("additionalProperties");
        let Some(properties) = map.get("properties").and_then(Value::as_object) else {
            return match additional {
                Some(schema @ Value::Object(_)) => {
                    Ty::Map(Box::new(self.lower(schema, &name.child("Value"))))
                }
                _ => Ty::Object,
            };
        };

        let item_name = self.claim(name);
        let slot = self.open_slot();
        let required: HashSet<&str> = map
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let mut idents = NameScope::new();
        let mut fields = Vec::with_capacity(properties.len());
        for (property, schema) in properties {
            let ident = idents.claim(&field_ident(property));
            let hint = Name::Hint(format!("{item_name}{}", to_pascal_case(property)));
            let is_required = required.contains(property.as_str());
            let mut ty = self.lower(schema, &hint);
            if !is_required {
                ty = ty.optional();
            }
            fields.push(Field {
                json_name: property.clone(),
                ident,
                ty,
                required: is_required,
                doc: description(schema),
            });
        }

        let (deny_unknown_fields, extra) = match additional {
            Some(Value::Bool(false)) => (true, None),
            Some(schema @ Value::Object(_)) => {
                let ident = idents.claim("extra");
                let ty = self.lower(schema, &Name::Hint(format!("{item_name}Extra")));
                (false, Some((ident, ty)))
            }
            _ => (false, None),
        };

        self.fill(
            slot,
            Item {
                name: item_name.clone(),
                doc: description_of(map),
                kind: ItemKind::Struct {
                    fields,
                    deny_unknown_fields,
                    extra,
                },
            },
        );
        Ty::Named(item_name)
    }
}

/// Type of a constant, by its JSON kind.
fn json_kind(value: &Value) -> Ty {
    match value {
        Value::Null => Ty::Unit,
        Value::Bool(_) => Ty::Bool,
        Value::Number(n) if n.is_i64() => Ty::Integer,
        Value::Number(n) if n.is_u64() => Ty::Unsigned,
        Value::Number(_) => Ty::Number,
        Value::String(_) => Ty::String,
        Value::Array(_) => Ty::Array(Box::new(Ty::Any)),
        Value::Object(_) => Ty::Object,
    }
}

/// Whether `minimum` or `exclusiveMinimum` rules out negative integers.
fn is_non_negative(map: &Map<String, Value>) -> bool {
    let bound = |keyword| map.get(keyword).and_then(Value::as_f64);
    bound("minimum").is_some_and(|min| min >= 0.0)
        || bound("exclusiveMinimum").is_some_and(|min| min > -1.0)
}

fn is_null_schema(schema: &Value) -> bool {
    match schema {
        Value::Object(map) => {
            map.get("type").and_then(Value::as_str) == Some("null")
                || map.get("const") == Some(&Value::Null)
                || map.get("enum") == Some(&Value::Array(vec![Value::Null]))
        }
        _ => false,
    }
}

fn description(schema: &Value) -> Option<String> {
    schema.as_object().and_then(description_of)
}

fn description_of(map: &Map<String, Value>) -> Option<String> {
    map.get("description")
        .or_else(|| map.get("title"))
        .and_then(Value::as_str)
        .map(str::to_string)
}

/// Merge `source` into `target`. Keys already in `target` win, except that
/// `properties` and `required` are unioned.
fn merge_schema(target: &mut Map<String, Value>, source: Map<String, Value>) {
    for (key, value) in source {
        match target.get_mut(&key) {
            None => {
                target.insert(key, value);
            }
            Some(existing) => match (key.as_str(), existing, value) {
                ("properties", Value::Object(existing), Value::Object(incoming)) => {
                    for (property, schema) in incoming {
                        existing.entry(property).or_insert(schema);
                    }
                }
                ("required", Value::Array(existing), Value::Array(incoming)) => {
                    for name in incoming {
                        if !existing.contains(&name) {
                            existing.push(name);
                        }
                    }
                }
                _ => {}
            },
        }
    }
}

/// Item name suggested by the last token of a JSON pointer.
fn hint_from_pointer(pointer: &str) -> String {
    let token = pointer.rsplit('/').next().unwrap_or_default();
    let token = token.replace("~1", "/").replace("~0", "~");
    let pascal = to_pascal_case(&token);
    if pascal.is_empty() {
        "Definition".to_string()
    } else {
        pascal
    }
}
