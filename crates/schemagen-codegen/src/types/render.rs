//! Rendering of lowered items as Rust source.

use super::ir::{Item, ItemKind, Ty};
use crate::ident::string_literal;
use crate::writer::CodeWriter;

const DATA_DERIVES: &str = "#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]";
const ENUM_DERIVES: &str =
    "#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]";

/// A complete module defining `items`.
pub fn render_module(items: &[Item]) -> String {
    let mut w = CodeWriter::generated();
    if items.iter().any(Item::uses_serde) {
        w.line("use serde::{Deserialize, Serialize};");
        w.blank();
    }
    for (i, item) in items.iter().enumerate() {
        if i > 0 {
            w.blank();
        }
        render_item(&mut w, item);
    }
    w.into_string()
}

fn render_item(w: &mut CodeWriter, item: &Item) {
    if let Some(doc) = &item.doc {
        w.doc(doc);
    }
    match &item.kind {
        ItemKind::Struct {
            fields,
            deny_unknown_fields,
            extra,
        } => {
            w.line(DATA_DERIVES);
            if *deny_unknown_fields {
                w.line("#[serde(deny_unknown_fields)]");
            }
            w.open(format!("pub struct {} {{", item.name));
            for field in fields {
                if let Some(doc) = &field.doc {
                    w.doc(doc);
                }
                let mut serde_args = Vec::new();
                if field.ident != field.json_name {
                    serde_args.push(format!("rename = {}", string_literal(&field.json_name)));
                }
                if !field.required {
                    serde_args.push("default".to_string());
                    serde_args.push("skip_serializing_if = \"Option::is_none\"".to_string());
                }
                if !serde_args.is_empty() {
                    w.line(format!("#[serde({})]", serde_args.join(", ")));
                }
                w.line(format!("pub {}: {},", field.ident, field.ty.render()));
            }
            if let Some((ident, value)) = extra {
                w.line("#[serde(flatten)]");
                w.line(format!(
                    "pub {ident}: {},",
                    Ty::Map(Box::new(value.clone())).render()
                ));
            }
            w.close("}");
        }
        ItemKind::StringEnum { variants } => {
            w.line(ENUM_DERIVES);
            w.open(format!("pub enum {} {{", item.name));
            for variant in variants {
                if variant.ident != variant.value {
                    w.line(format!("#[serde(rename = {})]", string_literal(&variant.value)));
                }
                w.line(format!("{},", variant.ident));
            }
            w.close("}");
        }
        ItemKind::Union { variants } => {
            w.line(DATA_DERIVES);
            w.line("#[serde(untagged)]");
            w.open(format!("pub enum {} {{", item.name));
            for (ident, ty) in variants {
                w.line(format!("{ident}({}),", ty.render()));
            }
            w.close("}");
        }
        ItemKind::Alias(ty) => {
            w.line(format!("pub type {} = {};", item.name, ty.render()));
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::ir::{Field, Variant};

    #[test]
    fn struct_rendering() {
        let item = Item {
            name: "Person".into(),
            doc: Some("A person.".into()),
            kind: ItemKind::Struct {
                fields: vec![
                    Field {
                        json_name: "firstName".into(),
                        ident: "first_name".into(),
                        ty: Ty::String,
                        required: true,
                        doc: None,
                    },
                    Field {
                        json_name: "age".into(),
                        ident: "age".into(),
                        ty: Ty::Option(Box::new(Ty::Integer)),
                        required: false,
                        doc: Some("Age in years.".into()),
                    },
                ],
                deny_unknown_fields: true,
                extra: None,
            },
        };
        let expected = "\
// @generated by schemagen

use serde::{Deserialize, Serialize};

/// A person.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Person {
    #[serde(rename = \"firstName\")]
    pub first_name: String,
    /// Age in years.
    #[serde(default, skip_serializing_if = \"Option::is_none\")]
    pub age: Option<i64>,
}
";
        assert_eq!(render_module(&[item]), expected);
    }

    #[test]
    fn enum_union_and_alias_rendering() {
        let items = vec![
            Item {
                name: "Status".into(),
                doc: None,
                kind: ItemKind::StringEnum {
                    variants: vec![
                        Variant { ident: "Active".into(), value: "active".into() },
                        Variant { ident: "Done".into(), value: "Done".into() },
                    ],
                },
            },
            Item {
                name: "Id".into(),
                doc: None,
                kind: ItemKind::Union {
                    variants: vec![("String".into(), Ty::String), ("Integer".into(), Ty::Integer)],
                },
            },
            Item {
                name: "Tags".into(),
                doc: None,
                kind: ItemKind::Alias(Ty::Array(Box::new(Ty::String))),
            },
        ];
        let text = render_module(&items);
        assert!(text.contains("    #[serde(rename = \"active\")]\n    Active,\n    Done,\n"));
        assert!(text.contains("#[serde(untagged)]\npub enum Id {\n    String(String),\n    Integer(i64),\n}"));
        assert!(text.contains("pub type Tags = Vec<String>;"));
    }

    #[test]
    fn alias_only_module_has_no_serde_import() {
        let items = vec![Item {
            name: "Name".into(),
            doc: None,
            kind: ItemKind::Alias(Ty::String),
        }];
        assert_eq!(
            render_module(&items),
            "// @generated by schemagen\n\npub type Name = String;\n"
        );
    }

    #[test]
    fn extra_fields_are_flattened_maps() {
        let item = Item {
            name: "Bag".into(),
            doc: None,
            kind: ItemKind::Struct {
                fields: Vec::new(),
                deny_unknown_fields: false,
                extra: Some(("extra".into(), Ty::Number)),
            },
        };
        let text = render_module(&[item]);
        assert!(text.contains(
            "    #[serde(flatten)]\n    pub extra: std::collections::BTreeMap<String, f64>,\n"
        ));
    }
}
