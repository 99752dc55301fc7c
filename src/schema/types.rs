//! Declarative field registry: the schema a typed model is parsed against.
//!
//! Schemas are built once at definition time; no runtime reflection is
//! involved. Field order in the registry is declaration order and drives
//! serialization order.

use serde_json::Value;

/// Expected type of a config field.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldType {
    Str,
    Int,
    Float,
    Bool,
    /// Filesystem path, stored as its string form.
    Path,
    /// Enumerated constant; the value must be one of the listed literals.
    Choice(&'static [&'static str]),
    /// Importable symbol such as `package.module.Class`; accepted verbatim,
    /// resolving the symbol itself is the consumer's concern.
    Symbol,
    List,
    /// Nested mapping parsed against its own schema.
    Nested(Schema),
    Optional(Box<FieldType>),
    /// Branches are tried in declared order; the first match wins.
    Union(Vec<FieldType>),
}

impl FieldType {
    pub fn optional(inner: FieldType) -> Self {
        FieldType::Optional(Box::new(inner))
    }

    /// Whether a missing value (no config entry, no default) is acceptable.
    pub fn accepts_absent(&self) -> bool {
        match self {
            FieldType::Optional(_) => true,
            FieldType::Union(branches) => branches.iter().any(FieldType::accepts_absent),
            _ => false,
        }
    }

    /// Schema of the nested mapping this type carries, looking through
    /// optional wrappers and union branches.
    pub(crate) fn nested_schema(&self) -> Option<&Schema> {
        match self {
            FieldType::Nested(schema) => Some(schema),
            FieldType::Optional(inner) => inner.nested_schema(),
            FieldType::Union(branches) => branches.iter().find_map(FieldType::nested_schema),
            _ => None,
        }
    }

    /// Human-readable description used in validation errors.
    pub fn describe(&self) -> String {
        match self {
            FieldType::Str => "string".to_owned(),
            FieldType::Int => "integer".to_owned(),
            FieldType::Float => "float".to_owned(),
            FieldType::Bool => "boolean".to_owned(),
            FieldType::Path => "filesystem path".to_owned(),
            FieldType::Choice(options) => format!("one of [{}]", options.join(", ")),
            FieldType::Symbol => "importable symbol".to_owned(),
            FieldType::List => "list".to_owned(),
            FieldType::Nested(_) => "nested mapping".to_owned(),
            FieldType::Optional(inner) => format!("optional {}", inner.describe()),
            FieldType::Union(branches) => branches
                .iter()
                .map(FieldType::describe)
                .collect::<Vec<_>>()
                .join(" | "),
        }
    }
}

/// One declared field: name, expected type, optional default raw value.
#[derive(Debug, Clone, PartialEq)]
pub struct FieldDef {
    pub name: &'static str,
    pub ty: FieldType,
    pub default: Option<Value>,
}

/// Ordered field registry for one mapping level of the config document.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Schema {
    fields: Vec<FieldDef>,
}

impl Schema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn field(mut self, name: &'static str, ty: FieldType) -> Self {
        self.fields.push(FieldDef {
            name,
            ty,
            default: None,
        });
        self
    }

    pub fn field_with_default(mut self, name: &'static str, ty: FieldType, default: Value) -> Self {
        self.fields.push(FieldDef {
            name,
            ty,
            default: Some(default),
        });
        self
    }

    pub fn fields(&self) -> &[FieldDef] {
        &self.fields
    }

    pub fn get(&self, name: &str) -> Option<&FieldDef> {
        self.fields.iter().find(|def| def.name == name)
    }
}
