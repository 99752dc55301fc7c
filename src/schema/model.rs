//! Typed config model: schema-validated, lazily resolving view of a document.
//!
//! Parsing never resolves references: any string containing a template marker
//! is stored verbatim, bypassing type checks until first read. On read the
//! template goes through the resolver against the root raw document and the
//! resolved literal is coerced to the declared type.
//!
//! Every nested model holds a non-owning handle to the root raw document
//! (an `Rc` of the materialized tree) so absolute reference paths resolve the
//! same way at any nesting depth. Models are plain single-threaded values,
//! matching the rest of this layer.

use crate::error::{ConfigError, ConfigResult};
use crate::refs::{TEMPLATE_START, resolve_single_item};
use crate::schema::types::{FieldDef, FieldType, Schema};
use crate::schema::validate::{FieldError, ValidationReport};
use indexmap::IndexMap;
use serde_json::{Map, Value};
use std::path::PathBuf;
use std::rc::Rc;

/// Typed value of one field after parsing.
#[derive(Debug, Clone, PartialEq)]
pub enum FieldValue {
    /// Unset sentinel for optional fields without a value.
    Absent,
    /// Template reference stored verbatim; resolved on first read.
    Template(String),
    Str(String),
    Int(i64),
    Float(f64),
    Bool(bool),
    Path(PathBuf),
    Choice(String),
    Symbol(String),
    List(Vec<Value>),
    Model(ConfigModel),
}

fn is_template(value: &Value) -> bool {
    matches!(value, Value::String(text) if text.contains(TEMPLATE_START))
}

/// A validated view over one mapping level of the config document.
#[derive(Debug, Clone, PartialEq)]
pub struct ConfigModel {
    /// Diagnostic path of this level; empty for the root model.
    path: String,
    /// Root raw document with defaults materialized. Shared, immutable.
    root: Rc<Value>,
    schema: Schema,
    values: IndexMap<String, FieldValue>,
}

impl ConfigModel {
    /// Parse a raw document against a schema.
    ///
    /// Collects every field error before failing; a returned model has every
    /// declared field present (possibly as [`FieldValue::Absent`]).
    pub fn parse(document: &Value, schema: &Schema) -> ConfigResult<Self> {
        let root = Rc::new(materialize_raw(document, schema));
        let mut report = ValidationReport::default();
        let model = Self::parse_at(document, schema, "", &root, &mut report);
        if report.is_empty() {
            Ok(model)
        } else {
            Err(ConfigError::Validation(report))
        }
    }

    fn parse_at(
        document: &Value,
        schema: &Schema,
        path: &str,
        root: &Rc<Value>,
        report: &mut ValidationReport,
    ) -> Self {
        let empty = Map::new();
        let map = document.as_object().unwrap_or(&empty);
        let mut values = IndexMap::new();
        for def in schema.fields() {
            let field_path = format!("{path}/{}", def.name);
            let raw = map.get(def.name).cloned().or_else(|| def.default.clone());
            let value = match raw {
                None => {
                    if !def.ty.accepts_absent() {
                        report.push(FieldError {
                            path: field_path,
                            expected: def.ty.describe(),
                            actual: Value::Null,
                        });
                    }
                    FieldValue::Absent
                }
                Some(raw) => parse_value(&raw, &def.ty, &field_path, root, report),
            };
            values.insert(def.name.to_owned(), value);
        }
        Self {
            path: path.to_owned(),
            root: Rc::clone(root),
            schema: schema.clone(),
            values,
        }
    }

    fn lookup(&self, name: &str) -> ConfigResult<(&FieldDef, &FieldValue)> {
        match (self.schema.get(name), self.values.get(name)) {
            (Some(def), Some(value)) => Ok((def, value)),
            _ => Err(field_error(
                format!("{}/{name}", self.path),
                "a declared field",
                Value::Null,
            )),
        }
    }

    /// Read one field, resolving a stored template through the root document
    /// and coercing the result to the declared type.
    pub fn get(&self, name: &str) -> ConfigResult<FieldValue> {
        let (def, value) = self.lookup(name)?;
        match value {
            FieldValue::Template(expression) => {
                let field_path = format!("{}/{name}", self.path);
                let resolved = resolve_single_item(&self.root, expression)?.ok_or_else(|| {
                    ConfigError::UnsolvedDependency {
                        owning: field_path.clone(),
                        target: expression.clone(),
                    }
                })?;
                coerce_resolved(&resolved, &def.ty, &field_path)
            }
            other => Ok(other.clone()),
        }
    }

    /// Raw template expression of a field, if it holds one.
    pub fn get_reference(&self, name: &str) -> Option<&str> {
        match self.values.get(name)? {
            FieldValue::Template(expression) => Some(expression),
            _ => None,
        }
    }

    /// Whether the field holds a value (or template) rather than the unset
    /// sentinel.
    pub fn is_set(&self, name: &str) -> bool {
        !matches!(self.values.get(name), None | Some(FieldValue::Absent))
    }

    /// Nested model stored at `name`, without template resolution.
    pub fn model(&self, name: &str) -> Option<&ConfigModel> {
        match self.values.get(name)? {
            FieldValue::Model(model) => Some(model),
            _ => None,
        }
    }

    pub fn get_str(&self, name: &str) -> ConfigResult<String> {
        match self.get(name)? {
            FieldValue::Str(value) => Ok(value),
            other => Err(self.type_mismatch(name, "string", &other)),
        }
    }

    pub fn get_int(&self, name: &str) -> ConfigResult<i64> {
        match self.get(name)? {
            FieldValue::Int(value) => Ok(value),
            other => Err(self.type_mismatch(name, "integer", &other)),
        }
    }

    pub fn get_float(&self, name: &str) -> ConfigResult<f64> {
        match self.get(name)? {
            FieldValue::Float(value) => Ok(value),
            FieldValue::Int(value) => Ok(value as f64),
            other => Err(self.type_mismatch(name, "float", &other)),
        }
    }

    pub fn get_bool(&self, name: &str) -> ConfigResult<bool> {
        match self.get(name)? {
            FieldValue::Bool(value) => Ok(value),
            other => Err(self.type_mismatch(name, "boolean", &other)),
        }
    }

    pub fn get_path(&self, name: &str) -> ConfigResult<PathBuf> {
        match self.get(name)? {
            FieldValue::Path(value) => Ok(value),
            other => Err(self.type_mismatch(name, "filesystem path", &other)),
        }
    }

    pub fn get_choice(&self, name: &str) -> ConfigResult<String> {
        match self.get(name)? {
            FieldValue::Choice(value) => Ok(value),
            other => Err(self.type_mismatch(name, "enumerated constant", &other)),
        }
    }

    pub fn get_symbol(&self, name: &str) -> ConfigResult<String> {
        match self.get(name)? {
            FieldValue::Symbol(value) => Ok(value),
            other => Err(self.type_mismatch(name, "importable symbol", &other)),
        }
    }

    fn type_mismatch(&self, name: &str, expected: &str, actual: &FieldValue) -> ConfigError {
        field_error(
            format!("{}/{name}", self.path),
            expected,
            serialize_value(actual, false),
        )
    }

    /// Convert the model back to a raw document.
    ///
    /// Templates are preserved verbatim (serialization never forces
    /// resolution); fields holding the unset sentinel are omitted when
    /// `exclude_absent` is set, emitted as null otherwise.
    pub fn serialize(&self, exclude_absent: bool) -> Value {
        let mut out = Map::new();
        for (name, value) in &self.values {
            if exclude_absent && matches!(value, FieldValue::Absent) {
                continue;
            }
            out.insert(name.clone(), serialize_value(value, exclude_absent));
        }
        Value::Object(out)
    }
}

fn serialize_value(value: &FieldValue, exclude_absent: bool) -> Value {
    match value {
        FieldValue::Absent => Value::Null,
        FieldValue::Template(expression) => Value::String(expression.clone()),
        FieldValue::Str(text) => Value::String(text.clone()),
        FieldValue::Int(number) => Value::from(*number),
        FieldValue::Float(number) => Value::from(*number),
        FieldValue::Bool(flag) => Value::Bool(*flag),
        FieldValue::Path(path) => Value::String(path.to_string_lossy().into_owned()),
        FieldValue::Choice(literal) => Value::String(literal.clone()),
        FieldValue::Symbol(symbol) => Value::String(symbol.clone()),
        FieldValue::List(items) => Value::Array(items.clone()),
        FieldValue::Model(model) => model.serialize(exclude_absent),
    }
}

/// Raw root document with schema defaults filled in for missing keys.
///
/// Only declared fields survive; templates stay verbatim. This is the
/// document lazily read templates resolve against, so a reference may target
/// a defaulted field that the source file never spelled out.
fn materialize_raw(document: &Value, schema: &Schema) -> Value {
    let empty = Map::new();
    let map = document.as_object().unwrap_or(&empty);
    let mut out = Map::new();
    for def in schema.fields() {
        let Some(raw) = map.get(def.name).cloned().or_else(|| def.default.clone()) else {
            continue;
        };
        let value = match def.ty.nested_schema() {
            Some(nested) if raw.is_object() => materialize_raw(&raw, nested),
            _ => raw,
        };
        out.insert(def.name.to_owned(), value);
    }
    Value::Object(out)
}

fn parse_value(
    raw: &Value,
    ty: &FieldType,
    field_path: &str,
    root: &Rc<Value>,
    report: &mut ValidationReport,
) -> FieldValue {
    // Template strings bypass type checking entirely until resolved.
    if is_template(raw) {
        if let Value::String(expression) = raw {
            return FieldValue::Template(expression.clone());
        }
    }
    match ty {
        FieldType::Str => match raw {
            Value::String(text) => FieldValue::Str(text.clone()),
            _ => mismatch(raw, ty, field_path, report),
        },
        FieldType::Int => match raw.as_i64() {
            Some(number) => FieldValue::Int(number),
            None => mismatch(raw, ty, field_path, report),
        },
        FieldType::Float => match raw {
            Value::Number(number) => match number.as_f64() {
                Some(value) => FieldValue::Float(value),
                None => mismatch(raw, ty, field_path, report),
            },
            _ => mismatch(raw, ty, field_path, report),
        },
        FieldType::Bool => match raw {
            Value::Bool(flag) => FieldValue::Bool(*flag),
            _ => mismatch(raw, ty, field_path, report),
        },
        FieldType::Path => match raw {
            Value::String(text) => FieldValue::Path(PathBuf::from(text)),
            _ => mismatch(raw, ty, field_path, report),
        },
        FieldType::Choice(options) => match raw {
            Value::String(text) if options.contains(&text.as_str()) => {
                FieldValue::Choice(text.clone())
            }
            _ => mismatch(raw, ty, field_path, report),
        },
        FieldType::Symbol => match raw {
            Value::String(text) => FieldValue::Symbol(text.clone()),
            _ => mismatch(raw, ty, field_path, report),
        },
        FieldType::List => match raw {
            Value::Array(items) => FieldValue::List(items.clone()),
            _ => mismatch(raw, ty, field_path, report),
        },
        FieldType::Nested(schema) => match raw {
            Value::Object(_) => FieldValue::Model(ConfigModel::parse_at(
                raw, schema, field_path, root, report,
            )),
            _ => mismatch(raw, ty, field_path, report),
        },
        FieldType::Optional(inner) => match raw {
            Value::Null => FieldValue::Absent,
            _ => parse_value(raw, inner, field_path, root, report),
        },
        FieldType::Union(branches) => {
            for branch in branches {
                let mut scratch = ValidationReport::default();
                let value = parse_value(raw, branch, field_path, root, &mut scratch);
                if scratch.is_empty() {
                    return value;
                }
            }
            mismatch(raw, ty, field_path, report)
        }
    }
}

fn mismatch(
    raw: &Value,
    ty: &FieldType,
    field_path: &str,
    report: &mut ValidationReport,
) -> FieldValue {
    report.push(FieldError {
        path: field_path.to_owned(),
        expected: ty.describe(),
        actual: raw.clone(),
    });
    FieldValue::Absent
}

fn field_error(path: String, expected: &str, actual: Value) -> ConfigError {
    let mut report = ValidationReport::default();
    report.push(FieldError {
        path,
        expected: expected.to_owned(),
        actual,
    });
    ConfigError::Validation(report)
}

/// Coerce the literal a template resolved to into the declared field type.
///
/// Splicing renders everything through a string, so numeric and boolean
/// declarations accept the parseable textual forms as well.
fn coerce_resolved(resolved: &Value, ty: &FieldType, field_path: &str) -> ConfigResult<FieldValue> {
    let fail = || field_error(field_path.to_owned(), &ty.describe(), resolved.clone());
    match ty {
        FieldType::Str => match resolved {
            Value::String(text) => Ok(FieldValue::Str(text.clone())),
            _ => Err(fail()),
        },
        FieldType::Int => match resolved {
            Value::Number(number) => number.as_i64().map(FieldValue::Int).ok_or_else(fail),
            Value::String(text) => text
                .parse::<i64>()
                .map(FieldValue::Int)
                .map_err(|_| fail()),
            _ => Err(fail()),
        },
        FieldType::Float => match resolved {
            Value::Number(number) => number.as_f64().map(FieldValue::Float).ok_or_else(fail),
            Value::String(text) => text
                .parse::<f64>()
                .map(FieldValue::Float)
                .map_err(|_| fail()),
            _ => Err(fail()),
        },
        FieldType::Bool => match resolved {
            Value::Bool(flag) => Ok(FieldValue::Bool(*flag)),
            Value::String(text) => text
                .parse::<bool>()
                .map(FieldValue::Bool)
                .map_err(|_| fail()),
            _ => Err(fail()),
        },
        FieldType::Path => match resolved {
            Value::String(text) => Ok(FieldValue::Path(PathBuf::from(text))),
            _ => Err(fail()),
        },
        FieldType::Choice(options) => match resolved {
            Value::String(text) if options.contains(&text.as_str()) => {
                Ok(FieldValue::Choice(text.clone()))
            }
            _ => Err(fail()),
        },
        FieldType::Symbol => match resolved {
            Value::String(text) => Ok(FieldValue::Symbol(text.clone())),
            _ => Err(fail()),
        },
        FieldType::List => match resolved {
            Value::Array(items) => Ok(FieldValue::List(items.clone())),
            _ => Err(fail()),
        },
        FieldType::Nested(_) => Err(fail()),
        FieldType::Optional(inner) => match resolved {
            Value::Null => Ok(FieldValue::Absent),
            _ => coerce_resolved(resolved, inner, field_path),
        },
        FieldType::Union(branches) => branches
            .iter()
            .find_map(|branch| coerce_resolved(resolved, branch, field_path).ok())
            .ok_or_else(fail),
    }
}
