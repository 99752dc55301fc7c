//! Schema-typed configuration model layer.
//!
//! A [`Schema`] is a field registry declared once; [`ConfigModel::parse`]
//! validates a raw document against it and [`ConfigModel`] accessors read
//! fields back, transparently resolving template references on first read.

mod model;
mod types;
mod validate;

pub use model::{ConfigModel, FieldValue};
pub use types::{FieldDef, FieldType, Schema};
pub use validate::{FieldError, ValidationReport};
