//! Configuration layer for the benchtop lab-instrument control application.
//!
//! A config document is a nested mapping addressable by JSON-Pointer paths.
//! String values may reference other locations in the same document with
//! `${#/json/pointer}` markers, so one canonical value (a project name) can
//! be reused inside many derived ones (storage locations).
//!
//! Two consumption styles produce identical values:
//! - **Eager**: [`refs::resolve_references`] rewrites the whole document so
//!   no marker remains.
//! - **Lazy**: [`schema::ConfigModel::parse`] keeps templates intact and
//!   resolves each field on first read.
//!
//! Documents are immutable snapshots; every transform returns a new document.

pub mod error;
pub mod file;
pub mod merge;
pub mod model;
pub mod refs;
pub mod schema;

pub use error::{ConfigError, ConfigResult};
pub use merge::recursive_override;
pub use refs::{resolve_references, resolve_single_item};
pub use schema::{ConfigModel, FieldType, FieldValue, Schema};
