//! Concrete schema of the benchtop application config.
//!
//! Mirrors the layout of `config.toml`: a single top-level `benchtop` table
//! with core settings plus nested tables for storage, the remote runner
//! service, and the calibration library.

use crate::schema::{FieldType, Schema};
use serde_json::json;
use std::path::PathBuf;

/// Top-level table name in the config file.
pub const CONFIG_KEY: &str = "benchtop";

/// Filename looked up in the config directory.
pub const DEFAULT_CONFIG_FILENAME: &str = "config.toml";

/// Current config structure version.
pub const CONFIG_VERSION: i64 = 2;

/// Project assigned when the config does not name one.
pub const DEFAULT_PROJECT: &str = "init_project";

/// Supported storage backends.
pub const STORAGE_TYPES: &[&str] = &["local_storage", "timeline_db"];

/// Default config directory, `~/.benchtop`.
pub fn default_config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|home| home.join(".benchtop"))
}

pub fn storage_schema() -> Schema {
    Schema::new()
        .field_with_default(
            "type",
            FieldType::Choice(STORAGE_TYPES),
            json!("local_storage"),
        )
        .field("location", FieldType::Path)
}

/// Remote service endpoint table (`address` plus request timeout in seconds).
pub fn remote_service_schema() -> Schema {
    Schema::new()
        .field("address", FieldType::Str)
        .field("timeout", FieldType::Float)
}

pub fn calibration_library_schema() -> Schema {
    Schema::new()
        .field("folder", FieldType::Path)
        .field("resolver", FieldType::Symbol)
}

/// Schema of the `benchtop` table.
pub fn benchtop_schema() -> Schema {
    Schema::new()
        .field_with_default("version", FieldType::Int, json!(CONFIG_VERSION))
        .field_with_default("project", FieldType::Str, json!(DEFAULT_PROJECT))
        .field("password", FieldType::optional(FieldType::Str))
        .field("log_folder", FieldType::optional(FieldType::Path))
        .field("storage", FieldType::Nested(storage_schema()))
        .field(
            "runner",
            FieldType::optional(FieldType::Nested(remote_service_schema())),
        )
        .field(
            "calibration_library",
            FieldType::optional(FieldType::Nested(calibration_library_schema())),
        )
}

/// Schema of the whole config document.
pub fn top_level_schema() -> Schema {
    Schema::new().field(CONFIG_KEY, FieldType::Nested(benchtop_schema()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ConfigModel;
    use serde_json::json;

    fn sample_document() -> serde_json::Value {
        json!({
            "benchtop": {
                "version": 2,
                "project": "squid_calibration",
                "storage": {
                    "type": "local_storage",
                    "location": "/data/${#/benchtop/project}",
                },
                "runner": {
                    "address": "http://localhost:8001/execution",
                    "timeout": 1.5,
                },
                "calibration_library": {
                    "folder": "/calibrations",
                    "resolver": "benchtop.librarian.FolderLibrarian",
                },
            }
        })
    }

    #[test]
    fn parses_full_document() {
        let model = ConfigModel::parse(&sample_document(), &top_level_schema()).unwrap();
        let benchtop = model.model("benchtop").unwrap();
        assert_eq!(benchtop.get_int("version").unwrap(), 2);
        assert_eq!(benchtop.get_str("project").unwrap(), "squid_calibration");
        assert!(!benchtop.is_set("password"));

        let runner = benchtop.model("runner").unwrap();
        assert_eq!(runner.get_float("timeout").unwrap(), 1.5);

        let library = benchtop.model("calibration_library").unwrap();
        assert_eq!(
            library.get_symbol("resolver").unwrap(),
            "benchtop.librarian.FolderLibrarian"
        );
    }

    #[test]
    fn storage_location_template_resolves_lazily() {
        let model = ConfigModel::parse(&sample_document(), &top_level_schema()).unwrap();
        let storage = model.model("benchtop").unwrap().model("storage").unwrap();
        assert_eq!(
            storage.get_path("location").unwrap(),
            std::path::PathBuf::from("/data/squid_calibration")
        );
    }

    #[test]
    fn defaults_fill_missing_core_fields() {
        let doc = json!({
            "benchtop": {
                "storage": {"location": "/data"},
            }
        });
        let model = ConfigModel::parse(&doc, &top_level_schema()).unwrap();
        let benchtop = model.model("benchtop").unwrap();
        assert_eq!(benchtop.get_int("version").unwrap(), CONFIG_VERSION);
        assert_eq!(benchtop.get_str("project").unwrap(), DEFAULT_PROJECT);
    }
}
