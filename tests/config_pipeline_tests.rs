//! End-to-end tests for the config pipeline: file reading, reference
//! resolution, and the typed model over the same document.

use benchtop_config::file::{read_config_file, write_document};
use benchtop_config::model::top_level_schema;
use benchtop_config::schema::ConfigModel;
use benchtop_config::{ConfigError, resolve_references, resolve_single_item};
use serde_json::json;
use std::fs;
use std::path::PathBuf;
use tempfile::TempDir;

const CONFIG_TOML: &str = r#"
[benchtop]
version = 2
project = "my_project"

[benchtop.storage]
type = "local_storage"
location = "/data/${#/benchtop/project}/subpath"

[benchtop.runner]
address = "http://localhost:8001/execution"
timeout = 1.0
"#;

#[test]
fn end_to_end_reference_resolution() {
    let doc = json!({
        "qual": {"project": "my_project"},
        "data_handler": {
            "root": "/data/${#/data_handler/project}/subpath",
            "project": "${#/qual/project}",
        },
    });
    let resolved = resolve_references(&doc).unwrap();
    assert_eq!(resolved["data_handler"]["root"], "/data/my_project/subpath");
    assert_eq!(resolved["data_handler"]["project"], "my_project");
}

#[test]
fn cyclic_document_is_rejected() {
    let doc = json!({"a": "${#/b}", "b": "${#/a}"});
    let err = resolve_references(&doc).unwrap_err();
    let message = err.to_string();
    assert!(message.contains("/a") && message.contains("/b"), "{message}");
    assert!(matches!(err, ConfigError::ReferenceCycle { .. }));
}

#[test]
fn plain_literal_is_not_a_template() {
    let doc = json!({"key": "value"});
    assert_eq!(resolve_single_item(&doc, "plain literal").unwrap(), None);
}

#[test]
fn eager_and_lazy_resolution_agree() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, CONFIG_TOML).unwrap();

    // Eager: resolve the whole document, then parse.
    let resolved = read_config_file(&path, None, true).unwrap();
    let eager = ConfigModel::parse(&resolved, &top_level_schema()).unwrap();

    // Lazy: parse with templates intact, resolve on read.
    let raw = read_config_file(&path, None, false).unwrap();
    let lazy = ConfigModel::parse(&raw, &top_level_schema()).unwrap();

    let eager_storage = eager.model("benchtop").unwrap().model("storage").unwrap();
    let lazy_storage = lazy.model("benchtop").unwrap().model("storage").unwrap();
    assert_eq!(
        eager_storage.get_path("location").unwrap(),
        PathBuf::from("/data/my_project/subpath")
    );
    assert_eq!(
        eager_storage.get_path("location").unwrap(),
        lazy_storage.get_path("location").unwrap()
    );

    // Only the lazy model still knows the raw template.
    assert_eq!(
        lazy_storage.get_reference("location"),
        Some("/data/${#/benchtop/project}/subpath")
    );
    assert_eq!(eager_storage.get_reference("location"), None);
}

#[test]
fn serialize_parse_identity_survives_file_round_trip() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(&path, CONFIG_TOML).unwrap();

    let raw = read_config_file(&path, None, false).unwrap();
    let model = ConfigModel::parse(&raw, &top_level_schema()).unwrap();
    assert_eq!(model.serialize(true), raw);

    // And the serialized form is writable as TOML again.
    let out = temp.path().join("rewritten.toml");
    write_document(&out, &model.serialize(true)).unwrap();
    let reread = read_config_file(&out, None, false).unwrap();
    assert_eq!(reread, raw);
}

#[test]
fn unresolvable_reference_in_file_surfaces_on_read() {
    let temp = TempDir::new().unwrap();
    let path = temp.path().join("config.toml");
    fs::write(
        &path,
        r#"
[benchtop]
project = "${#/benchtop/missing_key}"

[benchtop.storage]
location = "/data"
"#,
    )
    .unwrap();

    let err = read_config_file(&path, None, true).unwrap_err();
    assert!(err.to_string().contains("/benchtop/missing_key"), "{err}");
}
