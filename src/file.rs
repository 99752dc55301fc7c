//! Config file lookup and document IO.
//!
//! Thin glue between the filesystem and the in-memory document: TOML on
//! disk, `serde_json::Value` in memory. Assumes a single reader/writer at a
//! time; no locking discipline is defined here.

use crate::merge::recursive_override;
use crate::model::{DEFAULT_CONFIG_FILENAME, default_config_dir};
use crate::refs::resolve_references;
use anyhow::{Context, Result, bail};
use serde_json::Value;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

fn config_file_in_dir(dir: &Path, specific_filename: &str, must_exist: bool) -> Result<PathBuf> {
    let specific = dir.join(specific_filename);
    if specific.is_file() {
        return Ok(specific);
    }
    let common = dir.join(DEFAULT_CONFIG_FILENAME);
    if common.is_file() {
        return Ok(common);
    }
    if must_exist {
        bail!("config file in dir {} does not exist", dir.display());
    }
    Ok(common)
}

/// Locate the config file to use.
///
/// An explicit file path wins; an explicit directory is searched for the
/// specific filename, then the common `config.toml`; with no explicit path
/// the default config directory is searched the same way.
pub fn get_config_file(
    config_path: Option<&Path>,
    specific_filename: &str,
    must_exist: bool,
) -> Result<PathBuf> {
    let Some(path) = config_path else {
        let dir = default_config_dir().context("can't determine home directory")?;
        return config_file_in_dir(&dir, specific_filename, must_exist);
    };
    if path.is_file() {
        return Ok(path.to_path_buf());
    }
    if path.is_dir() {
        return config_file_in_dir(path, specific_filename, true);
    }
    if must_exist {
        bail!("unexpected config file path {}", path.display());
    }
    Ok(path.to_path_buf())
}

/// Read a TOML config file into a document.
pub fn read_document(path: &Path) -> Result<Value> {
    debug!(path = %path.display(), "reading config file");
    let content = fs::read_to_string(path)
        .with_context(|| format!("failed to read config file {}", path.display()))?;
    let document = toml::from_str(&content)
        .with_context(|| format!("failed to parse config file {}", path.display()))?;
    Ok(document)
}

/// Write a document to a TOML config file, creating parent directories.
pub fn write_document(path: &Path, document: &Value) -> Result<()> {
    let content =
        toml::to_string_pretty(document).context("failed to serialize config document")?;
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("failed to create config dir {}", parent.display()))?;
    }
    fs::write(path, content)
        .with_context(|| format!("failed to write config file {}", path.display()))?;
    Ok(())
}

/// Read a config file, apply an optional override document, and optionally
/// resolve template references eagerly.
///
/// With `solve_references` off the returned document keeps its template
/// strings intact, ready for lazy per-field resolution by the typed model.
pub fn read_config_file(
    path: &Path,
    overrides: Option<Value>,
    solve_references: bool,
) -> Result<Value> {
    let mut document = read_document(path)?;
    if let Some(overrides) = overrides {
        document = recursive_override(document, overrides);
    }
    if !solve_references {
        return Ok(document);
    }
    Ok(resolve_references(&document)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::TempDir;

    const SAMPLE: &str = r#"
[benchtop]
project = "my_project"

[benchtop.storage]
type = "local_storage"
location = "/data/${#/benchtop/project}"
"#;

    #[test]
    fn read_parses_toml_into_document() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, SAMPLE).unwrap();

        let document = read_document(&path).unwrap();
        assert_eq!(document["benchtop"]["project"], "my_project");
        assert_eq!(
            document["benchtop"]["storage"]["location"],
            "/data/${#/benchtop/project}"
        );
    }

    #[test]
    fn write_then_read_round_trips() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("nested/dir/config.toml");
        let document = json!({
            "benchtop": {
                "project": "demo",
                "storage": {"type": "local_storage", "location": "/data"},
            }
        });
        write_document(&path, &document).unwrap();
        assert_eq!(read_document(&path).unwrap(), document);
    }

    #[test]
    fn read_config_file_resolves_references_eagerly() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, SAMPLE).unwrap();

        let document = read_config_file(&path, None, true).unwrap();
        assert_eq!(
            document["benchtop"]["storage"]["location"],
            "/data/my_project"
        );

        let raw = read_config_file(&path, None, false).unwrap();
        assert_eq!(
            raw["benchtop"]["storage"]["location"],
            "/data/${#/benchtop/project}"
        );
    }

    #[test]
    fn read_config_file_applies_overrides_before_resolution() {
        let temp = TempDir::new().unwrap();
        let path = temp.path().join("config.toml");
        fs::write(&path, SAMPLE).unwrap();

        let overrides = json!({"benchtop": {"project": "other_project", "added": 1}});
        let document = read_config_file(&path, Some(overrides), true).unwrap();
        assert_eq!(document["benchtop"]["project"], "other_project");
        assert_eq!(
            document["benchtop"]["storage"]["location"],
            "/data/other_project"
        );
        // Override keys absent in the base are never added.
        assert!(document["benchtop"].get("added").is_none());
    }

    #[test]
    fn get_config_file_prefers_specific_filename() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.toml"), SAMPLE).unwrap();
        fs::write(temp.path().join("benchtop.toml"), SAMPLE).unwrap();

        let found = get_config_file(Some(temp.path()), "benchtop.toml", true).unwrap();
        assert_eq!(found, temp.path().join("benchtop.toml"));
    }

    #[test]
    fn get_config_file_falls_back_to_common_filename() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join("config.toml"), SAMPLE).unwrap();

        let found = get_config_file(Some(temp.path()), "benchtop.toml", true).unwrap();
        assert_eq!(found, temp.path().join("config.toml"));
    }

    #[test]
    fn get_config_file_missing_dir_entry_errors() {
        let temp = TempDir::new().unwrap();
        assert!(get_config_file(Some(temp.path()), "benchtop.toml", true).is_err());
    }
}
