//! Marker scanning: single strings and whole documents.
//!
//! Offsets are byte offsets into the owning string. Document paths use the
//! JSON-Pointer shape `/a/b/c`; keys are joined verbatim, without pointer
//! token escaping, matching the template syntax accepted in config files.

use crate::error::{ConfigError, ConfigResult};
use crate::refs::models::Reference;
use serde_json::Value;
use std::collections::{HashSet, VecDeque};

/// Opening marker of a template reference. The full form is `${#/path}`.
pub const TEMPLATE_START: &str = "${#";

/// Scan one string for template references.
///
/// An unmatched marker start stops scanning for the whole string: no further
/// references are reported even if well-formed markers follow. Long-standing
/// behavior, kept as-is.
pub fn find_references_in_str(to_search: &str, owning_path: &str) -> Vec<Reference> {
    let mut found = Vec::new();
    let mut cursor = 0;
    while let Some(offset) = to_search[cursor..].find(TEMPLATE_START) {
        let start = cursor + offset;
        let Some(close) = to_search[start..].find('}') else {
            return found;
        };
        let end = start + close;
        let target = to_search[start + TEMPLATE_START.len()..end].trim();
        found.push(Reference::new(owning_path, target, start, end));
        cursor = end + 1;
    }
    found
}

/// Find every reference in every string leaf of the document.
///
/// Returns references in document traversal order. Only mappings are
/// descended into; strings inside arrays are not scanned.
pub fn find_all_references(document: &Value) -> Vec<Reference> {
    let mut found = Vec::new();
    collect(document, "", &mut found);
    found
}

fn collect(document: &Value, current_path: &str, out: &mut Vec<Reference>) {
    let Some(map) = document.as_object() else {
        return;
    };
    for (key, value) in map {
        let child_path = format!("{current_path}/{key}");
        match value {
            Value::Object(_) => collect(value, &child_path, out),
            Value::String(text) => out.extend(find_references_in_str(text, &child_path)),
            _ => {}
        }
    }
}

/// Collect the transitive reference closure reachable from the string at
/// `path`, breadth-first.
///
/// Expansion of a branch stops once a target path repeats against the set of
/// already-expanded owning paths; this keeps a locally cyclic subgraph from
/// looping forever (whole-document cycle rejection happens separately).
pub fn find_references_from_base(
    document: &Value,
    path: &str,
) -> ConfigResult<HashSet<Reference>> {
    let value = document
        .pointer(path)
        .ok_or_else(|| ConfigError::UnresolvableReference {
            owning: path.to_owned(),
            target: path.to_owned(),
        })?;
    let Some(text) = value.as_str() else {
        return Err(ConfigError::NotAStringItem {
            path: path.to_owned(),
        });
    };
    let initial = find_references_in_str(text, path);
    if initial.is_empty() {
        return Ok(HashSet::new());
    }

    let mut queue: VecDeque<Reference> = initial.into();
    let mut to_resolve: HashSet<Reference> = HashSet::new();
    let mut owning_paths: HashSet<String> = HashSet::new();
    while let Some(reference) = queue.pop_front() {
        let owning = reference.owning_path.clone();
        let target = reference.target_path.clone();
        to_resolve.insert(reference);
        if owning_paths.contains(&target) {
            return Ok(to_resolve);
        }
        owning_paths.insert(owning.clone());
        let Some(value) = document.pointer(&target) else {
            return Err(ConfigError::UnresolvableReference { owning, target });
        };
        if let Some(text) = value.as_str() {
            for nested in find_references_in_str(text, &target) {
                queue.push_back(nested);
            }
        }
    }
    Ok(to_resolve)
}
