//! Reference resolution: whole-document and single-expression entry points.
//!
//! Resolution works over an immutable snapshot of the document. Every
//! transform returns a new document; the input is never mutated.

use crate::error::{ConfigError, ConfigResult};
use crate::refs::cycles::ensure_acyclic;
use crate::refs::models::{PathWithReferences, Reference};
use crate::refs::scan::{find_all_references, find_references_from_base};
use indexmap::IndexMap;
use serde_json::Value;
use std::collections::HashMap;
use tracing::debug;

/// Synthetic key used to host a standalone expression during single-item
/// resolution. Must not collide with a real config key.
const SINGLE_ITEM_KEY: &str = "_benchtop_ref_to_resolve";

/// Textual form a resolved target takes when spliced into the owning string.
/// Strings splice without quotes; other scalars use their literal rendering.
fn literal_text(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

/// State of one resolution pass. Local to a single call; nothing is shared
/// across separate `resolve_references`/`resolve_single_item` invocations.
struct Resolution<'doc> {
    document: &'doc Value,
    states: IndexMap<String, PathWithReferences>,
    solved: HashMap<String, Value>,
}

impl<'doc> Resolution<'doc> {
    /// Reject cyclic graphs, then group references by owning path in
    /// first-seen order.
    fn new(document: &'doc Value, references: Vec<Reference>) -> ConfigResult<Self> {
        ensure_acyclic(&references)?;
        let mut states: IndexMap<String, PathWithReferences> = IndexMap::new();
        for reference in references {
            states
                .entry(reference.owning_path.clone())
                .or_insert_with(|| PathWithReferences::new(reference.owning_path.clone()))
                .references
                .push(reference);
        }
        Ok(Self {
            document,
            states,
            solved: HashMap::new(),
        })
    }

    fn run(&mut self) -> ConfigResult<()> {
        let paths: Vec<String> = self.states.keys().cloned().collect();
        for path in paths {
            self.resolve_path(&path)?;
        }
        Ok(())
    }

    /// Resolve every reference owned by `path`, recursing into dependency
    /// paths first, then rebuild and cache the final string.
    fn resolve_path(&mut self, path: &str) -> ConfigResult<()> {
        if self.states[path].solved {
            return Ok(());
        }
        let count = self.states[path].references.len();
        for index in 0..count {
            let (owning, target, already_solved) = {
                let reference = &self.states[path].references[index];
                (
                    reference.owning_path.clone(),
                    reference.target_path.clone(),
                    reference.solved,
                )
            };
            if already_solved {
                continue;
            }
            let value = if let Some(cached) = self.solved.get(&target) {
                cached.clone()
            } else if self.states.contains_key(&target) {
                // The target is itself templated; resolve it first.
                self.resolve_path(&target)?;
                self.solved
                    .get(&target)
                    .cloned()
                    .ok_or_else(|| ConfigError::UnsolvedDependency {
                        owning,
                        target: target.clone(),
                    })?
            } else {
                // Plain literal elsewhere in the document. A null target is
                // as unresolvable as a missing one.
                let found = self
                    .document
                    .pointer(&target)
                    .filter(|value| !value.is_null())
                    .cloned()
                    .ok_or_else(|| ConfigError::UnresolvableReference {
                        owning,
                        target: target.clone(),
                    })?;
                self.solved.insert(target.clone(), found.clone());
                found
            };
            let reference = &mut self.states[path].references[index];
            reference.value = Some(value);
            reference.solved = true;
        }
        self.splice(path)
    }

    /// Rebuild the owning string by splicing resolved values over their
    /// marker spans, back to front.
    ///
    /// Descending start order is required: each splice shifts offsets for
    /// everything after the edit point, so working from the end keeps the
    /// untouched spans' offsets valid.
    fn splice(&mut self, path: &str) -> ConfigResult<()> {
        let original = self
            .document
            .pointer(path)
            .and_then(Value::as_str)
            .ok_or_else(|| ConfigError::NotAStringItem {
                path: path.to_owned(),
            })?;

        let mut spans: Vec<(usize, usize, String)> = self.states[path]
            .references
            .iter()
            .map(|reference| {
                let value = reference.value.as_ref().ok_or_else(|| {
                    ConfigError::UnsolvedDependency {
                        owning: reference.owning_path.clone(),
                        target: reference.target_path.clone(),
                    }
                })?;
                Ok((reference.start, reference.end, literal_text(value)))
            })
            .collect::<ConfigResult<_>>()?;
        spans.sort_by_key(|&(start, _, _)| std::cmp::Reverse(start));

        let mut rendered = original.to_owned();
        for (start, end, text) in spans {
            rendered.replace_range(start..=end, &text);
        }
        debug!(path, value = %rendered, "config path resolved");

        let state = &mut self.states[path];
        state.value = Some(Value::String(rendered.clone()));
        state.solved = true;
        self.solved.insert(path.to_owned(), Value::String(rendered));
        Ok(())
    }
}

/// Resolve every template reference in the document.
///
/// Returns a new document in which no `${#` marker remains; the input is left
/// untouched. Fails with [`ConfigError::ReferenceCycle`] before any resolution
/// work if the reference graph is cyclic.
pub fn resolve_references(document: &Value) -> ConfigResult<Value> {
    let references = find_all_references(document);
    debug!(count = references.len(), "resolving document references");
    let mut resolution = Resolution::new(document, references)?;
    resolution.run()?;

    let mut resolved = document.clone();
    for (path, state) in &resolution.states {
        let value = state
            .value
            .clone()
            .ok_or_else(|| ConfigError::UnsolvedDependency {
                owning: path.clone(),
                target: path.clone(),
            })?;
        let slot =
            resolved
                .pointer_mut(path)
                .ok_or_else(|| ConfigError::UnresolvableReference {
                    owning: path.clone(),
                    target: path.clone(),
                })?;
        *slot = value;
    }
    Ok(resolved)
}

/// Resolve a standalone template expression against the document.
///
/// Returns `Ok(None)` when the expression contains no reference markers at
/// all: the caller should treat the literal value as-is. The document must be
/// a mapping at the top level.
pub fn resolve_single_item(document: &Value, expression: &str) -> ConfigResult<Option<Value>> {
    let Some(map) = document.as_object() else {
        return Err(ConfigError::NotAStringItem { path: "/".to_owned() });
    };
    let mut scratch = map.clone();
    scratch.insert(
        SINGLE_ITEM_KEY.to_owned(),
        Value::String(expression.to_owned()),
    );
    let scratch = Value::Object(scratch);
    let pointer = format!("/{SINGLE_ITEM_KEY}");

    let references = find_references_from_base(&scratch, &pointer)?;
    let mut resolution = Resolution::new(&scratch, references.into_iter().collect())?;
    resolution.run()?;
    Ok(resolution
        .states
        .get(&pointer)
        .and_then(|state| state.value.clone()))
}
