//! Cycle detection over the reference adjacency graph.

use crate::error::{ConfigError, ConfigResult};
use crate::refs::models::Reference;
use indexmap::IndexMap;
use std::collections::HashSet;

/// Depth-first search for a cycle, visiting vertices in the adjacency map's
/// declared order.
///
/// On success returns the current traversal path followed by the repeated
/// vertex as a human-readable witness. Deterministic for a fixed adjacency
/// ordering; finds *a* cycle, not necessarily the shortest one.
pub fn check_cycles(adjacency: &IndexMap<String, Vec<String>>) -> (bool, Option<Vec<String>>) {
    let mut path: Vec<String> = Vec::new();
    let mut visited: HashSet<String> = HashSet::new();
    let mut cycled_item = String::new();

    for vertex in adjacency.keys() {
        if visit(vertex, adjacency, &mut visited, &mut path, &mut cycled_item) {
            let mut witness = path;
            witness.push(cycled_item);
            return (true, Some(witness));
        }
    }
    (false, None)
}

fn visit(
    vertex: &str,
    adjacency: &IndexMap<String, Vec<String>>,
    visited: &mut HashSet<String>,
    path: &mut Vec<String>,
    cycled_item: &mut String,
) -> bool {
    if visited.contains(vertex) {
        return false;
    }
    visited.insert(vertex.to_owned());
    path.push(vertex.to_owned());
    if let Some(neighbours) = adjacency.get(vertex) {
        for neighbour in neighbours {
            if path.iter().any(|seen| seen == neighbour)
                || visit(neighbour, adjacency, visited, path, cycled_item)
            {
                *cycled_item = vertex.to_owned();
                return true;
            }
        }
    }
    path.pop();
    false
}

/// Build the owning-path adjacency from a list of references and fail with
/// [`ConfigError::ReferenceCycle`] if it contains a cycle.
///
/// Must run before any resolution work on a whole-document pass.
pub fn ensure_acyclic(references: &[Reference]) -> ConfigResult<()> {
    let mut adjacency: IndexMap<String, Vec<String>> = IndexMap::new();
    for reference in references {
        adjacency
            .entry(reference.owning_path.clone())
            .or_default()
            .push(reference.target_path.clone());
    }
    if let (true, Some(cycle)) = check_cycles(&adjacency) {
        return Err(ConfigError::ReferenceCycle { cycle });
    }
    Ok(())
}
