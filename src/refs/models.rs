//! Data carriers for the reference resolution pipeline.

use serde_json::Value;
use std::hash::{Hash, Hasher};

/// One `${#/...}` occurrence inside a string value.
///
/// `owning_path` is the document path of the string that contains the marker,
/// `target_path` the path the marker points at. `start`/`end` are byte offsets
/// of the marker within the owning string, both inclusive (`end` is the offset
/// of the closing `}`).
///
/// Identity is the `(owning_path, target_path, start, end)` tuple; the
/// resolution bookkeeping fields do not participate in equality or hashing.
#[derive(Debug, Clone)]
pub struct Reference {
    pub owning_path: String,
    pub target_path: String,
    pub start: usize,
    pub end: usize,
    pub value: Option<Value>,
    pub solved: bool,
}

impl Reference {
    pub fn new(
        owning_path: impl Into<String>,
        target_path: impl Into<String>,
        start: usize,
        end: usize,
    ) -> Self {
        Self {
            owning_path: owning_path.into(),
            target_path: target_path.into(),
            start,
            end,
            value: None,
            solved: false,
        }
    }

    fn identity(&self) -> (&str, &str, usize, usize) {
        (&self.owning_path, &self.target_path, self.start, self.end)
    }
}

impl PartialEq for Reference {
    fn eq(&self, other: &Self) -> bool {
        self.identity() == other.identity()
    }
}

impl Eq for Reference {}

impl Hash for Reference {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.identity().hash(state);
    }
}

/// Resolution state for one owning path that contains at least one reference.
#[derive(Debug, Clone, Default)]
pub struct PathWithReferences {
    pub owning_path: String,
    pub references: Vec<Reference>,
    pub value: Option<Value>,
    pub solved: bool,
}

impl PathWithReferences {
    pub fn new(owning_path: impl Into<String>) -> Self {
        Self {
            owning_path: owning_path.into(),
            ..Self::default()
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn identity_ignores_resolution_state() {
        let mut solved = Reference::new("/a", "/b", 0, 7);
        solved.value = Some(Value::String("x".into()));
        solved.solved = true;
        let fresh = Reference::new("/a", "/b", 0, 7);
        assert_eq!(solved, fresh);

        let mut set = HashSet::new();
        set.insert(solved);
        set.insert(fresh);
        assert_eq!(set.len(), 1);
    }

    #[test]
    fn distinct_offsets_are_distinct_references() {
        let a = Reference::new("/a", "/b", 0, 7);
        let b = Reference::new("/a", "/b", 9, 16);
        assert_ne!(a, b);
    }
}
