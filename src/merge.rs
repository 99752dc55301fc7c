//! Recursive override merging for config documents.
//!
//! Used to apply a per-project override document over a base config before
//! parsing. Unlike a generic deep merge, keys that are absent in the base are
//! never added by the override: the base document defines the shape.

use serde_json::Value;

/// Merge `overrides` into `base`, returning the merged document.
///
/// - Keys present in both where both values are mappings merge recursively
/// - Keys present in both otherwise are overwritten by the override value
/// - Keys absent in the base are ignored
pub fn recursive_override(mut base: Value, overrides: Value) -> Value {
    if let (Value::Object(base_map), Value::Object(override_map)) = (&mut base, overrides) {
        for (key, override_value) in override_map {
            let Some(slot) = base_map.get_mut(&key) else {
                continue;
            };
            if slot.is_object() && override_value.is_object() {
                let nested = std::mem::take(slot);
                *slot = recursive_override(nested, override_value);
            } else {
                *slot = override_value;
            }
        }
    }
    base
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn overwrites_present_keys() {
        let base = json!({"a": 1, "b": 2});
        let overrides = json!({"b": 3});
        assert_eq!(recursive_override(base, overrides), json!({"a": 1, "b": 3}));
    }

    #[test]
    fn ignores_keys_absent_in_base() {
        let base = json!({"a": 1});
        let overrides = json!({"a": 2, "added": 3});
        assert_eq!(recursive_override(base, overrides), json!({"a": 2}));
    }

    #[test]
    fn merges_nested_mappings() {
        let base = json!({
            "storage": {"type": "local_storage", "location": "/data"},
            "debug": true
        });
        let overrides = json!({
            "storage": {"location": "/mnt/data"}
        });
        assert_eq!(
            recursive_override(base, overrides),
            json!({
                "storage": {"type": "local_storage", "location": "/mnt/data"},
                "debug": true
            })
        );
    }

    #[test]
    fn arrays_are_replaced() {
        let base = json!({"items": [1, 2, 3]});
        let overrides = json!({"items": [4]});
        assert_eq!(recursive_override(base, overrides), json!({"items": [4]}));
    }

    #[test]
    fn override_replaces_mapping_with_primitive() {
        let base = json!({"value": {"nested": true}});
        let overrides = json!({"value": 42});
        assert_eq!(recursive_override(base, overrides), json!({"value": 42}));
    }

    #[test]
    fn nested_keys_absent_in_base_are_ignored() {
        let base = json!({"outer": {"kept": 1}});
        let overrides = json!({"outer": {"kept": 2, "added": 3}});
        assert_eq!(
            recursive_override(base, overrides),
            json!({"outer": {"kept": 2}})
        );
    }
}
