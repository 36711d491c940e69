//! JSON merge-patch application (RFC 7396), used by `MergeConfiguration`
//! (§4.H, §9 "Merging via JSON patches"). No external merge-patch crate is
//! pulled in: `serde_json::Value` is already a workspace dependency and the
//! algorithm is a dozen lines, so a hand-rolled implementation is the
//! idiomatic choice here rather than adding a single-purpose dependency.

use serde_json::Value;

/// Applies `patch` to `target` per RFC 7396: a patch object's `null` values
/// delete the corresponding target key; non-object patch values replace the
/// target wholesale; object values recurse.
pub fn apply_merge_patch(target: &Value, patch: &Value) -> Value {
    match (target, patch) {
        (Value::Object(target_map), Value::Object(patch_map)) => {
            let mut result = target_map.clone();
            for (key, patch_value) in patch_map {
                if patch_value.is_null() {
                    result.remove(key);
                } else {
                    let merged = apply_merge_patch(result.get(key).unwrap_or(&Value::Null), patch_value);
                    result.insert(key.clone(), merged);
                }
            }
            Value::Object(result)
        }
        (_, Value::Object(_)) => apply_merge_patch(&Value::Object(Default::default()), patch),
        (_, patch) => patch.clone(),
    }
}

/// Computes the merge patch document that turns `from` into `to`. Used to
/// derive the patch `MergeConfiguration` applies: "(current⊕incoming) vs
/// current" in the spec's phrasing — i.e. diff `to` against `from`.
pub fn diff(from: &Value, to: &Value) -> Value {
    match (from, to) {
        (Value::Object(from_map), Value::Object(to_map)) => {
            let mut patch = serde_json::Map::new();
            for (key, to_value) in to_map {
                match from_map.get(key) {
                    Some(from_value) if from_value == to_value => {}
                    Some(from_value) => {
                        patch.insert(key.clone(), diff(from_value, to_value));
                    }
                    None => {
                        patch.insert(key.clone(), to_value.clone());
                    }
                }
            }
            for key in from_map.keys() {
                if !to_map.contains_key(key) {
                    patch.insert(key.clone(), Value::Null);
                }
            }
            Value::Object(patch)
        }
        _ if from == to => Value::Object(Default::default()),
        _ => to.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn replaces_scalar_fields() {
        let target = json!({"a": 1, "b": 2});
        let patch = json!({"b": 3});
        assert_eq!(apply_merge_patch(&target, &patch), json!({"a": 1, "b": 3}));
    }

    #[test]
    fn null_deletes_key() {
        let target = json!({"a": 1, "b": 2});
        let patch = json!({"b": null});
        assert_eq!(apply_merge_patch(&target, &patch), json!({"a": 1}));
    }

    #[test]
    fn nested_objects_merge_recursively() {
        let target = json!({"role": {"allow": ["a"], "deny": ["b"]}});
        let patch = json!({"role": {"deny": null}});
        assert_eq!(apply_merge_patch(&target, &patch), json!({"role": {"allow": ["a"]}}));
    }

    #[test]
    fn diff_then_apply_round_trips() {
        let from = json!({"a": 1, "b": {"x": 1, "y": 2}});
        let to = json!({"a": 1, "b": {"x": 1}, "c": 3});
        let patch = diff(&from, &to);
        assert_eq!(apply_merge_patch(&from, &patch), to);
    }
}
