//! RFC 7386 merge-patch documents: application (store side) and minimal
//! diff computation (patch-helper side).

use serde_json::{Map, Value};

/// Apply `patch` to `target` with JSON merge-patch semantics. A `null`
/// member removes the corresponding field; non-object patches replace
/// the target wholesale.
pub fn apply(target: &mut Value, patch: &Value) {
    match patch {
        Value::Object(entries) => {
            if !target.is_object() {
                *target = Value::Object(Map::new());
            }
            let fields = target.as_object_mut().unwrap();
            for (key, value) in entries {
                if value.is_null() {
                    fields.remove(key);
                } else {
                    apply(
                        fields.entry(key.clone()).or_insert(Value::Null),
                        value,
                    );
                }
            }
        }
        other => *target = other.clone(),
    }
}

/// Compute the minimal merge-patch transforming `before` into `after`.
/// Returns `None` when the two documents are already equal, so callers
/// can skip the store round-trip entirely.
pub fn diff(before: &Value, after: &Value) -> Option<Value> {
    match (before, after) {
        (Value::Object(old), Value::Object(new)) => {
            let mut patch = Map::new();
            for (key, new_value) in new {
                match old.get(key) {
                    Some(old_value) if old_value == new_value => {}
                    Some(old_value) => {
                        if let Some(inner) = diff(old_value, new_value) {
                            patch.insert(key.clone(), inner);
                        }
                    }
                    None => {
                        patch.insert(key.clone(), new_value.clone());
                    }
                }
            }
            for key in old.keys() {
                if !new.contains_key(key) {
                    patch.insert(key.clone(), Value::Null);
                }
            }
            if patch.is_empty() {
                None
            } else {
                Some(Value::Object(patch))
            }
        }
        (old, new) if old == new => None,
        (_, new) => Some(new.clone()),
    }
}
