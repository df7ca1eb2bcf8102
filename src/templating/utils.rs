//! Utility functions for the templating system.

use serde_json::Value;

use super::scope::Bindings;

/// Perform a deep merge of two JSON values.
///
/// Recursively merges `overrides` into `base`. For objects, fields from `overrides`
/// are added or replace fields in `base`. For arrays and primitives, `overrides`
/// completely replaces `base`.
///
/// # Examples
///
/// ```rust,no_run
/// use serde_json::json;
/// use krender::templating::deep_merge_json;
///
/// let base = json!({ "image": { "name": "web", "tag": "v1" } });
/// let overrides = json!({ "image": { "tag": "v2" }, "replicas": 3 });
///
/// let result = deep_merge_json(base, &overrides);
/// // result: { "image": { "name": "web", "tag": "v2" }, "replicas": 3 }
/// ```
pub fn deep_merge_json(mut base: Value, overrides: &Value) -> Value {
    match (base.as_object_mut(), overrides.as_object()) {
        (Some(base_obj), Some(override_obj)) => {
            for (key, override_value) in override_obj {
                match base_obj.get_mut(key) {
                    Some(base_value) if base_value.is_object() && override_value.is_object() => {
                        let merged = deep_merge_json(base_value.take(), override_value);
                        *base_value = merged;
                    }
                    _ => {
                        base_obj.insert(key.clone(), override_value.clone());
                    }
                }
            }
            base
        }
        (_, _) => overrides.clone(),
    }
}

/// Deep-merge `overrides` into a set of bindings.
pub fn merge_bindings(base: Bindings, overrides: &Bindings) -> Bindings {
    match deep_merge_json(Value::Object(base), &Value::Object(overrides.clone())) {
        Value::Object(map) => map,
        _ => overrides.clone(),
    }
}
