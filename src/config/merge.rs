//! Field-by-field merging of configuration tiers.
//!
//! Higher tiers override lower ones key by key. Lists (such as
//! `relations.types`) are replaced whole, never concatenated.

use serde_json::Value;

/// Deep merge two values, with `overlay` taking precedence over `base`.
///
/// A `null` in the overlay means "not specified" and keeps the base value.
///
/// # Example
/// ```
/// use serde_json::json;
/// use crm_schedule::config::deep_merge;
///
/// let base = json!({
///     "server": { "db_path": "crm.db" },
///     "schedule": { "department_scoped": false }
/// });
/// let overlay = json!({ "schedule": { "department_scoped": true } });
/// let merged = deep_merge(base, overlay);
/// assert_eq!(merged["server"]["db_path"], "crm.db");
/// assert_eq!(merged["schedule"]["department_scoped"], true);
/// ```
pub fn deep_merge(base: Value, overlay: Value) -> Value {
    match (base, overlay) {
        (Value::Object(mut base_map), Value::Object(overlay_map)) => {
            for (key, overlay_value) in overlay_map {
                let merged = match base_map.remove(&key) {
                    Some(base_value) => deep_merge(base_value, overlay_value),
                    None => overlay_value,
                };
                base_map.insert(key, merged);
            }
            Value::Object(base_map)
        }
        (base, Value::Null) => base,
        (_, overlay) => overlay,
    }
}

/// Fold [`deep_merge`] over tiers ordered lowest priority first.
pub fn deep_merge_all(values: impl IntoIterator<Item = Value>) -> Value {
    values.into_iter().fold(Value::Null, deep_merge)
}
