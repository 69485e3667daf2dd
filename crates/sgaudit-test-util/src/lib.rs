//! Shared test utilities for the sgaudit workspace.
//!
//! Lives in its own crate so CLI integration tests and the app crate can share
//! one normalization of run reports and published submissions.

use serde_json::Value;

const TIMESTAMP_KEYS: &[&str] = &[
    "started_at",
    "finished_at",
    "start",
    "end",
    "collected",
    "expires",
];

const UUID_KEYS: &[&str] = &["uuid", "related_observation"];

/// Normalize non-deterministic JSON fields for golden-file comparison.
///
/// 1. **Root-only**: `tool.version` becomes `"__VERSION__"` when the root is a
///    run report (has `schema`, `tool`, `status` and `counts`).
///
/// 2. **Recursive**: timestamps become `"__TIMESTAMP__"` and per-run
///    random ids (`uuid`, `related_observation`) become `"__UUID__"` at any
///    depth. `null` values are left alone so an absent end time stays visible.
///
/// Stream ids are deterministic and are deliberately not touched.
pub fn normalize_nondeterministic(mut value: Value) -> Value {
    if let Some(obj) = value.as_object_mut() {
        let is_report = obj.contains_key("schema")
            && obj.contains_key("tool")
            && obj.contains_key("status")
            && obj.contains_key("counts");
        if is_report
            && let Some(tool) = obj.get_mut("tool")
            && let Some(tool_obj) = tool.as_object_mut()
            && tool_obj.contains_key("version")
        {
            tool_obj.insert(
                "version".to_string(),
                Value::String("__VERSION__".to_string()),
            );
        }
    }
    normalize_recursive(&mut value);
    value
}

fn normalize_recursive(value: &mut Value) {
    match value {
        Value::Object(map) => {
            for (key, val) in map.iter_mut() {
                if val.is_null() {
                    continue;
                }
                if TIMESTAMP_KEYS.contains(&key.as_str()) {
                    *val = Value::String("__TIMESTAMP__".to_string());
                } else if UUID_KEYS.contains(&key.as_str()) {
                    *val = Value::String("__UUID__".to_string());
                } else {
                    normalize_recursive(val);
                }
            }
        }
        Value::Array(arr) => {
            for val in arr.iter_mut() {
                normalize_recursive(val);
            }
        }
        _ => {}
    }
}
