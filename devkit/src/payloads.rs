//! JSON payload builders matching the module's inbound wire formats.

use serde_json::{json, Value};

/// Sparse configuration update; pass `None` to leave a field untouched.
pub fn config_update(
    send_data: Option<bool>,
    send_interval: Option<i64>,
    instance_count: Option<i64>,
) -> Value {
    let mut obj = serde_json::Map::new();
    if let Some(v) = send_data {
        obj.insert("SendData".into(), json!(v));
    }
    if let Some(v) = send_interval {
        obj.insert("SendInterval".into(), json!(v));
    }
    if let Some(v) = instance_count {
        obj.insert("InstanceCount".into(), json!(v));
    }
    Value::Object(obj)
}

/// Control batch from a list of command names.
pub fn control_batch(commands: &[&str]) -> Value {
    Value::Array(
        commands
            .iter()
            .map(|c| json!({ "Command": c }))
            .collect(),
    )
}
