use serde_json::Value;

use super::SerializeError;

/// Compact JSON, keys in insertion order.
pub fn to_json(value: &Value) -> Result<String, SerializeError> {
    Ok(serde_json::to_string(value)?)
}

/// Parse a JSON request body. An empty body decodes as `null`.
pub fn from_json(body: &str) -> Result<Value, SerializeError> {
    if body.trim().is_empty() {
        return Ok(Value::Null);
    }
    Ok(serde_json::from_str(body)?)
}
