use serde_json::Value;

use super::{OpsError, Result};

pub(crate) fn get_required_f64(params: &Value, key: &str) -> Result<f64> {
    params
        .get(key)
        .and_then(Value::as_f64)
        .ok_or_else(|| OpsError::InvalidParams(format!("missing float parameter `{key}`")))
}

pub(crate) fn get_optional_usize(params: &Value, key: &str, default: usize) -> usize {
    params
        .get(key)
        .and_then(Value::as_u64)
        .map(|v| v as usize)
        .unwrap_or(default)
}

pub(crate) fn get_optional_bool(params: &Value, key: &str, default: bool) -> bool {
    params.get(key).and_then(Value::as_bool).unwrap_or(default)
}

/// Reads `points` as a list of integer coordinate lists.
pub(crate) fn get_points(params: &Value, key: &str) -> Result<Vec<Vec<i64>>> {
    let invalid = || OpsError::InvalidParams(format!("`{key}` must be a list of integer coordinates"));
    let Some(points) = params.get(key) else {
        return Ok(Vec::new());
    };
    points
        .as_array()
        .ok_or_else(invalid)?
        .iter()
        .map(|point| {
            point
                .as_array()
                .ok_or_else(invalid)?
                .iter()
                .map(|value| {
                    value
                        .as_i64()
                        .or_else(|| value.as_f64().map(|v| v.round() as i64))
                        .ok_or_else(invalid)
                })
                .collect::<Result<Vec<_>>>()
        })
        .collect()
}
