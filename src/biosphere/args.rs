//! Helpers for dictionary-driven construction

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};

use crate::core::types::DVec3;
use crate::core::{Error, Result};

/// Keyword arguments of a `from_dict` call
pub type Dict = Map<String, Value>;

/// Remove a string discriminator (`construct`, `type`) from `dict`
pub(crate) fn take_tag(dict: &mut Dict, key: &'static str) -> Result<Option<String>> {
    match dict.remove(key) {
        None | Some(Value::Null) => Ok(None),
        Some(Value::String(tag)) => Ok(Some(tag)),
        Some(other) => Err(Error::UnsupportedValue {
            key,
            value: other.to_string(),
        }),
    }
}

/// Deserialize the remaining keyword arguments into a typed parameter set
pub(crate) fn parse_args<T: DeserializeOwned>(what: &str, dict: Dict) -> Result<T> {
    serde_json::from_value(Value::Object(dict))
        .map_err(|e| Error::InvalidParameter(format!("{what}: {e}")))
}

/// Check that every row of a nested array has three components
pub(crate) fn vec3_rows(name: &str, rows: &[Vec<f64>]) -> Result<Vec<DVec3>> {
    rows.iter()
        .enumerate()
        .map(|(i, row)| match row.as_slice() {
            [x, y, z] => Ok(DVec3::new(*x, *y, *z)),
            _ => Err(Error::Shape(format!(
                "{name}: shape should be (N, 3), row {i} has {} components",
                row.len()
            ))),
        })
        .collect()
}
