//! Field deserializers that never reject a record.
//!
//! Service payloads occasionally carry `null` or a wrong-typed value in a
//! single field. These helpers replace such values with the field's default
//! so one bad field only blanks that field, not the whole response.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

/// Decode `value`, falling back to `T::default()` when it does not fit.
pub(crate) fn decode_or_default<T: DeserializeOwned + Default>(value: Value) -> T {
    if value.is_null() {
        return T::default();
    }
    T::deserialize(value).unwrap_or_default()
}

pub(crate) fn or_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(decode_or_default(Value::deserialize(deserializer)?))
}

/// A number, or a string holding one. Anything else is `0`.
pub(crate) fn number<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    let n = match Value::deserialize(deserializer)? {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(n.filter(|n| n.is_finite()).unwrap_or(0.0))
}

/// Like [`or_default`] but with `true` only for a JSON `true`.
pub(crate) fn flag<'de, D>(deserializer: D) -> Result<bool, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(matches!(Value::deserialize(deserializer)?, Value::Bool(true)))
}

/// A list whose items are decoded one by one; unusable items become
/// defaults so positions are preserved. A non-list is an empty list.
pub(crate) fn items<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Array(values) => values.into_iter().map(decode_or_default).collect(),
        _ => Vec::new(),
    })
}

/// [`items`] for a list of lists, decoding the inner items one by one.
pub(crate) fn nested_items<'de, D, T>(deserializer: D) -> Result<Vec<Vec<T>>, D::Error>
where
    D: Deserializer<'de>,
    T: DeserializeOwned + Default,
{
    let Value::Array(groups) = Value::deserialize(deserializer)? else {
        return Ok(Vec::new());
    };
    Ok(groups
        .into_iter()
        .map(|group| match group {
            Value::Array(values) => values.into_iter().map(decode_or_default).collect(),
            _ => Vec::new(),
        })
        .collect())
}
