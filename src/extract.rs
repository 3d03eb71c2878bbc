//! Pull ids and attribute values out of raw collection records.
//!
//! Upstream payloads occasionally carry entries that are not resource
//! objects or lack the expected members. Such entries are skipped with a
//! warning; only an entirely unusable payload is an error.

use serde_json::Value;

use crate::error::{AnalyticsError, Result};

/// Collect the `id` of every record.
///
/// Records that are not objects, or whose id is missing or null, are
/// skipped. Numeric ids are converted to strings.
///
/// # Errors
///
/// Returns [`AnalyticsError::NoValidIds`] if no record yields an id.
///
/// # Example
///
/// ```
/// use serde_json::json;
///
/// let records = vec![json!({"id": "1"}), json!({"id": "2"})];
/// assert_eq!(asc_analytics::extract_ids(&records).unwrap(), ["1", "2"]);
/// ```
pub fn extract_ids(records: &[Value]) -> Result<Vec<String>> {
    let mut ids = Vec::with_capacity(records.len());

    for record in records {
        let Some(object) = record.as_object() else {
            tracing::warn!(%record, "Skipped: record is not an object");
            continue;
        };

        match object.get("id") {
            Some(Value::String(id)) => ids.push(id.clone()),
            Some(Value::Number(id)) => ids.push(id.to_string()),
            Some(Value::Null) | None => {
                tracing::warn!(%record, "Skipped: missing or null 'id'");
            }
            Some(other) => {
                tracing::warn!(id = %other, "Skipped: 'id' is not a string or number");
            }
        }
    }

    if ids.is_empty() {
        return Err(AnalyticsError::NoValidIds);
    }

    Ok(ids)
}

/// Collect attribute values from every record.
///
/// With `attribute` set, yields that attribute's value and skips records
/// where it is missing or falsy (`null`, `false`, `0`, `""`, `[]`, `{}`).
/// Without it, yields each record's whole `attributes` object. Records
/// without an `attributes` object are always skipped.
///
/// # Errors
///
/// Returns [`AnalyticsError::NoValidValues`] if nothing was collected.
///
/// # Example
///
/// ```
/// use serde_json::json;
///
/// let records = vec![
///     json!({"attributes": {"url": "a"}}),
///     json!({"attributes": {"url": "b"}}),
/// ];
/// let urls = asc_analytics::extract_attribute_values(&records, Some("url")).unwrap();
/// assert_eq!(urls, [json!("a"), json!("b")]);
/// ```
pub fn extract_attribute_values(records: &[Value], attribute: Option<&str>) -> Result<Vec<Value>> {
    let mut values = Vec::with_capacity(records.len());

    for record in records {
        let Some(attributes) = record.get("attributes").filter(|a| a.is_object()) else {
            tracing::warn!(%record, "Skipped: missing or malformed 'attributes'");
            continue;
        };

        match attribute {
            Some(name) => match attributes.get(name) {
                Some(value) if !is_falsy(value) => values.push(value.clone()),
                _ => {
                    tracing::warn!(attribute = name, %attributes, "Skipped: missing or empty attribute");
                }
            },
            None => values.push(attributes.clone()),
        }
    }

    if values.is_empty() {
        return Err(AnalyticsError::NoValidValues {
            attribute: attribute.map(str::to_owned),
        });
    }

    Ok(values)
}

/// String attribute values, skipping non-string entries.
///
/// # Errors
///
/// Returns [`AnalyticsError::NoValidValues`] if no string value was found.
pub fn extract_attribute_strings(records: &[Value], attribute: &str) -> Result<Vec<String>> {
    let strings: Vec<String> = extract_attribute_values(records, Some(attribute))?
        .into_iter()
        .filter_map(|value| match value {
            Value::String(s) => Some(s),
            other => {
                tracing::warn!(attribute, value = %other, "Skipped: attribute is not a string");
                None
            }
        })
        .collect();

    if strings.is_empty() {
        return Err(AnalyticsError::NoValidValues {
            attribute: Some(attribute.to_string()),
        });
    }

    Ok(strings)
}

fn is_falsy(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Bool(b) => !b,
        Value::Number(n) => n.as_f64() == Some(0.0),
        Value::String(s) => s.is_empty(),
        Value::Array(a) => a.is_empty(),
        Value::Object(o) => o.is_empty(),
    }
}
