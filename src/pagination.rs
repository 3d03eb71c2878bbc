//! Response envelope and link-based pagination for App Store Connect.

use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::error::{AnalyticsError, Result};

/// One page of a resource collection.
///
/// Entries in `data` are kept as raw JSON; the extractors decide which of
/// them are usable.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Page {
    /// The resource objects on this page.
    pub data: Vec<Value>,
    /// Navigation links.
    #[serde(default, deserialize_with = "null_as_default")]
    pub links: Links,
}

/// Links attached to a collection response.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Links {
    /// URL of this page.
    #[serde(rename = "self", default, skip_serializing_if = "Option::is_none")]
    pub this: Option<String>,
    /// URL of the following page, absent on the last one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub next: Option<String>,
}

impl Page {
    /// Parse a response body, requiring a `data` array.
    ///
    /// # Errors
    ///
    /// Returns [`AnalyticsError::PayloadFormat`] when `data` is missing or
    /// not an array.
    pub fn from_value(body: Value) -> Result<Self> {
        match body.get("data") {
            Some(Value::Array(_)) => serde_json::from_value(body).map_err(|e| {
                AnalyticsError::PayloadFormat(format!("malformed collection envelope: {e}"))
            }),
            Some(other) => Err(AnalyticsError::PayloadFormat(format!(
                "'data' is {}, expected an array",
                json_kind(other)
            ))),
            None => Err(AnalyticsError::PayloadFormat(
                "response has no 'data' member".to_string(),
            )),
        }
    }

    /// The next page URL, if there is one.
    pub fn next_url(&self) -> Option<&str> {
        self.links.next.as_deref().filter(|next| !next.is_empty())
    }

    /// Returns true if this page has no entries.
    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}

/// `"links": null` reads as no links.
fn null_as_default<'de, D, T>(deserializer: D) -> std::result::Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Array(_) => "an array",
        Value::Object(_) => "an object",
    }
}
