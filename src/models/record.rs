//! Generic resource object shape.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// A resource object as returned in a collection's `data` array.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawRecord {
    /// Resource id.
    pub id: String,

    /// Resource type (e.g. "analyticsReports", "customerReviews").
    #[serde(rename = "type", default)]
    pub kind: String,

    /// Resource attributes.
    #[serde(default)]
    pub attributes: Map<String, Value>,

    /// Relationship links, when present.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relationships: Option<Value>,
}

impl RawRecord {
    /// Convert a raw `data` entry, returning `None` when it is not a
    /// resource object with a string id.
    pub fn from_value(value: &Value) -> Option<Self> {
        serde_json::from_value(value.clone()).ok()
    }

    /// Look up a single attribute.
    pub fn attribute(&self, name: &str) -> Option<&Value> {
        self.attributes.get(name)
    }

    /// Look up a string attribute.
    pub fn attribute_str(&self, name: &str) -> Option<&str> {
        self.attribute(name).and_then(Value::as_str)
    }
}
