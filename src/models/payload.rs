// Wire payload of the metrics endpoint.

use serde::Deserialize;
use serde_json::Value;

/// Raw response body. The API returns either a single flow-entry object or an
/// array of them; both shapes normalize to a list of entries here, so the
/// ambiguity never leaks past this type.
#[derive(Debug, Clone, Deserialize)]
#[serde(untagged)]
pub enum MetricsPayload {
    Entries(Vec<Value>),
    Entry(Value),
}

impl MetricsPayload {
    /// Flat list of flow entries. Null and `{}` payloads yield an empty list.
    pub fn into_entries(self) -> Vec<Value> {
        match self {
            MetricsPayload::Entries(entries) => entries,
            MetricsPayload::Entry(Value::Null) => Vec::new(),
            MetricsPayload::Entry(Value::Object(map)) if map.is_empty() => Vec::new(),
            MetricsPayload::Entry(value) => vec![value],
        }
    }
}
