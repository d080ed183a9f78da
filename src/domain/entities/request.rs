use serde_json::{Map, Value};

use crate::application::errors::BotError;

/// Raw inbound webhook payload, decoded by the transport layer
///
/// JSON bodies are kept as-is. Form-encoded bodies are stored as a flat JSON
/// object of string fields so drivers can inspect both shapes the same way.
#[derive(Debug, Clone, PartialEq)]
pub struct Request {
    body: Value,
}

impl Request {
    pub fn from_json(body: Value) -> Self {
        Self { body }
    }

    pub fn from_json_str(raw: &str) -> Result<Self, BotError> {
        serde_json::from_str(raw)
            .map(Self::from_json)
            .map_err(|e| BotError::MalformedPayload(e.to_string()))
    }

    pub fn from_form<I, K, V>(fields: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let map: Map<String, Value> = fields
            .into_iter()
            .map(|(k, v)| (k.into(), Value::String(v.into())))
            .collect();
        Self {
            body: Value::Object(map),
        }
    }

    pub fn body(&self) -> &Value {
        &self.body
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.body.get(key)
    }

    /// String field lookup; numbers are rendered so numeric ids compare as text
    pub fn str(&self, key: &str) -> Option<String> {
        self.get(key).and_then(value_to_string)
    }

    pub fn has(&self, key: &str) -> bool {
        self.get(key).is_some_and(|v| !v.is_null())
    }

    /// JSON pointer lookup, e.g. `/event/text`
    pub fn pointer(&self, path: &str) -> Option<&Value> {
        self.body.pointer(path)
    }
}

/// Render a scalar JSON value as text, `None` for null, objects and arrays
pub fn value_to_string(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}
