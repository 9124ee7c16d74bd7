//! Request document model
//!
//! Every transport entry point produces a `Document` before validation runs:
//! JSON bodies decode directly, multipart forms and URL query strings
//! synthesize an object from string key/value pairs. The validation engine
//! is the only consumer; it never cares where the document came from.

use serde_json::{Map, Value as JsonValue};

use crate::error::{CoreError, Result};

/// Untyped request tree. The root is always a JSON object.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Document(Map<String, JsonValue>);

impl Document {
    /// Create an empty document.
    pub fn new() -> Self {
        Self(Map::new())
    }

    /// Decode a JSON body.
    ///
    /// Decode failures are transport-shape errors, reported before any field
    /// validation runs and with their own error code.
    pub fn from_json_slice(bytes: &[u8]) -> Result<Self> {
        let value: JsonValue =
            serde_json::from_slice(bytes).map_err(CoreError::MalformedDocument)?;
        match value {
            JsonValue::Object(map) => Ok(Self(map)),
            other => Err(CoreError::RootNotObject {
                found: json_type_name(&other),
            }),
        }
    }

    /// Synthesize a document from string key/value pairs (multipart form
    /// fields, URL query parameters). Every value enters as a string; the
    /// engine coerces to the schema's kind.
    pub fn from_pairs<I, K, V>(pairs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        let mut map = Map::new();
        for (key, value) in pairs {
            map.insert(key.into(), JsonValue::String(value.into()));
        }
        Self(map)
    }

    /// Get a value by dotted path (e.g. "source.configMap.name").
    pub fn get(&self, path: &str) -> Option<&JsonValue> {
        let mut parts = path.split('.');
        let mut current = self.0.get(parts.next()?)?;
        for part in parts {
            current = current.as_object()?.get(part)?;
        }
        Some(current)
    }

    pub fn object(&self) -> &Map<String, JsonValue> {
        &self.0
    }

    pub(crate) fn object_mut(&mut self) -> &mut Map<String, JsonValue> {
        &mut self.0
    }

    /// Unwrap into the JSON value, for typed deserialization.
    pub fn into_value(self) -> JsonValue {
        JsonValue::Object(self.0)
    }
}

/// Human name for a JSON value's type, for error messages.
pub(crate) fn json_type_name(value: &JsonValue) -> &'static str {
    match value {
        JsonValue::Null => "null",
        JsonValue::Bool(_) => "boolean",
        JsonValue::Number(_) => "number",
        JsonValue::String(_) => "string",
        JsonValue::Array(_) => "array",
        JsonValue::Object(_) => "object",
    }
}
