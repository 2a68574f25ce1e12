//! Records under evaluation.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value as JsonValue};

use crate::error::Error;

/// One result record: an ordered map of attribute name to JSON value.
///
/// Values may be scalars, arrays (multi-valued attributes) or geometries
/// given as WKT strings or GeoJSON objects. The evaluator only reads records.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Record {
    fields: Map<String, JsonValue>,
}

impl Record {
    /// Create an empty record.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set a field (builder style).
    pub fn with(mut self, name: impl Into<String>, value: impl Into<JsonValue>) -> Self {
        self.insert(name, value);
        self
    }

    /// Set a field, returning the previous value.
    pub fn insert(
        &mut self,
        name: impl Into<String>,
        value: impl Into<JsonValue>,
    ) -> Option<JsonValue> {
        self.fields.insert(name.into(), value.into())
    }

    /// Get a field value.
    pub fn get(&self, name: &str) -> Option<&JsonValue> {
        self.fields.get(name)
    }

    /// Iterate fields in insertion order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &JsonValue)> {
        self.fields.iter()
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Check if the record has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Parse a record from a JSON object.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let value: JsonValue = serde_json::from_str(json)?;
        Self::try_from(value)
    }

    /// Parse a JSON array of objects into records.
    pub fn many_from_json(json: &str) -> Result<Vec<Self>, Error> {
        let value: JsonValue = serde_json::from_str(json)?;
        match value {
            JsonValue::Array(items) => items.into_iter().map(Self::try_from).collect(),
            other => Err(Error::InvalidData(format!(
                "expected an array of records, got {}",
                json_type_name(&other)
            ))),
        }
    }

    /// Borrow the underlying map.
    pub fn as_map(&self) -> &Map<String, JsonValue> {
        &self.fields
    }
}

impl From<Map<String, JsonValue>> for Record {
    fn from(fields: Map<String, JsonValue>) -> Self {
        Self { fields }
    }
}

impl TryFrom<JsonValue> for Record {
    type Error = Error;

    fn try_from(value: JsonValue) -> Result<Self, Self::Error> {
        match value {
            JsonValue::Object(fields) => Ok(Self { fields }),
            other => Err(Error::InvalidData(format!(
                "a record must be a JSON object, got {}",
                json_type_name(&other)
            ))),
        }
    }
}

/// Name of a JSON value's type for error messages.
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
