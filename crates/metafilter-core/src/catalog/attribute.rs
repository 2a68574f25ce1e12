//! Attribute definitions.

use super::types::AttributeType;
use serde::{Deserialize, Serialize};

/// A declared attribute of the records in a response.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AttributeDef {
    /// Attribute name.
    pub name: String,
    /// Declared type.
    #[serde(rename = "type")]
    pub attr_type: AttributeType,
    /// Whether the attribute may hold a list of values.
    #[serde(default)]
    pub multivalued: bool,
}

impl AttributeDef {
    /// Create a new single-valued attribute.
    pub fn new(name: impl Into<String>, attr_type: AttributeType) -> Self {
        Self {
            name: name.into(),
            attr_type,
            multivalued: false,
        }
    }

    /// Mark as multi-valued.
    pub fn multivalued(mut self) -> Self {
        self.multivalued = true;
        self
    }

    /// Check if this attribute is searched by `anyText`.
    pub fn is_text(&self) -> bool {
        self.attr_type == AttributeType::String
    }

    /// Check if this attribute is searched by `anyGeo`.
    pub fn is_geometry(&self) -> bool {
        self.attr_type == AttributeType::Geometry
    }
}
