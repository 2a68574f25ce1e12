//! Attribute type registry.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value as JsonValue;

use super::{AttributeDef, AttributeType};
use crate::error::Error;

/// Ordered set of attribute definitions with lookup by name.
///
/// Registration order is preserved; `anyText` and `anyGeo` visit attributes
/// in this order.
#[derive(Debug, Clone, Default)]
pub struct AttributeRegistry {
    attributes: Vec<AttributeDef>,
    index: HashMap<String, usize>,
}

/// Per-attribute entry of the registry JSON.
#[derive(Deserialize)]
struct RawAttribute {
    #[serde(rename = "type")]
    attr_type: AttributeType,
    #[serde(default)]
    multivalued: bool,
}

impl AttributeRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// Add an attribute definition (builder style).
    pub fn with_attribute(mut self, def: AttributeDef) -> Self {
        self.register(def);
        self
    }

    /// Register an attribute. Re-registering a name replaces its definition
    /// in place.
    pub fn register(&mut self, def: AttributeDef) {
        match self.index.get(&def.name) {
            Some(&i) => self.attributes[i] = def,
            None => {
                self.index.insert(def.name.clone(), self.attributes.len());
                self.attributes.push(def);
            }
        }
    }

    /// Load a registry from JSON of the form
    /// `{ "title": { "type": "STRING", "multivalued": false }, ... }`.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        let value: JsonValue = serde_json::from_str(json)?;
        Self::from_value(&value)
    }

    /// Load a registry from an already parsed JSON value.
    pub fn from_value(value: &JsonValue) -> Result<Self, Error> {
        let entries = value.as_object().ok_or_else(|| {
            Error::InvalidData("attribute registry must be a JSON object".to_string())
        })?;

        let mut registry = Self::new();
        for (name, raw) in entries {
            let raw: RawAttribute = serde_json::from_value(raw.clone()).map_err(|e| {
                Error::InvalidData(format!("attribute '{}': {}", name, e))
            })?;
            registry.register(AttributeDef {
                name: name.clone(),
                attr_type: raw.attr_type,
                multivalued: raw.multivalued,
            });
        }

        Ok(registry)
    }

    /// Get an attribute definition by name.
    pub fn get(&self, name: &str) -> Option<&AttributeDef> {
        self.index.get(name).map(|&i| &self.attributes[i])
    }

    /// Get the declared type of an attribute.
    pub fn attr_type(&self, name: &str) -> Option<AttributeType> {
        self.get(name).map(|def| def.attr_type)
    }

    /// Check if an attribute is declared as a geometry.
    pub fn is_geometry(&self, name: &str) -> bool {
        self.attr_type(name) == Some(AttributeType::Geometry)
    }

    /// STRING attributes, in registration order.
    pub fn text_attributes(&self) -> impl Iterator<Item = &AttributeDef> {
        self.attributes.iter().filter(|def| def.is_text())
    }

    /// GEOMETRY attributes, in registration order.
    pub fn geometry_attributes(&self) -> impl Iterator<Item = &AttributeDef> {
        self.attributes.iter().filter(|def| def.is_geometry())
    }

    /// All attributes, in registration order.
    pub fn iter(&self) -> impl Iterator<Item = &AttributeDef> {
        self.attributes.iter()
    }

    /// Number of registered attributes.
    pub fn len(&self) -> usize {
        self.attributes.len()
    }

    /// Check if the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.attributes.is_empty()
    }
}
