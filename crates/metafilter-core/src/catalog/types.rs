//! Attribute type definitions.

use std::fmt;

use serde::{Deserialize, Serialize};

/// Declared type of a record attribute.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum AttributeType {
    /// Free text; searched by `anyText`.
    String,
    /// WKT or GeoJSON geometry; searched by `anyGeo`.
    Geometry,
    /// Date-time.
    Date,
    /// 64-bit integer.
    Long,
    /// 64-bit floating point.
    Double,
    /// 32-bit floating point.
    Float,
    /// 32-bit integer.
    Integer,
    /// 16-bit integer.
    Short,
    /// Boolean.
    Boolean,
    /// Binary data.
    Binary,
    /// XML document.
    Xml,
    /// Opaque object.
    Object,
}

impl AttributeType {
    /// Check if this type is numeric.
    pub fn is_numeric(&self) -> bool {
        matches!(
            self,
            AttributeType::Long
                | AttributeType::Double
                | AttributeType::Float
                | AttributeType::Integer
                | AttributeType::Short
        )
    }

    /// The type name as written in registry JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            AttributeType::String => "STRING",
            AttributeType::Geometry => "GEOMETRY",
            AttributeType::Date => "DATE",
            AttributeType::Long => "LONG",
            AttributeType::Double => "DOUBLE",
            AttributeType::Float => "FLOAT",
            AttributeType::Integer => "INTEGER",
            AttributeType::Short => "SHORT",
            AttributeType::Boolean => "BOOLEAN",
            AttributeType::Binary => "BINARY",
            AttributeType::Xml => "XML",
            AttributeType::Object => "OBJECT",
        }
    }
}

impl fmt::Display for AttributeType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}
