//! Literal values carried by leaf filters.

use serde::{Deserialize, Serialize};

/// The value side of a leaf filter.
///
/// Scalars keep the type they were written with so that numeric ordering
/// comparisons behave numerically; equality and pattern matching go through
/// [`FilterValue::to_text`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterValue {
    /// Boolean literal.
    Bool(bool),
    /// Integer literal.
    Integer(i64),
    /// Floating point literal.
    Float(f64),
    /// String literal (also used for date-times and wildcard patterns).
    String(String),
    /// Geometry literal in well-known text.
    Geometry(GeometryLiteral),
}

impl FilterValue {
    /// Render the value the way a dynamically typed host would stringify it.
    pub fn to_text(&self) -> String {
        match self {
            FilterValue::Bool(b) => b.to_string(),
            FilterValue::Integer(i) => i.to_string(),
            FilterValue::Float(f) => format_number(*f),
            FilterValue::String(s) => s.clone(),
            FilterValue::Geometry(g) => g.wkt.clone(),
        }
    }

    /// Check if this is the empty string literal.
    pub fn is_empty_string(&self) -> bool {
        matches!(self, FilterValue::String(s) if s.is_empty())
    }

    /// Try to get as string reference.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            FilterValue::String(s) => Some(s),
            _ => None,
        }
    }

    /// Try to get as a geometry literal.
    pub fn as_geometry(&self) -> Option<&GeometryLiteral> {
        match self {
            FilterValue::Geometry(g) => Some(g),
            _ => None,
        }
    }

    /// Try to get as f64 (integers are widened).
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            FilterValue::Integer(i) => Some(*i as f64),
            FilterValue::Float(f) => Some(*f),
            _ => None,
        }
    }

    /// Get the type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            FilterValue::Bool(_) => "bool",
            FilterValue::Integer(_) => "integer",
            FilterValue::Float(_) => "float",
            FilterValue::String(_) => "string",
            FilterValue::Geometry(_) => "geometry",
        }
    }
}

impl From<&str> for FilterValue {
    fn from(s: &str) -> Self {
        FilterValue::String(s.to_string())
    }
}

impl From<String> for FilterValue {
    fn from(s: String) -> Self {
        FilterValue::String(s)
    }
}

impl From<bool> for FilterValue {
    fn from(b: bool) -> Self {
        FilterValue::Bool(b)
    }
}

impl From<i32> for FilterValue {
    fn from(i: i32) -> Self {
        FilterValue::Integer(i as i64)
    }
}

impl From<i64> for FilterValue {
    fn from(i: i64) -> Self {
        FilterValue::Integer(i)
    }
}

impl From<f64> for FilterValue {
    fn from(f: f64) -> Self {
        FilterValue::Float(f)
    }
}

impl From<GeometryLiteral> for FilterValue {
    fn from(g: GeometryLiteral) -> Self {
        FilterValue::Geometry(g)
    }
}

/// A geometry literal, serialized as `{ "type": "GEOMETRY", "value": "<wkt>" }`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GeometryLiteral {
    #[serde(rename = "type")]
    tag: GeometryTag,
    /// Well-known text of the shape.
    #[serde(rename = "value")]
    pub wkt: String,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
enum GeometryTag {
    #[default]
    #[serde(rename = "GEOMETRY")]
    Geometry,
}

impl GeometryLiteral {
    /// Create a geometry literal from well-known text.
    pub fn new(wkt: impl Into<String>) -> Self {
        Self {
            tag: GeometryTag::Geometry,
            wkt: wkt.into(),
        }
    }
}

/// Format a number like a JavaScript `Number#toString`.
///
/// Integral values print without a fractional part and very large or very
/// small magnitudes switch to exponent notation with an explicit sign.
pub fn format_number(f: f64) -> String {
    if f.is_nan() {
        return "NaN".to_string();
    }
    if f.is_infinite() {
        return if f > 0.0 { "Infinity" } else { "-Infinity" }.to_string();
    }
    if f == 0.0 {
        return "0".to_string();
    }

    let abs = f.abs();
    if abs >= 1e21 || abs < 1e-6 {
        let formatted = format!("{:e}", f);
        return match formatted.split_once('e') {
            Some((mantissa, exp)) if !exp.starts_with('-') => format!("{}e+{}", mantissa, exp),
            _ => formatted,
        };
    }

    if f.fract() == 0.0 {
        format!("{:.0}", f)
    } else {
        format!("{}", f)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_number() {
        assert_eq!(format_number(1.0), "1");
        assert_eq!(format_number(-42.0), "-42");
        assert_eq!(format_number(1.5), "1.5");
        assert_eq!(format_number(0.0), "0");
        assert_eq!(format_number(-0.0), "0");
        assert_eq!(format_number(1e21), "1e+21");
        assert_eq!(format_number(1e-7), "1e-7");
        assert_eq!(format_number(f64::NAN), "NaN");
    }

    #[test]
    fn test_to_text() {
        assert_eq!(FilterValue::from(true).to_text(), "true");
        assert_eq!(FilterValue::from(7).to_text(), "7");
        assert_eq!(FilterValue::from(2.0).to_text(), "2");
        assert_eq!(FilterValue::from("abc").to_text(), "abc");
        assert_eq!(
            FilterValue::from(GeometryLiteral::new("POINT(1 2)")).to_text(),
            "POINT(1 2)"
        );
    }

    #[test]
    fn test_empty_string() {
        assert!(FilterValue::from("").is_empty_string());
        assert!(!FilterValue::from(" ").is_empty_string());
        assert!(!FilterValue::from(0).is_empty_string());
    }

    #[test]
    fn test_untagged_json() {
        let v: FilterValue = serde_json::from_str("12").unwrap();
        assert_eq!(v, FilterValue::Integer(12));

        let v: FilterValue = serde_json::from_str("1.25").unwrap();
        assert_eq!(v, FilterValue::Float(1.25));

        let v: FilterValue = serde_json::from_str("\"x\"").unwrap();
        assert_eq!(v, FilterValue::String("x".into()));

        let v: FilterValue =
            serde_json::from_str(r#"{"type":"GEOMETRY","value":"POINT(1 1)"}"#).unwrap();
        assert_eq!(v, FilterValue::Geometry(GeometryLiteral::new("POINT(1 1)")));
    }

    #[test]
    fn test_geometry_serializes_with_tag() {
        let json = serde_json::to_string(&GeometryLiteral::new("POINT(0 0)")).unwrap();
        assert_eq!(json, r#"{"type":"GEOMETRY","value":"POINT(0 0)"}"#);
    }
}
