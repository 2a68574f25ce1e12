//! Property resolution.
//!
//! Maps a filter's property name to the list of record values it targets,
//! expanding the `anyText` and `anyGeo` pseudo-attributes through the
//! attribute registry.

use serde_json::Value as JsonValue;
use tracing::trace;

use crate::catalog::AttributeRegistry;
use crate::error::Error;
use crate::geometry::GeometryAdapter;
use crate::record::Record;
use metafilter_proto::{strip_quotes, ANY_GEO, ANY_TEXT};

/// A value a property resolved to.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved<'a, S> {
    /// A scalar record value.
    Scalar(&'a JsonValue),
    /// A parsed geometry.
    Shape(S),
}

impl<'a, S> Resolved<'a, S> {
    /// Get the scalar value, if this is one.
    pub fn as_scalar(&self) -> Option<&'a JsonValue> {
        match self {
            Resolved::Scalar(v) => Some(v),
            Resolved::Shape(_) => None,
        }
    }

    /// Get the shape, if this is one.
    pub fn as_shape(&self) -> Option<&S> {
        match self {
            Resolved::Shape(s) => Some(s),
            Resolved::Scalar(_) => None,
        }
    }
}

/// Resolve `property` against `record`.
///
/// - surrounding quotes are stripped from the name
/// - a property declared GEOMETRY is treated as `anyGeo`
/// - `anyText` yields every STRING attribute in registry order
/// - `anyGeo` yields every GEOMETRY attribute, parsed into shapes
/// - anything else yields the attribute itself
///
/// Null values are skipped and arrays are flattened one level. An absent
/// attribute yields an empty list.
pub fn resolve_values<'a, G: GeometryAdapter>(
    record: &'a Record,
    property: &str,
    registry: &AttributeRegistry,
    adapter: &G,
) -> Result<Vec<Resolved<'a, G::Shape>>, Error> {
    let mut name = strip_quotes(property);
    if registry.is_geometry(name) {
        name = ANY_GEO;
    }

    let mut resolved = Vec::new();
    match name {
        ANY_TEXT => {
            for def in registry.text_attributes() {
                push_flattened(record.get(&def.name), |v| {
                    resolved.push(Resolved::Scalar(v));
                    Ok(())
                })?;
            }
        }
        ANY_GEO => {
            for def in registry.geometry_attributes() {
                push_flattened(record.get(&def.name), |v| {
                    resolved.push(Resolved::Shape(adapter.parse_value(v)?));
                    Ok(())
                })?;
            }
        }
        _ => {
            push_flattened(record.get(name), |v| {
                resolved.push(Resolved::Scalar(v));
                Ok(())
            })?;
        }
    }

    trace!(property = name, count = resolved.len(), "resolved property");
    Ok(resolved)
}

/// Feed each non-null value to `push`, descending one level into arrays.
fn push_flattened<'a, F>(value: Option<&'a JsonValue>, mut push: F) -> Result<(), Error>
where
    F: FnMut(&'a JsonValue) -> Result<(), Error>,
{
    match value {
        None | Some(JsonValue::Null) => Ok(()),
        Some(JsonValue::Array(items)) => items
            .iter()
            .filter(|item| !item.is_null())
            .try_for_each(push),
        Some(v) => push(v),
    }
}
