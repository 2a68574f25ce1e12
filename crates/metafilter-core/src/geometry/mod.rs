//! Geometry adapter.
//!
//! The evaluator never touches geometry types directly. It parses, buffers
//! and intersects shapes through a [`GeometryAdapter`], so the geometry
//! backend can be swapped without changing filter semantics. [`GeoAdapter`]
//! is the default backend, built on the `geo` crate.

mod adapter;
mod buffer;

pub use adapter::GeoAdapter;
pub use buffer::{buffer_line, circle};

use serde_json::Value as JsonValue;

use crate::error::GeometryError;

/// Number of vertices used to approximate a circle.
pub const CIRCLE_STEPS: usize = 64;

/// Coarse classification of a shape, used to pick the `DWITHIN` strategy.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ShapeKind {
    Point,
    MultiPoint,
    LineString,
    MultiLineString,
    Polygon,
    MultiPolygon,
    GeometryCollection,
    /// Anything the filter language cannot express (lines, rects, triangles).
    Other,
}

/// Geometry operations needed by spatial filters.
pub trait GeometryAdapter {
    /// Parsed geometry.
    type Shape;

    /// Parse a well-known text geometry.
    fn parse_wkt(&self, text: &str) -> Result<Self::Shape, GeometryError>;

    /// Parse a record value: a WKT string, a GeoJSON string or a GeoJSON
    /// object (geometry, feature or feature collection).
    fn parse_value(&self, value: &JsonValue) -> Result<Self::Shape, GeometryError>;

    /// Check whether `candidate` intersects `query`. Collection candidates
    /// match when any member does.
    fn intersects(&self, query: &Self::Shape, candidate: &Self::Shape) -> bool;

    /// Polygon approximating a circle of `radius_m` meters around a point.
    ///
    /// Returns `None` when `center` is not a point or the radius is not
    /// positive.
    fn circle(&self, center: &Self::Shape, radius_m: f64) -> Option<Self::Shape>;

    /// Area within `width_m` meters of a line string.
    ///
    /// Returns `None` when `line` is not a line string or the width is not
    /// positive.
    fn buffer_line(&self, line: &Self::Shape, width_m: f64) -> Option<Self::Shape>;

    /// Classify a shape.
    fn kind(&self, shape: &Self::Shape) -> ShapeKind;
}
