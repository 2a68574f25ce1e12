//! Default geometry backend on `geo`, `wkt` and `geojson`.

use geo::{Geometry, GeometryCollection, Intersects};
use geojson::{Feature, GeoJson};
use serde_json::Value as JsonValue;
use wkt::TryFromWkt;

use super::{buffer, GeometryAdapter, ShapeKind, CIRCLE_STEPS};
use crate::error::GeometryError;
use crate::record::json_type_name;

/// Geometry adapter backed by `geo::Geometry<f64>`.
#[derive(Debug, Clone, Copy)]
pub struct GeoAdapter {
    circle_steps: usize,
}

impl Default for GeoAdapter {
    fn default() -> Self {
        Self {
            circle_steps: CIRCLE_STEPS,
        }
    }
}

impl GeoAdapter {
    /// Create an adapter with the default circle resolution.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the number of vertices used for circles.
    pub fn with_circle_steps(mut self, steps: usize) -> Self {
        self.circle_steps = steps;
        self
    }

    fn parse_geojson(&self, geojson: GeoJson) -> Result<Geometry<f64>, GeometryError> {
        match geojson {
            GeoJson::Geometry(geometry) => Geometry::<f64>::try_from(geometry)
                .map_err(|e| GeometryError::GeoJson(e.to_string())),
            GeoJson::Feature(feature) => self.feature_geometry(feature),
            GeoJson::FeatureCollection(collection) => {
                let members = collection
                    .features
                    .into_iter()
                    .map(|feature| self.feature_geometry(feature))
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(Geometry::GeometryCollection(GeometryCollection(members)))
            }
        }
    }

    /// A feature without a geometry becomes an empty collection.
    fn feature_geometry(&self, feature: Feature) -> Result<Geometry<f64>, GeometryError> {
        match feature.geometry {
            Some(geometry) => self.parse_geojson(GeoJson::Geometry(geometry)),
            None => Ok(Geometry::GeometryCollection(GeometryCollection(Vec::new()))),
        }
    }
}

impl GeometryAdapter for GeoAdapter {
    type Shape = Geometry<f64>;

    fn parse_wkt(&self, text: &str) -> Result<Self::Shape, GeometryError> {
        Geometry::<f64>::try_from_wkt_str(text)
            .map_err(|e| GeometryError::Wkt(format!("'{}': {}", text, e)))
    }

    fn parse_value(&self, value: &JsonValue) -> Result<Self::Shape, GeometryError> {
        match value {
            JsonValue::String(text) if text.trim_start().starts_with('{') => {
                let geojson: GeoJson = text
                    .parse()
                    .map_err(|e: geojson::Error| GeometryError::GeoJson(e.to_string()))?;
                self.parse_geojson(geojson)
            }
            JsonValue::String(text) => self.parse_wkt(text),
            JsonValue::Object(_) => {
                let geojson = GeoJson::from_json_value(value.clone())
                    .map_err(|e| GeometryError::GeoJson(e.to_string()))?;
                self.parse_geojson(geojson)
            }
            other => Err(GeometryError::UnsupportedValue(
                json_type_name(other).to_string(),
            )),
        }
    }

    fn intersects(&self, query: &Self::Shape, candidate: &Self::Shape) -> bool {
        match candidate {
            Geometry::Point(_) | Geometry::LineString(_) | Geometry::Polygon(_) => {
                query.intersects(candidate)
            }
            Geometry::MultiPoint(points) => points
                .iter()
                .any(|p| query.intersects(&Geometry::Point(*p))),
            Geometry::MultiLineString(lines) => lines
                .iter()
                .any(|l| query.intersects(&Geometry::LineString(l.clone()))),
            Geometry::MultiPolygon(polygons) => polygons
                .iter()
                .any(|p| query.intersects(&Geometry::Polygon(p.clone()))),
            Geometry::GeometryCollection(members) => {
                members.iter().any(|member| self.intersects(query, member))
            }
            Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => false,
        }
    }

    fn circle(&self, center: &Self::Shape, radius_m: f64) -> Option<Self::Shape> {
        if radius_m.is_nan() || radius_m <= 0.0 {
            return None;
        }
        match center {
            Geometry::Point(point) => Some(Geometry::Polygon(buffer::circle(
                *point,
                radius_m,
                self.circle_steps,
            ))),
            _ => None,
        }
    }

    fn buffer_line(&self, line: &Self::Shape, width_m: f64) -> Option<Self::Shape> {
        match line {
            Geometry::LineString(line) => {
                buffer::buffer_line(line, width_m, self.circle_steps).map(Geometry::MultiPolygon)
            }
            _ => None,
        }
    }

    fn kind(&self, shape: &Self::Shape) -> ShapeKind {
        match shape {
            Geometry::Point(_) => ShapeKind::Point,
            Geometry::MultiPoint(_) => ShapeKind::MultiPoint,
            Geometry::LineString(_) => ShapeKind::LineString,
            Geometry::MultiLineString(_) => ShapeKind::MultiLineString,
            Geometry::Polygon(_) => ShapeKind::Polygon,
            Geometry::MultiPolygon(_) => ShapeKind::MultiPolygon,
            Geometry::GeometryCollection(_) => ShapeKind::GeometryCollection,
            Geometry::Line(_) | Geometry::Rect(_) | Geometry::Triangle(_) => ShapeKind::Other,
        }
    }
}
