//! Core error types.

use thiserror::Error;

/// Evaluation errors.
///
/// Absent attributes and unsupported geometry kinds are not errors; they
/// simply do not match.
#[derive(Debug, Error)]
pub enum Error {
    /// CQL text failed to parse or compile.
    #[error("query error: {0}")]
    Query(#[from] metafilter_lang::LangError),

    /// Geometry literal or record geometry could not be parsed.
    #[error("geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// A date-time operand could not be parsed.
    #[error("invalid date-time: {0}")]
    InvalidDate(String),

    /// Structurally invalid filter tree.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),

    /// Invalid record or registry data.
    #[error("invalid data: {0}")]
    InvalidData(String),

    /// JSON error.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// Filter IR error.
    #[error("filter error: {0}")]
    Proto(#[from] metafilter_proto::Error),
}

/// Geometry parsing errors.
#[derive(Debug, Error)]
pub enum GeometryError {
    /// Malformed well-known text.
    #[error("malformed WKT: {0}")]
    Wkt(String),

    /// Malformed GeoJSON.
    #[error("malformed GeoJSON: {0}")]
    GeoJson(String),

    /// A JSON value that cannot hold a geometry.
    #[error("value of type {0} is not a geometry")]
    UnsupportedValue(String),
}
