//! metafilter core - attribute registry, geometry adapter and filter
//! evaluation.
//!
//! Given a filter tree (or CQL text), an attribute registry and a record,
//! decide whether the record matches:
//!
//! ```rust
//! use metafilter_core::{matches_cql, AttributeDef, AttributeRegistry, AttributeType, Record};
//!
//! let registry = AttributeRegistry::new()
//!     .with_attribute(AttributeDef::new("title", AttributeType::String))
//!     .with_attribute(AttributeDef::new("location", AttributeType::Geometry));
//!
//! let record = Record::new()
//!     .with("title", "Alpha Site")
//!     .with("location", "POINT(1 1)");
//!
//! assert!(matches_cql(&record, "anyText ILIKE '*Alpha*'", &registry).unwrap());
//! assert!(matches_cql(
//!     &record,
//!     "INTERSECTS(anyGeo, POLYGON((0 0, 0 2, 2 2, 2 0, 0 0)))",
//!     &registry,
//! )
//! .unwrap());
//! ```

pub mod catalog;
pub mod error;
pub mod evaluator;
pub mod geometry;
pub mod matcher;
pub mod record;
pub mod resolver;

pub use catalog::{AttributeDef, AttributeRegistry, AttributeType};
pub use error::{Error, GeometryError};
pub use evaluator::{matches_cql, matches_filters, FilterEvaluator};
pub use geometry::{GeoAdapter, GeometryAdapter, ShapeKind, CIRCLE_STEPS};
pub use record::Record;
pub use resolver::{resolve_values, Resolved};

/// Re-export filter IR types.
pub use metafilter_proto as proto;
