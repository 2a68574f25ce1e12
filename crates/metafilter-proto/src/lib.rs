//! metafilter filter IR.
//!
//! This crate defines the filter tree that the CQL parser produces and the
//! evaluator consumes. Trees are plain owned values with serde support, so
//! they can also be built by hand or loaded from JSON:
//!
//! ```rust
//! use metafilter_proto::{Comparator, FilterNode, LeafFilter};
//!
//! let tree = FilterNode::and(vec![
//!     LeafFilter::new("title", Comparator::ILike, "alpha*").into(),
//!     LeafFilter::new("resolution", Comparator::Gt, 10).into(),
//! ]);
//! assert_eq!(tree.properties().len(), 2);
//!
//! let json = r#"{"type":"ILIKE","property":"anyText","value":"*Alpha*"}"#;
//! let leaf = FilterNode::from_json(json).unwrap();
//! assert!(leaf.is_leaf());
//! ```
//!
//! # Modules
//!
//! - [`filter`] - Filter tree nodes, comparators and combinators
//! - [`value`] - Literal values carried by leaf filters
//! - [`error`] - Error types

pub mod error;
pub mod filter;
pub mod value;

pub use error::Error;
pub use filter::{
    extract_filter_properties, strip_quotes, CombinatorKind, CombinatorNode, Comparator,
    FilterNode, LeafFilter,
};
pub use value::{format_number, FilterValue, GeometryLiteral};

/// Pseudo-attribute matching every STRING-typed attribute of a record.
pub const ANY_TEXT: &str = "anyText";

/// Pseudo-attribute matching every GEOMETRY-typed attribute of a record.
pub const ANY_GEO: &str = "anyGeo";
