//! Attribute catalog.
//!
//! The registry records the declared type of every attribute in a result
//! set. It is built once per response schema and only read while filtering.

mod attribute;
mod registry;
mod types;

pub use attribute::AttributeDef;
pub use registry::AttributeRegistry;
pub use types::AttributeType;
