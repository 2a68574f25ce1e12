//! Filter IR error types.

use thiserror::Error;

/// Errors raised while loading or validating filter trees.
#[derive(Debug, Error)]
pub enum Error {
    /// The JSON document is not a valid filter tree.
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),

    /// The tree is structurally valid JSON but not a usable filter.
    #[error("invalid filter: {0}")]
    InvalidFilter(String),
}
