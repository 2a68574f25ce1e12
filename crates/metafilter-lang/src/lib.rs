//! metafilter CQL
//!
//! This crate provides a parser, compiler and serializer for the textual
//! filter language (CQL) used by search clients. Text is parsed into a
//! spanned AST and compiled into the filter tree defined by
//! `metafilter-proto`.
//!
//! # Syntax
//!
//! ```text
//! title ILIKE 'alpha*'
//! "anyText" ILIKE '*Alpha*' AND resolution > 10
//! NOT (status = 'retired' OR status = 'draft')
//! created BEFORE 2020-01-01T00:00:00Z
//! modified DURING 2020-01-01T00:00:00Z/2021-01-01T00:00:00Z
//! INTERSECTS(anyGeo, POLYGON((0 0, 0 2, 2 2, 2 0, 0 0)))
//! DWITHIN(location, POINT(10 20), 5, kilometers)
//! ```
//!
//! # Usage
//!
//! ```rust
//! use metafilter_lang::{parse, compile, parse_and_compile, to_cql};
//!
//! // Parse and compile in one step
//! let tree = parse_and_compile("title ILIKE 'alpha*' AND size > 10").unwrap();
//!
//! // Or parse and compile separately
//! let ast = parse("title = 'Alpha'").unwrap();
//! let ir = compile(ast).unwrap();
//!
//! // And render a tree back to text
//! assert_eq!(to_cql(&ir), r#""title" = 'Alpha'"#);
//! ```

pub mod ast;
pub mod compiler;
pub mod error;
pub mod lexer;
pub mod parser;
pub mod serializer;
pub mod span;

// Re-export main types
pub use ast::{ComparisonOp, Condition, Literal, SpatialOp, TemporalOp};
pub use compiler::{unit_to_meters, DISTANCE_UNITS};
pub use error::{CompileError, CompileErrorKind, LangError, ParseError};
pub use serializer::to_cql;
pub use span::{Span, Spanned};

use metafilter_proto::FilterNode;

/// Parse a source string into an AST.
///
/// # Example
///
/// ```rust
/// use metafilter_lang::parse;
///
/// let condition = parse("title = 'Alpha'").unwrap();
/// ```
pub fn parse(source: &str) -> Result<Condition, ParseError> {
    parser::parse(source)
}

/// Compile an AST condition to a filter tree.
///
/// # Example
///
/// ```rust
/// use metafilter_lang::{parse, compile};
///
/// let condition = parse("size >= 10").unwrap();
/// let tree = compile(condition).unwrap();
/// assert!(tree.is_leaf());
/// ```
pub fn compile(condition: Condition) -> Result<FilterNode, CompileError> {
    compiler::compile(condition)
}

/// Parse and compile a source string in one step.
///
/// # Example
///
/// ```rust
/// use metafilter_lang::parse_and_compile;
///
/// let tree = parse_and_compile("title ILIKE 'a*' OR title ILIKE 'b*'").unwrap();
/// assert!(!tree.is_leaf());
/// ```
pub fn parse_and_compile(source: &str) -> Result<FilterNode, LangError> {
    let condition = parse(source)?;
    let compiled = compile(condition)?;
    Ok(compiled)
}

/// Tokenize a source string (for debugging/testing).
///
/// # Example
///
/// ```rust
/// use metafilter_lang::tokenize;
///
/// let tokens = tokenize("title = 'Alpha'");
/// assert_eq!(tokens.len(), 3);
/// ```
pub fn tokenize(source: &str) -> Vec<lexer::SpannedToken> {
    lexer::tokenize(source)
}
