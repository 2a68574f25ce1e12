//! Abstract Syntax Tree types for CQL.

use crate::span::{Span, Spanned};

/// A parsed filter condition.
#[derive(Debug, Clone, PartialEq)]
pub enum Condition {
    /// Comparison: property op value.
    Comparison {
        property: Spanned<String>,
        op: ComparisonOp,
        value: Spanned<Literal>,
    },
    /// Temporal test: property BEFORE t, property AFTER t, property DURING t1/t2.
    Temporal {
        property: Spanned<String>,
        op: TemporalOp,
        start: Spanned<Literal>,
        end: Option<Spanned<Literal>>,
    },
    /// Spatial function: INTERSECTS(property, wkt) or DWITHIN(property, wkt, d, units).
    Spatial {
        property: Spanned<String>,
        op: SpatialOp,
        geometry: Spanned<String>,
        distance: Option<Spanned<Literal>>,
        units: Option<Spanned<String>>,
    },
    /// Logical AND of conditions.
    And(Vec<Condition>),
    /// Logical OR of conditions.
    Or(Vec<Condition>),
    /// Logical negation.
    Not(Box<Condition>),
}

impl Condition {
    /// Create an AND of conditions.
    pub fn and(mut conditions: Vec<Condition>) -> Self {
        if conditions.len() == 1 {
            conditions.remove(0)
        } else {
            Condition::And(conditions)
        }
    }

    /// Create an OR of conditions.
    pub fn or(mut conditions: Vec<Condition>) -> Self {
        if conditions.len() == 1 {
            conditions.remove(0)
        } else {
            Condition::Or(conditions)
        }
    }

    /// Get the span covering this condition.
    pub fn span(&self) -> Span {
        match self {
            Condition::Comparison {
                property, value, ..
            } => property.span.merge(value.span),
            Condition::Temporal {
                property,
                start,
                end,
                ..
            } => {
                let span = property.span.merge(start.span);
                end.as_ref().map_or(span, |e| span.merge(e.span))
            }
            Condition::Spatial {
                property,
                geometry,
                distance,
                units,
                ..
            } => {
                let mut span = property.span.merge(geometry.span);
                if let Some(d) = distance {
                    span = span.merge(d.span);
                }
                if let Some(u) = units {
                    span = span.merge(u.span);
                }
                span
            }
            Condition::And(conditions) | Condition::Or(conditions) => conditions
                .iter()
                .map(Condition::span)
                .reduce(Span::merge)
                .unwrap_or_default(),
            Condition::Not(inner) => inner.span(),
        }
    }
}

/// Scalar comparison operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ComparisonOp {
    /// Equal (=).
    Eq,
    /// Not equal (<> or !=).
    Ne,
    /// Less than (<).
    Lt,
    /// Less than or equal (<=).
    Le,
    /// Greater than (>).
    Gt,
    /// Greater than or equal (>=).
    Ge,
    /// Case-sensitive wildcard match (LIKE).
    Like,
    /// Case-insensitive wildcard match (ILIKE).
    ILike,
}

/// Temporal operators.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TemporalOp {
    Before,
    After,
    During,
}

/// Spatial functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpatialOp {
    Intersects,
    DWithin,
}

/// A literal value.
#[derive(Debug, Clone, PartialEq)]
pub enum Literal {
    /// Boolean.
    Bool(bool),
    /// Integer.
    Int(i64),
    /// Float.
    Float(f64),
    /// Quoted string.
    String(String),
    /// Unquoted ISO 8601 date or date-time.
    DateTime(String),
}

impl Literal {
    /// Get the type name for error messages.
    pub fn type_name(&self) -> &'static str {
        match self {
            Literal::Bool(_) => "bool",
            Literal::Int(_) => "int",
            Literal::Float(_) => "float",
            Literal::String(_) => "string",
            Literal::DateTime(_) => "date-time",
        }
    }
}
