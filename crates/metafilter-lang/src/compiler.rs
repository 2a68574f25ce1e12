//! Compiler from AST to filter trees.

use crate::ast::*;
use crate::error::CompileError;
use crate::span::Spanned;
use metafilter_proto::{Comparator, FilterNode, FilterValue, GeometryLiteral, LeafFilter};

/// Distance units accepted by `DWITHIN`, with their length in meters.
pub const DISTANCE_UNITS: &[(&str, f64)] = &[
    ("meters", 1.0),
    ("m", 1.0),
    ("kilometers", 1000.0),
    ("km", 1000.0),
    ("feet", 0.3048),
    ("ft", 0.3048),
    ("yards", 0.9144),
    ("yd", 0.9144),
    ("statute miles", 1609.344),
    ("miles", 1609.344),
    ("mi", 1609.344),
    ("nautical miles", 1852.0),
    ("nmi", 1852.0),
];

/// Length of one `unit` in meters. Case-insensitive; `_` may stand for a space.
pub fn unit_to_meters(unit: &str) -> Option<f64> {
    let normalized = unit.trim().to_ascii_lowercase().replace('_', " ");
    DISTANCE_UNITS
        .iter()
        .find(|(name, _)| *name == normalized)
        .map(|(_, factor)| *factor)
}

/// Compiler for CQL conditions.
pub struct Compiler;

impl Compiler {
    /// Compile a condition to a filter tree.
    pub fn compile(condition: Condition) -> Result<FilterNode, CompileError> {
        match condition {
            Condition::Comparison {
                property,
                op,
                value,
            } => Self::compile_comparison(property, op, value),
            Condition::Temporal {
                property,
                op,
                start,
                end,
            } => Self::compile_temporal(property, op, start, end),
            Condition::Spatial {
                property,
                op,
                geometry,
                distance,
                units,
            } => Self::compile_spatial(property, op, geometry, distance, units),
            Condition::And(conditions) => Ok(FilterNode::and(Self::compile_all(conditions)?)),
            Condition::Or(conditions) => Ok(FilterNode::or(Self::compile_all(conditions)?)),
            Condition::Not(inner) => Ok(Self::negate(Self::compile(*inner)?)),
        }
    }

    fn compile_all(conditions: Vec<Condition>) -> Result<Vec<FilterNode>, CompileError> {
        conditions.into_iter().map(Self::compile).collect()
    }

    /// Negation flips the combinator kind; a leaf is wrapped in `NOT AND`.
    fn negate(node: FilterNode) -> FilterNode {
        match node {
            FilterNode::Combinator(c) => FilterNode::combinator(c.kind.negate(), c.filters),
            leaf @ FilterNode::Leaf(_) => FilterNode::not_and(vec![leaf]),
        }
    }

    fn compile_comparison(
        property: Spanned<String>,
        op: ComparisonOp,
        value: Spanned<Literal>,
    ) -> Result<FilterNode, CompileError> {
        let comparator = match op {
            ComparisonOp::Eq => Comparator::Eq,
            ComparisonOp::Ne => Comparator::Ne,
            ComparisonOp::Lt => Comparator::Lt,
            ComparisonOp::Le => Comparator::Le,
            ComparisonOp::Gt => Comparator::Gt,
            ComparisonOp::Ge => Comparator::Ge,
            ComparisonOp::Like => Comparator::Like,
            ComparisonOp::ILike => Comparator::ILike,
        };

        if matches!(op, ComparisonOp::Like | ComparisonOp::ILike)
            && !matches!(value.value, Literal::String(_))
        {
            return Err(CompileError::type_mismatch(
                "string pattern",
                value.value.type_name(),
                value.span,
            ));
        }

        Ok(LeafFilter::new(property.value, comparator, Self::compile_literal(value.value)).into())
    }

    fn compile_temporal(
        property: Spanned<String>,
        op: TemporalOp,
        start: Spanned<Literal>,
        end: Option<Spanned<Literal>>,
    ) -> Result<FilterNode, CompileError> {
        let start_value = Self::compile_instant(start)?;

        match op {
            TemporalOp::Before => {
                Ok(LeafFilter::new(property.value, Comparator::Before, start_value).into())
            }
            TemporalOp::After => {
                Ok(LeafFilter::new(property.value, Comparator::After, start_value).into())
            }
            TemporalOp::During => {
                let end = end.ok_or_else(|| {
                    CompileError::invalid_literal("DURING requires an end instant", property.span)
                })?;
                let end_value = Self::compile_instant(end)?;
                Ok(FilterNode::and(vec![
                    LeafFilter::new(property.value.clone(), Comparator::After, start_value).into(),
                    LeafFilter::new(property.value, Comparator::Before, end_value).into(),
                ]))
            }
        }
    }

    fn compile_instant(literal: Spanned<Literal>) -> Result<FilterValue, CompileError> {
        match literal.value {
            Literal::DateTime(s) | Literal::String(s) => Ok(FilterValue::String(s)),
            other => Err(CompileError::type_mismatch(
                "date-time",
                other.type_name(),
                literal.span,
            )),
        }
    }

    fn compile_spatial(
        property: Spanned<String>,
        op: SpatialOp,
        geometry: Spanned<String>,
        distance: Option<Spanned<Literal>>,
        units: Option<Spanned<String>>,
    ) -> Result<FilterNode, CompileError> {
        let value = GeometryLiteral::new(geometry.value);

        match op {
            SpatialOp::Intersects => {
                Ok(LeafFilter::new(property.value, Comparator::Intersects, value).into())
            }
            SpatialOp::DWithin => {
                let distance = distance.ok_or_else(|| {
                    CompileError::invalid_literal("DWITHIN requires a distance", geometry.span)
                })?;
                let amount = match distance.value {
                    Literal::Int(i) => i as f64,
                    Literal::Float(f) => f,
                    ref other => {
                        return Err(CompileError::type_mismatch(
                            "number",
                            other.type_name(),
                            distance.span,
                        ))
                    }
                };

                let factor = match units {
                    Some(u) => unit_to_meters(&u.value)
                        .ok_or_else(|| CompileError::unknown_unit(&u.value, u.span))?,
                    None => 1.0,
                };

                Ok(LeafFilter::new(property.value, Comparator::DWithin, value)
                    .with_distance(amount * factor)
                    .into())
            }
        }
    }

    fn compile_literal(lit: Literal) -> FilterValue {
        match lit {
            Literal::Bool(b) => FilterValue::Bool(b),
            Literal::Int(i) => FilterValue::Integer(i),
            Literal::Float(f) => FilterValue::Float(f),
            Literal::String(s) | Literal::DateTime(s) => FilterValue::String(s),
        }
    }
}

/// Compile a condition to a filter tree.
pub fn compile(condition: Condition) -> Result<FilterNode, CompileError> {
    Compiler::compile(condition)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompileErrorKind;
    use crate::parser::parse;
    use metafilter_proto::CombinatorKind;
    use pretty_assertions::assert_eq;

    fn compile_str(source: &str) -> Result<FilterNode, CompileError> {
        compile(parse(source).unwrap())
    }

    fn leaf(property: &str, comparator: Comparator, value: impl Into<FilterValue>) -> FilterNode {
        LeafFilter::new(property, comparator, value).into()
    }

    #[test]
    fn test_compile_simple_comparison() {
        assert_eq!(
            compile_str("title = 'Alpha'").unwrap(),
            leaf("title", Comparator::Eq, "Alpha")
        );
        assert_eq!(
            compile_str("size <> 10").unwrap(),
            leaf("size", Comparator::Ne, 10)
        );
        assert_eq!(
            compile_str("ratio >= 0.5").unwrap(),
            leaf("ratio", Comparator::Ge, 0.5)
        );
        assert_eq!(
            compile_str("active = TRUE").unwrap(),
            leaf("active", Comparator::Eq, true)
        );
    }

    #[test]
    fn test_compile_exponent_and_wide_numbers() {
        assert_eq!(
            compile_str("size < 1e3").unwrap(),
            leaf("size", Comparator::Lt, 1000.0)
        );
        assert_eq!(
            compile_str("size < 99999999999999999999").unwrap(),
            leaf("size", Comparator::Lt, 1e20)
        );
    }

    #[test]
    fn test_compile_and_or() {
        let tree = compile_str("a = 1 OR b ILIKE 'x*' AND c < 3").unwrap();
        assert_eq!(
            tree,
            FilterNode::or(vec![
                leaf("a", Comparator::Eq, 1),
                FilterNode::and(vec![
                    leaf("b", Comparator::ILike, "x*"),
                    leaf("c", Comparator::Lt, 3),
                ]),
            ])
        );
    }

    #[test]
    fn test_compile_not() {
        assert_eq!(
            compile_str("NOT (a = 1 AND b = 2)").unwrap(),
            FilterNode::not_and(vec![leaf("a", Comparator::Eq, 1), leaf("b", Comparator::Eq, 2)])
        );
        assert_eq!(
            compile_str("NOT (a = 1 OR b = 2)").unwrap(),
            FilterNode::not_or(vec![leaf("a", Comparator::Eq, 1), leaf("b", Comparator::Eq, 2)])
        );
        assert_eq!(
            compile_str("NOT a = 1").unwrap(),
            FilterNode::not_and(vec![leaf("a", Comparator::Eq, 1)])
        );
    }

    #[test]
    fn test_double_negation_unwraps() {
        let tree = compile_str("NOT NOT (a = 1 OR b = 2)").unwrap();
        match tree {
            FilterNode::Combinator(c) => assert_eq!(c.kind, CombinatorKind::Or),
            FilterNode::Leaf(_) => panic!("expected combinator"),
        }

        let tree = compile_str("NOT NOT a = 1").unwrap();
        assert_eq!(tree, FilterNode::and(vec![leaf("a", Comparator::Eq, 1)]));
    }

    #[test]
    fn test_compile_during() {
        let tree = compile_str("created DURING 2020-01-01T00:00:00Z/2021-01-01T00:00:00Z").unwrap();
        assert_eq!(
            tree,
            FilterNode::and(vec![
                leaf("created", Comparator::After, "2020-01-01T00:00:00Z"),
                leaf("created", Comparator::Before, "2021-01-01T00:00:00Z"),
            ])
        );
    }

    #[test]
    fn test_compile_before_accepts_quoted_instant() {
        assert_eq!(
            compile_str("modified BEFORE '2020-06-01'").unwrap(),
            leaf("modified", Comparator::Before, "2020-06-01")
        );
    }

    #[test]
    fn test_temporal_operand_must_be_date() {
        let err = compile_str("created AFTER 12").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::TypeMismatch);
    }

    #[test]
    fn test_like_requires_string() {
        let err = compile_str("title LIKE 5").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::TypeMismatch);
        assert_eq!(err.message, "type mismatch: expected string pattern, got int");
    }

    #[test]
    fn test_compile_intersects() {
        let tree = compile_str("INTERSECTS(anyGeo, POINT(1 1))").unwrap();
        assert_eq!(
            tree,
            leaf("anyGeo", Comparator::Intersects, GeometryLiteral::new("POINT(1 1)"))
        );
    }

    #[test]
    fn test_compile_dwithin_converts_units() {
        let tree = compile_str("DWITHIN(location, POINT(1 1), 2, kilometers)").unwrap();
        match tree {
            FilterNode::Leaf(l) => {
                assert_eq!(l.comparator, Comparator::DWithin);
                assert_eq!(l.distance, Some(2000.0));
            }
            FilterNode::Combinator(_) => panic!("expected leaf"),
        }

        let tree = compile_str("DWITHIN(location, POINT(1 1), 1.5, 'nautical miles')").unwrap();
        if let FilterNode::Leaf(l) = tree {
            assert_eq!(l.distance, Some(2778.0));
        } else {
            panic!("expected leaf");
        }
    }

    #[test]
    fn test_unknown_unit() {
        let err = compile_str("DWITHIN(anyGeo, POINT(1 1), 5, furlongs)").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::UnknownUnit);
    }

    #[test]
    fn test_non_numeric_distance() {
        let err = compile_str("DWITHIN(anyGeo, POINT(1 1), 'far', meters)").unwrap_err();
        assert_eq!(err.kind, CompileErrorKind::TypeMismatch);
    }

    #[test]
    fn test_unit_lookup() {
        assert_eq!(unit_to_meters("Meters"), Some(1.0));
        assert_eq!(unit_to_meters("statute_miles"), Some(1609.344));
        assert_eq!(unit_to_meters("feet"), Some(0.3048));
        assert_eq!(unit_to_meters("leagues"), None);
    }
}
