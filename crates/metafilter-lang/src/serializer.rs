//! Rendering filter trees back to CQL text.

use metafilter_proto::{
    strip_quotes, CombinatorKind, Comparator, FilterNode, FilterValue, LeafFilter,
};

/// Render a filter tree as CQL text the parser accepts.
///
/// Properties are always double-quoted and combinators always parenthesized.
/// A combinator with no children has no CQL form and renders as `()`.
pub fn to_cql(node: &FilterNode) -> String {
    let mut out = String::new();
    write_node(&mut out, node);
    out
}

fn write_node(out: &mut String, node: &FilterNode) {
    match node {
        FilterNode::Leaf(leaf) => write_leaf(out, leaf),
        FilterNode::Combinator(c) => {
            let joiner = match c.kind {
                CombinatorKind::And | CombinatorKind::NotAnd => " AND ",
                CombinatorKind::Or | CombinatorKind::NotOr => " OR ",
            };
            if matches!(c.kind, CombinatorKind::NotAnd | CombinatorKind::NotOr) {
                out.push_str("NOT ");
            }
            out.push('(');
            for (i, child) in c.filters.iter().enumerate() {
                if i > 0 {
                    out.push_str(joiner);
                }
                write_node(out, child);
            }
            out.push(')');
        }
    }
}

fn write_leaf(out: &mut String, leaf: &LeafFilter) {
    let property = quote_property(&leaf.property);

    match leaf.comparator {
        Comparator::Intersects => {
            out.push_str(&format!("INTERSECTS({}, {})", property, wkt_text(&leaf.value)));
        }
        Comparator::DWithin => {
            out.push_str(&format!(
                "DWITHIN({}, {}, {}, meters)",
                property,
                wkt_text(&leaf.value),
                float_literal(leaf.distance.unwrap_or(0.0))
            ));
        }
        Comparator::Before | Comparator::After => {
            out.push_str(&format!(
                "{} {} {}",
                property,
                leaf.comparator,
                quote_string(&leaf.value.to_text())
            ));
        }
        other => {
            let op = if other == Comparator::Ne { "<>" } else { other.as_str() };
            out.push_str(&format!("{} {} {}", property, op, literal(&leaf.value)));
        }
    }
}

fn quote_property(name: &str) -> String {
    format!("\"{}\"", strip_quotes(name))
}

fn quote_string(s: &str) -> String {
    format!("'{}'", s.replace('\'', "''"))
}

fn wkt_text(value: &FilterValue) -> String {
    match value.as_geometry() {
        Some(g) => g.wkt.clone(),
        None => value.to_text(),
    }
}

fn float_literal(f: f64) -> String {
    let s = f.to_string();
    if s.contains('.') || !f.is_finite() {
        s
    } else {
        format!("{}.0", s)
    }
}

fn literal(value: &FilterValue) -> String {
    match value {
        FilterValue::Bool(true) => "TRUE".to_string(),
        FilterValue::Bool(false) => "FALSE".to_string(),
        FilterValue::Integer(i) => i.to_string(),
        FilterValue::Float(f) => float_literal(*f),
        FilterValue::String(s) => quote_string(s),
        FilterValue::Geometry(g) => quote_string(&g.wkt),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::compiler::compile;
    use crate::parser::parse;
    use metafilter_proto::GeometryLiteral;
    use pretty_assertions::assert_eq;

    fn round_trip(tree: &FilterNode) -> FilterNode {
        let text = to_cql(tree);
        compile(parse(&text).unwrap_or_else(|e| panic!("{}: {}", text, e))).unwrap()
    }

    #[test]
    fn test_leaf_rendering() {
        let tree: FilterNode = LeafFilter::new("title", Comparator::ILike, "it's*").into();
        assert_eq!(to_cql(&tree), r#""title" ILIKE 'it''s*'"#);

        let tree: FilterNode = LeafFilter::new("size", Comparator::Ne, 3).into();
        assert_eq!(to_cql(&tree), r#""size" <> 3"#);

        let tree: FilterNode = LeafFilter::new("ratio", Comparator::Gt, 2.0).into();
        assert_eq!(to_cql(&tree), r#""ratio" > 2.0"#);
    }

    #[test]
    fn test_combinator_rendering() {
        let tree = FilterNode::not_or(vec![
            LeafFilter::new("a", Comparator::Eq, true).into(),
            LeafFilter::new("b", Comparator::Lt, 1.5).into(),
        ]);
        assert_eq!(to_cql(&tree), r#"NOT ("a" = TRUE OR "b" < 1.5)"#);
    }

    #[test]
    fn test_spatial_rendering() {
        let tree: FilterNode = LeafFilter::new(
            "anyGeo",
            Comparator::DWithin,
            GeometryLiteral::new("POINT(1 2)"),
        )
        .with_distance(250.0)
        .into();
        assert_eq!(to_cql(&tree), r#"DWITHIN("anyGeo", POINT(1 2), 250.0, meters)"#);
    }

    #[test]
    fn test_round_trip() {
        let tree = FilterNode::and(vec![
            FilterNode::or(vec![
                LeafFilter::new("\"anyText\"", Comparator::ILike, "*Alpha*").into(),
                LeafFilter::new("title", Comparator::Like, "Beta").into(),
            ]),
            FilterNode::not_and(vec![LeafFilter::new("size", Comparator::Ge, 10).into()]),
            LeafFilter::new("created", Comparator::Before, "2020-01-01T00:00:00Z").into(),
            LeafFilter::new(
                "anyGeo",
                Comparator::Intersects,
                GeometryLiteral::new("POLYGON((0 0, 0 2, 2 2, 2 0, 0 0))"),
            )
            .into(),
        ]);

        let back = round_trip(&tree);
        // Quotes around property names are dropped by the parser.
        let expected = FilterNode::and(vec![
            FilterNode::or(vec![
                LeafFilter::new("anyText", Comparator::ILike, "*Alpha*").into(),
                LeafFilter::new("title", Comparator::Like, "Beta").into(),
            ]),
            FilterNode::not_and(vec![LeafFilter::new("size", Comparator::Ge, 10).into()]),
            LeafFilter::new("created", Comparator::Before, "2020-01-01T00:00:00Z").into(),
            LeafFilter::new(
                "anyGeo",
                Comparator::Intersects,
                GeometryLiteral::new("POLYGON((0 0, 0 2, 2 2, 2 0, 0 0))"),
            )
            .into(),
        ]);
        assert_eq!(back, expected);
    }
}
