//! Filter-tree evaluation.
//!
//! This module provides the `FilterEvaluator` that decides whether a record
//! matches a filter tree, and the `matches_filters` / `matches_cql` entry
//! points built on it.

use tracing::{debug, trace};

use crate::catalog::AttributeRegistry;
use crate::error::Error;
use crate::geometry::{GeoAdapter, GeometryAdapter, ShapeKind};
use crate::matcher::{self, WildcardPattern};
use crate::record::Record;
use crate::resolver::{resolve_values, Resolved};
use metafilter_proto::{CombinatorKind, CombinatorNode, Comparator, FilterNode, LeafFilter};

/// Evaluates filter trees against records.
///
/// Holds no per-call state; one evaluator can serve any number of records,
/// from any number of threads when the adapter is `Sync`.
pub struct FilterEvaluator<'r, G: GeometryAdapter = GeoAdapter> {
    registry: &'r AttributeRegistry,
    adapter: G,
}

impl<'r> FilterEvaluator<'r, GeoAdapter> {
    /// Create an evaluator with the default geometry backend.
    pub fn new(registry: &'r AttributeRegistry) -> Self {
        Self::with_adapter(registry, GeoAdapter::default())
    }
}

impl<'r, G: GeometryAdapter> FilterEvaluator<'r, G> {
    /// Create an evaluator with a custom geometry backend.
    pub fn with_adapter(registry: &'r AttributeRegistry, adapter: G) -> Self {
        Self { registry, adapter }
    }

    /// The attribute registry in use.
    pub fn registry(&self) -> &AttributeRegistry {
        self.registry
    }

    /// The geometry adapter in use.
    pub fn adapter(&self) -> &G {
        &self.adapter
    }

    /// Evaluate a filter tree against a record.
    pub fn evaluate(&self, node: &FilterNode, record: &Record) -> Result<bool, Error> {
        match node {
            FilterNode::Leaf(leaf) => self.evaluate_leaf(leaf, record),
            FilterNode::Combinator(combinator) => self.evaluate_combinator(combinator, record),
        }
    }

    /// Parse and compile CQL text, then evaluate it. Empty text matches
    /// every record.
    pub fn evaluate_cql(&self, text: &str, record: &Record) -> Result<bool, Error> {
        if text.is_empty() {
            return Ok(true);
        }
        let tree = metafilter_lang::parse_and_compile(text)?;
        debug!(query = text, "compiled CQL filter");
        self.evaluate(&tree, record)
    }

    /// Evaluate one tree against many records, keeping the matches.
    pub fn filter<'a, I>(&self, node: &FilterNode, records: I) -> Result<Vec<&'a Record>, Error>
    where
        I: IntoIterator<Item = &'a Record>,
    {
        let mut matched = Vec::new();
        for record in records {
            if self.evaluate(node, record)? {
                matched.push(record);
            }
        }
        Ok(matched)
    }

    fn evaluate_combinator(&self, node: &CombinatorNode, record: &Record) -> Result<bool, Error> {
        match node.kind {
            CombinatorKind::And => {
                for child in &node.filters {
                    if !self.evaluate(child, record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
            CombinatorKind::Or => {
                for child in &node.filters {
                    if self.evaluate(child, record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            CombinatorKind::NotAnd => {
                for child in &node.filters {
                    if !self.evaluate(child, record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }
            CombinatorKind::NotOr => {
                for child in &node.filters {
                    if self.evaluate(child, record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }
        }
    }

    fn evaluate_leaf(&self, leaf: &LeafFilter, record: &Record) -> Result<bool, Error> {
        // Spatial literals are parsed up front so a malformed literal fails
        // regardless of what the record holds.
        let query = if leaf.comparator.is_spatial() {
            Some(self.spatial_query(leaf)?)
        } else {
            None
        };

        let values = resolve_values(record, &leaf.property, self.registry, &self.adapter)?;
        if values.is_empty() {
            let matched = leaf.value.is_empty_string();
            trace!(property = %leaf.property, comparator = %leaf.comparator, matched, "no values");
            return Ok(matched);
        }

        let matched = match leaf.comparator {
            Comparator::Intersects | Comparator::DWithin => match query.flatten() {
                Some(query) => values.iter().any(|v| {
                    v.as_shape()
                        .is_some_and(|shape| self.adapter.intersects(&query, shape))
                }),
                None => false,
            },
            Comparator::ILike | Comparator::Like => {
                let pattern = WildcardPattern::new(
                    &leaf.value.to_text(),
                    leaf.comparator == Comparator::ILike,
                )?;
                scalars(&values).any(|v| pattern.matches(&matcher::value_text(v)))
            }
            Comparator::Before | Comparator::After => {
                let mut matched = false;
                for value in scalars(&values) {
                    if matcher::compare_temporal(leaf.comparator, value, &leaf.value)? {
                        matched = true;
                        break;
                    }
                }
                matched
            }
            comparator => {
                scalars(&values).any(|v| matcher::compare_scalar(comparator, v, &leaf.value))
            }
        };

        trace!(
            property = %leaf.property,
            comparator = %leaf.comparator,
            candidates = values.len(),
            matched,
            "evaluated leaf"
        );
        Ok(matched)
    }

    /// Build the shape candidates are intersected with.
    ///
    /// `Ok(None)` means the leaf can never match: a non-positive `DWITHIN`
    /// distance, or a `DWITHIN` literal that is neither a point, a line
    /// string nor a polygon.
    fn spatial_query(&self, leaf: &LeafFilter) -> Result<Option<G::Shape>, Error> {
        let literal = leaf.value.as_geometry().ok_or_else(|| {
            Error::InvalidFilter(format!(
                "{} on '{}' requires a geometry value, got {}",
                leaf.comparator,
                leaf.property,
                leaf.value.type_name()
            ))
        })?;
        let shape = self.adapter.parse_wkt(&literal.wkt)?;

        if leaf.comparator == Comparator::Intersects {
            return Ok(Some(shape));
        }

        let distance = leaf.distance.ok_or_else(|| {
            Error::InvalidFilter(format!("DWITHIN on '{}' requires a distance", leaf.property))
        })?;

        Ok(match self.adapter.kind(&shape) {
            ShapeKind::Point => self.adapter.circle(&shape, distance),
            ShapeKind::LineString => self.adapter.buffer_line(&shape, distance),
            ShapeKind::Polygon | ShapeKind::MultiPolygon => Some(shape),
            _ => None,
        })
    }
}

fn scalars<'v, 'a: 'v, S: 'v>(
    values: &'v [Resolved<'a, S>],
) -> impl Iterator<Item = &'a serde_json::Value> + 'v {
    values.iter().filter_map(Resolved::as_scalar)
}

/// Check whether `record` matches the filter tree `root`.
pub fn matches_filters(
    record: &Record,
    root: &FilterNode,
    registry: &AttributeRegistry,
) -> Result<bool, Error> {
    FilterEvaluator::new(registry).evaluate(root, record)
}

/// Check whether `record` matches the CQL text `text`.
///
/// Empty text matches every record without being parsed.
pub fn matches_cql(record: &Record, text: &str, registry: &AttributeRegistry) -> Result<bool, Error> {
    FilterEvaluator::new(registry).evaluate_cql(text, record)
}
