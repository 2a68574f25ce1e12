//! Filter tree types.
//!
//! A filter tree is either a leaf comparison against one property or a
//! combinator over child trees. The JSON shape matches what search clients
//! already exchange:
//!
//! ```text
//! { "type": "AND", "filters": [ ... ] }
//! { "type": "ILIKE", "property": "title", "value": "alpha*" }
//! { "type": "DWITHIN", "property": "anyGeo",
//!   "value": { "type": "GEOMETRY", "value": "POINT(1 2)" }, "distance": 100 }
//! ```

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::value::FilterValue;

/// Comparator of a leaf filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Comparator {
    /// Case-insensitive wildcard token match.
    #[serde(rename = "ILIKE")]
    ILike,
    /// Case-sensitive wildcard token match.
    #[serde(rename = "LIKE")]
    Like,
    /// String-coerced equality.
    #[serde(rename = "=")]
    Eq,
    /// String-coerced inequality.
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Ge,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Le,
    /// Geometry intersection.
    #[serde(rename = "INTERSECTS")]
    Intersects,
    /// Geometry within a distance (meters) of the literal.
    #[serde(rename = "DWITHIN")]
    DWithin,
    /// Date-time at or before the literal.
    #[serde(rename = "BEFORE")]
    Before,
    /// Date-time at or after the literal.
    #[serde(rename = "AFTER")]
    After,
}

impl Comparator {
    /// The comparator as written in CQL and JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            Comparator::ILike => "ILIKE",
            Comparator::Like => "LIKE",
            Comparator::Eq => "=",
            Comparator::Ne => "!=",
            Comparator::Gt => ">",
            Comparator::Ge => ">=",
            Comparator::Lt => "<",
            Comparator::Le => "<=",
            Comparator::Intersects => "INTERSECTS",
            Comparator::DWithin => "DWITHIN",
            Comparator::Before => "BEFORE",
            Comparator::After => "AFTER",
        }
    }

    /// Check if this comparator operates on geometries.
    pub fn is_spatial(&self) -> bool {
        matches!(self, Comparator::Intersects | Comparator::DWithin)
    }

    /// Check if this comparator operates on date-times.
    pub fn is_temporal(&self) -> bool {
        matches!(self, Comparator::Before | Comparator::After)
    }
}

impl fmt::Display for Comparator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Boolean combinator of a non-leaf node.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum CombinatorKind {
    /// True when every child is true.
    #[serde(rename = "AND")]
    And,
    /// True when at least one child is false (NAND).
    #[serde(rename = "NOT AND")]
    NotAnd,
    /// True when at least one child is true.
    #[serde(rename = "OR")]
    Or,
    /// True when no child is true (NOR).
    #[serde(rename = "NOT OR")]
    NotOr,
}

impl CombinatorKind {
    /// The combinator as written in JSON.
    pub fn as_str(&self) -> &'static str {
        match self {
            CombinatorKind::And => "AND",
            CombinatorKind::NotAnd => "NOT AND",
            CombinatorKind::Or => "OR",
            CombinatorKind::NotOr => "NOT OR",
        }
    }

    /// The same combinator with its negation flipped.
    pub fn negate(self) -> Self {
        match self {
            CombinatorKind::And => CombinatorKind::NotAnd,
            CombinatorKind::NotAnd => CombinatorKind::And,
            CombinatorKind::Or => CombinatorKind::NotOr,
            CombinatorKind::NotOr => CombinatorKind::Or,
        }
    }
}

impl fmt::Display for CombinatorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single property/comparator/value test.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LeafFilter {
    /// The comparator.
    #[serde(rename = "type")]
    pub comparator: Comparator,
    /// Target attribute or pseudo-attribute, possibly double-quoted.
    pub property: String,
    /// Value to compare against.
    pub value: FilterValue,
    /// Distance in meters, only meaningful for `DWITHIN`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub distance: Option<f64>,
}

impl LeafFilter {
    /// Create a new leaf filter.
    pub fn new(
        property: impl Into<String>,
        comparator: Comparator,
        value: impl Into<FilterValue>,
    ) -> Self {
        Self {
            comparator,
            property: property.into(),
            value: value.into(),
            distance: None,
        }
    }

    /// Set the distance in meters.
    pub fn with_distance(mut self, distance: f64) -> Self {
        self.distance = Some(distance);
        self
    }

    /// Property name without surrounding quote characters.
    pub fn property_name(&self) -> &str {
        strip_quotes(&self.property)
    }
}

/// A boolean combination of child filters.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CombinatorNode {
    /// The combinator.
    #[serde(rename = "type")]
    pub kind: CombinatorKind,
    /// Child filters, evaluated in order.
    pub filters: Vec<FilterNode>,
}

/// A node of a filter tree.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum FilterNode {
    /// A combinator over child nodes.
    Combinator(CombinatorNode),
    /// A leaf comparison.
    Leaf(LeafFilter),
}

impl FilterNode {
    /// Create a combinator node.
    pub fn combinator(kind: CombinatorKind, filters: Vec<FilterNode>) -> Self {
        FilterNode::Combinator(CombinatorNode { kind, filters })
    }

    /// Create an AND node.
    pub fn and(filters: Vec<FilterNode>) -> Self {
        Self::combinator(CombinatorKind::And, filters)
    }

    /// Create an OR node.
    pub fn or(filters: Vec<FilterNode>) -> Self {
        Self::combinator(CombinatorKind::Or, filters)
    }

    /// Create a NOT AND node.
    pub fn not_and(filters: Vec<FilterNode>) -> Self {
        Self::combinator(CombinatorKind::NotAnd, filters)
    }

    /// Create a NOT OR node.
    pub fn not_or(filters: Vec<FilterNode>) -> Self {
        Self::combinator(CombinatorKind::NotOr, filters)
    }

    /// Check if this node is a leaf.
    pub fn is_leaf(&self) -> bool {
        matches!(self, FilterNode::Leaf(_))
    }

    /// All property names referenced anywhere in the tree.
    pub fn properties(&self) -> HashSet<String> {
        extract_filter_properties(self)
    }

    /// Parse a filter tree from JSON.
    pub fn from_json(json: &str) -> Result<Self, Error> {
        Ok(serde_json::from_str(json)?)
    }

    /// Serialize the tree as pretty-printed JSON.
    pub fn to_json_pretty(&self) -> Result<String, Error> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Check that every spatial leaf carries a geometry literal and every
    /// `DWITHIN` leaf carries a distance.
    pub fn validate(&self) -> Result<(), Error> {
        match self {
            FilterNode::Leaf(leaf) => {
                if leaf.comparator.is_spatial() && leaf.value.as_geometry().is_none() {
                    return Err(Error::InvalidFilter(format!(
                        "{} on '{}' requires a geometry value, got {}",
                        leaf.comparator,
                        leaf.property,
                        leaf.value.type_name()
                    )));
                }
                if leaf.comparator == Comparator::DWithin && leaf.distance.is_none() {
                    return Err(Error::InvalidFilter(format!(
                        "DWITHIN on '{}' requires a distance",
                        leaf.property
                    )));
                }
                Ok(())
            }
            FilterNode::Combinator(node) => node.filters.iter().try_for_each(FilterNode::validate),
        }
    }
}

impl From<LeafFilter> for FilterNode {
    fn from(leaf: LeafFilter) -> Self {
        FilterNode::Leaf(leaf)
    }
}

impl From<CombinatorNode> for FilterNode {
    fn from(node: CombinatorNode) -> Self {
        FilterNode::Combinator(node)
    }
}

/// Extract all property names referenced in a filter tree.
pub fn extract_filter_properties(filter: &FilterNode) -> HashSet<String> {
    let mut properties = HashSet::new();
    extract_filter_properties_inner(filter, &mut properties);
    properties
}

fn extract_filter_properties_inner(filter: &FilterNode, properties: &mut HashSet<String>) {
    match filter {
        FilterNode::Leaf(leaf) => {
            properties.insert(leaf.property_name().to_string());
        }
        FilterNode::Combinator(node) => {
            for child in &node.filters {
                extract_filter_properties_inner(child, properties);
            }
        }
    }
}

/// Strip surrounding single or double quote characters from a name.
pub fn strip_quotes(name: &str) -> &str {
    name.trim_matches(|c| c == '"' || c == '\'')
}
