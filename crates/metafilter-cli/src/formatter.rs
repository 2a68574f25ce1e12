//! Output formatters for matching records.

use clap::ValueEnum;
use comfy_table::{Cell, Table};
use metafilter_core::matcher::value_text;
use metafilter_core::proto::FilterNode;
use metafilter_core::{AttributeRegistry, Record};
use serde_json::Value as JsonValue;

/// Output format for results.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// ASCII table format
    Table,
    /// JSON format
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Table => write!(f, "table"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Trait for formatting output.
pub trait Formatter: Send + Sync {
    /// Format the records that matched.
    fn format_matches(&self, records: &[&Record], registry: &AttributeRegistry) -> String;

    /// Format a compiled filter. `None` is the match-everything filter.
    fn format_explain(&self, tree: Option<&FilterNode>, cql: &str) -> String;
}

/// Create a formatter for the given output format.
pub fn create_formatter(format: OutputFormat) -> Box<dyn Formatter> {
    match format {
        OutputFormat::Table => Box::new(TableFormatter),
        OutputFormat::Json => Box::new(JsonFormatter),
    }
}

/// Table formatter using comfy-table.
pub struct TableFormatter;

impl Formatter for TableFormatter {
    fn format_matches(&self, records: &[&Record], registry: &AttributeRegistry) -> String {
        if records.is_empty() {
            return "No results".to_string();
        }

        let columns = present_columns(records, registry);
        let mut table = Table::new();
        table.set_header(columns.iter().map(Cell::new).collect::<Vec<_>>());

        for record in records {
            let cells: Vec<Cell> = columns
                .iter()
                .map(|name| Cell::new(record.get(name).map(format_value).unwrap_or_default()))
                .collect();
            table.add_row(cells);
        }

        format!("{}\n{} row(s)", table, records.len())
    }

    fn format_explain(&self, tree: Option<&FilterNode>, cql: &str) -> String {
        let Some(tree) = tree else {
            return "No filter: every record matches".to_string();
        };

        let mut table = Table::new();
        table.set_header(vec!["Property", "Comparator"]);
        collect_leaves(tree, &mut |property, comparator| {
            table.add_row(vec![property.to_string(), comparator.to_string()]);
        });

        let json = tree.to_json_pretty().unwrap_or_else(|_| "{}".to_string());
        format!("{}\n\n{}\n\n{}", cql, json, table)
    }
}

/// JSON formatter.
pub struct JsonFormatter;

impl Formatter for JsonFormatter {
    fn format_matches(&self, records: &[&Record], _registry: &AttributeRegistry) -> String {
        serde_json::to_string_pretty(records).unwrap_or_else(|_| "[]".to_string())
    }

    fn format_explain(&self, tree: Option<&FilterNode>, cql: &str) -> String {
        let explain = serde_json::json!({
            "cql": cql,
            "filter": tree,
        });
        serde_json::to_string_pretty(&explain).unwrap_or_else(|_| "{}".to_string())
    }
}

/// Registry attributes present in at least one record, in registry order.
/// Attributes missing from the registry follow in first-seen order.
fn present_columns(records: &[&Record], registry: &AttributeRegistry) -> Vec<String> {
    let mut columns: Vec<String> = registry
        .iter()
        .filter(|def| records.iter().any(|r| r.get(&def.name).is_some()))
        .map(|def| def.name.clone())
        .collect();

    for record in records {
        for (name, _) in record.iter() {
            if registry.get(name).is_none() && !columns.contains(name) {
                columns.push(name.clone());
            }
        }
    }
    columns
}

fn collect_leaves<F: FnMut(&str, String)>(node: &FilterNode, visit: &mut F) {
    match node {
        FilterNode::Leaf(leaf) => visit(&leaf.property, leaf.comparator.to_string()),
        FilterNode::Combinator(c) => {
            for child in &c.filters {
                collect_leaves(child, visit);
            }
        }
    }
}

/// Format a record value as a display string.
fn format_value(value: &JsonValue) -> String {
    match value {
        JsonValue::Null => "NULL".to_string(),
        JsonValue::Array(items) => format!(
            "[{}]",
            items.iter().map(value_text).collect::<Vec<_>>().join(", ")
        ),
        _ => value_text(value),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use metafilter_core::{AttributeDef, AttributeType};
    use serde_json::json;

    fn registry() -> AttributeRegistry {
        AttributeRegistry::new()
            .with_attribute(AttributeDef::new("title", AttributeType::String))
            .with_attribute(AttributeDef::new("unused", AttributeType::String))
            .with_attribute(AttributeDef::new("size", AttributeType::Integer))
    }

    #[test]
    fn test_present_columns_follow_registry_order() {
        let a = Record::new().with("size", 3).with("title", "Alpha");
        let b = Record::new().with("extra", true).with("title", "Beta");
        let columns = present_columns(&[&a, &b], &registry());
        assert_eq!(columns, vec!["title", "size", "extra"]);
    }

    #[test]
    fn test_table_output() {
        let a = Record::new()
            .with("title", "Alpha")
            .with("size", 3)
            .with("tags", json!(["x", "y"]));
        let output = TableFormatter.format_matches(&[&a], &registry());
        assert!(output.contains("Alpha"));
        assert!(output.contains("[x, y]"));
        assert!(output.ends_with("1 row(s)"));
        assert!(!output.contains("unused"));
    }

    #[test]
    fn test_table_no_results() {
        assert_eq!(TableFormatter.format_matches(&[], &registry()), "No results");
    }

    #[test]
    fn test_json_output() {
        let a = Record::new().with("title", "Alpha");
        let output = JsonFormatter.format_matches(&[&a], &registry());
        let parsed: JsonValue = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed, json!([{"title": "Alpha"}]));
    }

    #[test]
    fn test_explain_output() {
        let tree = metafilter_lang::parse_and_compile("title ILIKE 'a*' AND size > 2").unwrap();
        let cql = metafilter_lang::to_cql(&tree);

        let table = TableFormatter.format_explain(Some(&tree), &cql);
        assert!(table.starts_with(&cql));
        assert!(table.contains("\"type\": \"AND\""));
        assert!(table.contains("\"property\": \"title\""));
        assert!(table.contains("ILIKE"));

        let json = JsonFormatter.format_explain(Some(&tree), &cql);
        let parsed: JsonValue = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed["cql"], json!(cql));
        assert_eq!(parsed["filter"]["type"], json!("AND"));

        let everything = JsonFormatter.format_explain(None, "");
        let parsed: JsonValue = serde_json::from_str(&everything).unwrap();
        assert!(parsed["filter"].is_null());
    }
}
