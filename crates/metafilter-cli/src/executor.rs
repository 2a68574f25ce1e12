//! Load inputs, compile the filter and evaluate it.

use std::fs;
use std::path::Path;

use metafilter_core::proto::FilterNode;
use metafilter_core::{AttributeRegistry, FilterEvaluator, Record};
use thiserror::Error;
use tracing::{debug, info};

use crate::config::{CliConfig, FilterSource};
use crate::formatter::create_formatter;

/// Errors that can occur while executing a CLI invocation.
#[derive(Debug, Error)]
pub enum ExecuteError {
    #[error("failed to read '{path}': {source}")]
    Io {
        path: String,
        #[source]
        source: std::io::Error,
    },

    /// A CQL error, already rendered with its source context.
    #[error("{0}")]
    Query(String),

    #[error("invalid filter tree: {0}")]
    Filter(#[from] metafilter_core::proto::Error),

    #[error(transparent)]
    Evaluate(#[from] metafilter_core::Error),
}

/// Runs one configured invocation and renders its output.
pub struct Executor {
    config: CliConfig,
}

impl Executor {
    /// Create an executor for a configuration.
    pub fn new(config: CliConfig) -> Self {
        Self { config }
    }

    /// Get the configuration.
    pub fn config(&self) -> &CliConfig {
        &self.config
    }

    /// Execute and return the formatted output.
    pub fn execute(&self) -> Result<String, ExecuteError> {
        let tree = self.load_filter()?;
        let formatter = create_formatter(self.config.format);

        if self.config.explain {
            let cql = tree.as_ref().map(metafilter_lang::to_cql).unwrap_or_default();
            return Ok(formatter.format_explain(tree.as_ref(), &cql));
        }

        let registry = load_registry(&self.config.registry_path)?;
        let records = load_records(&self.config.records_path)?;
        info!(
            records = records.len(),
            attributes = registry.len(),
            "loaded search results"
        );

        let mut matched: Vec<&Record> = match &tree {
            Some(tree) => FilterEvaluator::new(&registry).filter(tree, &records)?,
            None => records.iter().collect(),
        };
        info!(matched = matched.len(), "evaluated filter");

        if let Some(limit) = self.config.limit {
            matched.truncate(limit);
        }

        Ok(formatter.format_matches(&matched, &registry))
    }

    /// Compile the configured filter. Empty CQL text yields `None`, which
    /// matches every record.
    pub fn load_filter(&self) -> Result<Option<FilterNode>, ExecuteError> {
        match &self.config.source {
            FilterSource::Query(query) => {
                if query.trim().is_empty() {
                    return Ok(None);
                }
                let tree = metafilter_lang::parse_and_compile(query)
                    .map_err(|e| ExecuteError::Query(e.format_with_source(query)))?;
                debug!(query = %query, "compiled CQL filter");
                Ok(Some(tree))
            }
            FilterSource::File(path) => {
                let tree = FilterNode::from_json(&read_file(path)?)?;
                tree.validate()?;
                debug!(path = %path.display(), "loaded filter tree");
                Ok(Some(tree))
            }
        }
    }
}

fn load_registry(path: &Path) -> Result<AttributeRegistry, ExecuteError> {
    Ok(AttributeRegistry::from_json(&read_file(path)?)?)
}

fn load_records(path: &Path) -> Result<Vec<Record>, ExecuteError> {
    Ok(Record::many_from_json(&read_file(path)?)?)
}

fn read_file(path: &Path) -> Result<String, ExecuteError> {
    fs::read_to_string(path).map_err(|source| ExecuteError::Io {
        path: path.display().to_string(),
        source,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::formatter::OutputFormat;
    use serde_json::{json, Value as JsonValue};
    use std::path::PathBuf;
    use tempfile::TempDir;

    const REGISTRY: &str = r#"{
        "id": {"type": "STRING", "multivalued": false},
        "title": {"type": "STRING", "multivalued": false},
        "location": {"type": "GEOMETRY", "multivalued": false},
        "resolution": {"type": "INTEGER", "multivalued": false}
    }"#;

    const RECORDS: &str = r#"[
        {"id": "r1", "title": "Alpha Report", "location": "POINT(1 1)", "resolution": 10},
        {"id": "r2", "title": "Beta Survey", "location": "POINT(5 5)", "resolution": 30},
        {"id": "r3", "title": "Alpha Two", "resolution": 50}
    ]"#;

    struct Fixture {
        dir: TempDir,
    }

    impl Fixture {
        fn new() -> Self {
            let dir = tempfile::tempdir().unwrap();
            fs::write(dir.path().join("types.json"), REGISTRY).unwrap();
            fs::write(dir.path().join("results.json"), RECORDS).unwrap();
            Self { dir }
        }

        fn path(&self, name: &str) -> PathBuf {
            self.dir.path().join(name)
        }

        fn config(&self) -> CliConfig {
            CliConfig::new(self.path("results.json"), self.path("types.json"))
                .with_format(OutputFormat::Json)
        }

        fn ids(&self, config: CliConfig) -> Vec<JsonValue> {
            let output = Executor::new(config).execute().unwrap();
            let parsed: Vec<JsonValue> = serde_json::from_str(&output).unwrap();
            parsed.into_iter().map(|r| r["id"].clone()).collect()
        }
    }

    #[test]
    fn test_query_filters_records() {
        let fx = Fixture::new();
        let ids = fx.ids(fx.config().with_query("anyText ILIKE 'alpha'"));
        assert_eq!(ids, vec![json!("r1"), json!("r3")]);
    }

    #[test]
    fn test_empty_query_matches_all_and_limit_applies() {
        let fx = Fixture::new();
        assert_eq!(fx.ids(fx.config()).len(), 3);
        assert_eq!(fx.ids(fx.config().with_limit(2)), vec![json!("r1"), json!("r2")]);
    }

    #[test]
    fn test_filter_file() {
        let fx = Fixture::new();
        fs::write(
            fx.path("tree.json"),
            r#"{
                "type": "AND",
                "filters": [
                    {"type": "INTERSECTS", "property": "anyGeo",
                     "value": {"type": "GEOMETRY", "value": "POLYGON((4 4, 4 6, 6 6, 6 4, 4 4))"}},
                    {"type": ">=", "property": "resolution", "value": 20}
                ]
            }"#,
        )
        .unwrap();

        let ids = fx.ids(fx.config().with_filter_file(fx.path("tree.json")));
        assert_eq!(ids, vec![json!("r2")]);
    }

    #[test]
    fn test_explain_skips_evaluation() {
        let fx = Fixture::new();
        // explain never touches the records file
        let config = CliConfig::new(fx.path("missing.json"), fx.path("types.json"))
            .with_format(OutputFormat::Json)
            .with_query("title = 'x' OR resolution > 1")
            .with_explain(true);

        let output = Executor::new(config).execute().unwrap();
        let parsed: JsonValue = serde_json::from_str(&output).unwrap();
        assert_eq!(parsed["filter"]["type"], json!("OR"));
        assert_eq!(parsed["cql"], json!("(\"title\" = 'x' OR \"resolution\" > 1)"));
    }

    #[test]
    fn test_query_error_has_source_context() {
        let fx = Fixture::new();
        let err = Executor::new(fx.config().with_query("title = "))
            .execute()
            .unwrap_err();
        match err {
            ExecuteError::Query(message) => {
                assert!(message.starts_with("error:"));
                assert!(message.contains("line 1"));
            }
            other => panic!("expected query error, got {other:?}"),
        }
    }

    #[test]
    fn test_missing_file() {
        let fx = Fixture::new();
        let config = CliConfig::new(fx.path("nope.json"), fx.path("types.json"));
        let err = Executor::new(config).execute().unwrap_err();
        assert!(matches!(err, ExecuteError::Io { .. }));
        assert!(err.to_string().contains("nope.json"));
    }

    #[test]
    fn test_invalid_tree_is_rejected() {
        let fx = Fixture::new();
        fs::write(
            fx.path("tree.json"),
            r#"{"type": "DWITHIN", "property": "anyGeo",
                "value": {"type": "GEOMETRY", "value": "POINT(1 1)"}}"#,
        )
        .unwrap();
        let err = Executor::new(fx.config().with_filter_file(fx.path("tree.json")))
            .execute()
            .unwrap_err();
        assert!(matches!(err, ExecuteError::Filter(_)));
    }

    #[test]
    fn test_bad_records_file() {
        let fx = Fixture::new();
        fs::write(fx.path("results.json"), r#"{"not": "an array"}"#).unwrap();
        let err = Executor::new(fx.config()).execute().unwrap_err();
        assert!(matches!(err, ExecuteError::Evaluate(_)));
    }
}
