//! CLI configuration.

use std::path::PathBuf;

use clap::{ArgGroup, Parser};

use crate::formatter::OutputFormat;

/// Default path of the search results file.
pub const DEFAULT_RECORDS_PATH: &str = "results.json";

/// Default path of the metacard types file.
pub const DEFAULT_REGISTRY_PATH: &str = "types.json";

/// Where the filter comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FilterSource {
    /// CQL text given on the command line. Empty text matches everything.
    Query(String),
    /// A JSON filter tree stored in a file.
    File(PathBuf),
}

/// Configuration for one CLI invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CliConfig {
    /// JSON array of records to filter.
    pub records_path: PathBuf,
    /// JSON object of attribute definitions.
    pub registry_path: PathBuf,
    /// The filter to apply.
    pub source: FilterSource,
    /// How matching records are printed.
    pub format: OutputFormat,
    /// Print at most this many matches.
    pub limit: Option<usize>,
    /// Print the compiled filter instead of evaluating it.
    pub explain: bool,
}

impl CliConfig {
    /// Create a configuration reading the given records and registry files.
    pub fn new(records_path: impl Into<PathBuf>, registry_path: impl Into<PathBuf>) -> Self {
        Self {
            records_path: records_path.into(),
            registry_path: registry_path.into(),
            source: FilterSource::Query(String::new()),
            format: OutputFormat::Table,
            limit: None,
            explain: false,
        }
    }

    /// Filter with CQL text.
    pub fn with_query(mut self, query: impl Into<String>) -> Self {
        self.source = FilterSource::Query(query.into());
        self
    }

    /// Filter with a JSON tree read from `path`.
    pub fn with_filter_file(mut self, path: impl Into<PathBuf>) -> Self {
        self.source = FilterSource::File(path.into());
        self
    }

    /// Set the output format.
    pub fn with_format(mut self, format: OutputFormat) -> Self {
        self.format = format;
        self
    }

    /// Cap the number of printed matches.
    pub fn with_limit(mut self, limit: usize) -> Self {
        self.limit = Some(limit);
        self
    }

    /// Print the compiled filter instead of evaluating it.
    pub fn with_explain(mut self, explain: bool) -> Self {
        self.explain = explain;
        self
    }
}

impl Default for CliConfig {
    fn default() -> Self {
        Self::new(DEFAULT_RECORDS_PATH, DEFAULT_REGISTRY_PATH)
    }
}

/// Command-line arguments.
#[derive(Parser, Debug)]
#[command(name = "metafilter")]
#[command(version, about = "Filter search results with CQL", long_about = None)]
#[command(group(ArgGroup::new("filter_source").required(true).args(["query", "filter"])))]
pub struct Args {
    /// JSON file holding an array of result records.
    #[arg(short, long, default_value = DEFAULT_RECORDS_PATH)]
    pub records: PathBuf,

    /// JSON file holding the metacard attribute types.
    #[arg(short = 't', long, default_value = DEFAULT_REGISTRY_PATH)]
    pub registry: PathBuf,

    /// CQL filter text.
    #[arg(short, long)]
    pub query: Option<String>,

    /// JSON filter tree file.
    #[arg(short, long)]
    pub filter: Option<PathBuf>,

    /// Output format
    #[arg(long, default_value = "table", value_enum)]
    pub format: OutputFormat,

    /// Print at most this many matches (0 = no limit).
    #[arg(short, long, default_value_t = 0)]
    pub limit: usize,

    /// Print the compiled filter tree and its CQL form, then exit.
    #[arg(long)]
    pub explain: bool,

    /// Enable debug logging.
    #[arg(short, long)]
    pub verbose: bool,
}

impl Args {
    /// Convert command-line arguments to a CLI configuration.
    pub fn into_config(self) -> CliConfig {
        let mut config = CliConfig::new(self.records, self.registry)
            .with_format(self.format)
            .with_explain(self.explain);

        config = match (self.query, self.filter) {
            (_, Some(path)) => config.with_filter_file(path),
            (Some(query), None) => config.with_query(query),
            (None, None) => config,
        };

        if self.limit > 0 {
            config = config.with_limit(self.limit);
        }
        config
    }
}
