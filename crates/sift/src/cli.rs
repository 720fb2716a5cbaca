//! Command-line arguments.

use std::path::PathBuf;
use std::time::Duration;

use clap::{Args, Parser, Subcommand};
use sift_client::{ClientConfig, EnvReader};
use sift_query::SortOrder;

use crate::output::OutputMode;

/// Compile, check and run filter criteria against a sift search backend.
#[derive(Debug, Parser)]
#[command(name = "sift", version, about)]
pub struct Cli {
    /// Output format
    #[arg(short, long, global = true, value_enum, default_value_t = OutputMode::Text)]
    pub output: OutputMode,

    #[command(flatten)]
    pub client: ClientArgs,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Print the human-readable explanation of a condition tree
    Explain {
        /// Condition tree JSON file ("-" for stdin)
        tree: PathBuf,
        /// Field catalog JSON file, for labels
        #[arg(long)]
        fields: Option<PathBuf>,
    },
    /// Print the canonical predicate of a condition tree
    Predicate {
        /// Condition tree JSON file ("-" for stdin)
        tree: PathBuf,
    },
    /// Check a condition tree; exits with status 1 when it is invalid
    Validate {
        /// Condition tree JSON file ("-" for stdin)
        tree: PathBuf,
        /// Field catalog JSON file, for type checks
        #[arg(long)]
        fields: Option<PathBuf>,
    },
    /// Print the search request for a condition tree and column filters
    Compile(RequestArgs),
    /// Fetch the field catalog
    Fields {
        /// Only fields of this source category
        #[arg(long)]
        category: Option<String>,
    },
    /// Send the search request and print the response
    Search(RequestArgs),
}

/// Inputs of an outgoing search request.
#[derive(Debug, Clone, Default, Args)]
pub struct RequestArgs {
    /// Condition tree JSON file ("-" for stdin)
    pub tree: Option<PathBuf>,

    /// Column filter entries JSON file
    #[arg(long)]
    pub columns: Option<PathBuf>,

    /// Free-text query
    #[arg(long)]
    pub q: Option<String>,

    /// Entity selector (repeatable)
    #[arg(long = "entity")]
    pub entities: Vec<String>,

    /// Source category selector (repeatable)
    #[arg(long = "category")]
    pub categories: Vec<String>,

    /// Rows per page [default: the configured page size]
    #[arg(long)]
    pub limit: Option<u32>,

    /// Rows to skip
    #[arg(long, default_value_t = 0)]
    pub offset: u32,

    /// Sort field
    #[arg(long)]
    pub sort_by: Option<String>,

    /// Sort direction (asc or desc)
    #[arg(long, value_parser = parse_sort_order, requires = "sort_by")]
    pub sort_order: Option<SortOrder>,
}

/// Backend connection settings; each falls back to its environment variable.
#[derive(Debug, Clone, Default, Args)]
pub struct ClientArgs {
    /// Backend base URL
    #[arg(long, global = true, env = sift_client::ENV_BASE_URL)]
    pub base_url: Option<String>,

    /// Path of the field catalog endpoint
    #[arg(long, global = true, env = sift_client::ENV_CATALOG_PATH)]
    pub catalog_path: Option<String>,

    /// Path of the search endpoint
    #[arg(long, global = true, env = sift_client::ENV_SEARCH_PATH)]
    pub search_path: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = sift_client::ENV_TIMEOUT_SECS)]
    pub timeout_secs: Option<u64>,

    /// Default rows per page
    #[arg(long, global = true, env = sift_client::ENV_PAGE_SIZE)]
    pub page_size: Option<u32>,

    /// Quiet period before a scheduled search is sent, in milliseconds
    #[arg(long, global = true, env = sift_client::ENV_DEBOUNCE_MS)]
    pub debounce_ms: Option<u64>,
}

impl ClientArgs {
    /// Reads the configuration from `env`, then applies the given settings
    /// over it.
    pub fn config(&self, env: &dyn EnvReader) -> sift_client::Result<ClientConfig> {
        let mut config = ClientConfig::from_env_reader(env)?;
        if let Some(url) = &self.base_url {
            config = config.with_base_url(url.clone());
        }
        if let Some(path) = &self.catalog_path {
            config = config.with_catalog_path(path.clone());
        }
        if let Some(path) = &self.search_path {
            config = config.with_search_path(path.clone());
        }
        if let Some(secs) = self.timeout_secs {
            config = config.with_timeout(Duration::from_secs(secs));
        }
        if let Some(size) = self.page_size {
            config = config.with_page_size(size);
        }
        if let Some(ms) = self.debounce_ms {
            config = config.with_debounce(Duration::from_millis(ms));
        }
        Ok(config)
    }
}

fn parse_sort_order(s: &str) -> Result<SortOrder, String> {
    s.parse().map_err(|e: sift_query::QueryError| e.to_string())
}
