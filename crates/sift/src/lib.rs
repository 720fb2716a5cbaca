//! Sift - command-line front end for sift filter criteria.
//!
//! Condition trees, field catalogs and column filters are read as JSON
//! documents; the pure commands (`explain`, `predicate`, `validate`,
//! `compile`) never touch the network, while `fields` and `search` talk to
//! the backend configured through `--base-url` or `SIFT_BASE_URL`.

pub mod cli;
pub mod commands;
pub mod input;
pub mod output;

use std::sync::Arc;

use anyhow::{Context, Result};
use sift_client::{HttpBackend, RealEnv};

pub use cli::{Cli, ClientArgs, Command, RequestArgs};
pub use commands::Outcome;
pub use output::{serialize_structured, OutputMode, SerializeError};

/// Runs one parsed command line.
pub async fn run(cli: Cli) -> Result<Outcome> {
    let config = cli
        .client
        .config(&RealEnv)
        .context("invalid client configuration")?;
    let mode = cli.output;
    tracing::debug!(?mode, base_url = %config.base_url, "running command");

    match &cli.command {
        Command::Explain { tree, fields } => commands::explain(tree, fields.as_deref(), mode),
        Command::Predicate { tree } => commands::predicate(tree, mode),
        Command::Validate { tree, fields } => commands::validate(tree, fields.as_deref(), mode),
        Command::Compile(args) => commands::compile(args, &config, mode),
        Command::Fields { category } => {
            let backend = HttpBackend::new(config).context("failed to build HTTP client")?;
            commands::fields(Arc::new(backend), category.as_deref(), mode).await
        }
        Command::Search(args) => {
            let backend =
                HttpBackend::new(config.clone()).context("failed to build HTTP client")?;
            commands::search(Arc::new(backend), args, &config, mode).await
        }
    }
}
