//! Command handlers.
//!
//! Each handler returns an [`Outcome`]: the rendered body and whether the
//! command succeeded. Handlers never print.

use std::path::Path;
use std::sync::Arc;

use anyhow::{bail, Result};
use serde::Serialize;
use sift_client::{
    CatalogLoader, CatalogState, ClientConfig, ColumnDescriptor, FieldCatalog, SearchEndpoint,
    SearchSession,
};
use sift_query::{
    ColumnFilters, FieldIndex, FieldMetadata, OperatorRegistry, Predicate, QueryGroup,
    SearchRequest, SearchRequestAssembler, TreeCompiler, TreeValidator, ValidationIssue,
};

use crate::cli::RequestArgs;
use crate::input::{read_columns, read_fields, read_tree};
use crate::output::{cell, render, serialize_structured, OutputMode};

/// Rendered result of one command.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub body: String,
    pub success: bool,
}

impl Outcome {
    fn ok(body: String) -> Self {
        Outcome {
            body,
            success: true,
        }
    }
}

fn load_fields(path: Option<&Path>) -> Result<Option<FieldIndex>> {
    path.map(read_fields).transpose()
}

#[derive(Serialize)]
struct Explanation<'a> {
    explanation: &'a str,
}

pub fn explain(tree: &Path, fields: Option<&Path>, mode: OutputMode) -> Result<Outcome> {
    let tree = read_tree(tree)?;
    let fields = load_fields(fields)?;
    let registry = OperatorRegistry::standard();
    let mut compiler = TreeCompiler::new(&registry);
    if let Some(fields) = &fields {
        compiler = compiler.with_fields(fields);
    }
    let explanation = compiler.explain(&tree);
    let body = render(
        &Explanation {
            explanation: &explanation,
        },
        mode,
        |e| e.explanation.to_string(),
    )?;
    Ok(Outcome::ok(body))
}

pub fn predicate(tree: &Path, mode: OutputMode) -> Result<Outcome> {
    let tree = read_tree(tree)?;
    let registry = OperatorRegistry::standard();
    let predicate = TreeCompiler::new(&registry).predicate(&tree);
    Ok(Outcome::ok(render_predicate(&predicate, mode)?))
}

fn render_predicate(predicate: &Predicate, mode: OutputMode) -> Result<String> {
    // The predicate is JSON in every mode; text just means pretty JSON.
    let mode = if mode.is_structured() { mode } else { OutputMode::Json };
    Ok(serialize_structured(predicate, mode)?)
}

/// Validity of a tree plus the messages for its incomplete conditions.
#[derive(Debug, Serialize)]
pub struct ValidationReport {
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    pub fn check(tree: &QueryGroup, registry: &OperatorRegistry, fields: Option<&FieldIndex>) -> Self {
        let mut validator = TreeValidator::new(registry);
        if let Some(fields) = fields {
            validator = validator.with_fields(fields);
        }
        ValidationReport {
            valid: validator.is_valid(tree),
            issues: validator.issues(tree),
        }
    }

    fn to_text(&self) -> String {
        let mut lines = vec![if self.valid { "valid" } else { "invalid" }.to_string()];
        lines.extend(
            self.issues
                .iter()
                .map(|issue| format!("  condition {}: {}", issue.condition_id, issue)),
        );
        lines.join("\n")
    }
}

pub fn validate(tree: &Path, fields: Option<&Path>, mode: OutputMode) -> Result<Outcome> {
    let tree = read_tree(tree)?;
    let fields = load_fields(fields)?;
    let registry = OperatorRegistry::standard();
    let report = ValidationReport::check(&tree, &registry, fields.as_ref());
    let body = render(&report, mode, ValidationReport::to_text)?;
    Ok(Outcome {
        body,
        success: report.valid,
    })
}

/// Builds the outgoing request from the command-line inputs.
pub fn build_request(args: &RequestArgs, config: &ClientConfig) -> Result<SearchRequest> {
    let tree = match &args.tree {
        Some(path) => read_tree(path)?,
        None => QueryGroup::new(),
    };
    let columns = match &args.columns {
        Some(path) => read_columns(path)?,
        None => ColumnFilters::new(),
    };

    let registry = OperatorRegistry::standard();
    let payload = TreeCompiler::new(&registry).payload(&tree);

    let mut assembler = SearchRequestAssembler::new()
        .entities(args.entities.iter().cloned())
        .categories(args.categories.iter().cloned())
        .limit(args.limit.unwrap_or(config.page_size))
        .offset(args.offset);
    if let Some(q) = &args.q {
        assembler = assembler.query(q);
    }
    if let Some(field) = &args.sort_by {
        assembler = assembler.sort(field.clone(), args.sort_order.unwrap_or_default());
    }
    Ok(assembler.assemble(&payload, &columns))
}

pub fn compile(args: &RequestArgs, config: &ClientConfig, mode: OutputMode) -> Result<Outcome> {
    let request = build_request(args, config)?;
    let mode = if mode.is_structured() { mode } else { OutputMode::Json };
    Ok(Outcome::ok(serialize_structured(&request, mode)?))
}

/// Fetches the catalog through `catalog` and lists its fields.
pub async fn fields(
    catalog: Arc<dyn FieldCatalog>,
    category: Option<&str>,
    mode: OutputMode,
) -> Result<Outcome> {
    let mut loader = CatalogLoader::new(catalog);
    if let Some(category) = category {
        loader = loader.with_category(category);
    }
    let state = loader.load().await;
    if let CatalogState::Failed(message) = &state {
        bail!("field catalog unavailable: {message}");
    }
    let fields: Vec<&FieldMetadata> = state.fields().collect();
    let body = render(&fields, mode, |fields| fields_table(fields))?;
    Ok(Outcome::ok(body))
}

fn fields_table(fields: &[&FieldMetadata]) -> String {
    fields
        .iter()
        .map(|f| format!("{}\t{}\t{}", f.name, f.field_type.as_str(), f.display_label()))
        .collect::<Vec<_>>()
        .join("\n")
}

/// What `search` prints.
#[derive(Debug, Serialize)]
pub struct SearchOutput {
    pub total: u64,
    pub columns: Vec<ColumnDescriptor>,
    pub results: Vec<serde_json::Value>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub facets: Option<serde_json::Value>,
}

/// Sends the assembled request through `endpoint` and prints the response.
pub async fn search(
    endpoint: Arc<dyn SearchEndpoint>,
    args: &RequestArgs,
    config: &ClientConfig,
    mode: OutputMode,
) -> Result<Outcome> {
    let request = build_request(args, config)?;
    let session = SearchSession::new(endpoint, config.debounce);
    let state = session.execute(request).await;
    if let Some(error) = state.error {
        bail!("search failed: {error}");
    }
    let output = SearchOutput {
        total: state.total,
        columns: state.columns,
        results: state.results,
        facets: state.facets,
    };
    Ok(Outcome::ok(render(&output, mode, results_table)?))
}

fn results_table(output: &SearchOutput) -> String {
    let mut lines = Vec::with_capacity(output.results.len() + 2);
    if !output.columns.is_empty() {
        lines.push(
            output
                .columns
                .iter()
                .map(ColumnDescriptor::label)
                .collect::<Vec<_>>()
                .join("\t"),
        );
        for row in &output.results {
            let cells: Vec<String> = output
                .columns
                .iter()
                .map(|c| cell(lookup(row, &c.field)))
                .collect();
            lines.push(cells.join("\t"));
        }
    } else {
        lines.extend(output.results.iter().map(|row| row.to_string()));
    }
    lines.push(format!("{} of {} results", output.results.len(), output.total));
    lines.join("\n")
}

/// Finds a column's value in a row, by key or by dotted path.
fn lookup<'a>(row: &'a serde_json::Value, field: &str) -> &'a serde_json::Value {
    row.get(field)
        .or_else(|| row.pointer(&dotted_pointer(field)))
        .unwrap_or(&serde_json::Value::Null)
}

/// Turns `a.b` into the JSON pointer `/a/b`, escaping `~` and `/` in keys.
fn dotted_pointer(field: &str) -> String {
    field
        .split('.')
        .map(|key| format!("/{}", key.replace('~', "~0").replace('/', "~1")))
        .collect()
}
