//! Reading JSON documents from disk or stdin.

use std::io::Read;
use std::path::Path;

use anyhow::{Context, Result};
use serde::Deserialize;
use sift_client::parse_catalog;
use sift_query::{ColumnFilterEntry, ColumnFilters, ColumnKind, FieldIndex, QueryGroup};

/// Reads `path`, or stdin when the path is `-`.
pub fn read_source(path: &Path) -> Result<String> {
    if path == Path::new("-") {
        let mut text = String::new();
        std::io::stdin()
            .read_to_string(&mut text)
            .context("failed to read stdin")?;
        return Ok(text);
    }
    std::fs::read_to_string(path).with_context(|| format!("failed to read {}", path.display()))
}

pub fn read_tree(path: &Path) -> Result<QueryGroup> {
    let text = read_source(path)?;
    QueryGroup::from_json(&text)
        .with_context(|| format!("{} is not a condition tree", path.display()))
}

/// Reads a field catalog in either response shape.
pub fn read_fields(path: &Path) -> Result<FieldIndex> {
    let text = read_source(path)?;
    let fields = parse_catalog(&text)
        .with_context(|| format!("{} is not a field catalog", path.display()))?;
    Ok(FieldIndex::from_fields(fields))
}

#[derive(Deserialize)]
struct ColumnDocument {
    #[serde(flatten)]
    entry: ColumnFilterEntry,
    #[serde(rename = "type", default)]
    column_type: Option<String>,
}

/// Reads column filters: an array of `{"id", "value", "type"?}` entries.
/// Columns without a type filter as text.
pub fn read_columns(path: &Path) -> Result<ColumnFilters> {
    let text = read_source(path)?;
    let docs: Vec<ColumnDocument> = serde_json::from_str(&text)
        .with_context(|| format!("{} is not a list of column filters", path.display()))?;
    Ok(column_filters_from(docs))
}

fn column_filters_from(docs: Vec<ColumnDocument>) -> ColumnFilters {
    ColumnFilters::from_entries(docs.into_iter().map(|doc| {
        let kind = doc
            .column_type
            .as_deref()
            .map(ColumnKind::from_type_name)
            .unwrap_or_default();
        (doc.entry, kind)
    }))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn column_documents_keep_order_and_kind() {
        let docs: Vec<ColumnDocument> = serde_json::from_str(
            r#"[
                {"id": "year", "type": "number",
                 "value": {"conditions": [{"operator": "greaterThan", "value": 2019}], "joinOperator": "AND"}},
                {"id": "title",
                 "value": {"conditions": [{"operator": "contains", "value": "cancer"}]}}
            ]"#,
        )
        .unwrap();
        let filters = column_filters_from(docs);
        assert_eq!(filters.len(), 2);
        assert_eq!(filters.get("year").unwrap().kind(), ColumnKind::Number);
        assert_eq!(filters.get("title").unwrap().kind(), ColumnKind::Text);
        let ids: Vec<_> = filters.compile().into_iter().map(|e| e.id).collect();
        assert_eq!(ids, vec!["year", "title"]);
    }

    #[test]
    fn missing_file_names_the_path() {
        let err = read_tree(Path::new("/nonexistent/tree.json")).unwrap_err();
        assert!(err.to_string().contains("/nonexistent/tree.json"));
    }
}
