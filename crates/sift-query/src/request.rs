//! Outgoing search request and its assembly.
//!
//! [`SearchRequestAssembler`] collects the parts of the search form that are
//! not part of the condition tree (free text, entity and category selectors,
//! paging, sort) and merges them with the compiled tree payload and the
//! table's column filters:
//!
//! ```text
//! request.metadata      = tree metadata map
//! request.columnFilters = tree column entries ++ active column-model entries
//! ```
//!
//! The merge is a plain concatenation. A column filtered both in the tree and
//! in the table is sent twice.

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::column::{ColumnFilterEntry, ColumnFilters};
use crate::compile::{BackendFilterPayload, OperatorValue};
use crate::error::QueryError;

/// Page size used when none is given.
pub const DEFAULT_LIMIT: u32 = 50;

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    #[default]
    Asc,
    Desc,
}

impl SortOrder {
    pub fn as_str(self) -> &'static str {
        match self {
            SortOrder::Asc => "asc",
            SortOrder::Desc => "desc",
        }
    }

    /// Returns the opposite direction.
    pub fn reversed(self) -> SortOrder {
        match self {
            SortOrder::Asc => SortOrder::Desc,
            SortOrder::Desc => SortOrder::Asc,
        }
    }
}

impl FromStr for SortOrder {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "asc" => Ok(SortOrder::Asc),
            "desc" => Ok(SortOrder::Desc),
            _ => Err(QueryError::UnknownSortOrder(s.to_string())),
        }
    }
}

impl std::fmt::Display for SortOrder {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Body of a search call. Empty parts are left out of the JSON.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SearchRequest {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub q: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub entities: Vec<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub source_categories: Vec<String>,
    #[serde(skip_serializing_if = "IndexMap::is_empty")]
    pub metadata: IndexMap<String, OperatorValue>,
    #[serde(rename = "columnFilters", skip_serializing_if = "Vec::is_empty")]
    pub column_filters: Vec<ColumnFilterEntry>,
    pub limit: u32,
    pub offset: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
}

impl SearchRequest {
    /// Zero-based page index implied by `offset` and `limit`.
    pub fn page(&self) -> u32 {
        if self.limit == 0 {
            0
        } else {
            self.offset / self.limit
        }
    }

    /// Returns `true` if the request carries no criteria at all.
    pub fn is_unfiltered(&self) -> bool {
        self.q.is_none()
            && self.entities.is_empty()
            && self.source_categories.is_empty()
            && self.metadata.is_empty()
            && self.column_filters.is_empty()
    }
}

/// Builder for [`SearchRequest`].
///
/// # Example
///
/// ```
/// use sift_query::{BackendFilterPayload, ColumnFilters, SearchRequestAssembler, SortOrder};
///
/// let request = SearchRequestAssembler::new()
///     .query("  breast cancer ")
///     .category("trials")
///     .page(2, 25)
///     .sort("year", SortOrder::Desc)
///     .assemble(&BackendFilterPayload::default(), &ColumnFilters::new());
///
/// assert_eq!(request.q.as_deref(), Some("breast cancer"));
/// assert_eq!(request.offset, 50);
/// assert_eq!(request.limit, 25);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct SearchRequestAssembler {
    query: Option<String>,
    entities: Vec<String>,
    categories: Vec<String>,
    limit: u32,
    offset: u32,
    sort_by: Option<String>,
    sort_order: Option<SortOrder>,
}

impl Default for SearchRequestAssembler {
    fn default() -> Self {
        SearchRequestAssembler {
            query: None,
            entities: Vec::new(),
            categories: Vec::new(),
            limit: DEFAULT_LIMIT,
            offset: 0,
            sort_by: None,
            sort_order: None,
        }
    }
}

impl SearchRequestAssembler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the free-text query. Surrounding whitespace is trimmed; blank
    /// text clears it.
    pub fn query(mut self, text: impl AsRef<str>) -> Self {
        let trimmed = text.as_ref().trim();
        self.query = (!trimmed.is_empty()).then(|| trimmed.to_string());
        self
    }

    pub fn entity(mut self, entity: impl Into<String>) -> Self {
        self.entities.push(entity.into());
        self
    }

    pub fn entities<I, S>(mut self, entities: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.entities.extend(entities.into_iter().map(Into::into));
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.categories.push(category.into());
        self
    }

    pub fn categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.categories.extend(categories.into_iter().map(Into::into));
        self
    }

    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = limit;
        self
    }

    pub fn offset(mut self, offset: u32) -> Self {
        self.offset = offset;
        self
    }

    /// Selects a zero-based page of `size` rows.
    pub fn page(mut self, page: u32, size: u32) -> Self {
        self.limit = size;
        self.offset = page.saturating_mul(size);
        self
    }

    pub fn sort(mut self, field: impl Into<String>, order: SortOrder) -> Self {
        self.sort_by = Some(field.into());
        self.sort_order = Some(order);
        self
    }

    /// Merges the selectors with a compiled tree and the table's filters.
    pub fn assemble(&self, payload: &BackendFilterPayload, columns: &ColumnFilters) -> SearchRequest {
        self.assemble_entries(payload, columns.compile())
    }

    /// Like [`assemble`](Self::assemble), with column entries compiled by the caller.
    pub fn assemble_entries(
        &self,
        payload: &BackendFilterPayload,
        column_entries: Vec<ColumnFilterEntry>,
    ) -> SearchRequest {
        let mut column_filters = payload.column_filters.clone();
        column_filters.extend(column_entries);
        SearchRequest {
            q: self.query.clone(),
            entities: self.entities.clone(),
            source_categories: self.categories.clone(),
            metadata: payload.metadata.clone(),
            column_filters,
            limit: self.limit,
            offset: self.offset,
            sort_by: self.sort_by.clone(),
            sort_order: self.sort_order,
        }
    }
}
