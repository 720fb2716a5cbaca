//! Error types for the query crate.

use thiserror::Error;

/// Errors that can occur when parsing or building filter criteria.
///
/// Incomplete conditions are not errors; they are reported as
/// [`ValidationIssue`](crate::ValidationIssue) values instead.
#[derive(Debug, Error)]
pub enum QueryError {
    /// Operator id is not part of the tree operator vocabulary.
    #[error("unknown operator '{0}'")]
    UnknownOperator(String),

    /// Operator id is not part of the column-filter operator vocabulary.
    #[error("unknown column filter operator '{0}'")]
    UnknownColumnOperator(String),

    /// Field type name is not one of the catalog types.
    #[error("unknown field type '{0}'")]
    UnknownFieldType(String),

    /// Combinator is neither AND nor OR.
    #[error("unknown combinator '{0}'")]
    UnknownCombinator(String),

    /// Sort order is neither asc nor desc.
    #[error("unknown sort order '{0}'")]
    UnknownSortOrder(String),

    /// Invalid regular expression pattern in a `regex` condition.
    #[error("invalid regex pattern: {0}")]
    InvalidRegex(#[from] regex::Error),

    /// A document could not be decoded.
    #[error("invalid document: {0}")]
    Json(#[from] serde_json::Error),
}

/// Result type for query operations.
pub type Result<T> = std::result::Result<T, QueryError>;
