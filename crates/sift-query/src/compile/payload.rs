//! Backend filter payload.
//!
//! The search backend does not understand nested boolean structure. Every
//! complete leaf of the tree lands in one of two flat containers which the
//! backend ANDs together:
//!
//! - `metadata.<key>` fields go into the `metadata` map as
//!   `{key: {operator: value}}`; a later leaf on the same key replaces an
//!   earlier one.
//! - Core fields are appended to `columnFilters`, one single-condition entry
//!   per leaf, with the operator translated by
//!   [`TreeOperator::column_operator`](crate::TreeOperator::column_operator).
//!
//! Group combinators are therefore lost: an OR tree and the equivalent AND
//! tree produce the same payload.

use indexmap::IndexMap;
use serde::Serialize;

use crate::column::{ColumnFilterCondition, ColumnFilterEntry, ColumnFilterValue};
use crate::compile::predicate::OperatorValue;
use crate::field::strip_metadata_prefix;
use crate::op::Combinator;
use crate::value::ConditionValue;

/// Tree-derived part of the outgoing search request.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct BackendFilterPayload {
    /// Attribute-map filters keyed by the stripped field name.
    pub metadata: IndexMap<String, OperatorValue>,
    /// Core-field filters, in tree order.
    #[serde(rename = "columnFilters")]
    pub column_filters: Vec<ColumnFilterEntry>,
}

impl BackendFilterPayload {
    pub fn is_empty(&self) -> bool {
        self.metadata.is_empty() && self.column_filters.is_empty()
    }

    /// Routes one complete leaf into the payload.
    pub(crate) fn push_leaf(&mut self, field: &str, test: OperatorValue, raw: ConditionValue) {
        match strip_metadata_prefix(field) {
            Some(key) => {
                if self.metadata.contains_key(key) {
                    tracing::debug!(key, "metadata filter overwritten by later condition");
                }
                self.metadata.insert(key.to_string(), test);
            }
            None => self.column_filters.push(ColumnFilterEntry {
                id: field.to_string(),
                value: ColumnFilterValue {
                    conditions: vec![ColumnFilterCondition {
                        operator: test.operator.column_operator(),
                        value: raw,
                    }],
                    join_operator: Combinator::And,
                },
            }),
        }
    }
}
