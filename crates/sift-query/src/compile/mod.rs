//! Compilation of condition trees.
//!
//! [`TreeCompiler`] runs three independent traversals over a tree. Each one
//! skips incomplete conditions, so a half-edited tree still compiles to
//! whatever its complete leaves say:
//!
//! - [`TreeCompiler::explain`]: text for the preview panel
//! - [`TreeCompiler::predicate`]: canonical nested [`Predicate`]
//! - [`TreeCompiler::payload`]: the flat [`BackendFilterPayload`] the search
//!   backend executes
//!
//! Compilation is pure: the same tree always yields identical output.
//!
//! # Example
//!
//! ```
//! use sift_query::{Combinator, OperatorRegistry, QueryCondition, QueryGroup, TreeCompiler, TreeOperator};
//!
//! let tree = QueryGroup::empty(Combinator::Or)
//!     .with_condition(QueryCondition::new("title", TreeOperator::Contains, "cancer"))
//!     .with_condition(QueryCondition::new("year", TreeOperator::Gte, 2020i64));
//!
//! let registry = OperatorRegistry::standard();
//! let compiler = TreeCompiler::new(&registry);
//!
//! assert_eq!(compiler.explain(&tree), "title contains cancer or year greater than or equal 2020");
//! assert_eq!(
//!     compiler.predicate(&tree).to_string(),
//!     r#"{"or":[{"title":{"contains":"cancer"}},{"year":{"gte":2020}}]}"#
//! );
//! assert_eq!(compiler.payload(&tree).column_filters.len(), 2);
//! ```

mod explain;
mod payload;
mod predicate;

pub use explain::NO_CONDITIONS;
pub use payload::BackendFilterPayload;
pub use predicate::{OperatorValue, Predicate};

use serde::Serialize;

use crate::field::FieldIndex;
use crate::op::{Combinator, TreeOperator};
use crate::registry::OperatorRegistry;
use crate::tree::{QueryCondition, QueryGroup};
use crate::validate::{TreeValidator, ValidationIssue};
use crate::value::ConditionValue;

/// Everything the preview panel shows for one tree state.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct CompiledQuery {
    pub explanation: String,
    pub predicate: Predicate,
    pub payload: BackendFilterPayload,
    pub valid: bool,
    pub issues: Vec<ValidationIssue>,
}

/// Compiles trees against an operator registry.
#[derive(Debug, Clone, Copy)]
pub struct TreeCompiler<'a> {
    registry: &'a OperatorRegistry,
    fields: Option<&'a FieldIndex>,
}

impl<'a> TreeCompiler<'a> {
    pub fn new(registry: &'a OperatorRegistry) -> Self {
        TreeCompiler {
            registry,
            fields: None,
        }
    }

    /// Uses catalog labels in explanations and type checks in issues.
    pub fn with_fields(mut self, fields: &'a FieldIndex) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Renders the tree as text, or [`NO_CONDITIONS`] when nothing is complete.
    pub fn explain(&self, root: &QueryGroup) -> String {
        explain::Explainer {
            registry: self.registry,
            fields: self.fields,
        }
        .explain(root)
    }

    /// Builds the canonical predicate.
    ///
    /// A group with exactly one item is replaced by that item, whatever its
    /// combinator; a group with none is [`Predicate::Empty`].
    pub fn predicate(&self, group: &QueryGroup) -> Predicate {
        let mut items: Vec<Predicate> = group
            .conditions
            .iter()
            .filter_map(|c| {
                let (op, value) = self.leaf(c)?;
                Some(Predicate::leaf(c.field.clone(), op, value.to_json()))
            })
            .collect();
        items.extend(
            group
                .groups
                .iter()
                .map(|g| self.predicate(g))
                .filter(|p| !p.is_empty()),
        );

        match items.len() {
            0 => Predicate::Empty,
            1 => items.remove(0),
            _ => match group.combinator {
                Combinator::And => Predicate::And(items),
                Combinator::Or => Predicate::Or(items),
            },
        }
    }

    /// Builds the flat backend payload from every complete leaf, depth-first.
    pub fn payload(&self, root: &QueryGroup) -> BackendFilterPayload {
        let mut payload = BackendFilterPayload::default();
        for (_, condition) in root.walk_conditions() {
            if let Some((op, value)) = self.leaf(condition) {
                payload.push_leaf(
                    &condition.field,
                    OperatorValue::new(op, value.to_json()),
                    value,
                );
            }
        }
        payload
    }

    /// Runs every traversal plus validation.
    pub fn compile_all(&self, root: &QueryGroup) -> CompiledQuery {
        let mut validator = TreeValidator::new(self.registry);
        if let Some(fields) = self.fields {
            validator = validator.with_fields(fields);
        }
        let compiled = CompiledQuery {
            explanation: self.explain(root),
            predicate: self.predicate(root),
            payload: self.payload(root),
            valid: validator.is_valid_root(root),
            issues: validator.issues(root),
        };
        tracing::debug!(
            valid = compiled.valid,
            issues = compiled.issues.len(),
            metadata = compiled.payload.metadata.len(),
            column_filters = compiled.payload.column_filters.len(),
            "compiled condition tree"
        );
        compiled
    }

    /// Operator and compiled value of a complete condition.
    ///
    /// `exists` carries its flag as a boolean.
    fn leaf(&self, condition: &QueryCondition) -> Option<(TreeOperator, ConditionValue)> {
        let op = condition.complete_operator(self.registry)?;
        let value = if op.is_existence() {
            ConditionValue::Bool(condition.value.existence_flag())
        } else {
            condition.value.clone()
        };
        Some((op, value))
    }
}
