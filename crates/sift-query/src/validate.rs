//! Tree validity and per-condition validation messages.
//!
//! Validity is deliberately loose: a tree is valid as soon as one leaf
//! anywhere in it is complete, regardless of combinators. Incomplete leaves
//! are dropped by the compilers. [`TreeValidator::issues`] lists what is
//! wrong with each incomplete or suspicious leaf, for display next to the
//! editor; issues never change the validity verdict.

use serde::Serialize;

use crate::error::Result;
use crate::field::FieldIndex;
use crate::op::TreeOperator;
use crate::registry::OperatorRegistry;
use crate::tree::{QueryCondition, QueryGroup};

/// Compiles the pattern of a `regex` condition.
pub fn compile_pattern(pattern: &str) -> Result<regex::Regex> {
    Ok(regex::Regex::new(pattern)?)
}

/// What is wrong with a condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "camelCase")]
pub enum IssueKind {
    /// No field selected.
    MissingField,
    /// No operator selected.
    MissingOperator,
    /// Operator is not in the registry in use.
    UnknownOperator { operator: TreeOperator },
    /// Operator does not apply to the field's catalog type.
    InapplicableOperator {
        operator: TreeOperator,
        field_type: crate::field::FieldType,
    },
    /// Operator needs a value and none was entered.
    MissingValue,
    /// Value does not have the shape the operator takes.
    WrongValueShape { expected: &'static str },
    /// Pattern of a `regex` condition does not compile.
    InvalidRegex { message: String },
}

impl std::fmt::Display for IssueKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            IssueKind::MissingField => write!(f, "select a field"),
            IssueKind::MissingOperator => write!(f, "select an operator"),
            IssueKind::UnknownOperator { operator } => {
                write!(f, "operator '{operator}' is not available")
            }
            IssueKind::InapplicableOperator { operator, field_type } => {
                write!(f, "operator '{operator}' does not apply to {field_type} fields")
            }
            IssueKind::MissingValue => write!(f, "enter a value"),
            IssueKind::WrongValueShape { expected } => write!(f, "expected {expected}"),
            IssueKind::InvalidRegex { message } => write!(f, "{message}"),
        }
    }
}

/// One validation message, addressed to a condition.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub group_id: String,
    pub condition_id: String,
    #[serde(flatten)]
    pub kind: IssueKind,
}

impl std::fmt::Display for ValidationIssue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.kind)
    }
}

/// Checks trees against an operator registry and, optionally, a field catalog.
#[derive(Debug, Clone, Copy)]
pub struct TreeValidator<'a> {
    registry: &'a OperatorRegistry,
    fields: Option<&'a FieldIndex>,
}

impl<'a> TreeValidator<'a> {
    pub fn new(registry: &'a OperatorRegistry) -> Self {
        TreeValidator {
            registry,
            fields: None,
        }
    }

    /// Enables field-type checks against a catalog.
    pub fn with_fields(mut self, fields: &'a FieldIndex) -> Self {
        self.fields = Some(fields);
        self
    }

    /// Returns `true` if any condition at any depth is complete.
    ///
    /// The group's combinator plays no part: an AND group with one complete
    /// and one blank condition is valid, and compiles to the complete one.
    pub fn is_valid(&self, group: &QueryGroup) -> bool {
        group.conditions.iter().any(|c| c.is_complete(self.registry))
            || group.groups.iter().any(|g| self.is_valid(g))
    }

    /// Validity at the top level, where an empty root means "no filter".
    pub fn is_valid_root(&self, root: &QueryGroup) -> bool {
        root.is_empty() || self.is_valid(root)
    }

    /// Lists validation messages for every condition, depth-first.
    pub fn issues(&self, root: &QueryGroup) -> Vec<ValidationIssue> {
        root.walk_conditions()
            .into_iter()
            .flat_map(|(group_id, condition)| {
                self.condition_issues(condition)
                    .into_iter()
                    .map(move |kind| ValidationIssue {
                        group_id: group_id.to_string(),
                        condition_id: condition.id.clone(),
                        kind,
                    })
            })
            .collect()
    }

    fn condition_issues(&self, condition: &QueryCondition) -> Vec<IssueKind> {
        let mut issues = Vec::new();
        if condition.field.is_empty() {
            issues.push(IssueKind::MissingField);
        }
        let Some(op) = condition.operator else {
            issues.push(IssueKind::MissingOperator);
            return issues;
        };
        if !self.registry.contains(op) {
            issues.push(IssueKind::UnknownOperator { operator: op });
            return issues;
        }
        if let Some(field_type) = self.fields.and_then(|f| f.type_of(&condition.field)) {
            if !self.registry.is_applicable(op, field_type) {
                issues.push(IssueKind::InapplicableOperator {
                    operator: op,
                    field_type,
                });
            }
        }
        if op.is_existence() {
            return issues;
        }
        let value = &condition.value;
        if value.is_empty() {
            issues.push(IssueKind::MissingValue);
            return issues;
        }
        if op.takes_pair() {
            match value.bounds() {
                Some((low, high)) if !low.is_empty() && !high.is_empty() => {}
                _ => issues.push(IssueKind::WrongValueShape {
                    expected: "two bounds",
                }),
            }
        } else if op.takes_list() && value.as_list().is_none() {
            issues.push(IssueKind::WrongValueShape { expected: "a list" });
        } else if op == TreeOperator::Regex {
            if let Err(err) = compile_pattern(&value.to_string()) {
                issues.push(IssueKind::InvalidRegex {
                    message: err.to_string(),
                });
            }
        }
        issues
    }
}
