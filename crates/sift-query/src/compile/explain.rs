//! Human-readable explanation of a condition tree.

use crate::field::FieldIndex;
use crate::op::TreeOperator;
use crate::registry::OperatorRegistry;
use crate::tree::{QueryCondition, QueryGroup};
use crate::value::ConditionValue;

/// Text shown when no condition is complete.
pub const NO_CONDITIONS: &str = "no conditions specified";

pub(crate) struct Explainer<'a> {
    pub registry: &'a OperatorRegistry,
    pub fields: Option<&'a FieldIndex>,
}

impl Explainer<'_> {
    pub fn explain(&self, root: &QueryGroup) -> String {
        let items = self.group_items(root);
        if items.is_empty() {
            NO_CONDITIONS.to_string()
        } else {
            items.join(&format!(" {} ", root.combinator.connective()))
        }
    }

    /// Rendered items a group contributes: its complete conditions, then its
    /// non-empty subgroups (parenthesized when they join several items).
    fn group_items(&self, group: &QueryGroup) -> Vec<String> {
        let mut items: Vec<String> = group
            .conditions
            .iter()
            .filter_map(|c| self.condition(c))
            .collect();
        for child in &group.groups {
            let child_items = self.group_items(child);
            match child_items.len() {
                0 => {}
                1 => items.extend(child_items),
                _ => items.push(format!(
                    "({})",
                    child_items.join(&format!(" {} ", child.combinator.connective()))
                )),
            }
        }
        items
    }

    fn condition(&self, condition: &QueryCondition) -> Option<String> {
        let op = condition.complete_operator(self.registry)?;
        let label = match self.fields {
            Some(fields) => fields.label_for(&condition.field),
            None => condition.field.as_str(),
        };
        if op == TreeOperator::Exists {
            let verb = if condition.value.existence_flag() {
                "exists"
            } else {
                "does not exist"
            };
            return Some(format!("{label} {verb}"));
        }
        let op_label = self
            .registry
            .label(op)
            .unwrap_or(op.as_str())
            .to_lowercase();
        Some(format!("{label} {op_label} {}", render_value(op, &condition.value)))
    }
}

fn render_value(op: TreeOperator, value: &ConditionValue) -> String {
    if op.takes_pair() {
        if let Some((low, high)) = value.bounds() {
            return format!("{low} and {high}");
        }
    }
    value.to_string()
}
