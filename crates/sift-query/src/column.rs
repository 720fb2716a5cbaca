//! Per-column multi-condition filters for the results table.
//!
//! Each filtered column owns one [`ColumnFilterModel`]: an ordered list of
//! conditions joined by a single AND/OR across the whole list. Models are
//! created lazily by [`ColumnFilters::open`] and compile to the same
//! `{id, value: {conditions, joinOperator}}` entries the tree compiler emits
//! for core fields.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::op::{ColumnOperator, Combinator};
use crate::value::ConditionValue;

/// Data kind of a results-table column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ColumnKind {
    #[default]
    Text,
    Number,
    Date,
    Set,
}

impl ColumnKind {
    /// Maps a column descriptor's type name onto a column kind.
    ///
    /// Unrecognized names are treated as text.
    pub fn from_type_name(name: &str) -> ColumnKind {
        match name.to_ascii_lowercase().as_str() {
            "number" | "numeric" | "integer" | "float" => ColumnKind::Number,
            "date" | "datetime" | "timestamp" => ColumnKind::Date,
            "set" | "array" | "list" => ColumnKind::Set,
            _ => ColumnKind::Text,
        }
    }

    /// Column operators offered for this kind, in menu order.
    pub fn operators(self) -> &'static [ColumnOperator] {
        use ColumnOperator::*;
        match self {
            ColumnKind::Text => &[
                Contains,
                NotContains,
                Equals,
                NotEqual,
                StartsWith,
                EndsWith,
                Blank,
                NotBlank,
            ],
            ColumnKind::Number => &[
                Equals,
                NotEqual,
                GreaterThan,
                GreaterThanOrEqual,
                LessThan,
                LessThanOrEqual,
                InRange,
                Blank,
                NotBlank,
            ],
            ColumnKind::Date => &[Equals, NotEqual, Before, After, Between, Blank, NotBlank],
            ColumnKind::Set => &[Contains, NotContains, Equals, Blank, NotBlank],
        }
    }

    /// Operator a new condition starts with.
    pub fn default_operator(self) -> ColumnOperator {
        self.operators()[0]
    }
}

/// One condition of a column filter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilterCondition {
    pub operator: ColumnOperator,
    #[serde(default)]
    pub value: ConditionValue,
}

impl ColumnFilterCondition {
    pub fn new(operator: ColumnOperator, value: impl Into<ConditionValue>) -> Self {
        ColumnFilterCondition {
            operator,
            value: value.into(),
        }
    }

    /// Condition with the given operator and no value.
    pub fn empty(operator: ColumnOperator) -> Self {
        ColumnFilterCondition::new(operator, ConditionValue::empty())
    }

    /// A condition takes effect once it has a value, or when its operator
    /// needs none.
    pub fn is_active(&self) -> bool {
        self.operator.is_no_value() || !self.value.is_empty()
    }
}

/// Conditions of one column plus the connective joining them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilterValue {
    pub conditions: Vec<ColumnFilterCondition>,
    #[serde(rename = "joinOperator", default)]
    pub join_operator: Combinator,
}

/// Column-keyed filter entry as sent to the search backend.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnFilterEntry {
    /// Column (field) name.
    pub id: String,
    pub value: ColumnFilterValue,
}

/// One-click replacements for a column's filter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnPreset {
    /// Cell is blank.
    Empty,
    /// Cell is not blank.
    NotEmpty,
}

impl ColumnPreset {
    pub fn operator(self) -> ColumnOperator {
        match self {
            ColumnPreset::Empty => ColumnOperator::Blank,
            ColumnPreset::NotEmpty => ColumnOperator::NotBlank,
        }
    }
}

/// Partial update of a column-filter condition.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnConditionPatch {
    pub operator: Option<ColumnOperator>,
    pub value: Option<ConditionValue>,
}

impl ColumnConditionPatch {
    pub fn operator(op: ColumnOperator) -> Self {
        ColumnConditionPatch {
            operator: Some(op),
            value: None,
        }
    }

    pub fn value(value: impl Into<ConditionValue>) -> Self {
        ColumnConditionPatch {
            operator: None,
            value: Some(value.into()),
        }
    }
}

/// Filter state of one column.
#[derive(Debug, Clone, PartialEq)]
pub struct ColumnFilterModel {
    column: String,
    kind: ColumnKind,
    conditions: Vec<ColumnFilterCondition>,
    join_operator: Combinator,
}

impl ColumnFilterModel {
    /// Creates a model holding one empty condition.
    pub fn new(column: impl Into<String>, kind: ColumnKind) -> Self {
        ColumnFilterModel {
            column: column.into(),
            kind,
            conditions: vec![ColumnFilterCondition::empty(kind.default_operator())],
            join_operator: Combinator::And,
        }
    }

    pub fn column(&self) -> &str {
        &self.column
    }

    pub fn kind(&self) -> ColumnKind {
        self.kind
    }

    pub fn conditions(&self) -> &[ColumnFilterCondition] {
        &self.conditions
    }

    pub fn join_operator(&self) -> Combinator {
        self.join_operator
    }

    /// Patches the condition at `index`. Out-of-range indices are ignored.
    ///
    /// An operator change reshapes the current value to fit the new operator.
    /// Operators the column kind does not offer are ignored.
    pub fn update_condition(&mut self, index: usize, patch: ColumnConditionPatch) {
        let Some(condition) = self.conditions.get_mut(index) else {
            tracing::debug!(column = %self.column, index, "column condition index out of range");
            return;
        };
        match patch.operator {
            Some(op) if !self.kind.operators().contains(&op) => {
                tracing::debug!(
                    column = %self.column,
                    kind = ?self.kind,
                    operator = ?op,
                    "ignoring operator not offered for column kind"
                );
            }
            Some(op) => {
                condition.operator = op;
                condition.value = std::mem::take(&mut condition.value).coerce_for_column(op);
            }
            None => {}
        }
        if let Some(value) = patch.value {
            condition.value = value;
        }
    }

    /// Appends an empty condition with the column's default operator.
    pub fn add_condition(&mut self) {
        self.conditions
            .push(ColumnFilterCondition::empty(self.kind.default_operator()));
    }

    /// Removes the condition at `index`, unless it is the only one left.
    pub fn remove_condition(&mut self, index: usize) {
        if self.conditions.len() > 1 && index < self.conditions.len() {
            self.conditions.remove(index);
        }
    }

    /// Replaces every condition with the preset's single condition.
    pub fn apply_preset(&mut self, preset: ColumnPreset) {
        self.conditions = vec![ColumnFilterCondition::empty(preset.operator())];
        self.join_operator = Combinator::And;
    }

    pub fn toggle_join_operator(&mut self) {
        self.join_operator = self.join_operator.toggled();
    }

    /// Resets to a single empty condition joined by AND.
    pub fn clear(&mut self) {
        *self = ColumnFilterModel::new(std::mem::take(&mut self.column), self.kind);
    }

    /// Returns `true` if any condition is active.
    pub fn is_active(&self) -> bool {
        self.conditions.iter().any(ColumnFilterCondition::is_active)
    }

    /// Compiles the active conditions into a backend entry.
    ///
    /// Returns `None` when nothing is active, so the column is left out of
    /// the outgoing request.
    pub fn compile(&self) -> Option<ColumnFilterEntry> {
        let conditions: Vec<_> = self
            .conditions
            .iter()
            .filter(|c| c.is_active())
            .cloned()
            .collect();
        if conditions.is_empty() {
            return None;
        }
        Some(ColumnFilterEntry {
            id: self.column.clone(),
            value: ColumnFilterValue {
                conditions,
                join_operator: self.join_operator,
            },
        })
    }
}

/// Every column filter the user has opened, in the order they were opened.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ColumnFilters {
    models: IndexMap<String, ColumnFilterModel>,
}

impl ColumnFilters {
    pub fn new() -> Self {
        ColumnFilters::default()
    }

    /// Returns the column's model, creating it on first use.
    pub fn open(&mut self, column: &str, kind: ColumnKind) -> &mut ColumnFilterModel {
        self.models
            .entry(column.to_string())
            .or_insert_with(|| ColumnFilterModel::new(column, kind))
    }

    pub fn get(&self, column: &str) -> Option<&ColumnFilterModel> {
        self.models.get(column)
    }

    pub fn get_mut(&mut self, column: &str) -> Option<&mut ColumnFilterModel> {
        self.models.get_mut(column)
    }

    /// Drops a column's model; reopening starts from a fresh one.
    pub fn remove(&mut self, column: &str) -> Option<ColumnFilterModel> {
        self.models.shift_remove(column)
    }

    /// Clears every model.
    pub fn clear_all(&mut self) {
        for model in self.models.values_mut() {
            model.clear();
        }
    }

    /// Compiles every active model, in open order.
    pub fn compile(&self) -> Vec<ColumnFilterEntry> {
        self.models
            .values()
            .filter_map(ColumnFilterModel::compile)
            .collect()
    }

    /// Restores models from previously compiled entries.
    pub fn from_entries(entries: impl IntoIterator<Item = (ColumnFilterEntry, ColumnKind)>) -> Self {
        let mut filters = ColumnFilters::new();
        for (entry, kind) in entries {
            let model = filters.open(&entry.id, kind);
            model.conditions = entry.value.conditions;
            model.join_operator = entry.value.join_operator;
            if model.conditions.is_empty() {
                model.add_condition();
            }
        }
        filters
    }

    pub fn len(&self) -> usize {
        self.models.len()
    }

    pub fn is_empty(&self) -> bool {
        self.models.is_empty()
    }
}
