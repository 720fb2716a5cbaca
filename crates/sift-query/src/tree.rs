//! Condition tree and its structural edits.
//!
//! A [`QueryGroup`] owns its conditions and child groups outright, so the tree
//! is a plain recursive value. Edits never mutate a tree in place: each one
//! takes the current tree by reference and returns the rebuilt tree, with
//! every ancestor of the edited group copied along the way.
//!
//! Edits that need to know about fields and operators (adding a condition
//! for a field, changing a condition's field or operator) go through a
//! [`TreeEditor`], which carries the operator registry and field index.

use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::field::{FieldIndex, FieldType};
use crate::op::{Combinator, TreeOperator};
use crate::registry::OperatorRegistry;
use crate::resolver::DefaultOperatorResolver;
use crate::value::ConditionValue;

/// Generates a fresh node id.
pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A leaf condition: field, operator and value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryCondition {
    #[serde(default = "new_id")]
    pub id: String,
    /// Field name; empty until the user picks one.
    #[serde(default)]
    pub field: String,
    /// Operator; `None` until one is picked. Travels as `""` when unset.
    #[serde(default, with = "crate::op::optional_operator")]
    pub operator: Option<TreeOperator>,
    #[serde(default)]
    pub value: ConditionValue,
}

impl QueryCondition {
    /// Creates an empty condition `{field: "", operator: "", value: ""}`.
    pub fn empty() -> Self {
        QueryCondition {
            id: new_id(),
            field: String::new(),
            operator: None,
            value: ConditionValue::empty(),
        }
    }

    /// Creates a condition with every part filled in.
    pub fn new(
        field: impl Into<String>,
        operator: TreeOperator,
        value: impl Into<ConditionValue>,
    ) -> Self {
        QueryCondition {
            id: new_id(),
            field: field.into(),
            operator: Some(operator),
            value: value.into(),
        }
    }

    /// Returns the operator if this condition is complete.
    ///
    /// A condition is complete when its field is non-empty, its operator is
    /// present in `registry`, and either the operator is `exists` or the
    /// value is non-empty. Incomplete conditions are skipped by every
    /// compiler output.
    pub fn complete_operator(&self, registry: &OperatorRegistry) -> Option<TreeOperator> {
        let op = self.operator?;
        if self.field.is_empty() || !registry.contains(op) {
            return None;
        }
        if op.is_existence() || !self.value.is_empty() {
            Some(op)
        } else {
            None
        }
    }

    /// Returns `true` if this condition is complete (see [`complete_operator`](Self::complete_operator)).
    pub fn is_complete(&self, registry: &OperatorRegistry) -> bool {
        self.complete_operator(registry).is_some()
    }
}

/// A group of conditions and child groups joined by one combinator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryGroup {
    #[serde(default = "new_id")]
    pub id: String,
    #[serde(default)]
    pub combinator: Combinator,
    #[serde(default)]
    pub conditions: Vec<QueryCondition>,
    #[serde(default)]
    pub groups: Vec<QueryGroup>,
}

impl Default for QueryGroup {
    fn default() -> Self {
        QueryGroup::new()
    }
}

impl QueryGroup {
    /// Creates an AND group holding one empty condition.
    ///
    /// This is the shape of a freshly mounted (or cleared) tree and of every
    /// group added through [`add_group`](Self::add_group).
    pub fn new() -> Self {
        QueryGroup {
            id: new_id(),
            combinator: Combinator::And,
            conditions: vec![QueryCondition::empty()],
            groups: Vec::new(),
        }
    }

    /// Creates a group with no conditions and no child groups.
    pub fn empty(combinator: Combinator) -> Self {
        QueryGroup {
            id: new_id(),
            combinator,
            conditions: Vec::new(),
            groups: Vec::new(),
        }
    }

    /// Appends a condition. Builder-style helper for constructing trees.
    pub fn with_condition(mut self, condition: QueryCondition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Appends a child group. Builder-style helper for constructing trees.
    pub fn with_group(mut self, group: QueryGroup) -> Self {
        self.groups.push(group);
        self
    }

    /// Parses a tree from JSON. Missing ids are generated.
    pub fn from_json(json: &str) -> Result<QueryGroup> {
        Ok(serde_json::from_str(json)?)
    }

    /// Returns `true` if the group has neither conditions nor child groups.
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty() && self.groups.is_empty()
    }

    /// Finds a group by id, searching this group and all descendants.
    pub fn find_group(&self, group_id: &str) -> Option<&QueryGroup> {
        if self.id == group_id {
            return Some(self);
        }
        self.groups.iter().find_map(|g| g.find_group(group_id))
    }

    /// Finds a condition by id within the given group.
    pub fn find_condition(&self, group_id: &str, condition_id: &str) -> Option<&QueryCondition> {
        self.find_group(group_id)?
            .conditions
            .iter()
            .find(|c| c.id == condition_id)
    }

    /// Depth-first iterator over every condition, paired with its group id.
    pub fn walk_conditions(&self) -> Vec<(&str, &QueryCondition)> {
        let mut out = Vec::new();
        self.collect_conditions(&mut out);
        out
    }

    fn collect_conditions<'a>(&'a self, out: &mut Vec<(&'a str, &'a QueryCondition)>) {
        for condition in &self.conditions {
            out.push((self.id.as_str(), condition));
        }
        for group in &self.groups {
            group.collect_conditions(out);
        }
    }

    /// Rebuilds the tree with `edit` applied to the group `group_id`.
    ///
    /// Every group on the path from the root to the target is copied; an
    /// unknown id yields an unchanged copy.
    pub fn map_group<F>(&self, group_id: &str, edit: F) -> QueryGroup
    where
        F: FnOnce(&QueryGroup) -> QueryGroup,
    {
        let mut edit = Some(edit);
        let rebuilt = self.map_group_inner(group_id, &mut edit);
        if edit.is_some() {
            tracing::debug!(group = group_id, "edit target group not found");
        }
        rebuilt
    }

    fn map_group_inner<F>(&self, group_id: &str, edit: &mut Option<F>) -> QueryGroup
    where
        F: FnOnce(&QueryGroup) -> QueryGroup,
    {
        if self.id == group_id {
            if let Some(f) = edit.take() {
                return f(self);
            }
        }
        QueryGroup {
            id: self.id.clone(),
            combinator: self.combinator,
            conditions: self.conditions.clone(),
            groups: self
                .groups
                .iter()
                .map(|g| {
                    if edit.is_some() {
                        g.map_group_inner(group_id, edit)
                    } else {
                        g.clone()
                    }
                })
                .collect(),
        }
    }

    // ========================================================================
    // Context-free edits
    // ========================================================================

    /// Removes a condition from a group.
    ///
    /// A group never ends up with zero conditions this way: removing the last
    /// one leaves a single fresh empty condition.
    pub fn remove_condition(&self, group_id: &str, condition_id: &str) -> QueryGroup {
        self.map_group(group_id, |group| {
            let mut group = group.clone();
            group.conditions.retain(|c| c.id != condition_id);
            if group.conditions.is_empty() {
                group.conditions.push(QueryCondition::empty());
            }
            group
        })
    }

    /// Appends a new AND group with one empty condition under `parent_id`.
    pub fn add_group(&self, parent_id: &str) -> QueryGroup {
        self.map_group(parent_id, |parent| {
            let mut parent = parent.clone();
            parent.groups.push(QueryGroup::new());
            parent
        })
    }

    /// Removes the child group `group_id` from `parent_id`.
    pub fn remove_group(&self, parent_id: &str, group_id: &str) -> QueryGroup {
        self.map_group(parent_id, |parent| {
            let mut parent = parent.clone();
            parent.groups.retain(|g| g.id != group_id);
            parent
        })
    }

    /// Flips a group's combinator between AND and OR.
    pub fn toggle_combinator(&self, group_id: &str) -> QueryGroup {
        self.map_group(group_id, |group| {
            let mut group = group.clone();
            group.combinator = group.combinator.toggled();
            group
        })
    }
}

/// Partial update of a condition. `None` fields are left untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ConditionPatch {
    pub field: Option<String>,
    /// `Some(None)` clears the operator.
    pub operator: Option<Option<TreeOperator>>,
    pub value: Option<ConditionValue>,
}

impl ConditionPatch {
    pub fn field(name: impl Into<String>) -> Self {
        ConditionPatch {
            field: Some(name.into()),
            ..Default::default()
        }
    }

    pub fn operator(op: TreeOperator) -> Self {
        ConditionPatch {
            operator: Some(Some(op)),
            ..Default::default()
        }
    }

    pub fn value(value: impl Into<ConditionValue>) -> Self {
        ConditionPatch {
            value: Some(value.into()),
            ..Default::default()
        }
    }
}

/// Applies structural edits that depend on the field catalog and registry.
#[derive(Debug, Clone, Copy)]
pub struct TreeEditor<'a> {
    registry: &'a OperatorRegistry,
    fields: &'a FieldIndex,
}

impl<'a> TreeEditor<'a> {
    pub fn new(registry: &'a OperatorRegistry, fields: &'a FieldIndex) -> Self {
        TreeEditor { registry, fields }
    }

    /// Type of a field, treating names missing from the catalog as strings.
    fn field_type(&self, name: &str) -> FieldType {
        self.fields.type_of(name).unwrap_or_default()
    }

    /// Whether `op` may be chosen for `field`. Any registered operator may be
    /// chosen before a field is.
    fn accepts(&self, field: &str, op: TreeOperator) -> bool {
        if field.is_empty() {
            return self.registry.contains(op);
        }
        self.registry.is_applicable(op, self.field_type(field))
    }

    /// Builds the condition a user gets after selecting `field`.
    fn condition_for_field(&self, mut condition: QueryCondition, field: String) -> QueryCondition {
        let ty = self.field_type(&field);
        let operator = DefaultOperatorResolver::new(self.registry).resolve(&field, ty);
        condition.field = field;
        condition.operator = operator;
        condition.value = match operator {
            Some(op) => ConditionValue::empty().coerce_for(op),
            None => ConditionValue::empty(),
        };
        condition
    }

    /// Appends a condition to a group.
    ///
    /// With a field, the default operator for that field is applied at once.
    pub fn add_condition(&self, tree: &QueryGroup, group_id: &str, field: Option<&str>) -> QueryGroup {
        let condition = match field {
            Some(name) => self.condition_for_field(QueryCondition::empty(), name.to_string()),
            None => QueryCondition::empty(),
        };
        tree.map_group(group_id, |group| {
            let mut group = group.clone();
            group.conditions.push(condition);
            group
        })
    }

    /// Removes a condition, keeping at least one condition in the group.
    pub fn remove_condition(&self, tree: &QueryGroup, group_id: &str, condition_id: &str) -> QueryGroup {
        tree.remove_condition(group_id, condition_id)
    }

    /// Applies a patch to one condition.
    ///
    /// Selecting a new field re-runs the default-operator resolver for the
    /// field's type and resets the value; clearing the field clears the
    /// operator and value too. An operator in the patch is applied after
    /// that, unless it does not apply to the field's type, in which case the
    /// current operator is kept. The value is reshaped to fit the operator
    /// (see [`ConditionValue::coerce_for`]). A value in the patch is applied
    /// last, as given.
    pub fn update_condition(
        &self,
        tree: &QueryGroup,
        group_id: &str,
        condition_id: &str,
        patch: ConditionPatch,
    ) -> QueryGroup {
        tree.map_group(group_id, |group| {
            let mut group = group.clone();
            if let Some(condition) = group.conditions.iter_mut().find(|c| c.id == condition_id) {
                *condition = self.patched(condition.clone(), patch);
            }
            group
        })
    }

    fn patched(&self, mut condition: QueryCondition, patch: ConditionPatch) -> QueryCondition {
        if let Some(field) = patch.field {
            if field.is_empty() {
                condition.field.clear();
                condition.operator = None;
                condition.value = ConditionValue::empty();
            } else if field != condition.field {
                condition = self.condition_for_field(condition, field);
            }
        }
        match patch.operator {
            Some(Some(op)) if !self.accepts(&condition.field, op) => {
                tracing::debug!(field = %condition.field, %op, "ignoring operator not applicable to field type");
            }
            Some(operator) => {
                condition.operator = operator;
                if let Some(op) = operator {
                    condition.value = condition.value.coerce_for(op);
                }
            }
            None => {}
        }
        if let Some(value) = patch.value {
            condition.value = value;
        }
        condition
    }

    /// Appends a new child group.
    pub fn add_group(&self, tree: &QueryGroup, parent_id: &str) -> QueryGroup {
        tree.add_group(parent_id)
    }

    /// Removes a child group.
    pub fn remove_group(&self, tree: &QueryGroup, parent_id: &str, group_id: &str) -> QueryGroup {
        tree.remove_group(parent_id, group_id)
    }

    /// Flips a group's combinator.
    pub fn toggle_combinator(&self, tree: &QueryGroup, group_id: &str) -> QueryGroup {
        tree.toggle_combinator(group_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldMetadata;

    fn catalog() -> FieldIndex {
        FieldIndex::from_fields([
            FieldMetadata::new("title", FieldType::String),
            FieldMetadata::new("summary", FieldType::String),
            FieldMetadata::new("pmid", FieldType::String),
            FieldMetadata::new("year", FieldType::Number),
            FieldMetadata::new("created_at", FieldType::Date),
            FieldMetadata::new("metadata.extra", FieldType::Object),
        ])
    }

    #[test]
    fn new_tree_has_one_empty_condition() {
        let tree = QueryGroup::new();
        assert_eq!(tree.conditions.len(), 1);
        assert!(tree.conditions[0].field.is_empty());
        assert!(tree.conditions[0].operator.is_none());
        assert!(tree.conditions[0].value.is_empty());
        assert!(tree.groups.is_empty());
    }

    #[test]
    fn add_condition_with_field_applies_resolver() {
        let registry = OperatorRegistry::standard();
        let fields = catalog();
        let editor = TreeEditor::new(&registry, &fields);
        let tree = QueryGroup::new();

        let tree = editor.add_condition(&tree, &tree.id.clone(), Some("summary"));
        let added = tree.conditions.last().unwrap();
        assert_eq!(added.field, "summary");
        assert_eq!(added.operator, Some(TreeOperator::Contains));

        let tree = editor.add_condition(&tree, &tree.id.clone(), Some("created_at"));
        assert_eq!(tree.conditions.last().unwrap().operator, Some(TreeOperator::Gte));
    }

    #[test]
    fn add_condition_without_field_is_empty() {
        let registry = OperatorRegistry::standard();
        let fields = catalog();
        let editor = TreeEditor::new(&registry, &fields);
        let tree = QueryGroup::new();
        let tree = editor.add_condition(&tree, &tree.id.clone(), None);
        assert_eq!(tree.conditions.len(), 2);
        assert!(tree.conditions[1].field.is_empty());
    }

    #[test]
    fn removing_last_condition_leaves_fresh_empty_one() {
        let tree = QueryGroup::empty(Combinator::And)
            .with_condition(QueryCondition::new("title", TreeOperator::Eq, "x"));
        let only = tree.conditions[0].id.clone();

        let edited = tree.remove_condition(&tree.id, &only);
        assert_eq!(edited.conditions.len(), 1);
        assert_ne!(edited.conditions[0].id, only);
        assert!(edited.conditions[0].field.is_empty());
        // The original tree is untouched.
        assert_eq!(tree.conditions[0].field, "title");
    }

    #[test]
    fn edits_reach_nested_groups() {
        let inner = QueryGroup::new();
        let inner_id = inner.id.clone();
        let tree = QueryGroup::new().with_group(QueryGroup::new().with_group(inner));

        let toggled = tree.toggle_combinator(&inner_id);
        assert_eq!(toggled.find_group(&inner_id).unwrap().combinator, Combinator::Or);
        assert_eq!(toggled.combinator, Combinator::And);
        assert_eq!(tree.find_group(&inner_id).unwrap().combinator, Combinator::And);

        let with_child = toggled.add_group(&inner_id);
        assert_eq!(with_child.find_group(&inner_id).unwrap().groups.len(), 1);
    }

    #[test]
    fn remove_group_only_affects_named_parent() {
        let child = QueryGroup::new();
        let child_id = child.id.clone();
        let tree = QueryGroup::new().with_group(child);

        let edited = tree.remove_group(&tree.id, &child_id);
        assert!(edited.groups.is_empty());

        let unchanged = tree.remove_group("no-such-parent", &child_id);
        assert_eq!(unchanged, tree);
    }

    #[test]
    fn selecting_field_resets_operator_and_value() {
        let registry = OperatorRegistry::standard();
        let fields = catalog();
        let editor = TreeEditor::new(&registry, &fields);

        let tree = QueryGroup::empty(Combinator::And)
            .with_condition(QueryCondition::new("title", TreeOperator::StartsWith, "abc"));
        let gid = tree.id.clone();
        let cid = tree.conditions[0].id.clone();

        let tree = editor.update_condition(&tree, &gid, &cid, ConditionPatch::field("year"));
        let c = tree.find_condition(&gid, &cid).unwrap();
        assert_eq!(c.field, "year");
        assert_eq!(c.operator, Some(TreeOperator::Eq));
        assert!(c.value.is_empty());

        let tree = editor.update_condition(&tree, &gid, &cid, ConditionPatch::field("metadata.extra"));
        let c = tree.find_condition(&gid, &cid).unwrap();
        assert_eq!(c.operator, Some(TreeOperator::Exists));
        assert_eq!(c.value, ConditionValue::Bool(true));
    }

    #[test]
    fn same_field_patch_keeps_operator() {
        let registry = OperatorRegistry::standard();
        let fields = catalog();
        let editor = TreeEditor::new(&registry, &fields);

        let tree = QueryGroup::empty(Combinator::And)
            .with_condition(QueryCondition::new("title", TreeOperator::StartsWith, "abc"));
        let gid = tree.id.clone();
        let cid = tree.conditions[0].id.clone();

        let tree = editor.update_condition(&tree, &gid, &cid, ConditionPatch::field("title"));
        let c = tree.find_condition(&gid, &cid).unwrap();
        assert_eq!(c.operator, Some(TreeOperator::StartsWith));
        assert_eq!(c.value, ConditionValue::from("abc"));
    }

    #[test]
    fn operator_patch_reshapes_value() {
        let registry = OperatorRegistry::standard();
        let fields = catalog();
        let editor = TreeEditor::new(&registry, &fields);

        let tree = QueryGroup::empty(Combinator::And)
            .with_condition(QueryCondition::new("year", TreeOperator::Eq, 2020i64));
        let gid = tree.id.clone();
        let cid = tree.conditions[0].id.clone();

        let tree = editor.update_condition(&tree, &gid, &cid, ConditionPatch::operator(TreeOperator::Between));
        let c = tree.find_condition(&gid, &cid).unwrap();
        assert_eq!(c.value, ConditionValue::List(vec![2020i64.into(), ConditionValue::empty()]));

        let tree = editor.update_condition(
            &tree,
            &gid,
            &cid,
            ConditionPatch::value(vec![2020i64, 2024]),
        );
        let c = tree.find_condition(&gid, &cid).unwrap();
        assert_eq!(c.value.bounds().map(|(_, hi)| hi.to_string()), Some("2024".to_string()));
    }

    #[test]
    fn inapplicable_operator_patch_is_ignored() {
        let registry = OperatorRegistry::standard();
        let fields = catalog();
        let editor = TreeEditor::new(&registry, &fields);

        let tree = QueryGroup::empty(Combinator::And)
            .with_condition(QueryCondition::new("year", TreeOperator::Eq, 2020i64));
        let gid = tree.id.clone();
        let cid = tree.conditions[0].id.clone();

        let edited = editor.update_condition(&tree, &gid, &cid, ConditionPatch::operator(TreeOperator::Regex));
        let c = edited.find_condition(&gid, &cid).unwrap();
        assert_eq!(c.operator, Some(TreeOperator::Eq));
        assert_eq!(c.value, ConditionValue::from(2020i64));
        assert_eq!(edited, tree);

        // Switching field and operator together checks against the new type.
        let patch = ConditionPatch {
            field: Some("title".into()),
            operator: Some(Some(TreeOperator::Regex)),
            value: Some("^brca".into()),
        };
        let edited = editor.update_condition(&tree, &gid, &cid, patch);
        let c = edited.find_condition(&gid, &cid).unwrap();
        assert_eq!(c.operator, Some(TreeOperator::Regex));
        assert_eq!(c.value, ConditionValue::from("^brca"));
    }

    #[test]
    fn operator_may_be_picked_before_field() {
        let registry = OperatorRegistry::standard();
        let fields = catalog();
        let editor = TreeEditor::new(&registry, &fields);

        let tree = QueryGroup::new();
        let gid = tree.id.clone();
        let cid = tree.conditions[0].id.clone();
        let tree = editor.update_condition(&tree, &gid, &cid, ConditionPatch::operator(TreeOperator::Gt));
        assert_eq!(tree.conditions[0].operator, Some(TreeOperator::Gt));

        // Picking a field afterwards resolves the field's own default.
        let tree = editor.update_condition(&tree, &gid, &cid, ConditionPatch::field("summary"));
        assert_eq!(tree.conditions[0].operator, Some(TreeOperator::Contains));
    }

    #[test]
    fn clearing_field_clears_operator_and_value() {
        let registry = OperatorRegistry::standard();
        let fields = catalog();
        let editor = TreeEditor::new(&registry, &fields);

        let tree = QueryGroup::empty(Combinator::And)
            .with_condition(QueryCondition::new("year", TreeOperator::Gte, 2020i64));
        let gid = tree.id.clone();
        let cid = tree.conditions[0].id.clone();

        let tree = editor.update_condition(&tree, &gid, &cid, ConditionPatch::field(""));
        let c = tree.find_condition(&gid, &cid).unwrap();
        assert!(c.field.is_empty());
        assert_eq!(c.operator, None);
        assert!(c.value.is_empty());
    }

    #[test]
    fn tree_json_round_trip_keeps_empty_operator_as_empty_string() {
        let tree = QueryGroup::new();
        let json = serde_json::to_value(&tree).unwrap();
        assert_eq!(json["conditions"][0]["operator"], "");
        assert_eq!(json["combinator"], "AND");
        let back: QueryGroup = serde_json::from_value(json).unwrap();
        assert_eq!(back, tree);
    }

    #[test]
    fn hand_written_tree_gets_ids() {
        let json = r#"{
            "combinator": "OR",
            "conditions": [{"field": "title", "operator": "contains", "value": "cancer"}]
        }"#;
        let tree: QueryGroup = serde_json::from_str(json).unwrap();
        assert!(!tree.id.is_empty());
        assert!(!tree.conditions[0].id.is_empty());
        assert_eq!(tree.combinator, Combinator::Or);
    }

    #[test]
    fn walk_conditions_is_depth_first() {
        let tree = QueryGroup::empty(Combinator::And)
            .with_condition(QueryCondition::new("a", TreeOperator::Eq, "1"))
            .with_group(
                QueryGroup::empty(Combinator::Or)
                    .with_condition(QueryCondition::new("b", TreeOperator::Eq, "2")),
            )
            .with_condition(QueryCondition::new("c", TreeOperator::Eq, "3"));
        let fields: Vec<_> = tree.walk_conditions().into_iter().map(|(_, c)| c.field.as_str()).collect();
        assert_eq!(fields, vec!["a", "c", "b"]);
    }
}
