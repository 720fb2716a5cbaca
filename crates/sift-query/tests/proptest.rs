//! Property-based tests for condition trees using proptest.

use proptest::prelude::*;
use sift_query::{
    new_id, Combinator, ConditionPatch, ConditionValue, FieldIndex, FieldMetadata, FieldType,
    OperatorRegistry, QueryCondition, QueryGroup, TreeCompiler, TreeEditor, TreeOperator,
    TreeValidator, NO_CONDITIONS,
};

// ============================================================================
// Strategies
// ============================================================================

fn field_strategy() -> impl Strategy<Value = String> {
    prop::sample::select(vec!["", "title", "year", "pmid", "metadata.phase", "metadata.site"])
        .prop_map(String::from)
}

fn operator_strategy() -> impl Strategy<Value = Option<TreeOperator>> {
    prop::option::of(prop::sample::select(TreeOperator::ALL.to_vec()))
}

fn value_strategy() -> impl Strategy<Value = ConditionValue> {
    prop_oneof![
        Just(ConditionValue::empty()),
        "[a-z]{1,5}".prop_map(ConditionValue::from),
        any::<i64>().prop_map(ConditionValue::from),
        any::<bool>().prop_map(ConditionValue::from),
        prop::collection::vec("[a-z]{0,3}", 0..3).prop_map(ConditionValue::from),
    ]
}

fn condition_strategy() -> impl Strategy<Value = QueryCondition> {
    (field_strategy(), operator_strategy(), value_strategy()).prop_map(|(field, operator, value)| {
        QueryCondition {
            id: new_id(),
            field,
            operator,
            value,
        }
    })
}

fn combinator_strategy() -> impl Strategy<Value = Combinator> {
    prop_oneof![Just(Combinator::And), Just(Combinator::Or)]
}

fn tree_strategy() -> impl Strategy<Value = QueryGroup> {
    let leaf = (
        combinator_strategy(),
        prop::collection::vec(condition_strategy(), 0..4),
    )
        .prop_map(|(combinator, conditions)| QueryGroup {
            id: new_id(),
            combinator,
            conditions,
            groups: Vec::new(),
        });

    leaf.prop_recursive(3, 24, 3, |inner| {
        (
            combinator_strategy(),
            prop::collection::vec(condition_strategy(), 0..4),
            prop::collection::vec(inner, 0..3),
        )
            .prop_map(|(combinator, conditions, groups)| QueryGroup {
                id: new_id(),
                combinator,
                conditions,
                groups,
            })
    })
}

fn patch_strategy() -> impl Strategy<Value = ConditionPatch> {
    prop_oneof![
        field_strategy().prop_map(ConditionPatch::field),
        prop::sample::select(TreeOperator::ALL.to_vec()).prop_map(ConditionPatch::operator),
        value_strategy().prop_map(ConditionPatch::value),
        (field_strategy(), operator_strategy()).prop_map(|(field, operator)| ConditionPatch {
            field: Some(field),
            operator: Some(operator),
            value: None,
        }),
    ]
}

// ============================================================================
// Helpers
// ============================================================================

fn catalog() -> FieldIndex {
    FieldIndex::from_fields([
        FieldMetadata::new("title", FieldType::String),
        FieldMetadata::new("year", FieldType::Number),
        FieldMetadata::new("pmid", FieldType::String),
        FieldMetadata::new("metadata.phase", FieldType::String),
        FieldMetadata::new("metadata.site", FieldType::Object),
    ])
}

fn group_ids(group: &QueryGroup, out: &mut Vec<String>) {
    out.push(group.id.clone());
    for child in &group.groups {
        group_ids(child, out);
    }
}

fn complete_leaves(tree: &QueryGroup, registry: &OperatorRegistry) -> Vec<QueryCondition> {
    tree.walk_conditions()
        .into_iter()
        .map(|(_, c)| c.clone())
        .filter(|c| c.is_complete(registry))
        .collect()
}

// ============================================================================
// Property tests
// ============================================================================

proptest! {
    /// A tree is valid exactly when some leaf at any depth is complete.
    #[test]
    fn validity_iff_some_leaf_complete(tree in tree_strategy()) {
        let registry = OperatorRegistry::standard();
        let validator = TreeValidator::new(&registry);
        let has_complete = !complete_leaves(&tree, &registry).is_empty();
        prop_assert_eq!(validator.is_valid(&tree), has_complete);
    }

    /// Compilers agree with the validator on whether there is anything to say.
    #[test]
    fn outputs_are_empty_iff_invalid(tree in tree_strategy()) {
        let registry = OperatorRegistry::standard();
        let compiler = TreeCompiler::new(&registry);
        let valid = TreeValidator::new(&registry).is_valid(&tree);

        prop_assert_eq!(compiler.predicate(&tree).is_empty(), !valid);
        prop_assert_eq!(compiler.explain(&tree) == NO_CONDITIONS, !valid);
        prop_assert_eq!(compiler.payload(&tree).is_empty(), !valid);
    }

    /// Removing any condition leaves its group with at least one condition.
    #[test]
    fn group_never_left_without_conditions(tree in tree_strategy()) {
        let mut ids = Vec::new();
        group_ids(&tree, &mut ids);
        for group_id in ids {
            let Some(group) = tree.find_group(&group_id) else { continue };
            for condition in &group.conditions {
                let edited = tree.remove_condition(&group_id, &condition.id);
                let edited_group = edited.find_group(&group_id).unwrap();
                prop_assert!(!edited_group.conditions.is_empty());
                prop_assert_eq!(
                    edited_group.conditions.len(),
                    group.conditions.len().saturating_sub(1).max(1)
                );
            }
        }
    }

    /// Compiling the same tree twice yields byte-identical output.
    #[test]
    fn compilation_is_deterministic(tree in tree_strategy()) {
        let registry = OperatorRegistry::standard();
        let compiler = TreeCompiler::new(&registry);
        let first = serde_json::to_string(&compiler.compile_all(&tree)).unwrap();
        let second = serde_json::to_string(&compiler.compile_all(&tree.clone())).unwrap();
        prop_assert_eq!(first, second);
    }

    /// Every complete core-field leaf becomes exactly one column entry, and
    /// combinators play no part in the payload.
    #[test]
    fn payload_is_flat_and_combinator_blind(tree in tree_strategy()) {
        let registry = OperatorRegistry::standard();
        let compiler = TreeCompiler::new(&registry);
        let payload = compiler.payload(&tree);

        let core_leaves = complete_leaves(&tree, &registry)
            .into_iter()
            .filter(|c| !c.field.starts_with("metadata."))
            .count();
        prop_assert_eq!(payload.column_filters.len(), core_leaves);
        prop_assert!(payload.metadata.len() <= 2);

        let toggled = tree.toggle_combinator(&tree.id);
        prop_assert_eq!(compiler.payload(&toggled), payload);
    }

    /// Edits never touch the tree they were applied to.
    #[test]
    fn edits_are_pure(tree in tree_strategy()) {
        let before = tree.clone();
        let _ = tree.add_group(&tree.id);
        let _ = tree.toggle_combinator(&tree.id);
        if let Some(c) = tree.conditions.first() {
            let _ = tree.remove_condition(&tree.id, &c.id);
        }
        prop_assert_eq!(tree, before);
    }

    /// Editing through the editor never leaves an operator that does not
    /// apply to the condition's field.
    #[test]
    fn edited_operators_apply_to_field_type(
        patches in prop::collection::vec(patch_strategy(), 1..12)
    ) {
        let registry = OperatorRegistry::standard();
        let fields = catalog();
        let editor = TreeEditor::new(&registry, &fields);

        let mut tree = QueryGroup::new();
        let group_id = tree.id.clone();
        let condition_id = tree.conditions[0].id.clone();
        for patch in patches {
            tree = editor.update_condition(&tree, &group_id, &condition_id, patch);
            let condition = tree.find_condition(&group_id, &condition_id).unwrap();
            if condition.field.is_empty() {
                continue;
            }
            if let Some(op) = condition.operator {
                let ty = fields.type_of(&condition.field).unwrap_or_default();
                prop_assert!(registry.is_applicable(op, ty), "{} on {}", op, condition.field);
            }
        }
    }
}
