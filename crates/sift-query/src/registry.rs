//! Operator registry: which tree operators apply to which field types.

use serde::Serialize;

use crate::field::FieldType;
use crate::op::TreeOperator;

/// One registry entry.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperatorDescriptor {
    /// Operator id.
    pub id: TreeOperator,
    /// Human-readable label, e.g. "Greater than".
    pub label: String,
    /// Field types this operator may be used with.
    pub applicable_types: Vec<FieldType>,
}

impl OperatorDescriptor {
    /// Creates a descriptor.
    pub fn new(id: TreeOperator, label: impl Into<String>, types: &[FieldType]) -> Self {
        OperatorDescriptor {
            id,
            label: label.into(),
            applicable_types: types.to_vec(),
        }
    }

    /// Returns `true` if the operator may be used on fields of `ty`.
    pub fn applies_to(&self, ty: FieldType) -> bool {
        self.applicable_types.contains(&ty)
    }
}

/// Immutable table of operator descriptors.
///
/// The registry is passed explicitly to the resolver, validator and compiler
/// so tests can substitute a reduced table. [`OperatorRegistry::standard`]
/// is the table used in production.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OperatorRegistry {
    entries: Vec<OperatorDescriptor>,
}

impl OperatorRegistry {
    /// Creates a registry from explicit entries, kept in the given order.
    pub fn new(entries: Vec<OperatorDescriptor>) -> Self {
        OperatorRegistry { entries }
    }

    /// The standard operator table.
    pub fn standard() -> Self {
        use FieldType::*;
        use TreeOperator as Op;

        OperatorRegistry::new(vec![
            OperatorDescriptor::new(Op::Eq, "Equals", &[String, Number, Date, Boolean]),
            OperatorDescriptor::new(Op::Ne, "Not equals", &[String, Number, Date, Boolean]),
            OperatorDescriptor::new(Op::Contains, "Contains", &[String, Array]),
            OperatorDescriptor::new(Op::StartsWith, "Starts with", &[String]),
            OperatorDescriptor::new(Op::EndsWith, "Ends with", &[String]),
            OperatorDescriptor::new(Op::Regex, "Matches regex", &[String]),
            OperatorDescriptor::new(Op::Gt, "Greater than", &[Number, Date]),
            OperatorDescriptor::new(Op::Gte, "Greater than or equal", &[Number, Date]),
            OperatorDescriptor::new(Op::Lt, "Less than", &[Number, Date]),
            OperatorDescriptor::new(Op::Lte, "Less than or equal", &[Number, Date]),
            OperatorDescriptor::new(Op::In, "In", &[String, Number, Array]),
            OperatorDescriptor::new(Op::Nin, "Not in", &[String, Number, Array]),
            OperatorDescriptor::new(Op::All, "Contains all", &[Array]),
            OperatorDescriptor::new(
                Op::Exists,
                "Exists",
                &[String, Number, Date, Boolean, Array, Object],
            ),
            OperatorDescriptor::new(Op::Between, "Between", &[Number, Date]),
        ])
    }

    /// Looks up the descriptor for an operator.
    pub fn get(&self, op: TreeOperator) -> Option<&OperatorDescriptor> {
        self.entries.iter().find(|d| d.id == op)
    }

    /// Returns `true` if the operator is in this registry.
    pub fn contains(&self, op: TreeOperator) -> bool {
        self.get(op).is_some()
    }

    /// Returns the label of an operator, if registered.
    pub fn label(&self, op: TreeOperator) -> Option<&str> {
        self.get(op).map(|d| d.label.as_str())
    }

    /// Returns `true` if `op` is registered and applies to `ty`.
    pub fn is_applicable(&self, op: TreeOperator, ty: FieldType) -> bool {
        self.get(op).is_some_and(|d| d.applies_to(ty))
    }

    /// Operators applicable to a field type, in registry order.
    pub fn operators_for_type(&self, ty: FieldType) -> Vec<&OperatorDescriptor> {
        self.entries.iter().filter(|d| d.applies_to(ty)).collect()
    }

    /// First operator applicable to a field type.
    pub fn first_for_type(&self, ty: FieldType) -> Option<TreeOperator> {
        self.entries.iter().find(|d| d.applies_to(ty)).map(|d| d.id)
    }

    /// Iterates all entries.
    pub fn iter(&self) -> impl Iterator<Item = &OperatorDescriptor> {
        self.entries.iter()
    }
}

impl Default for OperatorRegistry {
    fn default() -> Self {
        OperatorRegistry::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn standard_registry_covers_every_operator() {
        let registry = OperatorRegistry::standard();
        for op in TreeOperator::ALL {
            assert!(registry.contains(op), "{op} missing");
        }
    }

    #[test]
    fn operators_for_type_keeps_registry_order() {
        let registry = OperatorRegistry::standard();
        let ids: Vec<_> = registry
            .operators_for_type(FieldType::Array)
            .into_iter()
            .map(|d| d.id)
            .collect();
        assert_eq!(
            ids,
            vec![
                TreeOperator::Contains,
                TreeOperator::In,
                TreeOperator::Nin,
                TreeOperator::All,
                TreeOperator::Exists
            ]
        );
    }

    #[test]
    fn object_fields_only_support_existence() {
        let registry = OperatorRegistry::standard();
        assert_eq!(
            registry.first_for_type(FieldType::Object),
            Some(TreeOperator::Exists)
        );
        assert_eq!(registry.operators_for_type(FieldType::Object).len(), 1);
    }

    #[test]
    fn applicability() {
        let registry = OperatorRegistry::standard();
        assert!(registry.is_applicable(TreeOperator::Gt, FieldType::Date));
        assert!(!registry.is_applicable(TreeOperator::Gt, FieldType::String));
        assert!(!registry.is_applicable(TreeOperator::Regex, FieldType::Number));
    }

    #[test]
    fn reduced_registry() {
        let registry = OperatorRegistry::new(vec![OperatorDescriptor::new(
            TreeOperator::Eq,
            "Is",
            &[FieldType::String],
        )]);
        assert_eq!(registry.label(TreeOperator::Eq), Some("Is"));
        assert!(!registry.contains(TreeOperator::Contains));
        assert_eq!(registry.first_for_type(FieldType::Number), None);
    }
}
