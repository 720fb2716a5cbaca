//! Default operator selection for a newly chosen field.

use crate::field::FieldType;
use crate::op::TreeOperator;
use crate::registry::OperatorRegistry;

const TEXT_MARKERS: [&str; 5] = ["summary", "content", "description", "text", "body"];
const IDENTIFIER_NAMES: [&str; 3] = ["pmid", "nct", "doi"];
const TIMESTAMP_MARKERS: [&str; 2] = ["updated", "created"];

/// Picks the operator a condition starts with when its field is selected.
#[derive(Debug, Clone, Copy)]
pub struct DefaultOperatorResolver<'a> {
    registry: &'a OperatorRegistry,
}

impl<'a> DefaultOperatorResolver<'a> {
    pub fn new(registry: &'a OperatorRegistry) -> Self {
        DefaultOperatorResolver { registry }
    }

    /// Resolves the starting operator for a field.
    ///
    /// Applies [`heuristic`] and, when the result does not apply to
    /// `field_type` in this registry, falls back to the first operator the
    /// registry lists for the type. Returns `None` only when the registry has
    /// no operator at all for the type.
    pub fn resolve(&self, field_name: &str, field_type: FieldType) -> Option<TreeOperator> {
        let preferred = heuristic(field_name, field_type);
        if self.registry.is_applicable(preferred, field_type) {
            return Some(preferred);
        }
        let fallback = self.registry.first_for_type(field_type);
        tracing::debug!(
            field = field_name,
            %field_type,
            %preferred,
            ?fallback,
            "default operator not applicable, falling back"
        );
        fallback
    }
}

/// Name/type heuristic, evaluated in order; the first matching rule wins.
///
/// 1. Free-text fields (`_fulltext`, or names mentioning summary, content,
///    description, text or body) → `contains`.
/// 2. Identifier fields (names containing `id`, or `pmid`/`nct`/`doi`) → `eq`.
/// 3. Creation/update dates → `gte`.
/// 4. Arrays → `contains`.
/// 5. Everything else → `eq`.
pub fn heuristic(field_name: &str, field_type: FieldType) -> TreeOperator {
    let name = field_name.to_lowercase();

    if name == "_fulltext" || TEXT_MARKERS.iter().any(|m| name.contains(m)) {
        return TreeOperator::Contains;
    }
    if name.contains("id") || IDENTIFIER_NAMES.contains(&name.as_str()) {
        return TreeOperator::Eq;
    }
    if field_type == FieldType::Date && TIMESTAMP_MARKERS.iter().any(|m| name.contains(m)) {
        return TreeOperator::Gte;
    }
    if field_type == FieldType::Array {
        return TreeOperator::Contains;
    }
    TreeOperator::Eq
}
