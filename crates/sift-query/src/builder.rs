//! Editing session over one condition tree.

use crate::compile::{CompiledQuery, TreeCompiler};
use crate::field::FieldIndex;
use crate::registry::OperatorRegistry;
use crate::tree::{ConditionPatch, QueryGroup, TreeEditor};

/// Owns the current tree and keeps its compiled form up to date.
///
/// Every edit goes through the pure [`TreeEditor`] API, replaces the tree
/// with the returned one, and recompiles.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    registry: OperatorRegistry,
    fields: FieldIndex,
    tree: QueryGroup,
    compiled: CompiledQuery,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        QueryBuilder::new(OperatorRegistry::standard(), FieldIndex::new())
    }
}

impl QueryBuilder {
    pub fn new(registry: OperatorRegistry, fields: FieldIndex) -> Self {
        let tree = QueryGroup::new();
        let compiled = TreeCompiler::new(&registry).with_fields(&fields).compile_all(&tree);
        QueryBuilder {
            registry,
            fields,
            tree,
            compiled,
        }
    }

    /// Starts the session from an existing tree.
    pub fn with_tree(mut self, tree: QueryGroup) -> Self {
        self.replace(tree);
        self
    }

    pub fn tree(&self) -> &QueryGroup {
        &self.tree
    }

    pub fn root_id(&self) -> &str {
        &self.tree.id
    }

    pub fn compiled(&self) -> &CompiledQuery {
        &self.compiled
    }

    pub fn registry(&self) -> &OperatorRegistry {
        &self.registry
    }

    pub fn fields(&self) -> &FieldIndex {
        &self.fields
    }

    /// Swaps in a new catalog, e.g. after a reload, and recompiles.
    pub fn set_fields(&mut self, fields: FieldIndex) {
        self.fields = fields;
        self.recompile();
    }

    /// Replaces the whole tree and recompiles.
    pub fn replace(&mut self, tree: QueryGroup) -> &CompiledQuery {
        self.tree = tree;
        self.recompile();
        &self.compiled
    }

    /// Resets to a fresh root with one empty condition.
    pub fn clear(&mut self) -> &CompiledQuery {
        self.replace(QueryGroup::new())
    }

    pub fn add_condition(&mut self, group_id: &str, field: Option<&str>) -> &CompiledQuery {
        let tree = self.editor().add_condition(&self.tree, group_id, field);
        self.replace(tree)
    }

    pub fn remove_condition(&mut self, group_id: &str, condition_id: &str) -> &CompiledQuery {
        let tree = self.editor().remove_condition(&self.tree, group_id, condition_id);
        self.replace(tree)
    }

    pub fn update_condition(
        &mut self,
        group_id: &str,
        condition_id: &str,
        patch: ConditionPatch,
    ) -> &CompiledQuery {
        let tree = self
            .editor()
            .update_condition(&self.tree, group_id, condition_id, patch);
        self.replace(tree)
    }

    pub fn add_group(&mut self, parent_id: &str) -> &CompiledQuery {
        let tree = self.editor().add_group(&self.tree, parent_id);
        self.replace(tree)
    }

    pub fn remove_group(&mut self, parent_id: &str, group_id: &str) -> &CompiledQuery {
        let tree = self.editor().remove_group(&self.tree, parent_id, group_id);
        self.replace(tree)
    }

    pub fn toggle_combinator(&mut self, group_id: &str) -> &CompiledQuery {
        let tree = self.editor().toggle_combinator(&self.tree, group_id);
        self.replace(tree)
    }

    fn editor(&self) -> TreeEditor<'_> {
        TreeEditor::new(&self.registry, &self.fields)
    }

    fn recompile(&mut self) {
        self.compiled = TreeCompiler::new(&self.registry)
            .with_fields(&self.fields)
            .compile_all(&self.tree);
    }
}
