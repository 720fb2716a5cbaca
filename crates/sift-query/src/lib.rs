//! Sift Query - filter criteria for a hybrid record store.
//!
//! Records in the store have a handful of well-known core fields plus an
//! open-ended attribute map addressed as `metadata.<key>`. This crate holds
//! everything between the filter editor and the search call:
//!
//! - A recursive condition tree with pure structural edits
//! - An operator registry and the default-operator heuristic
//! - Validation, including per-condition messages
//! - Three compilers: explanation text, canonical predicate, backend payload
//! - Per-column multi-condition table filters
//! - Assembly of the outgoing search request
//!
//! Nothing here does I/O. The field catalog and search endpoint are in
//! `sift-client`.
//!
//! # Quick Start
//!
//! ```rust
//! use sift_query::{
//!     ConditionPatch, FieldIndex, FieldMetadata, FieldType, OperatorRegistry, QueryBuilder,
//!     ColumnFilters, SearchRequestAssembler,
//! };
//!
//! let fields = FieldIndex::from_fields([
//!     FieldMetadata::new("summary", FieldType::String).with_label("Summary"),
//!     FieldMetadata::new("metadata.phase", FieldType::String).with_label("Phase"),
//! ]);
//! let mut builder = QueryBuilder::new(OperatorRegistry::standard(), fields);
//!
//! let root = builder.root_id().to_string();
//! let first = builder.tree().conditions[0].id.clone();
//! builder.update_condition(&root, &first, ConditionPatch::field("summary"));
//! builder.update_condition(&root, &first, ConditionPatch::value("cancer"));
//!
//! let compiled = builder.compiled();
//! assert_eq!(compiled.explanation, "Summary contains cancer");
//!
//! let request = SearchRequestAssembler::new()
//!     .query("immunotherapy")
//!     .assemble(&compiled.payload, &ColumnFilters::new());
//! assert_eq!(request.column_filters[0].id, "summary");
//! ```
//!
//! # Compilation Semantics
//!
//! The three outputs agree on which leaves count, but not on structure:
//!
//! ```text
//! complete(leaf) = field ≠ "" ∧ operator ∈ registry ∧ (operator = exists ∨ value ≠ empty)
//! valid(group)   = ∃ complete leaf ∈ group.conditions ∨ ∃ valid child group
//! ```
//!
//! - **Explanation and predicate** keep the nesting and each group's
//!   combinator. A group with a single item collapses to that item.
//! - **Backend payload** is flat. `metadata.` leaves fill a map (later
//!   leaves replace earlier ones on the same key), core leaves become
//!   column-filter entries, and the backend ANDs everything together.
//!
//! # Operators
//!
//! | Type | Operators |
//! |------|-----------|
//! | string | `eq`, `ne`, `contains`, `startsWith`, `endsWith`, `regex`, `in`, `nin`, `exists` |
//! | number | `eq`, `ne`, `gt`, `gte`, `lt`, `lte`, `in`, `nin`, `exists`, `between` |
//! | date | `eq`, `ne`, `gt`, `gte`, `lt`, `lte`, `exists`, `between` |
//! | boolean | `eq`, `ne`, `exists` |
//! | array | `contains`, `in`, `nin`, `all`, `exists` |
//! | object | `exists` |

mod builder;
mod column;
mod compile;
mod error;
mod field;
mod op;
mod registry;
mod request;
mod resolver;
mod tree;
mod validate;
mod value;

// Re-export public API
pub use builder::QueryBuilder;
pub use column::{
    ColumnConditionPatch, ColumnFilterCondition, ColumnFilterEntry, ColumnFilterModel,
    ColumnFilterValue, ColumnFilters, ColumnKind, ColumnPreset,
};
pub use compile::{
    BackendFilterPayload, CompiledQuery, OperatorValue, Predicate, TreeCompiler, NO_CONDITIONS,
};
pub use error::{QueryError, Result};
pub use field::{
    is_metadata_field, strip_metadata_prefix, FieldIndex, FieldMetadata, FieldType,
    METADATA_PREFIX,
};
pub use op::{ColumnOperator, Combinator, TreeOperator};
pub use registry::{OperatorDescriptor, OperatorRegistry};
pub use request::{SearchRequest, SearchRequestAssembler, SortOrder, DEFAULT_LIMIT};
pub use resolver::{heuristic, DefaultOperatorResolver};
pub use tree::{new_id, ConditionPatch, QueryCondition, QueryGroup, TreeEditor};
pub use validate::{compile_pattern, IssueKind, TreeValidator, ValidationIssue};
pub use value::ConditionValue;
