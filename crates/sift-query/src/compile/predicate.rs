//! Canonical predicate form.
//!
//! A leaf is `{field: {operator: value}}`; a group with several items is
//! `{"and": [...]}` or `{"or": [...]}`. A group that contributes a single item
//! is replaced by that item, and a group that contributes nothing is `{}`.

use serde::{Serialize, Serializer};
use serde_json::{Map, Value};

use crate::op::TreeOperator;

/// One `{operator: value}` test, serialized as a single-entry object.
#[derive(Debug, Clone, PartialEq)]
pub struct OperatorValue {
    pub operator: TreeOperator,
    pub value: Value,
}

impl OperatorValue {
    pub fn new(operator: TreeOperator, value: Value) -> Self {
        OperatorValue { operator, value }
    }

    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        map.insert(self.operator.as_str().to_string(), self.value.clone());
        Value::Object(map)
    }
}

impl Serialize for OperatorValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

/// Backend-neutral boolean predicate compiled from a condition tree.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Predicate {
    /// Matches everything; serialized as `{}`.
    #[default]
    Empty,
    /// `{field: {operator: value}}`
    Leaf { field: String, test: OperatorValue },
    /// All items must hold.
    And(Vec<Predicate>),
    /// Any item must hold.
    Or(Vec<Predicate>),
}

impl Predicate {
    pub fn leaf(field: impl Into<String>, operator: TreeOperator, value: Value) -> Self {
        Predicate::Leaf {
            field: field.into(),
            test: OperatorValue::new(operator, value),
        }
    }

    /// Returns `true` for the match-everything predicate.
    pub fn is_empty(&self) -> bool {
        matches!(self, Predicate::Empty)
    }

    /// Converts to JSON, preserving item order.
    pub fn to_json(&self) -> Value {
        let mut map = Map::new();
        match self {
            Predicate::Empty => {}
            Predicate::Leaf { field, test } => {
                map.insert(field.clone(), test.to_json());
            }
            Predicate::And(items) => {
                map.insert("and".into(), items.iter().map(Predicate::to_json).collect());
            }
            Predicate::Or(items) => {
                map.insert("or".into(), items.iter().map(Predicate::to_json).collect());
            }
        }
        Value::Object(map)
    }
}

impl Serialize for Predicate {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        self.to_json().serialize(serializer)
    }
}

impl std::fmt::Display for Predicate {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.to_json())
    }
}
