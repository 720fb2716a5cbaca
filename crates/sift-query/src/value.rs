//! Condition values.
//!
//! A [`ConditionValue`] is what the user typed or picked for a condition: a
//! scalar, a pair of bounds, or a sequence. Pairs and sequences are both
//! carried as [`ConditionValue::List`]; the operator decides the shape.

use serde::{Deserialize, Serialize};

use crate::op::{ColumnOperator, TreeOperator};

/// Value of a tree condition or a column-filter condition.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum ConditionValue {
    /// Boolean value (also the flag of an `exists` condition).
    Bool(bool),
    /// Numeric value, kept in its JSON representation.
    Number(serde_json::Number),
    /// Text value. The empty string means "no value yet".
    Text(String),
    /// Pair of bounds or arbitrary-length sequence.
    List(Vec<ConditionValue>),
}

impl Default for ConditionValue {
    fn default() -> Self {
        ConditionValue::Text(String::new())
    }
}

impl ConditionValue {
    /// The empty value.
    pub fn empty() -> Self {
        ConditionValue::default()
    }

    /// Returns `true` if nothing has been entered.
    ///
    /// Empty text, an empty list, and a list whose elements are all empty
    /// count as empty. Booleans and numbers are never empty.
    pub fn is_empty(&self) -> bool {
        match self {
            ConditionValue::Text(s) => s.is_empty(),
            ConditionValue::List(items) => items.iter().all(ConditionValue::is_empty),
            ConditionValue::Bool(_) | ConditionValue::Number(_) => false,
        }
    }

    /// Returns the text, if this is a text value.
    pub fn as_text(&self) -> Option<&str> {
        match self {
            ConditionValue::Text(s) => Some(s),
            _ => None,
        }
    }

    /// Returns the boolean, if this is a boolean value.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            ConditionValue::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Returns the elements, if this is a list.
    pub fn as_list(&self) -> Option<&[ConditionValue]> {
        match self {
            ConditionValue::List(items) => Some(items),
            _ => None,
        }
    }

    /// Returns both bounds of a two-element list.
    pub fn bounds(&self) -> Option<(&ConditionValue, &ConditionValue)> {
        match self.as_list() {
            Some([low, high]) => Some((low, high)),
            _ => None,
        }
    }

    /// Flag carried by an `exists` condition.
    ///
    /// Anything other than an explicit `false` means "exists".
    pub fn existence_flag(&self) -> bool {
        self.as_bool().unwrap_or(true)
    }

    /// Converts to a JSON value for predicates and payloads.
    pub fn to_json(&self) -> serde_json::Value {
        match self {
            ConditionValue::Bool(b) => serde_json::Value::Bool(*b),
            ConditionValue::Number(n) => serde_json::Value::Number(n.clone()),
            ConditionValue::Text(s) => serde_json::Value::String(s.clone()),
            ConditionValue::List(items) => {
                serde_json::Value::Array(items.iter().map(ConditionValue::to_json).collect())
            }
        }
    }

    /// Reshapes this value for a tree operator.
    ///
    /// - `between` → two-element list, keeping a scalar as the lower bound
    /// - `in` / `nin` / `all` → list, wrapping a non-empty scalar
    /// - `exists` → boolean flag (`true` unless already a boolean)
    /// - scalar operators → a list collapses to its first element
    pub fn coerce_for(self, op: TreeOperator) -> ConditionValue {
        if op.is_existence() {
            return ConditionValue::Bool(self.existence_flag());
        }
        if op.takes_pair() {
            return self.into_pair();
        }
        if op.takes_list() {
            return match self {
                ConditionValue::List(items) => ConditionValue::List(items),
                scalar if scalar.is_empty() => ConditionValue::List(Vec::new()),
                scalar => ConditionValue::List(vec![scalar]),
            };
        }
        self.into_scalar()
    }

    /// Reshapes this value for a column-filter operator.
    pub fn coerce_for_column(self, op: ColumnOperator) -> ConditionValue {
        if op.is_no_value() {
            return ConditionValue::empty();
        }
        if op.takes_pair() {
            return self.into_pair();
        }
        self.into_scalar()
    }

    fn into_pair(self) -> ConditionValue {
        match self {
            ConditionValue::List(mut items) => {
                items.resize(2, ConditionValue::empty());
                ConditionValue::List(items)
            }
            ConditionValue::Bool(_) => {
                ConditionValue::List(vec![ConditionValue::empty(), ConditionValue::empty()])
            }
            scalar => ConditionValue::List(vec![scalar, ConditionValue::empty()]),
        }
    }

    fn into_scalar(self) -> ConditionValue {
        match self {
            ConditionValue::List(items) => items.into_iter().next().unwrap_or_default(),
            ConditionValue::Bool(_) => ConditionValue::empty(),
            scalar => scalar,
        }
    }
}

impl std::fmt::Display for ConditionValue {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConditionValue::Bool(b) => write!(f, "{b}"),
            ConditionValue::Number(n) => write!(f, "{n}"),
            ConditionValue::Text(s) => write!(f, "{s}"),
            ConditionValue::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        write!(f, ", ")?;
                    }
                    write!(f, "{item}")?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for ConditionValue {
    fn from(s: &str) -> Self {
        ConditionValue::Text(s.to_string())
    }
}

impl From<String> for ConditionValue {
    fn from(s: String) -> Self {
        ConditionValue::Text(s)
    }
}

impl From<bool> for ConditionValue {
    fn from(b: bool) -> Self {
        ConditionValue::Bool(b)
    }
}

impl From<i64> for ConditionValue {
    fn from(n: i64) -> Self {
        ConditionValue::Number(n.into())
    }
}

impl From<u64> for ConditionValue {
    fn from(n: u64) -> Self {
        ConditionValue::Number(n.into())
    }
}

impl From<f64> for ConditionValue {
    /// Non-finite floats have no JSON form and become the empty value.
    fn from(n: f64) -> Self {
        serde_json::Number::from_f64(n)
            .map(ConditionValue::Number)
            .unwrap_or_default()
    }
}

impl<T: Into<ConditionValue>> From<Vec<T>> for ConditionValue {
    fn from(items: Vec<T>) -> Self {
        ConditionValue::List(items.into_iter().map(Into::into).collect())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn emptiness() {
        assert!(ConditionValue::empty().is_empty());
        assert!(ConditionValue::List(vec![]).is_empty());
        assert!(ConditionValue::from(vec!["", ""]).is_empty());
        assert!(!ConditionValue::from(vec!["1", ""]).is_empty());
        assert!(!ConditionValue::from(false).is_empty());
        assert!(!ConditionValue::from(0i64).is_empty());
        assert!(!ConditionValue::from(" ").is_empty());
    }

    #[test]
    fn deserializes_untagged() {
        let v: ConditionValue = serde_json::from_str(r#"["a", 2, true]"#).unwrap();
        assert_eq!(
            v,
            ConditionValue::List(vec!["a".into(), 2i64.into(), true.into()])
        );
        let v: ConditionValue = serde_json::from_str("2.5").unwrap();
        assert_eq!(v.to_json(), serde_json::json!(2.5));
    }

    #[test]
    fn coercion_for_tree_operators() {
        let v = ConditionValue::from("2020").coerce_for(TreeOperator::Between);
        assert_eq!(v, ConditionValue::from(vec!["2020", ""]));

        let v = ConditionValue::from("a").coerce_for(TreeOperator::In);
        assert_eq!(v, ConditionValue::from(vec!["a"]));

        let v = ConditionValue::empty().coerce_for(TreeOperator::Nin);
        assert_eq!(v, ConditionValue::List(vec![]));

        let v = ConditionValue::from(vec!["x", "y", "z"]).coerce_for(TreeOperator::Eq);
        assert_eq!(v, ConditionValue::from("x"));

        let v = ConditionValue::from(vec!["x", "y", "z"]).coerce_for(TreeOperator::Between);
        assert_eq!(v, ConditionValue::from(vec!["x", "y"]));

        let v = ConditionValue::empty().coerce_for(TreeOperator::Exists);
        assert_eq!(v, ConditionValue::Bool(true));

        let v = ConditionValue::from(false).coerce_for(TreeOperator::Exists);
        assert_eq!(v, ConditionValue::Bool(false));

        let v = ConditionValue::from(true).coerce_for(TreeOperator::Contains);
        assert_eq!(v, ConditionValue::empty());
    }

    #[test]
    fn coercion_for_column_operators() {
        let v = ConditionValue::from("cancer").coerce_for_column(ColumnOperator::Blank);
        assert_eq!(v, ConditionValue::empty());
        let v = ConditionValue::from("5").coerce_for_column(ColumnOperator::InRange);
        assert_eq!(v, ConditionValue::from(vec!["5", ""]));
    }

    #[test]
    fn display_joins_lists() {
        assert_eq!(ConditionValue::from(vec!["a", "b"]).to_string(), "a, b");
        assert_eq!(ConditionValue::from(3i64).to_string(), "3");
    }

    #[test]
    fn bounds_only_for_pairs() {
        let pair = ConditionValue::from(vec!["1", "2"]);
        let (lo, hi) = pair.bounds().unwrap();
        assert_eq!(lo.as_text(), Some("1"));
        assert_eq!(hi.as_text(), Some("2"));
        assert!(ConditionValue::from(vec!["1"]).bounds().is_none());
    }
}
