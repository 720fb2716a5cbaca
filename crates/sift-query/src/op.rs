//! Operator vocabularies for condition trees and column filters.
//!
//! The [`TreeOperator`] enum covers the operators a user can pick inside the
//! condition tree; [`ColumnOperator`] covers the operators the results table
//! understands per column. Both serialize to their wire ids exactly.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Operator of a leaf condition in the condition tree.
///
/// Operators are grouped by the shape of value they take:
/// - **Scalar**: `Eq`, `Ne`, `Contains`, `StartsWith`, `EndsWith`, `Regex`,
///   `Gt`, `Gte`, `Lt`, `Lte`
/// - **Sequence**: `In`, `Nin`, `All`
/// - **Pair**: `Between`
/// - **No value**: `Exists` (the value is a boolean flag)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum TreeOperator {
    /// Equal (exact match).
    #[serde(rename = "eq")]
    Eq,
    /// Not equal.
    #[serde(rename = "ne")]
    Ne,
    /// Substring match.
    #[serde(rename = "contains")]
    Contains,
    /// String starts with prefix.
    #[serde(rename = "startsWith")]
    StartsWith,
    /// String ends with suffix.
    #[serde(rename = "endsWith")]
    EndsWith,
    /// Regular expression match.
    #[serde(rename = "regex")]
    Regex,
    /// Greater than.
    #[serde(rename = "gt")]
    Gt,
    /// Greater than or equal.
    #[serde(rename = "gte")]
    Gte,
    /// Less than.
    #[serde(rename = "lt")]
    Lt,
    /// Less than or equal.
    #[serde(rename = "lte")]
    Lte,
    /// Value is one of the given sequence.
    #[serde(rename = "in")]
    In,
    /// Value is none of the given sequence.
    #[serde(rename = "nin")]
    Nin,
    /// Array field contains every element of the given sequence.
    #[serde(rename = "all")]
    All,
    /// Field is present (or absent, when the value is `false`).
    #[serde(rename = "exists")]
    Exists,
    /// Value lies between two bounds.
    #[serde(rename = "between")]
    Between,
}

impl TreeOperator {
    /// Every tree operator, in registry order.
    pub const ALL: [TreeOperator; 15] = [
        TreeOperator::Eq,
        TreeOperator::Ne,
        TreeOperator::Contains,
        TreeOperator::StartsWith,
        TreeOperator::EndsWith,
        TreeOperator::Regex,
        TreeOperator::Gt,
        TreeOperator::Gte,
        TreeOperator::Lt,
        TreeOperator::Lte,
        TreeOperator::In,
        TreeOperator::Nin,
        TreeOperator::All,
        TreeOperator::Exists,
        TreeOperator::Between,
    ];

    /// Returns the wire id of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            TreeOperator::Eq => "eq",
            TreeOperator::Ne => "ne",
            TreeOperator::Contains => "contains",
            TreeOperator::StartsWith => "startsWith",
            TreeOperator::EndsWith => "endsWith",
            TreeOperator::Regex => "regex",
            TreeOperator::Gt => "gt",
            TreeOperator::Gte => "gte",
            TreeOperator::Lt => "lt",
            TreeOperator::Lte => "lte",
            TreeOperator::In => "in",
            TreeOperator::Nin => "nin",
            TreeOperator::All => "all",
            TreeOperator::Exists => "exists",
            TreeOperator::Between => "between",
        }
    }

    /// Returns `true` for the existence operator, which needs no value.
    pub fn is_existence(self) -> bool {
        matches!(self, TreeOperator::Exists)
    }

    /// Returns `true` if the operator takes an arbitrary-length sequence.
    pub fn takes_list(self) -> bool {
        matches!(self, TreeOperator::In | TreeOperator::Nin | TreeOperator::All)
    }

    /// Returns `true` if the operator takes exactly two bounds.
    pub fn takes_pair(self) -> bool {
        matches!(self, TreeOperator::Between)
    }

    /// Maps this operator onto the column-filter vocabulary.
    ///
    /// Used when a core-field leaf is written into the backend's
    /// `columnFilters` list. The mapping is many-to-one and loses the
    /// distinction between, e.g., `in` and `eq`.
    pub fn column_operator(self) -> ColumnOperator {
        match self {
            TreeOperator::Eq => ColumnOperator::Equals,
            TreeOperator::Ne => ColumnOperator::NotEqual,
            TreeOperator::Contains => ColumnOperator::Contains,
            TreeOperator::StartsWith => ColumnOperator::StartsWith,
            TreeOperator::EndsWith => ColumnOperator::EndsWith,
            TreeOperator::Regex => ColumnOperator::Contains,
            TreeOperator::Gt => ColumnOperator::GreaterThan,
            TreeOperator::Gte => ColumnOperator::GreaterThanOrEqual,
            TreeOperator::Lt => ColumnOperator::LessThan,
            TreeOperator::Lte => ColumnOperator::LessThanOrEqual,
            TreeOperator::In => ColumnOperator::Equals,
            TreeOperator::Nin => ColumnOperator::NotEqual,
            TreeOperator::All => ColumnOperator::Contains,
            TreeOperator::Exists => ColumnOperator::NotBlank,
            TreeOperator::Between => ColumnOperator::InRange,
        }
    }
}

impl FromStr for TreeOperator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        TreeOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| QueryError::UnknownOperator(s.to_string()))
    }
}

impl std::fmt::Display for TreeOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Operator of a single column-filter condition.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ColumnOperator {
    Contains,
    NotContains,
    Equals,
    NotEqual,
    StartsWith,
    EndsWith,
    GreaterThan,
    GreaterThanOrEqual,
    LessThan,
    LessThanOrEqual,
    InRange,
    Before,
    After,
    Between,
    Blank,
    NotBlank,
}

impl ColumnOperator {
    /// Every column operator, in vocabulary order.
    pub const ALL: [ColumnOperator; 16] = [
        ColumnOperator::Contains,
        ColumnOperator::NotContains,
        ColumnOperator::Equals,
        ColumnOperator::NotEqual,
        ColumnOperator::StartsWith,
        ColumnOperator::EndsWith,
        ColumnOperator::GreaterThan,
        ColumnOperator::GreaterThanOrEqual,
        ColumnOperator::LessThan,
        ColumnOperator::LessThanOrEqual,
        ColumnOperator::InRange,
        ColumnOperator::Before,
        ColumnOperator::After,
        ColumnOperator::Between,
        ColumnOperator::Blank,
        ColumnOperator::NotBlank,
    ];

    /// Returns the wire id of this operator.
    pub fn as_str(self) -> &'static str {
        match self {
            ColumnOperator::Contains => "contains",
            ColumnOperator::NotContains => "notContains",
            ColumnOperator::Equals => "equals",
            ColumnOperator::NotEqual => "notEqual",
            ColumnOperator::StartsWith => "startsWith",
            ColumnOperator::EndsWith => "endsWith",
            ColumnOperator::GreaterThan => "greaterThan",
            ColumnOperator::GreaterThanOrEqual => "greaterThanOrEqual",
            ColumnOperator::LessThan => "lessThan",
            ColumnOperator::LessThanOrEqual => "lessThanOrEqual",
            ColumnOperator::InRange => "inRange",
            ColumnOperator::Before => "before",
            ColumnOperator::After => "after",
            ColumnOperator::Between => "between",
            ColumnOperator::Blank => "blank",
            ColumnOperator::NotBlank => "notBlank",
        }
    }

    /// Returns the menu label of this operator.
    pub fn label(self) -> &'static str {
        match self {
            ColumnOperator::Contains => "Contains",
            ColumnOperator::NotContains => "Does not contain",
            ColumnOperator::Equals => "Equals",
            ColumnOperator::NotEqual => "Does not equal",
            ColumnOperator::StartsWith => "Starts with",
            ColumnOperator::EndsWith => "Ends with",
            ColumnOperator::GreaterThan => "Greater than",
            ColumnOperator::GreaterThanOrEqual => "Greater than or equal",
            ColumnOperator::LessThan => "Less than",
            ColumnOperator::LessThanOrEqual => "Less than or equal",
            ColumnOperator::InRange => "In range",
            ColumnOperator::Before => "Before",
            ColumnOperator::After => "After",
            ColumnOperator::Between => "Between",
            ColumnOperator::Blank => "Blank",
            ColumnOperator::NotBlank => "Not blank",
        }
    }

    /// Returns `true` for operators that are active without a value.
    pub fn is_no_value(self) -> bool {
        matches!(self, ColumnOperator::Blank | ColumnOperator::NotBlank)
    }

    /// Returns `true` for operators that take two bounds.
    pub fn takes_pair(self) -> bool {
        matches!(self, ColumnOperator::InRange | ColumnOperator::Between)
    }
}

impl FromStr for ColumnOperator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ColumnOperator::ALL
            .into_iter()
            .find(|op| op.as_str() == s)
            .ok_or_else(|| QueryError::UnknownColumnOperator(s.to_string()))
    }
}

impl std::fmt::Display for ColumnOperator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Boolean connective for a group's children or a column's conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Combinator {
    #[default]
    And,
    Or,
}

impl Combinator {
    /// Returns the wire spelling (`AND` / `OR`).
    pub fn as_str(self) -> &'static str {
        match self {
            Combinator::And => "AND",
            Combinator::Or => "OR",
        }
    }

    /// Returns the key used in the canonical predicate form (`and` / `or`).
    pub fn connective(self) -> &'static str {
        match self {
            Combinator::And => "and",
            Combinator::Or => "or",
        }
    }

    /// Returns the other combinator.
    pub fn toggled(self) -> Combinator {
        match self {
            Combinator::And => Combinator::Or,
            Combinator::Or => Combinator::And,
        }
    }
}

impl FromStr for Combinator {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "AND" => Ok(Combinator::And),
            "OR" => Ok(Combinator::Or),
            _ => Err(QueryError::UnknownCombinator(s.to_string())),
        }
    }
}

impl std::fmt::Display for Combinator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Serde adapter for an optional tree operator that travels as `""` when unset.
pub(crate) mod optional_operator {
    use super::TreeOperator;
    use serde::{de::Error, Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(op: &Option<TreeOperator>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        serializer.serialize_str(op.map(TreeOperator::as_str).unwrap_or(""))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<Option<TreeOperator>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = Option::<String>::deserialize(deserializer)?;
        match raw.as_deref() {
            None | Some("") => Ok(None),
            Some(id) => id.parse().map(Some).map_err(D::Error::custom),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn tree_operator_ids_round_trip_through_from_str() {
        for op in TreeOperator::ALL {
            assert_eq!(op.as_str().parse::<TreeOperator>().unwrap(), op);
        }
        assert!("like".parse::<TreeOperator>().is_err());
    }

    #[test]
    fn column_operator_ids_match_serde() {
        for op in ColumnOperator::ALL {
            let json = serde_json::to_string(&op).unwrap();
            assert_eq!(json, format!("\"{}\"", op.as_str()));
        }
    }

    #[test]
    fn tree_operator_serde_uses_wire_ids() {
        assert_eq!(
            serde_json::to_string(&TreeOperator::StartsWith).unwrap(),
            "\"startsWith\""
        );
        let op: TreeOperator = serde_json::from_str("\"nin\"").unwrap();
        assert_eq!(op, TreeOperator::Nin);
    }

    #[test]
    fn column_mapping_table() {
        assert_eq!(TreeOperator::Exists.column_operator(), ColumnOperator::NotBlank);
        assert_eq!(TreeOperator::In.column_operator(), ColumnOperator::Equals);
        assert_eq!(TreeOperator::Contains.column_operator(), ColumnOperator::Contains);
        assert_eq!(TreeOperator::Between.column_operator(), ColumnOperator::InRange);
        assert_eq!(TreeOperator::Gte.column_operator(), ColumnOperator::GreaterThanOrEqual);
    }

    #[test]
    fn operator_shapes() {
        assert!(TreeOperator::In.takes_list());
        assert!(TreeOperator::All.takes_list());
        assert!(!TreeOperator::Eq.takes_list());
        assert!(TreeOperator::Between.takes_pair());
        assert!(TreeOperator::Exists.is_existence());
        assert!(ColumnOperator::Blank.is_no_value());
        assert!(ColumnOperator::InRange.takes_pair());
        assert!(!ColumnOperator::Equals.is_no_value());
    }

    #[test]
    fn combinator_parsing_and_toggle() {
        assert_eq!("and".parse::<Combinator>().unwrap(), Combinator::And);
        assert_eq!("OR".parse::<Combinator>().unwrap(), Combinator::Or);
        assert!("xor".parse::<Combinator>().is_err());
        assert_eq!(Combinator::And.toggled(), Combinator::Or);
        assert_eq!(Combinator::Or.connective(), "or");
        assert_eq!(serde_json::to_string(&Combinator::Or).unwrap(), "\"OR\"");
    }
}
