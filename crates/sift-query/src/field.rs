//! Field catalog model.
//!
//! The catalog itself lives behind the search backend; this module only
//! describes the shape of its entries and provides a name-keyed index over
//! one catalog response.

use std::str::FromStr;

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

use crate::error::QueryError;

/// Prefix that addresses a field inside the per-record attribute map.
pub const METADATA_PREFIX: &str = "metadata.";

/// Type of a catalog field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum FieldType {
    #[default]
    String,
    Number,
    Date,
    Boolean,
    Array,
    Object,
}

impl FieldType {
    /// Every field type.
    pub const ALL: [FieldType; 6] = [
        FieldType::String,
        FieldType::Number,
        FieldType::Date,
        FieldType::Boolean,
        FieldType::Array,
        FieldType::Object,
    ];

    /// Returns the wire name of this type.
    pub fn as_str(self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Date => "date",
            FieldType::Boolean => "boolean",
            FieldType::Array => "array",
            FieldType::Object => "object",
        }
    }
}

impl FromStr for FieldType {
    type Err = QueryError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        FieldType::ALL
            .into_iter()
            .find(|t| t.as_str() == s)
            .ok_or_else(|| QueryError::UnknownFieldType(s.to_string()))
    }
}

impl std::fmt::Display for FieldType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// One entry of a field catalog response.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FieldMetadata {
    /// Unique field name; `metadata.`-prefixed names address the attribute map.
    pub name: String,
    /// Value type of the field.
    #[serde(rename = "type")]
    pub field_type: FieldType,
    /// Display label.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<String>,
    /// Source categories this field occurs in.
    #[serde(
        default,
        alias = "sourceCategories",
        skip_serializing_if = "Vec::is_empty"
    )]
    pub source_categories: Vec<String>,
    /// A few example values, in catalog order.
    #[serde(default, alias = "sampleValues", skip_serializing_if = "Vec::is_empty")]
    pub sample_values: Vec<serde_json::Value>,
    /// Free-form description.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl FieldMetadata {
    /// Creates a field with only a name and a type.
    pub fn new(name: impl Into<String>, field_type: FieldType) -> Self {
        FieldMetadata {
            name: name.into(),
            field_type,
            label: None,
            source_categories: Vec::new(),
            sample_values: Vec::new(),
            description: None,
        }
    }

    /// Sets the display label.
    pub fn with_label(mut self, label: impl Into<String>) -> Self {
        self.label = Some(label.into());
        self
    }

    /// Adds a source category tag.
    pub fn with_category(mut self, category: impl Into<String>) -> Self {
        self.source_categories.push(category.into());
        self
    }

    /// Returns the label, or the name when the catalog has none.
    pub fn display_label(&self) -> &str {
        self.label.as_deref().unwrap_or(&self.name)
    }

    /// Returns `true` if this field lives in the per-record attribute map.
    pub fn is_metadata_field(&self) -> bool {
        is_metadata_field(&self.name)
    }

    /// Returns the attribute-map key for a `metadata.` field, or the name itself.
    pub fn stripped_name(&self) -> &str {
        strip_metadata_prefix(&self.name).unwrap_or(&self.name)
    }
}

/// Returns `true` if `name` addresses the attribute map.
pub fn is_metadata_field(name: &str) -> bool {
    name.starts_with(METADATA_PREFIX)
}

/// Strips the `metadata.` prefix, if present.
pub fn strip_metadata_prefix(name: &str) -> Option<&str> {
    name.strip_prefix(METADATA_PREFIX)
}

/// Name-keyed view over one catalog response, in catalog order.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FieldIndex {
    fields: IndexMap<String, FieldMetadata>,
}

impl FieldIndex {
    /// Creates an empty index.
    pub fn new() -> Self {
        FieldIndex::default()
    }

    /// Builds an index from a catalog response.
    ///
    /// Field names are unique within one response; a repeated name keeps the
    /// first entry.
    pub fn from_fields(fields: impl IntoIterator<Item = FieldMetadata>) -> Self {
        let mut index = IndexMap::new();
        for field in fields {
            if index.contains_key(&field.name) {
                tracing::warn!(field = %field.name, "duplicate field in catalog response");
                continue;
            }
            index.insert(field.name.clone(), field);
        }
        FieldIndex { fields: index }
    }

    /// Looks up a field by name.
    pub fn get(&self, name: &str) -> Option<&FieldMetadata> {
        self.fields.get(name)
    }

    /// Returns the type of a field, if it is in the catalog.
    pub fn type_of(&self, name: &str) -> Option<FieldType> {
        self.get(name).map(|f| f.field_type)
    }

    /// Returns the display label of a field, falling back to its name.
    pub fn label_for<'a>(&'a self, name: &'a str) -> &'a str {
        self.get(name).map(FieldMetadata::display_label).unwrap_or(name)
    }

    /// Iterates fields in catalog order.
    pub fn iter(&self) -> impl Iterator<Item = &FieldMetadata> {
        self.fields.values()
    }

    /// Returns the fields tagged with the given source category.
    pub fn for_category<'a>(&'a self, category: &'a str) -> impl Iterator<Item = &'a FieldMetadata> {
        self.iter()
            .filter(move |f| f.source_categories.iter().any(|c| c == category))
    }

    /// Number of fields.
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    /// Returns `true` if the index has no fields.
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

impl FromIterator<FieldMetadata> for FieldIndex {
    fn from_iter<I: IntoIterator<Item = FieldMetadata>>(iter: I) -> Self {
        FieldIndex::from_fields(iter)
    }
}
