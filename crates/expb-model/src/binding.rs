//! Parameter specifications and their per-component bindings.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ValueType;

/// One parameter of a component type.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Unique key within the component's parameter set.
    pub key: String,
    /// Declared value type.
    pub value_type: ValueType,
    /// Value used when the parameter has no binding.
    #[serde(default)]
    pub default_value: Value,
}

impl ParameterSpec {
    pub fn new(key: impl Into<String>, value_type: ValueType, default_value: Value) -> Self {
        Self {
            key: key.into(),
            value_type,
            default_value,
        }
    }
}

/// Where a bound parameter takes its value from.
///
/// Serialized as `{"source": "typed", "value": <literal>}` or
/// `{"source": "csv", "value": "<column>"}`. A csv binding carries only the
/// column name; the literal is looked up per row at run time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "source", content = "value", rename_all = "lowercase")]
pub enum ColumnMappingEntry {
    Typed(Value),
    Csv(String),
}

impl ColumnMappingEntry {
    pub fn typed(value: impl Into<Value>) -> Self {
        Self::Typed(value.into())
    }

    pub fn csv(column: impl Into<String>) -> Self {
        Self::Csv(column.into())
    }

    pub fn source_name(&self) -> &'static str {
        match self {
            Self::Typed(_) => "typed",
            Self::Csv(_) => "csv",
        }
    }

    pub fn column(&self) -> Option<&str> {
        match self {
            Self::Csv(column) => Some(column),
            Self::Typed(_) => None,
        }
    }
}

/// Bindings of a single component instance, keyed by parameter.
///
/// Parameters without an entry fall back to their declared default.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ColumnMapping {
    entries: BTreeMap<String, ColumnMappingEntry>,
}

impl ColumnMapping {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, key: &str) -> Option<&ColumnMappingEntry> {
        self.entries.get(key)
    }

    /// Inserts or replaces a binding, returning the previous one.
    pub fn insert(
        &mut self,
        key: impl Into<String>,
        entry: ColumnMappingEntry,
    ) -> Option<ColumnMappingEntry> {
        self.entries.insert(key.into(), entry)
    }

    pub fn remove(&mut self, key: &str) -> Option<ColumnMappingEntry> {
        self.entries.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &ColumnMappingEntry)> {
        self.entries.iter().map(|(key, entry)| (key.as_str(), entry))
    }

    /// Column names referenced by csv bindings.
    pub fn referenced_columns(&self) -> impl Iterator<Item = &str> {
        self.entries.values().filter_map(ColumnMappingEntry::column)
    }
}

impl FromIterator<(String, ColumnMappingEntry)> for ColumnMapping {
    fn from_iter<I: IntoIterator<Item = (String, ColumnMappingEntry)>>(iter: I) -> Self {
        Self {
            entries: iter.into_iter().collect(),
        }
    }
}
