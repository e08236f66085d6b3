//! Binding state of a single placed component.

use expb_model::{ColumnMapping, ColumnMappingEntry, ParameterSpec, Row};

use crate::error::MappingError;
use crate::resolve::{Resolved, resolve_binding};
use crate::validate::validate_entry;

/// Bindings of one component instance together with its type's parameters.
#[derive(Debug, Clone, PartialEq)]
pub struct ComponentMapping {
    component_type: String,
    parameters: Vec<ParameterSpec>,
    mapping: ColumnMapping,
}

impl ComponentMapping {
    /// A component with no bindings: every parameter reads its default.
    pub fn new(component_type: impl Into<String>, parameters: Vec<ParameterSpec>) -> Self {
        Self {
            component_type: component_type.into(),
            parameters,
            mapping: ColumnMapping::new(),
        }
    }

    pub fn component_type(&self) -> &str {
        &self.component_type
    }

    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    pub fn mapping(&self) -> &ColumnMapping {
        &self.mapping
    }

    pub fn binding(&self, key: &str) -> Option<&ColumnMappingEntry> {
        self.mapping.get(key)
    }

    pub fn parameter(&self, key: &str) -> Result<&ParameterSpec, MappingError> {
        self.parameters
            .iter()
            .find(|p| p.key == key)
            .ok_or_else(|| MappingError::ParameterNotFound {
                component_type: self.component_type.clone(),
                key: key.to_string(),
            })
    }

    /// Inserts or replaces the binding for `key`, returning the previous one.
    ///
    /// With `strict` set the entry must fit the parameter's declared type;
    /// a rejected entry leaves the mapping untouched.
    pub fn set_binding(
        &mut self,
        key: &str,
        entry: ColumnMappingEntry,
        strict: bool,
    ) -> Result<Option<ColumnMappingEntry>, MappingError> {
        let spec = self.parameter(key)?;
        if strict {
            validate_entry(spec, &entry)?;
        }
        Ok(self.mapping.insert(key, entry))
    }

    /// Removes the binding for `key`. Returns whether one existed.
    pub fn clear_binding(&mut self, key: &str) -> bool {
        self.mapping.remove(key).is_some()
    }

    /// Value the parameter takes for `row`.
    ///
    /// Typed bindings ignore the row, csv bindings resolve against it and
    /// unbound parameters yield their declared default.
    pub fn effective_value(&self, key: &str, row: Option<&Row>) -> Result<Resolved, MappingError> {
        let spec = self.parameter(key)?;
        Ok(match self.mapping.get(key) {
            Some(entry) => resolve_binding(spec, entry, row),
            None => Resolved::Value(spec.default_value.clone()),
        })
    }

    /// Effective values of every parameter, in declaration order.
    pub fn resolve_all(&self, row: Option<&Row>) -> Vec<(&str, Resolved)> {
        self.parameters
            .iter()
            .map(|spec| {
                let value = match self.mapping.get(&spec.key) {
                    Some(entry) => resolve_binding(spec, entry, row),
                    None => Resolved::Value(spec.default_value.clone()),
                };
                (spec.key.as_str(), value)
            })
            .collect()
    }

    pub fn status(&self, key: &str) -> BindingStatus {
        match self.mapping.get(key) {
            Some(ColumnMappingEntry::Typed(_)) => BindingStatus::Typed,
            Some(ColumnMappingEntry::Csv(_)) => BindingStatus::Csv,
            None => BindingStatus::Default,
        }
    }

    pub fn summary(&self) -> BindingSummary {
        let mut summary = BindingSummary {
            total_parameters: self.parameters.len(),
            ..BindingSummary::default()
        };
        for spec in &self.parameters {
            match self.status(&spec.key) {
                BindingStatus::Typed => summary.typed += 1,
                BindingStatus::Csv => summary.csv += 1,
                BindingStatus::Default => summary.defaulted += 1,
            }
        }
        summary
    }
}

/// How a parameter currently obtains its value.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BindingStatus {
    /// Bound to a literal.
    Typed,
    /// Bound to a data column.
    Csv,
    /// Unbound; reads the declared default.
    Default,
}

/// Binding counts for one component.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BindingSummary {
    pub total_parameters: usize,
    pub typed: usize,
    pub csv: usize,
    pub defaulted: usize,
}
