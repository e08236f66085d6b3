//! Named literal values offered as quick fills for point-grid parameters.

use serde_json::{Value, json};

use expb_model::ParameterSpec;

use crate::error::PresetError;

/// Parameters for which presets are offered (when their type is an array).
pub const PRESET_PARAMETERS: &[&str] = &["calibration_points", "validation_points"];

/// A named, immutable literal.
#[derive(Debug, Clone, PartialEq)]
pub struct Preset {
    label: String,
    value: Value,
    serialized: String,
}

impl Preset {
    pub fn label(&self) -> &str {
        &self.label
    }

    pub fn value(&self) -> &Value {
        &self.value
    }
}

/// Ordered presets. No two presets share a label or a serialized value.
#[derive(Debug, Clone, Default)]
pub struct PresetLibrary {
    presets: Vec<Preset>,
}

impl PresetLibrary {
    pub fn new<L, I>(presets: I) -> Result<Self, PresetError>
    where
        L: Into<String>,
        I: IntoIterator<Item = (L, Value)>,
    {
        let mut library = Self::default();
        for (label, value) in presets {
            library.push(label.into(), value)?;
        }
        Ok(library)
    }

    /// Calibration grids in percent coordinates.
    pub fn builtin() -> Self {
        Self::new(builtin_grids()).unwrap_or_else(|error| {
            tracing::error!(%error, "built-in presets are inconsistent");
            Self::default()
        })
    }

    fn push(&mut self, label: String, value: Value) -> Result<(), PresetError> {
        if self.get(&label).is_some() {
            return Err(PresetError::DuplicateLabel(label));
        }
        let serialized =
            serde_json::to_string(&value).map_err(|_| PresetError::Unserializable(label.clone()))?;
        if let Some(existing) = self.presets.iter().find(|p| p.serialized == serialized) {
            return Err(PresetError::DuplicateValue {
                label,
                existing: existing.label.clone(),
            });
        }
        self.presets.push(Preset {
            label,
            value,
            serialized,
        });
        Ok(())
    }

    /// Whether presets apply to this parameter at all.
    pub fn is_offered(spec: &ParameterSpec) -> bool {
        spec.value_type.is_array() && PRESET_PARAMETERS.contains(&spec.key.as_str())
    }

    /// Presets offered for `spec`; empty when the parameter is not eligible.
    pub fn offered_for(&self, spec: &ParameterSpec) -> &[Preset] {
        if Self::is_offered(spec) {
            &self.presets
        } else {
            &[]
        }
    }

    pub fn get(&self, label: &str) -> Option<&Preset> {
        self.presets.iter().find(|p| p.label == label)
    }

    /// The preset whose serialized form equals `value`'s, if any.
    pub fn selected(&self, value: &Value) -> Option<&Preset> {
        let serialized = serde_json::to_string(value).ok()?;
        self.presets.iter().find(|p| p.serialized == serialized)
    }

    pub fn iter(&self) -> impl Iterator<Item = &Preset> {
        self.presets.iter()
    }

    pub fn len(&self) -> usize {
        self.presets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.presets.is_empty()
    }
}

fn builtin_grids() -> Vec<(&'static str, Value)> {
    vec![
        (
            "5 points",
            json!([[10, 10], [10, 90], [50, 50], [90, 10], [90, 90]]),
        ),
        (
            "9 points",
            json!([
                [10, 10],
                [10, 50],
                [10, 90],
                [50, 10],
                [50, 50],
                [50, 90],
                [90, 10],
                [90, 50],
                [90, 90]
            ]),
        ),
        (
            "13 points",
            json!([
                [10, 10],
                [10, 50],
                [10, 90],
                [30, 30],
                [30, 70],
                [50, 10],
                [50, 50],
                [50, 90],
                [70, 30],
                [70, 70],
                [90, 10],
                [90, 50],
                [90, 90]
            ]),
        ),
    ]
}

#[cfg(test)]
mod tests {
    use expb_model::{BaseType, ValueType};

    use super::*;

    #[test]
    fn builtin_grids_are_distinct() {
        let library = PresetLibrary::new(builtin_grids()).expect("built-in presets are valid");
        let labels: Vec<&str> = library.iter().map(Preset::label).collect();
        assert_eq!(labels, vec!["5 points", "9 points", "13 points"]);
        assert_eq!(library.get("13 points").unwrap().value().as_array().unwrap().len(), 13);
    }

    #[test]
    fn duplicate_value_is_rejected() {
        let err = PresetLibrary::new([("a", json!([[1, 2]])), ("b", json!([[1, 2]]))]).unwrap_err();
        assert_eq!(
            err,
            PresetError::DuplicateValue {
                label: "b".into(),
                existing: "a".into(),
            }
        );
    }

    #[test]
    fn duplicate_label_is_rejected() {
        let err = PresetLibrary::new([("a", json!([1])), ("a", json!([2]))]).unwrap_err();
        assert_eq!(err, PresetError::DuplicateLabel("a".into()));
    }

    #[test]
    fn offered_only_for_allow_listed_arrays() {
        let library = PresetLibrary::builtin();
        let points = ParameterSpec::new(
            "validation_points",
            ValueType::Array(BaseType::Object),
            json!([]),
        );
        let scalar = ParameterSpec::new("calibration_points", ValueType::OBJECT, json!([]));
        let other = ParameterSpec::new("labels", ValueType::Array(BaseType::String), json!([]));
        assert_eq!(library.offered_for(&points).len(), 3);
        assert!(library.offered_for(&scalar).is_empty());
        assert!(library.offered_for(&other).is_empty());
    }
}
