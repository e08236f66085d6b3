//! Plugin metadata documents.
//!
//! Each component type is described by a JSON document of the shape
//! `{ name, version, parameters, data? }`. Parameters keep their declared order.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use expb_model::{ParameterSpec, ValueType};

use crate::error::SchemaError;

/// Declared metadata for one component type.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentMetadata {
    pub name: String,
    #[serde(default)]
    pub version: Option<String>,
    #[serde(default)]
    pub parameters: IndexMap<String, ParameterInfo>,
    /// Fields the component writes into the runtime's data record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub data: Option<IndexMap<String, Value>>,
}

/// One parameter entry of a metadata document.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ParameterInfo {
    #[serde(rename = "type")]
    pub type_name: String,
    #[serde(default)]
    pub array: bool,
    #[serde(default)]
    pub default: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pretty_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ComponentMetadata {
    /// Parses a metadata document.
    pub fn from_json(component: &str, text: &str) -> Result<Self, SchemaError> {
        serde_json::from_str(text).map_err(|source| SchemaError::Json {
            component: component.to_string(),
            source,
        })
    }

    /// Converts declared parameters into specs, in declaration order.
    pub fn parameter_specs(&self) -> Result<Vec<ParameterSpec>, SchemaError> {
        self.parameters
            .iter()
            .map(|(key, info)| {
                let value_type =
                    ValueType::from_metadata(&info.type_name, info.array).map_err(|source| {
                        SchemaError::InvalidParameter {
                            component: self.name.clone(),
                            key: key.clone(),
                            source,
                        }
                    })?;
                Ok(ParameterSpec::new(key.clone(), value_type, info.default.clone()))
            })
            .collect()
    }

    /// Names of the data fields the component records.
    pub fn data_fields(&self) -> Vec<String> {
        self.data
            .as_ref()
            .map(|fields| fields.keys().cloned().collect())
            .unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use expb_model::BaseType;
    use serde_json::json;

    use super::*;

    #[test]
    fn keeps_declared_parameter_order() {
        let meta = ComponentMetadata::from_json(
            "demo",
            r#"{
                "name": "demo",
                "parameters": {
                    "zeta": {"type": "string", "default": "z"},
                    "alpha": {"type": "int", "array": true, "default": [1]}
                }
            }"#,
        )
        .unwrap();
        let specs = meta.parameter_specs().unwrap();
        assert_eq!(specs[0].key, "zeta");
        assert_eq!(specs[1].key, "alpha");
        assert_eq!(specs[1].value_type, ValueType::Array(BaseType::Number));
        assert_eq!(specs[1].default_value, json!([1]));
        assert!(meta.data_fields().is_empty());
    }

    #[test]
    fn unknown_parameter_type_is_reported() {
        let meta = ComponentMetadata::from_json(
            "demo",
            r#"{"name": "demo", "parameters": {"x": {"type": "uuid"}}}"#,
        )
        .unwrap();
        let err = meta.parameter_specs().unwrap_err();
        assert!(matches!(err, SchemaError::InvalidParameter { ref key, .. } if key == "x"));
    }
}
