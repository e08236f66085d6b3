//! Boundary checks for bindings entering the store.

use serde_json::Value;

use expb_model::{BaseType, ColumnMappingEntry, ParameterSpec, ValueType};

use crate::error::MappingError;
use crate::resolve::number_value;

/// Short name of a JSON value's shape, for error messages.
pub fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Checks that a binding fits the parameter's declared type.
///
/// Typed literals must have the declared shape; csv bindings must name a column.
pub fn validate_entry(spec: &ParameterSpec, entry: &ColumnMappingEntry) -> Result<(), MappingError> {
    match entry {
        ColumnMappingEntry::Typed(value) if !spec.value_type.accepts(value) => {
            Err(MappingError::TypeMismatch {
                key: spec.key.clone(),
                expected: spec.value_type,
                found: json_kind(value),
            })
        }
        ColumnMappingEntry::Csv(column) if column.trim().is_empty() => {
            Err(MappingError::EmptyColumn {
                key: spec.key.clone(),
            })
        }
        _ => Ok(()),
    }
}

/// Parses text typed into a parameter's input field.
///
/// Strings are taken verbatim, numbers and booleans are parsed, structured
/// types are read as JSON and shape-checked.
pub fn parse_manual_input(spec: &ParameterSpec, text: &str) -> Result<Value, MappingError> {
    let invalid = |message: String| MappingError::InvalidManualInput {
        key: spec.key.clone(),
        expected: spec.value_type,
        message,
    };
    let value = match spec.value_type {
        ValueType::Scalar(BaseType::String) => Value::String(text.to_string()),
        ValueType::Scalar(BaseType::Number) => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(number_value)
            .ok_or_else(|| invalid(format!("{:?} is not a number", text.trim())))?,
        ValueType::Scalar(BaseType::Boolean) => match text.trim().to_ascii_lowercase().as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => return Err(invalid(format!("{other:?} is not true or false"))),
        },
        ValueType::Scalar(BaseType::Object) | ValueType::Array(_) => {
            serde_json::from_str(text).map_err(|e| invalid(e.to_string()))?
        }
    };
    validate_entry(spec, &ColumnMappingEntry::Typed(value.clone()))?;
    Ok(value)
}
