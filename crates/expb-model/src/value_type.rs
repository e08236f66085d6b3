//! Declared value types of component parameters.
//!
//! A value type is either a scalar base type or an array of a base type. The
//! canonical string form is the base name (`number`) or the base name with an
//! `_array` suffix (`number_array`).

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::ModelError;

const ARRAY_SUFFIX: &str = "_array";

/// Scalar shapes a parameter value may take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum BaseType {
    String,
    Number,
    Boolean,
    /// Structured values. JSON objects and nested arrays both qualify.
    Object,
}

impl BaseType {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
        }
    }

    /// Whether a JSON value has this base shape.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object() || value.is_array(),
        }
    }

    /// Parses a base type name, including the aliases used by plugin metadata.
    fn parse_alias(raw: &str) -> Option<Self> {
        let normalized = raw.trim().to_ascii_lowercase();
        let base = match normalized.as_str() {
            "string" | "html_string" | "image" | "audio" | "video" | "key" | "select" => {
                Self::String
            }
            "number" | "int" | "integer" | "float" => Self::Number,
            "boolean" | "bool" => Self::Boolean,
            "object" | "complex" | "function" | "timeline" => Self::Object,
            _ => return None,
        };
        Some(base)
    }
}

impl fmt::Display for BaseType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// The declared type of a parameter.
///
/// Fixed once a component type is registered; bindings are validated against
/// it at the mapping store boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub enum ValueType {
    Scalar(BaseType),
    Array(BaseType),
}

impl ValueType {
    pub const STRING: Self = Self::Scalar(BaseType::String);
    pub const NUMBER: Self = Self::Scalar(BaseType::Number);
    pub const BOOLEAN: Self = Self::Scalar(BaseType::Boolean);
    pub const OBJECT: Self = Self::Scalar(BaseType::Object);

    /// Builds a value type from a metadata type name and its `array` flag.
    ///
    /// `keys` is shorthand for an array of keys.
    pub fn from_metadata(type_name: &str, array: bool) -> Result<Self, ModelError> {
        let parsed: Self = type_name.parse()?;
        Ok(match parsed {
            Self::Scalar(base) if array => Self::Array(base),
            other => other,
        })
    }

    pub fn base(self) -> BaseType {
        match self {
            Self::Scalar(base) | Self::Array(base) => base,
        }
    }

    pub fn is_array(self) -> bool {
        matches!(self, Self::Array(_))
    }

    pub fn is_numeric(self) -> bool {
        self == Self::NUMBER
    }

    /// Whether a literal value has the shape this type declares.
    pub fn accepts(self, value: &Value) -> bool {
        match self {
            Self::Scalar(base) => base.accepts(value),
            Self::Array(base) => value
                .as_array()
                .is_some_and(|items| items.iter().all(|item| base.accepts(item))),
        }
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Scalar(base) => write!(f, "{base}"),
            Self::Array(base) => write!(f, "{base}{ARRAY_SUFFIX}"),
        }
    }
}

impl FromStr for ValueType {
    type Err = ModelError;

    fn from_str(raw: &str) -> Result<Self, Self::Err> {
        let trimmed = raw.trim();
        if trimmed.eq_ignore_ascii_case("keys") {
            return Ok(Self::Array(BaseType::String));
        }
        if let Some(base) = trimmed.strip_suffix(ARRAY_SUFFIX) {
            return BaseType::parse_alias(base)
                .map(Self::Array)
                .ok_or_else(|| ModelError::InvalidValueType(raw.to_string()));
        }
        BaseType::parse_alias(trimmed)
            .map(Self::Scalar)
            .ok_or_else(|| ModelError::InvalidValueType(raw.to_string()))
    }
}

impl TryFrom<String> for ValueType {
    type Error = ModelError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<ValueType> for String {
    fn from(value: ValueType) -> Self {
        value.to_string()
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn parses_canonical_and_alias_names() {
        assert_eq!("number".parse::<ValueType>().unwrap(), ValueType::NUMBER);
        assert_eq!("INT".parse::<ValueType>().unwrap(), ValueType::NUMBER);
        assert_eq!(
            "html_string".parse::<ValueType>().unwrap(),
            ValueType::STRING
        );
        assert_eq!(
            "object_array".parse::<ValueType>().unwrap(),
            ValueType::Array(BaseType::Object)
        );
        assert_eq!(
            "keys".parse::<ValueType>().unwrap(),
            ValueType::Array(BaseType::String)
        );
        assert!("uuid".parse::<ValueType>().is_err());
    }

    #[test]
    fn array_flag_lifts_scalar() {
        let ty = ValueType::from_metadata("float", true).unwrap();
        assert_eq!(ty, ValueType::Array(BaseType::Number));
        assert_eq!(ty.to_string(), "number_array");
    }

    #[test]
    fn accepts_checks_shape() {
        let points = ValueType::Array(BaseType::Object);
        assert!(points.accepts(&json!([[10, 10], [90, 90]])));
        assert!(points.accepts(&json!([])));
        assert!(!points.accepts(&json!([1, 2])));
        assert!(!ValueType::NUMBER.accepts(&json!("5")));
        assert!(ValueType::OBJECT.accepts(&json!({"a": 1})));
    }
}
