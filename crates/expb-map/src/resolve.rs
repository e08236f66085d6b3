//! Binding resolution: raw cells to runtime parameter values.
//!
//! Resolution is total. Malformed input degrades to a best-effort value
//! (`NaN`, an empty array or the raw text) instead of failing; callers that
//! need to tell these apart inspect [`Resolved`].

use serde_json::{Number, Value};
use tracing::debug;

use expb_model::{CellValue, ColumnMappingEntry, ParameterSpec, Row, ValueType};

static MISSING: CellValue = CellValue::Missing;

/// A resolved parameter value.
#[derive(Debug, Clone, PartialEq)]
pub enum Resolved {
    Value(Value),
    /// A numeric parameter whose cell did not parse. The runtime sees `NaN`.
    NotANumber,
}

impl Resolved {
    pub fn as_value(&self) -> Option<&Value> {
        match self {
            Self::Value(value) => Some(value),
            Self::NotANumber => None,
        }
    }

    pub fn is_nan(&self) -> bool {
        matches!(self, Self::NotANumber)
    }

    /// Numeric reading; `NaN` for unresolved numbers.
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Value(value) => value.as_f64(),
            Self::NotANumber => Some(f64::NAN),
        }
    }

    /// JSON form. JSON has no `NaN`, so unresolved numbers become `null`.
    pub fn into_json(self) -> Value {
        match self {
            Self::Value(value) => value,
            Self::NotANumber => Value::Null,
        }
    }
}

/// JSON number for `value`, integral when the value is whole. Non-finite
/// values have no JSON form.
pub(crate) fn json_number(value: f64) -> Option<Number> {
    if value.fract() == 0.0 && value.abs() < i64::MAX as f64 {
        return Some(Number::from(value as i64));
    }
    Number::from_f64(value)
}

pub(crate) fn number_value(value: f64) -> Option<Value> {
    json_number(value).map(Value::Number)
}

/// Coerces one cell into the shape `value_type` declares.
///
/// A missing cell (or a column absent from the row) resolves like an empty one.
pub fn resolve_cell(value_type: ValueType, cell: Option<&CellValue>) -> Resolved {
    let cell = cell.unwrap_or(&MISSING);
    if value_type.is_numeric() {
        return cell
            .as_f64()
            .and_then(number_value)
            .map_or(Resolved::NotANumber, Resolved::Value);
    }
    if value_type.is_array() {
        return Resolved::Value(resolve_array(cell));
    }
    Resolved::Value(match cell {
        CellValue::Number(value) => number_value(*value).unwrap_or(Value::Null),
        other => other.to_json(),
    })
}

fn resolve_array(cell: &CellValue) -> Value {
    match cell {
        CellValue::Missing => Value::Array(Vec::new()),
        CellValue::Number(value) => {
            Value::Array(vec![number_value(*value).unwrap_or(Value::Null)])
        }
        CellValue::Text(text) => {
            let trimmed = text.trim();
            if trimmed.is_empty() {
                return Value::Array(Vec::new());
            }
            if trimmed.starts_with('[')
                && let Ok(Value::Array(items)) = serde_json::from_str::<Value>(trimmed)
            {
                return Value::Array(items);
            }
            Value::Array(vec![Value::String(text.clone())])
        }
    }
}

/// Resolves a binding of `spec` against an optional participant row.
///
/// Typed literals are returned unchanged whatever the row. Csv bindings
/// without a row resolve as a missing cell.
pub fn resolve_binding(
    spec: &ParameterSpec,
    entry: &ColumnMappingEntry,
    row: Option<&Row>,
) -> Resolved {
    match entry {
        ColumnMappingEntry::Typed(value) => Resolved::Value(value.clone()),
        ColumnMappingEntry::Csv(column) => {
            let cell = row.and_then(|row| row.get(column));
            if cell.is_none() {
                debug!(key = %spec.key, column = %column, "csv column absent from row");
            }
            resolve_cell(spec.value_type, cell)
        }
    }
}

#[cfg(test)]
mod tests {
    use expb_model::BaseType;
    use serde_json::json;

    use super::*;

    fn text(value: &str) -> CellValue {
        CellValue::text(value)
    }

    #[test]
    fn numbers_parse_or_become_nan() {
        assert_eq!(
            resolve_cell(ValueType::NUMBER, Some(&text(" 250 "))),
            Resolved::Value(json!(250))
        );
        assert_eq!(
            resolve_cell(ValueType::NUMBER, Some(&text("0.5"))),
            Resolved::Value(json!(0.5))
        );
        assert!(resolve_cell(ValueType::NUMBER, Some(&text("fast"))).is_nan());
        assert!(resolve_cell(ValueType::NUMBER, None).is_nan());
        assert!(resolve_cell(ValueType::NUMBER, Some(&text("inf"))).is_nan());
    }

    #[test]
    fn arrays_parse_bracketed_text() {
        let ty = ValueType::Array(BaseType::Object);
        assert_eq!(
            resolve_cell(ty, Some(&text("[[10,10],[90,90]]"))),
            Resolved::Value(json!([[10, 10], [90, 90]]))
        );
        assert_eq!(
            resolve_cell(ty, Some(&text("[broken"))),
            Resolved::Value(json!(["[broken"]))
        );
        assert_eq!(resolve_cell(ty, None), Resolved::Value(json!([])));
        assert_eq!(
            resolve_cell(ty, Some(&CellValue::Number(3.0))),
            Resolved::Value(json!([3]))
        );
    }

    #[test]
    fn other_types_pass_through() {
        assert_eq!(
            resolve_cell(ValueType::BOOLEAN, Some(&text("true"))),
            Resolved::Value(json!("true"))
        );
        assert_eq!(
            resolve_cell(ValueType::STRING, Some(&CellValue::Number(2.0))),
            Resolved::Value(json!(2))
        );
        assert_eq!(
            resolve_cell(ValueType::STRING, None),
            Resolved::Value(Value::Null)
        );
    }

    #[test]
    fn nan_renders_as_null() {
        assert_eq!(Resolved::NotANumber.into_json(), Value::Null);
        assert!(Resolved::NotANumber.as_f64().is_some_and(f64::is_nan));
    }
}
