use expb_map::{Resolved, resolve_binding, resolve_cell};
use expb_model::{BaseType, CellValue, ColumnMappingEntry, ParameterSpec, Row, ValueType};
use proptest::prelude::*;
use serde_json::{Value, json};

fn value_types() -> impl Strategy<Value = ValueType> {
    let base = prop_oneof![
        Just(BaseType::String),
        Just(BaseType::Number),
        Just(BaseType::Boolean),
        Just(BaseType::Object),
    ];
    (base, any::<bool>()).prop_map(|(base, array)| {
        if array {
            ValueType::Array(base)
        } else {
            ValueType::Scalar(base)
        }
    })
}

fn cells() -> impl Strategy<Value = Option<CellValue>> {
    prop_oneof![
        Just(None),
        Just(Some(CellValue::Missing)),
        any::<f64>().prop_map(|n| Some(CellValue::Number(n))),
        ".*".prop_map(|s| Some(CellValue::Text(s))),
        "\\[[0-9, \\[\\]]{0,12}".prop_map(|s| Some(CellValue::Text(s))),
    ]
}

proptest! {
    #[test]
    fn resolution_is_total_and_shaped(ty in value_types(), cell in cells()) {
        let resolved = resolve_cell(ty, cell.as_ref());
        if ty.is_numeric() {
            match &resolved {
                Resolved::Value(value) => prop_assert!(value.is_number()),
                Resolved::NotANumber => {}
            }
        } else if ty.is_array() {
            prop_assert!(resolved.as_value().is_some_and(Value::is_array));
        } else {
            prop_assert!(!resolved.is_nan());
        }
    }

    #[test]
    fn typed_literal_ignores_any_row(text in ".*", column in "[a-z]{1,8}") {
        let spec = ParameterSpec::new("prompt", ValueType::STRING, json!(""));
        let entry = ColumnMappingEntry::typed("fixed");
        let row: Row = [(column.as_str(), CellValue::Text(text))].into_iter().collect();
        prop_assert_eq!(
            resolve_binding(&spec, &entry, Some(&row)),
            Resolved::Value(json!("fixed"))
        );
    }
}

#[test]
fn plain_text_for_array_parameter_is_wrapped() {
    let ty = ValueType::Array(BaseType::String);
    assert_eq!(
        resolve_cell(ty, Some(&CellValue::text("abc"))),
        Resolved::Value(json!(["abc"]))
    );
}

#[test]
fn csv_binding_reads_its_column() {
    let spec = ParameterSpec::new("trial_duration", ValueType::NUMBER, Value::Null);
    let entry = ColumnMappingEntry::csv("duration");
    let row: Row = [("duration", CellValue::text("1200"))].into_iter().collect();

    assert_eq!(
        resolve_binding(&spec, &entry, Some(&row)),
        Resolved::Value(json!(1200))
    );
    assert!(resolve_binding(&spec, &entry, None).is_nan());
    let other: Row = [("rt", CellValue::text("1200"))].into_iter().collect();
    assert!(resolve_binding(&spec, &entry, Some(&other)).is_nan());
}
