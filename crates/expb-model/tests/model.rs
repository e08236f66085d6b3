//! Tests for expb-model types.

use expb_model::{
    BaseType, CellValue, ColumnMapping, ColumnMappingEntry, ComponentId, Dataset, ParameterSpec,
    Row, TrialId, ValueType,
};
use serde_json::json;

#[test]
fn typed_entry_serializes_with_source_tag() {
    let entry = ColumnMappingEntry::typed(json!([[10, 10], [90, 90]]));
    let value = serde_json::to_value(&entry).expect("serialize entry");
    assert_eq!(value, json!({"source": "typed", "value": [[10, 10], [90, 90]]}));
}

#[test]
fn csv_entry_carries_column_name_only() {
    let entry: ColumnMappingEntry =
        serde_json::from_value(json!({"source": "csv", "value": "stimulus_file"}))
            .expect("deserialize entry");
    assert_eq!(entry, ColumnMappingEntry::csv("stimulus_file"));
    assert_eq!(entry.column(), Some("stimulus_file"));
    assert_eq!(entry.source_name(), "csv");
}

#[test]
fn csv_entry_rejects_literal_payload() {
    let parsed = serde_json::from_value::<ColumnMappingEntry>(json!({
        "source": "csv",
        "value": [1, 2, 3]
    }));
    assert!(parsed.is_err());
}

#[test]
fn mapping_serializes_as_plain_object() {
    let mut mapping = ColumnMapping::new();
    mapping.insert("prompt", ColumnMappingEntry::typed("Press a key"));
    mapping.insert("stimulus", ColumnMappingEntry::csv("image"));

    let value = serde_json::to_value(&mapping).expect("serialize mapping");
    assert_eq!(
        value,
        json!({
            "prompt": {"source": "typed", "value": "Press a key"},
            "stimulus": {"source": "csv", "value": "image"}
        })
    );
    let columns: Vec<&str> = mapping.referenced_columns().collect();
    assert_eq!(columns, vec!["image"]);
}

#[test]
fn mapping_remove_is_idempotent() {
    let mut mapping = ColumnMapping::new();
    mapping.insert("prompt", ColumnMappingEntry::typed("x"));
    assert!(mapping.remove("prompt").is_some());
    assert!(mapping.remove("prompt").is_none());
    assert!(mapping.is_empty());
}

#[test]
fn parameter_spec_round_trips_value_type_string() {
    let spec = ParameterSpec::new(
        "calibration_points",
        ValueType::Array(BaseType::Object),
        json!([]),
    );
    let value = serde_json::to_value(&spec).expect("serialize spec");
    assert_eq!(value["value_type"], json!("object_array"));
    let back: ParameterSpec = serde_json::from_value(value).expect("deserialize spec");
    assert_eq!(back, spec);
}

#[test]
fn cell_values_deserialize_from_mixed_json() {
    let row: Row = serde_json::from_value(json!({"c": 1, "name": "x", "gap": null}))
        .expect("deserialize row");
    assert_eq!(row.get("c"), Some(&CellValue::Number(1.0)));
    assert_eq!(row.get("name"), Some(&CellValue::text("x")));
    assert_eq!(row.get("gap"), Some(&CellValue::Missing));
}

#[test]
fn booleans_and_nested_cells_read_as_json_text() {
    let row: Row = serde_json::from_value(json!({
        "consent": true,
        "tags": ["a", 2],
        "meta": {"k": null}
    }))
    .expect("deserialize row");
    assert_eq!(row.get("consent"), Some(&CellValue::text("true")));
    assert_eq!(row.get("tags"), Some(&CellValue::text(r#"["a",2]"#)));
    assert_eq!(row.get("meta"), Some(&CellValue::text(r#"{"k":null}"#)));
}

#[test]
fn cell_numeric_reading_trims_text() {
    assert_eq!(CellValue::text(" 3 ").as_f64(), Some(3.0));
    assert_eq!(CellValue::text("x").as_f64(), None);
    assert!(CellValue::text("  ").is_missing());
}

#[test]
fn dataset_collects_headers_in_first_seen_order() {
    let dataset = Dataset::from_rows(vec![
        Row::from_iter([("b", CellValue::Number(1.0)), ("a", CellValue::Number(2.0))]),
        Row::from_iter([("c", CellValue::text("z"))]),
    ]);
    assert_eq!(dataset.headers, vec!["b", "a", "c"]);
    assert!(dataset.has_column("c"));
    let c: Vec<&CellValue> = dataset.column_values("c").collect();
    assert_eq!(c, vec![&CellValue::Missing, &CellValue::text("z")]);
}

#[test]
fn ids_reject_blank_values() {
    assert!(ComponentId::new("  ").is_err());
    assert_eq!(ComponentId::new(" img-1 ").unwrap().as_str(), "img-1");
    assert!(TrialId::new("").is_err());
    assert!(serde_json::from_value::<TrialId>(json!("")).is_err());
}
