use expb_map::{OrderError, extract_order, order_indices};
use expb_model::{CellValue, Dataset, Row};
use serde_json::json;

fn dataset(rows: Vec<Vec<(&str, CellValue)>>) -> Dataset {
    Dataset::from_rows(
        rows.into_iter()
            .map(|cells| cells.into_iter().collect::<Row>())
            .collect(),
    )
}

#[test]
fn positions_become_zero_based_and_junk_is_dropped() {
    let data = dataset(vec![
        vec![("c", CellValue::Number(1.0))],
        vec![("c", CellValue::Number(3.0))],
        vec![("c", CellValue::text("x"))],
        vec![("c", CellValue::Number(2.0))],
    ]);
    let order = extract_order(&data, &["c"]).unwrap();
    assert_eq!(json!(order.get("c")), json!([0, 2, 1]));
    assert_eq!(order.columns[0].dropped, 1);
}

#[test]
fn text_positions_are_parsed() {
    let values = [
        CellValue::text(" 4 "),
        CellValue::text("2.5"),
        CellValue::Missing,
        CellValue::text("1"),
    ];
    let (indices, dropped) = order_indices(values.iter());
    assert_eq!(json!(indices), json!([3, 1.5, 0]));
    assert_eq!(dropped, 1);
}

#[test]
fn fractional_positions_are_kept() {
    let values = [
        CellValue::Number(1.0),
        CellValue::Number(2.5),
        CellValue::Number(3.0),
    ];
    let (indices, dropped) = order_indices(values.iter());
    assert_eq!(json!(indices), json!([0, 1.5, 2]));
    assert_eq!(dropped, 0);
    assert!(indices[0].is_i64());
}

#[test]
fn non_finite_positions_are_dropped() {
    let values = [
        CellValue::Number(f64::NAN),
        CellValue::text("inf"),
        CellValue::Number(2.0),
    ];
    let (indices, dropped) = order_indices(values.iter());
    assert_eq!(json!(indices), json!([1]));
    assert_eq!(dropped, 2);
}

#[test]
fn unknown_column_is_an_error() {
    let data = dataset(vec![vec![("c", CellValue::Number(1.0))]]);
    let err = extract_order(&data, &["c", "block"]).unwrap_err();
    assert_eq!(err, OrderError::ColumnNotFound("block".into()));
}

#[test]
fn columns_may_differ_in_length() {
    let data = dataset(vec![
        vec![("a", CellValue::Number(1.0)), ("b", CellValue::Number(2.0))],
        vec![("a", CellValue::Number(2.0)), ("b", CellValue::text("n/a"))],
    ]);
    let order = extract_order(&data, &["b", "a"]).unwrap();
    let columns: Vec<&str> = order.columns.iter().map(|c| c.column.as_str()).collect();
    assert_eq!(columns, vec!["b", "a"]);
    assert_eq!(json!(order.get("a")), json!([0, 1]));
    assert_eq!(json!(order.get("b")), json!([1]));
    assert!(!order.is_aligned());
}

#[test]
fn no_columns_selected_yields_empty_order() {
    let data = dataset(vec![vec![("a", CellValue::Number(1.0))]]);
    let order = extract_order::<&str>(&data, &[]).unwrap();
    assert!(order.is_empty());
    assert!(order.is_aligned());
}
