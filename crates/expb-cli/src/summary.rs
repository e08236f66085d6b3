use comfy_table::modifiers::UTF8_ROUND_CORNERS;
use comfy_table::presets::UTF8_FULL_CONDENSED;
use comfy_table::{Attribute, Cell, CellAlignment, Color, ContentArrangement, Table};
use serde_json::Number;

use expb_cli::check::{CheckReport, Severity};
use expb_map::OrderSpecification;

/// Longest index list printed in the order table before eliding.
const MAX_INDICES_SHOWN: usize = 24;

pub fn print_check_report(report: &CheckReport) {
    if report.is_clean() {
        println!("No issues found.");
        return;
    }
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Severity"),
        header_cell("Trial"),
        header_cell("Component"),
        header_cell("Parameter"),
        header_cell("Message"),
    ]);
    apply_table_style(&mut table);
    for issue in &report.issues {
        table.add_row(vec![
            severity_cell(issue.severity),
            optional_cell(issue.trial.as_ref()),
            optional_cell(issue.component.as_ref()),
            optional_cell(issue.key.as_ref()),
            Cell::new(&issue.message),
        ]);
    }
    println!("{table}");
    println!(
        "{} error(s), {} warning(s)",
        report.error_count(),
        report.warning_count()
    );
}

pub fn print_order(order: &OrderSpecification) {
    let mut table = Table::new();
    table.set_header(vec![
        header_cell("Column"),
        header_cell("Length"),
        header_cell("Dropped"),
        header_cell("Indices"),
    ]);
    apply_table_style(&mut table);
    align_column(&mut table, 1, CellAlignment::Right);
    align_column(&mut table, 2, CellAlignment::Right);
    for column in &order.columns {
        table.add_row(vec![
            Cell::new(&column.column),
            Cell::new(column.indices.len()),
            count_cell(column.dropped, Color::Yellow),
            Cell::new(format_indices(&column.indices)),
        ]);
    }
    println!("{table}");
    if !order.is_aligned() {
        println!("warning: order columns yield sequences of different lengths");
    }
}

pub fn apply_table_style(table: &mut Table) {
    table
        .load_preset(UTF8_FULL_CONDENSED)
        .apply_modifier(UTF8_ROUND_CORNERS)
        .set_content_arrangement(ContentArrangement::Dynamic)
        .set_width(120);
}

pub fn header_cell(label: &str) -> Cell {
    Cell::new(label)
        .fg(Color::Cyan)
        .add_attribute(Attribute::Bold)
}

pub fn dim_cell<T: ToString>(value: T) -> Cell {
    Cell::new(value).fg(Color::DarkGrey)
}

pub fn count_cell(count: usize, color: Color) -> Cell {
    if count > 0 {
        Cell::new(count).fg(color).add_attribute(Attribute::Bold)
    } else {
        dim_cell(count)
    }
}

pub fn align_column(table: &mut Table, index: usize, alignment: CellAlignment) {
    if let Some(column) = table.column_mut(index) {
        column.set_cell_alignment(alignment);
    }
}

fn severity_cell(severity: Severity) -> Cell {
    match severity {
        Severity::Error => Cell::new("error")
            .fg(Color::Red)
            .add_attribute(Attribute::Bold),
        Severity::Warning => Cell::new("warning").fg(Color::Yellow),
    }
}

fn optional_cell<T: ToString>(value: Option<&T>) -> Cell {
    match value {
        Some(value) => Cell::new(value.to_string()),
        None => dim_cell("-"),
    }
}

fn format_indices(indices: &[Number]) -> String {
    let shown: Vec<String> = indices
        .iter()
        .take(MAX_INDICES_SHOWN)
        .map(Number::to_string)
        .collect();
    if indices.len() > MAX_INDICES_SHOWN {
        format!("{}, ... (+{})", shown.join(", "), indices.len() - MAX_INDICES_SHOWN)
    } else {
        shown.join(", ")
    }
}
