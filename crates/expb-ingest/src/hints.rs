//! Column characteristics used to sanity-check csv bindings.

use std::collections::{BTreeMap, BTreeSet};

use serde::{Deserialize, Serialize};

use expb_model::Dataset;

/// Hints about a dataset column's contents.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ColumnHint {
    /// True if every non-missing value parses as a number.
    pub is_numeric: bool,
    /// True if every non-missing value looks like a JSON array literal.
    pub is_array_literal: bool,
    /// Ratio of unique values to non-missing values (0.0 to 1.0).
    pub unique_ratio: f64,
    /// Ratio of missing values to total rows (0.0 to 1.0).
    pub null_ratio: f64,
}

pub fn build_column_hints(dataset: &Dataset) -> BTreeMap<String, ColumnHint> {
    let mut hints = BTreeMap::new();
    let row_count = dataset.len();
    for header in &dataset.headers {
        let mut non_null = 0usize;
        let mut numeric = 0usize;
        let mut array_literal = 0usize;
        let mut uniques = BTreeSet::new();
        for cell in dataset.column_values(header) {
            if cell.is_missing() {
                continue;
            }
            non_null += 1;
            if cell.as_f64().is_some() {
                numeric += 1;
            }
            if let Some(text) = cell.as_text() {
                if text.trim_start().starts_with('[') {
                    array_literal += 1;
                }
                uniques.insert(text.trim().to_string());
            }
        }
        let null_ratio = if row_count == 0 {
            1.0
        } else {
            (row_count.saturating_sub(non_null)) as f64 / row_count as f64
        };
        let unique_ratio = if non_null == 0 {
            0.0
        } else {
            uniques.len() as f64 / non_null as f64
        };
        hints.insert(
            header.clone(),
            ColumnHint {
                is_numeric: non_null > 0 && numeric == non_null,
                is_array_literal: non_null > 0 && array_literal == non_null,
                unique_ratio,
                null_ratio,
            },
        );
    }
    hints
}
