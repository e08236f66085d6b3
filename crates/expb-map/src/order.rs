//! Presentation order extraction from participant data.
//!
//! Authors list 1-based trial positions in one or more columns. Each selected
//! column becomes a sequence of 0-based indices. Rows whose value is not a
//! number are dropped, so sequences are not aligned with row numbers and may
//! differ in length across columns. Fractional positions are kept as they are.

use serde::Serialize;
use serde_json::Number;
use tracing::{debug, warn};

use expb_model::{CellValue, Dataset};

use crate::error::OrderError;
use crate::resolve::json_number;

/// Derived order for one column.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct OrderColumn {
    pub column: String,
    /// Whole indices serialize as integers.
    pub indices: Vec<Number>,
    /// Rows dropped because their value was not a finite number.
    pub dropped: usize,
}

/// Derived orders for every selected column, in selection order.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct OrderSpecification {
    pub columns: Vec<OrderColumn>,
}

impl OrderSpecification {
    pub fn get(&self, column: &str) -> Option<&[Number]> {
        self.columns
            .iter()
            .find(|c| c.column == column)
            .map(|c| c.indices.as_slice())
    }

    /// Whether every selected column produced the same number of indices.
    pub fn is_aligned(&self) -> bool {
        self.columns
            .windows(2)
            .all(|pair| pair[0].indices.len() == pair[1].indices.len())
    }

    pub fn is_empty(&self) -> bool {
        self.columns.is_empty()
    }
}

/// Converts 1-based positions into 0-based indices, dropping unusable values.
///
/// Returns the indices and the number of dropped values.
pub fn order_indices<'a, I>(values: I) -> (Vec<Number>, usize)
where
    I: IntoIterator<Item = &'a CellValue>,
{
    let mut indices = Vec::new();
    let mut dropped = 0usize;
    for value in values {
        match value.as_f64().and_then(|position| json_number(position - 1.0)) {
            Some(index) => indices.push(index),
            None => dropped += 1,
        }
    }
    (indices, dropped)
}

/// Extracts a per-column presentation order from `dataset`.
pub fn extract_order<C: AsRef<str>>(
    dataset: &Dataset,
    columns: &[C],
) -> Result<OrderSpecification, OrderError> {
    let mut spec = OrderSpecification::default();
    for column in columns {
        let column = column.as_ref();
        if !dataset.has_column(column) {
            return Err(OrderError::ColumnNotFound(column.to_string()));
        }
        let (indices, dropped) = order_indices(dataset.column_values(column));
        debug!(column, kept = indices.len(), dropped, "extracted order column");
        spec.columns.push(OrderColumn {
            column: column.to_string(),
            indices,
            dropped,
        });
    }
    if !spec.is_aligned() {
        let lengths: Vec<usize> = spec.columns.iter().map(|c| c.indices.len()).collect();
        warn!(?lengths, "order columns yield sequences of different lengths");
    }
    Ok(spec)
}
