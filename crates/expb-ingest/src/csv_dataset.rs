use std::fs;
use std::io::Read;
use std::path::Path;

use csv::ReaderBuilder;
use tracing::debug;

use expb_model::{CellValue, Dataset, Row};

use crate::error::{IngestError, Result};

fn normalize_header(raw: &str) -> String {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    trimmed.split_whitespace().collect::<Vec<_>>().join(" ")
}

fn normalize_cell(raw: &str) -> CellValue {
    let trimmed = raw.trim().trim_matches('\u{feff}');
    if trimmed.is_empty() {
        CellValue::Missing
    } else {
        CellValue::Text(trimmed.to_string())
    }
}

/// Reads participant rows from a CSV file with a header row.
///
/// Cells stay textual; numeric coercion happens at binding resolution.
/// Fully blank lines are skipped and short records read as missing cells.
pub fn read_csv_dataset(path: &Path) -> Result<Dataset> {
    let file = fs::File::open(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    read_csv_dataset_from_reader(file, path)
}

/// Reads CSV rows from any reader. `origin` names the source in errors.
pub fn read_csv_dataset_from_reader<R: Read>(reader: R, origin: &Path) -> Result<Dataset> {
    let csv_error = |source| IngestError::Csv {
        path: origin.to_path_buf(),
        source,
    };
    let mut reader = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_reader(reader);

    let headers: Vec<String> = reader
        .headers()
        .map_err(csv_error)?
        .iter()
        .map(normalize_header)
        .collect();
    for (idx, header) in headers.iter().enumerate() {
        if headers[..idx].contains(header) {
            return Err(IngestError::DuplicateColumn {
                path: origin.to_path_buf(),
                column: header.clone(),
            });
        }
    }

    let mut rows = Vec::new();
    for record in reader.records() {
        let record = record.map_err(csv_error)?;
        if record.iter().all(|value| value.trim().is_empty()) {
            continue;
        }
        let row: Row = headers
            .iter()
            .enumerate()
            .map(|(idx, header)| {
                let cell = record.get(idx).map_or(CellValue::Missing, normalize_cell);
                (header.clone(), cell)
            })
            .collect();
        rows.push(row);
    }
    debug!(
        path = %origin.display(),
        columns = headers.len(),
        rows = rows.len(),
        "loaded csv dataset"
    );
    Ok(Dataset::new(headers, rows))
}

/// Reads participant rows from a JSON array of objects.
///
/// Unlike CSV, JSON keeps numbers numeric. Booleans and nested values are
/// read as their JSON text; headers follow the file's key order.
pub fn read_json_dataset(path: &Path) -> Result<Dataset> {
    let text = fs::read_to_string(path).map_err(|source| IngestError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let rows: Vec<Row> = serde_json::from_str(&text).map_err(|source| IngestError::Json {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(Dataset::from_rows(rows))
}

/// Reads a dataset, choosing the format by file extension (`.json` or CSV).
pub fn read_dataset(path: &Path) -> Result<Dataset> {
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));
    if is_json {
        read_json_dataset(path)
    } else {
        read_csv_dataset(path)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalizes_headers_and_cells() {
        assert_eq!(normalize_header("\u{feff} stimulus   file "), "stimulus file");
        assert_eq!(normalize_cell("  a.png "), CellValue::text("a.png"));
        assert_eq!(normalize_cell("   "), CellValue::Missing);
    }

    #[test]
    fn reads_rows_from_reader() {
        let data = "image,order\n a.png ,1\n\n,2\nc.png\n";
        let dataset = read_csv_dataset_from_reader(data.as_bytes(), Path::new("inline")).unwrap();
        assert_eq!(dataset.headers, vec!["image", "order"]);
        assert_eq!(dataset.len(), 3);
        assert_eq!(dataset.rows[0].get("image"), Some(&CellValue::text("a.png")));
        assert_eq!(dataset.rows[1].get("image"), Some(&CellValue::Missing));
        assert_eq!(dataset.rows[2].get("order"), Some(&CellValue::Missing));
    }

    #[test]
    fn rejects_duplicate_headers() {
        let data = "a,b,a\n1,2,3\n";
        let err = read_csv_dataset_from_reader(data.as_bytes(), Path::new("inline")).unwrap_err();
        assert!(matches!(err, IngestError::DuplicateColumn { column, .. } if column == "a"));
    }
}
