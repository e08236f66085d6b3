pub mod csv_dataset;
pub mod error;
pub mod hints;

pub use csv_dataset::{read_csv_dataset, read_csv_dataset_from_reader, read_dataset, read_json_dataset};
pub use error::{IngestError, Result};
pub use hints::{ColumnHint, build_column_hints};
