//! Data model for experiment component parameters.
//!
//! Shared by the schema registry, the mapping store and the exporter.

pub mod binding;
pub mod dataset;
pub mod error;
pub mod ids;
pub mod value_type;

pub use binding::{ColumnMapping, ColumnMappingEntry, ParameterSpec};
pub use dataset::{CellValue, Dataset, Row};
pub use error::{ModelError, Result};
pub use ids::{ComponentId, TrialId};
pub use value_type::{BaseType, ValueType};
