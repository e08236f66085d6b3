//! Error types for mapping operations.

use thiserror::Error;

use expb_model::{ComponentId, ValueType};

/// Errors from binding operations on the mapping store.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MappingError {
    /// No component with this id is placed.
    #[error("component not found: {0}")]
    ComponentNotFound(ComponentId),
    /// A component with this id is already placed.
    #[error("component already placed: {0}")]
    ComponentAlreadyPlaced(ComponentId),
    /// The component type does not declare this parameter.
    #[error("parameter {key:?} is not declared by {component_type}")]
    ParameterNotFound { component_type: String, key: String },
    /// A typed literal does not have the declared shape.
    #[error("parameter {key:?} expects {expected}, got {found}")]
    TypeMismatch {
        key: String,
        expected: ValueType,
        found: &'static str,
    },
    /// A csv binding names no column.
    #[error("parameter {key:?} is bound to an empty column name")]
    EmptyColumn { key: String },
    /// Manually entered text could not be parsed; the stored value is unchanged.
    #[error("invalid input for {key:?} ({expected}): {message}")]
    InvalidManualInput {
        key: String,
        expected: ValueType,
        message: String,
    },
    /// No preset with this label exists.
    #[error("unknown preset: {0}")]
    UnknownPreset(String),
    /// Presets are not offered for this parameter.
    #[error("presets are not offered for parameter {0:?}")]
    PresetNotOffered(String),
}

/// Errors building a preset library.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum PresetError {
    #[error("duplicate preset label: {0}")]
    DuplicateLabel(String),
    #[error("presets {label:?} and {existing:?} have identical values")]
    DuplicateValue { label: String, existing: String },
    #[error("preset {0:?} value could not be serialized")]
    Unserializable(String),
}

/// Errors extracting a presentation order.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum OrderError {
    #[error("order column not found in dataset: {0}")]
    ColumnNotFound(String),
}
