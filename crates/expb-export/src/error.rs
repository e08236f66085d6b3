//! Error types for project files, export and sequencing.

use std::path::PathBuf;

use thiserror::Error;

use expb_map::MappingError;
use expb_model::{ComponentId, TrialId};

#[derive(Debug, Error)]
pub enum ExportError {
    #[error("failed to read or write {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("invalid project file {path}: {source}")]
    Json {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },
    #[error("component {component} appears more than once in the project")]
    DuplicateComponent { component: ComponentId },
    #[error("trial {0} appears more than once in the project")]
    DuplicateTrial(TrialId),
    #[error("binding {key:?} of component {component} was rejected: {source}")]
    Binding {
        component: ComponentId,
        key: String,
        #[source]
        source: MappingError,
    },
    #[error(transparent)]
    Mapping(#[from] MappingError),
    #[error("row {row} is out of range; the dataset has {len} rows")]
    RowOutOfRange { row: usize, len: usize },
    #[error(transparent)]
    Sequence(#[from] SequenceError),
}

/// Invalid requests to the trial sequencing controller.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SequenceError {
    #[error("unknown trial: {0}")]
    UnknownTrial(TrialId),
    #[error("cannot skip backwards to trial {0}; use a jump instead")]
    BackwardSkip(TrialId),
}

impl ExportError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}

pub type Result<T> = std::result::Result<T, ExportError>;
