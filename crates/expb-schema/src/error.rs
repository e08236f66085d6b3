#![deny(unsafe_code)]

use std::path::PathBuf;

use expb_model::ModelError;

#[derive(Debug, thiserror::Error)]
pub enum SchemaError {
    #[error("failed to read metadata file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse metadata for {component}: {source}")]
    Json {
        component: String,
        #[source]
        source: serde_json::Error,
    },

    #[error("no metadata available for component type {0}")]
    UnknownComponent(String),

    #[error("invalid parameter {key} of {component}: {source}")]
    InvalidParameter {
        component: String,
        key: String,
        #[source]
        source: ModelError,
    },

    #[error("component type {0} is already registered")]
    DuplicateComponent(String),
}

impl SchemaError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
