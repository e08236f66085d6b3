use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ModelError {
    #[error("invalid component id: {0:?}")]
    InvalidComponentId(String),
    #[error("invalid trial id: {0:?}")]
    InvalidTrialId(String),
    #[error("unknown value type: {0}")]
    InvalidValueType(String),
}

pub type Result<T> = std::result::Result<T, ModelError>;
