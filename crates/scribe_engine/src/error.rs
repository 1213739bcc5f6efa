//! Engine error types

use scribe_core::{StoreError, ValidationError};
use thiserror::Error;

/// A non-report generation failed.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum GenerationError {
    #[error("{} failed: {message}", Self::describe(.operation, .block_type.as_deref()))]
    Backend {
        operation: &'static str,
        block_type: Option<String>,
        message: String,
    },

    #[error("{operation} returned an empty response")]
    EmptyResponse { operation: &'static str },

    #[error("generation cancelled")]
    Cancelled,
}

impl GenerationError {
    fn describe(operation: &str, block_type: Option<&str>) -> String {
        match block_type {
            Some(kind) => format!("{} ({} block)", operation, kind),
            None => operation.to_string(),
        }
    }
}

/// Error surfaced by the [`ReportEngine`](crate::api::ReportEngine) facade.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Generation(#[from] GenerationError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("invalid request: {0}")]
    Validation(#[from] ValidationError),
}

pub type Result<T> = std::result::Result<T, EngineError>;

/// The chat reply was delivered but its turns were not stored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PersistenceWarning {
    pub message: String,
}

impl PersistenceWarning {
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
        }
    }
}

impl std::fmt::Display for PersistenceWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "chat history not saved: {}", self.message)
    }
}
