use thiserror::Error;

/// Malformed input rejected at the boundary, before it reaches the engine.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("missing required field '{field}'")]
    MissingField { field: &'static str },

    #[error("{kind} block '{id}' requires a non-empty {field}")]
    BlockField {
        kind: String,
        id: String,
        field: &'static str,
    },

    #[error("end date {end} is before start date {start}")]
    DateOrder { start: String, end: String },

    #[error("invalid event record: {0}")]
    Malformed(String),
}

/// Failures raised by a `MessageStore` implementation.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("sqlite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("store lock poisoned")]
    Poisoned,

    #[error("corrupt row: {0}")]
    Corrupt(String),

    #[error("store task failed: {0}")]
    Task(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),
}

#[derive(Error, Debug)]
pub enum ScribeError {
    #[error("validation error: {0}")]
    Validation(#[from] ValidationError),

    #[error("store error: {0}")]
    Store(#[from] StoreError),

    #[error("lookup error: {0}")]
    Lookup(String),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),
}

pub type Result<T> = std::result::Result<T, ScribeError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_missing_field() {
        let err = ValidationError::MissingField { field: "title" };
        assert_eq!(err.to_string(), "missing required field 'title'");
    }

    #[test]
    fn test_block_field() {
        let err = ValidationError::BlockField {
            kind: "quote".to_string(),
            id: "b1".to_string(),
            field: "content",
        };
        assert_eq!(err.to_string(), "quote block 'b1' requires a non-empty content");
    }

    #[test]
    fn test_date_order() {
        let err = ValidationError::DateOrder {
            start: "2024-01-11".to_string(),
            end: "2024-01-10".to_string(),
        };
        assert!(err.to_string().contains("before start date"));
    }

    #[test]
    fn test_scribe_error_wraps_validation() {
        let err = ScribeError::from(ValidationError::MissingField { field: "title" });
        assert_eq!(
            err.to_string(),
            "validation error: missing required field 'title'"
        );
    }

    #[test]
    fn test_json_error() {
        let json_err = serde_json::from_str::<serde_json::Value>("invalid json");
        let err = ScribeError::from(json_err.unwrap_err());
        assert!(err.to_string().contains("expected value"));
    }
}
