//! Error types for generative backends

use std::time::Duration;

use thiserror::Error;

/// Result type alias for backend operations
pub type Result<T> = std::result::Result<T, BackendError>;

/// Failures raised while talking to a generative backend.
#[derive(Error, Debug)]
pub enum BackendError {
    /// Transport-level failure
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// Non-success status returned by the backend
    #[error("{backend} error {status}: {message}")]
    Status {
        backend: String,
        status: u16,
        message: String,
    },

    /// Response body could not be decoded
    #[error("invalid response from {backend}: {message}")]
    Decode { backend: String, message: String },

    /// Request exceeded its deadline
    #[error("request timed out after {}s", .0.as_secs())]
    Timeout(Duration),

    /// API key is missing
    #[error("missing API key for {0}")]
    MissingApiKey(String),

    /// Unknown backend name
    #[error("unknown backend '{0}' (expected openai, ollama or gemini)")]
    UnknownBackend(String),

    /// Other errors
    #[error("{0}")]
    Other(String),
}

impl BackendError {
    pub fn decode(backend: impl Into<String>, message: impl Into<String>) -> Self {
        BackendError::Decode {
            backend: backend.into(),
            message: message.into(),
        }
    }

    /// Whether a later attempt could succeed.
    pub fn is_retryable(&self) -> bool {
        match self {
            BackendError::Http(e) => e.is_connect() || e.is_timeout(),
            BackendError::Status { status, .. } => matches!(*status, 429 | 500 | 502 | 503 | 504),
            BackendError::Timeout(_) => true,
            BackendError::Decode { .. }
            | BackendError::MissingApiKey(_)
            | BackendError::UnknownBackend(_)
            | BackendError::Other(_) => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_display() {
        let err = BackendError::Status {
            backend: "openai".to_string(),
            status: 503,
            message: "overloaded".to_string(),
        };
        assert_eq!(err.to_string(), "openai error 503: overloaded");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_timeout_display() {
        let err = BackendError::Timeout(Duration::from_secs(30));
        assert_eq!(err.to_string(), "request timed out after 30s");
        assert!(err.is_retryable());
    }

    #[test]
    fn test_client_errors_are_not_retryable() {
        let err = BackendError::Status {
            backend: "gemini".to_string(),
            status: 400,
            message: "bad request".to_string(),
        };
        assert!(!err.is_retryable());
        assert!(!BackendError::MissingApiKey("openai".to_string()).is_retryable());
    }
}
